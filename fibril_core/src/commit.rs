// Copyright 2026 the Fibril Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Commit phase.
//!
//! Commit is the only stage that touches the visible part of the render
//! target, and it is never split across slices. Deletions go first, then the
//! new tree is walked in preorder applying placements and updates.
//!
//! A placed node goes in front of the next sibling whose node is already
//! mounted (an `Update` fiber), so the rendered children keep the element
//! order even when a type changes mid-list.

use crate::diff::{PropChanges, diff_props};
use crate::error::RenderError;
use crate::fiber::{EffectTag, FiberId, FiberStore};
use crate::target::RenderTarget;

/// What one commit did to the render target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CommitStats {
    /// Nodes inserted.
    pub placements: u32,
    /// Fibers whose props were diffed in place.
    pub updates: u32,
    /// Nodes removed.
    pub deletions: u32,
    /// Attribute and listener mutations issued by updates.
    pub props: PropChanges,
}

impl CommitStats {
    /// Returns `true` if the commit issued no mutation at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.placements == 0 && self.deletions == 0 && self.props.is_empty()
    }
}

/// Applies the effects of the tree under `wip_root` and of `deletions`.
///
/// Leaves the fiber store untouched; promoting the tree is up to the caller.
/// On error, mutations already issued stay applied.
pub(crate) fn commit_root<T>(
    target: &mut T,
    fibers: &FiberStore<T::Node>,
    wip_root: FiberId,
    deletions: &[FiberId],
) -> Result<CommitStats, RenderError>
where
    T: RenderTarget + ?Sized,
{
    let mut stats = CommitStats::default();

    for &fiber in deletions {
        let Some(node) = fibers.node(fiber) else {
            continue;
        };
        let parent = host_parent(fibers, fiber);
        target.remove_child(parent, node)?;
        stats.deletions += 1;
    }

    for fiber in fibers.preorder(wip_root).skip(1) {
        match fibers.effect(fiber) {
            EffectTag::Placement => {
                if let Some(node) = fibers.node(fiber) {
                    let parent = host_parent(fibers, fiber);
                    match mounted_sibling(fibers, fiber) {
                        Some(before) => target.insert_before(parent, node, before)?,
                        None => target.append_child(parent, node)?,
                    }
                    stats.placements += 1;
                }
            }
            EffectTag::Update => {
                let (Some(node), Some(old)) = (fibers.node(fiber), fibers.alternate(fiber)) else {
                    continue;
                };
                stats.props += diff_props(target, node, fibers.props(old), fibers.props(fiber))?;
                stats.updates += 1;
            }
            EffectTag::None | EffectTag::Deletion => {}
        }
    }

    Ok(stats)
}

/// Returns the node of the first later sibling that stays mounted.
fn mounted_sibling<N>(fibers: &FiberStore<N>, fiber: FiberId) -> Option<&N> {
    let mut cursor = fibers.sibling(fiber);
    while let Some(sibling) = cursor {
        if fibers.effect(sibling) == EffectTag::Update
            && let Some(node) = fibers.node(sibling)
        {
            return Some(node);
        }
        cursor = fibers.sibling(sibling);
    }
    None
}

/// Returns the node of the nearest ancestor that has one.
///
/// # Panics
///
/// Panics if no ancestor has a node. Every tree hangs below a root whose node
/// is the render container, so this means the tree is corrupt.
fn host_parent<N>(fibers: &FiberStore<N>, fiber: FiberId) -> &N {
    let mut cursor = fibers.parent(fiber);
    while let Some(ancestor) = cursor {
        if let Some(node) = fibers.node(ancestor) {
            return node;
        }
        cursor = fibers.parent(ancestor);
    }
    panic!("{fiber:?} has no ancestor with a rendered node");
}
