// Copyright 2026 the Fibril Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reconciliation: one unit of work per fiber.
//!
//! A unit materializes the fiber's node if it has none yet, then diffs the
//! fiber's child elements against the children of its alternate. Matching is
//! purely positional: the element at index `i` is compared with the `i`-th old
//! child, and only their types are looked at. A reordered list therefore shows
//! up as deletions plus placements, never as moves.
//!
//! Nothing here touches the visible tree. Nodes created by
//! [`materialize`](crate::materialize::materialize) stay detached until the
//! commit phase inserts them.

use alloc::vec::Vec;

use crate::element::Element;
use crate::error::RenderError;
use crate::fiber::{EffectTag, FiberId, FiberStore, INVALID};
use crate::materialize::materialize;
use crate::target::RenderTarget;

/// What a single unit of work did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct UnitReport {
    /// The fiber to visit next, in preorder.
    pub(crate) next: Option<FiberId>,
    /// Whether a node was created.
    pub(crate) materialized: bool,
    /// Number of child fibers produced.
    pub(crate) children: u32,
    /// Number of old fibers pushed to the deletion set.
    pub(crate) deletions: u32,
}

/// Runs one unit of work on `fiber`.
pub(crate) fn perform_unit_of_work<T>(
    target: &mut T,
    fibers: &mut FiberStore<T::Node>,
    deletions: &mut Vec<FiberId>,
    fiber: FiberId,
) -> Result<UnitReport, RenderError>
where
    T: RenderTarget + ?Sized,
{
    let props = fibers.props(fiber).clone();

    let mut materialized = false;
    if fibers.node(fiber).is_none() {
        let Some(ty) = fibers.element_type(fiber).cloned() else {
            return Err(RenderError::MalformedElement {
                reason: "root fiber without a container",
            });
        };
        let (node, _) = materialize(target, &ty, &props)?;
        fibers.set_node(fiber, node);
        materialized = true;
    }

    let before = deletions.len();
    let children = reconcile_children(fibers, deletions, fiber, props.children());

    #[expect(
        clippy::cast_possible_truncation,
        reason = "deletions per parent are bounded by u32 slot indices"
    )]
    let deleted = (deletions.len() - before) as u32;

    Ok(UnitReport {
        next: fibers.id_at(fibers.preorder_successor(fiber.idx, INVALID)),
        materialized,
        children,
        deletions: deleted,
    })
}

/// Builds the child fibers of `wip` from `elements`, diffing against the
/// children of its alternate. Returns the number of fibers created.
///
/// Old children whose position has no element of the same type are tagged
/// [`EffectTag::Deletion`] and pushed to `deletions`.
pub(crate) fn reconcile_children<N: Clone>(
    fibers: &mut FiberStore<N>,
    deletions: &mut Vec<FiberId>,
    wip: FiberId,
    elements: &[Element],
) -> u32 {
    let mut old = fibers.alternate(wip).and_then(|alt| fibers.child(alt));
    let mut prev: Option<FiberId> = None;
    let mut created = 0;
    let mut index = 0;

    while index < elements.len() || old.is_some() {
        let element = elements.get(index);
        let same_type = match (element, old) {
            (Some(element), Some(old)) => fibers.element_type(old) == Some(element.element_type()),
            _ => false,
        };

        let fresh = match (element, old) {
            (Some(element), Some(old)) if same_type => {
                let node = fibers.node(old).cloned();
                let fiber = fibers.create_fiber(
                    Some(element.element_type().clone()),
                    element.props().clone(),
                    node,
                    EffectTag::Update,
                );
                fibers.set_alternate(fiber, Some(old));
                Some(fiber)
            }
            (Some(element), _) => Some(fibers.create_fiber(
                Some(element.element_type().clone()),
                element.props().clone(),
                None,
                EffectTag::Placement,
            )),
            (None, _) => None,
        };

        if let Some(stale) = old {
            if !same_type {
                fibers.set_effect(stale, EffectTag::Deletion);
                deletions.push(stale);
            }
            old = fibers.sibling(stale);
        }

        if let Some(fiber) = fresh {
            fibers.link_child(wip, prev, fiber);
            prev = Some(fiber);
            created += 1;
        }
        index += 1;
    }

    created
}
