// Copyright 2026 the Fibril Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays fiber storage with allocation, topology, and generation
//! retirement.

use alloc::vec::Vec;

use crate::element::{ElementType, Props};

use super::id::{EffectTag, FiberId, INVALID};
use super::traverse::{Children, Preorder};

/// Struct-of-arrays storage for the fibers of every live tree generation.
///
/// Fibers are addressed by [`FiberId`] handles. Internally, each fiber occupies
/// a slot in parallel arrays. Freed fibers are recycled via a free list, and
/// generation counters prevent stale handle access.
///
/// `N` is the rendered-node handle type of the render target. A slot's node is
/// dropped when the fiber is freed.
#[derive(Debug)]
pub struct FiberStore<N> {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) child: Vec<u32>,
    pub(crate) sibling: Vec<u32>,
    pub(crate) alternate: Vec<u32>,

    // -- Element data --
    pub(crate) ty: Vec<Option<ElementType>>,
    pub(crate) props: Vec<Props>,

    // -- Reconciliation state --
    pub(crate) node: Vec<Option<N>>,
    pub(crate) effect: Vec<EffectTag>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,
}

impl<N> Default for FiberStore<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N> FiberStore<N> {
    /// Creates an empty fiber store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent: Vec::new(),
            child: Vec::new(),
            sibling: Vec::new(),
            alternate: Vec::new(),
            ty: Vec::new(),
            props: Vec::new(),
            node: Vec::new(),
            effect: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
        }
    }

    // -- Allocation API --

    /// Creates an unlinked fiber.
    ///
    /// `ty` is `None` only for root fibers, whose node is the container passed
    /// to [`render`](crate::Renderer::render).
    pub(crate) fn create_fiber(
        &mut self,
        ty: Option<ElementType>,
        props: Props,
        node: Option<N>,
        effect: EffectTag,
    ) -> FiberId {
        let idx = if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot. Its generation was bumped when it was freed.
            let i = idx as usize;
            self.parent[i] = INVALID;
            self.child[i] = INVALID;
            self.sibling[i] = INVALID;
            self.alternate[i] = INVALID;
            self.ty[i] = ty;
            self.props[i] = props;
            self.node[i] = node;
            self.effect[i] = effect;
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.child.push(INVALID);
            self.sibling.push(INVALID);
            self.alternate.push(INVALID);
            self.ty.push(ty);
            self.props.push(props);
            self.node.push(node);
            self.effect.push(effect);
            self.generation.push(0);
            idx
        };

        FiberId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Frees a single fiber, dropping its node and props.
    ///
    /// Links of other fibers pointing at it are left alone; callers free whole
    /// generations at once.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub(crate) fn destroy_fiber(&mut self, id: FiberId) {
        self.validate(id);
        let i = id.idx as usize;
        self.parent[i] = INVALID;
        self.child[i] = INVALID;
        self.sibling[i] = INVALID;
        self.alternate[i] = INVALID;
        self.ty[i] = None;
        self.props[i] = Props::default();
        self.node[i] = None;
        self.effect[i] = EffectTag::None;

        // Bump generation so old handles immediately fail validation.
        self.generation[i] += 1;
        self.free_list.push(id.idx);
    }

    /// Frees `root` and every fiber below it. Returns the number freed.
    pub(crate) fn destroy_subtree(&mut self, root: FiberId) -> u32 {
        let doomed: Vec<FiberId> = self.preorder(root).collect();
        for &id in &doomed {
            self.destroy_fiber(id);
        }
        #[expect(
            clippy::cast_possible_truncation,
            reason = "fiber counts are bounded by u32 slot indices"
        )]
        let count = doomed.len() as u32;
        count
    }

    /// Returns whether the given handle refers to a live fiber.
    #[must_use]
    pub fn is_alive(&self, id: FiberId) -> bool {
        (id.idx < self.len)
            && self.generation[id.idx as usize] == id.generation
            && !self.free_list.contains(&id.idx)
    }

    /// Returns the number of live fibers across all generations.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.len as usize - self.free_list.len()
    }

    // -- Topology API --

    /// Returns the parent of a fiber, if any.
    #[must_use]
    pub fn parent(&self, id: FiberId) -> Option<FiberId> {
        self.validate(id);
        self.id_at(self.parent[id.idx as usize])
    }

    /// Returns the first child of a fiber, if any.
    #[must_use]
    pub fn child(&self, id: FiberId) -> Option<FiberId> {
        self.validate(id);
        self.id_at(self.child[id.idx as usize])
    }

    /// Returns the next sibling of a fiber, if any.
    #[must_use]
    pub fn sibling(&self, id: FiberId) -> Option<FiberId> {
        self.validate(id);
        self.id_at(self.sibling[id.idx as usize])
    }

    /// Returns the fiber at the same position in the other generation.
    ///
    /// Only set on work-in-progress fibers tagged [`EffectTag::Update`] (and on
    /// the work-in-progress root) until their pass commits.
    #[must_use]
    pub fn alternate(&self, id: FiberId) -> Option<FiberId> {
        self.validate(id);
        self.id_at(self.alternate[id.idx as usize])
    }

    /// Returns an iterator over the direct children of a fiber.
    #[must_use]
    pub fn children(&self, id: FiberId) -> Children<'_, N> {
        self.validate(id);
        Children::new(self, self.child[id.idx as usize])
    }

    /// Returns a preorder iterator over `root` and all of its descendants.
    #[must_use]
    pub fn preorder(&self, root: FiberId) -> Preorder<'_, N> {
        self.validate(root);
        Preorder::new(self, root.idx)
    }

    // -- Property getters --

    /// Returns the element type, or `None` for a root fiber.
    #[must_use]
    pub fn element_type(&self, id: FiberId) -> Option<&ElementType> {
        self.validate(id);
        self.ty[id.idx as usize].as_ref()
    }

    /// Returns the props the fiber was built from.
    #[must_use]
    pub fn props(&self, id: FiberId) -> &Props {
        self.validate(id);
        &self.props[id.idx as usize]
    }

    /// Returns the rendered node, once materialized.
    #[must_use]
    pub fn node(&self, id: FiberId) -> Option<&N> {
        self.validate(id);
        self.node[id.idx as usize].as_ref()
    }

    /// Returns the effect tag.
    #[must_use]
    pub fn effect(&self, id: FiberId) -> EffectTag {
        self.validate(id);
        self.effect[id.idx as usize]
    }

    // -- Mutation API --

    pub(crate) fn set_node(&mut self, id: FiberId, node: N) {
        self.validate(id);
        self.node[id.idx as usize] = Some(node);
    }

    pub(crate) fn set_effect(&mut self, id: FiberId, effect: EffectTag) {
        self.validate(id);
        self.effect[id.idx as usize] = effect;
    }

    pub(crate) fn set_alternate(&mut self, id: FiberId, alternate: Option<FiberId>) {
        self.validate(id);
        self.alternate[id.idx as usize] = alternate.map_or(INVALID, |a| a.idx);
    }

    /// Links `child` below `parent`, after `prev` if given, else as the first
    /// child.
    pub(crate) fn link_child(&mut self, parent: FiberId, prev: Option<FiberId>, child: FiberId) {
        self.validate(parent);
        self.validate(child);
        self.parent[child.idx as usize] = parent.idx;
        match prev {
            Some(prev) => {
                self.validate(prev);
                self.sibling[prev.idx as usize] = child.idx;
            }
            None => self.child[parent.idx as usize] = child.idx,
        }
    }

    // -- Internal helpers --

    /// Converts a raw link into a handle carrying the slot's current generation.
    pub(crate) fn id_at(&self, idx: u32) -> Option<FiberId> {
        (idx != INVALID).then(|| FiberId {
            idx,
            generation: self.generation[idx as usize],
        })
    }

    /// Panics if the handle is stale.
    fn validate(&self, id: FiberId) {
        assert!(
            id.idx < self.len && self.generation[id.idx as usize] == id.generation,
            "stale FiberId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }
}
