// Copyright 2026 the Fibril Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use super::id::{FiberId, INVALID};
use super::store::FiberStore;

/// An iterator over the direct children of a fiber.
///
/// Created by [`FiberStore::children`].
#[derive(Debug)]
pub struct Children<'a, N> {
    store: &'a FiberStore<N>,
    current: u32,
}

impl<'a, N> Children<'a, N> {
    pub(crate) fn new(store: &'a FiberStore<N>, first: u32) -> Self {
        Self {
            store,
            current: first,
        }
    }
}

impl<N> Iterator for Children<'_, N> {
    type Item = FiberId;

    fn next(&mut self) -> Option<FiberId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.store.sibling[idx as usize];
        self.store.id_at(idx)
    }
}

/// A depth-first preorder iterator over a fiber and its descendants.
///
/// Created by [`FiberStore::preorder`]. Siblings of the starting fiber are not
/// visited.
#[derive(Debug)]
pub struct Preorder<'a, N> {
    store: &'a FiberStore<N>,
    root: u32,
    next: u32,
}

impl<'a, N> Preorder<'a, N> {
    pub(crate) fn new(store: &'a FiberStore<N>, root: u32) -> Self {
        Self {
            store,
            root,
            next: root,
        }
    }
}

impl<N> Iterator for Preorder<'_, N> {
    type Item = FiberId;

    fn next(&mut self) -> Option<FiberId> {
        if self.next == INVALID {
            return None;
        }
        let idx = self.next;
        self.next = self.store.preorder_successor(idx, self.root);
        self.store.id_at(idx)
    }
}

impl<N> FiberStore<N> {
    /// Returns the slot visited after `idx` in a preorder walk that ends once
    /// the walk climbs back to `stop`.
    ///
    /// The first child comes first; otherwise the nearest sibling of `idx` or
    /// of one of its ancestors below `stop`. Pass [`INVALID`] as `stop` to walk
    /// up to the top of the tree.
    pub(crate) fn preorder_successor(&self, idx: u32, stop: u32) -> u32 {
        let child = self.child[idx as usize];
        if child != INVALID {
            return child;
        }
        let mut cursor = idx;
        while cursor != INVALID && cursor != stop {
            let sibling = self.sibling[cursor as usize];
            if sibling != INVALID {
                return sibling;
            }
            cursor = self.parent[cursor as usize];
        }
        INVALID
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use crate::element::{ElementType, Props};
    use crate::fiber::EffectTag;

    use super::*;

    fn fiber(store: &mut FiberStore<()>) -> FiberId {
        store.create_fiber(
            Some(ElementType::host("div")),
            Props::default(),
            None,
            EffectTag::None,
        )
    }

    /// Builds `root(a(a1, a2), b(b1))` and returns all handles in preorder.
    fn sample_tree(store: &mut FiberStore<()>) -> [FiberId; 6] {
        let [root, a, a1, a2, b, b1] = core::array::from_fn(|_| fiber(store));
        store.link_child(root, None, a);
        store.link_child(a, None, a1);
        store.link_child(a, Some(a1), a2);
        store.link_child(root, Some(a), b);
        store.link_child(b, None, b1);
        [root, a, a1, a2, b, b1]
    }

    #[test]
    fn preorder_visits_depth_first() {
        let mut store = FiberStore::new();
        let all = sample_tree(&mut store);
        let visited: Vec<_> = store.preorder(all[0]).collect();
        assert_eq!(visited, all.to_vec());
    }

    #[test]
    fn preorder_of_subtree_skips_its_siblings() {
        let mut store = FiberStore::new();
        let [_, a, a1, a2, ..] = sample_tree(&mut store);
        let visited: Vec<_> = store.preorder(a).collect();
        assert_eq!(visited, vec![a, a1, a2]);
    }

    #[test]
    fn successor_climbs_to_the_top() {
        let mut store = FiberStore::new();
        let [_, _, _, a2, b, b1] = sample_tree(&mut store);
        assert_eq!(store.preorder_successor(a2.idx, INVALID), b.idx);
        assert_eq!(store.preorder_successor(b1.idx, INVALID), INVALID);
    }
}
