// Copyright 2026 the Fibril Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fiber tree data model.
//!
//! A *fiber* is the unit the reconciler works on: one node of either the
//! committed (*current*) tree or the tree under construction
//! (*work-in-progress*). Each fiber has:
//!
//! - An identity ([`FiberId`]): a generational handle that becomes stale when
//!   the fiber is freed, so a handle into a retired generation can never alias
//!   a fiber of a newer one.
//! - Topology: parent, first-child, and sibling links forming an ordered tree.
//! - An `alternate` link to the fiber at the same position in the other
//!   generation. It never owns anything; it is cleared once the generation it
//!   points into has been retired.
//! - The element data it was built from (type and props), the rendered node
//!   once materialized, and the [`EffectTag`] the commit phase acts on.
//!
//! Fibers are stored in struct-of-arrays layout with index links. Freed slots
//! are recycled through a free list.

mod id;
mod store;
mod traverse;

pub use id::{EffectTag, FiberId, INVALID};
pub use store::FiberStore;
pub use traverse::{Children, Preorder};
