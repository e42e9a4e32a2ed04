// Copyright 2026 the Fibril Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Incremental fiber reconciler with a cooperative work loop.
//!
//! `fibril_core` turns declarative [`Element`](element::Element) trees into
//! the minimal set of mutations on a [`RenderTarget`](target::RenderTarget).
//! Work is split into units, one per tree node, so a host can spread a large
//! render over many idle periods and never block for long. It is `no_std`
//! compatible (with `alloc`) and keeps fibers in struct-of-arrays storage with
//! generational index handles.
//!
//! # Architecture
//!
//! ```text
//!   Element tree
//!       │
//!       ▼
//!   Renderer::render() ──► wip root ──► next unit
//!                                          │
//!          ┌───────────────────────────────┘
//!          ▼
//!   Renderer::work_loop(deadline)
//!     ├─ perform_unit_of_work ── materialize, reconcile_children
//!     ├─ … until the IdleDeadline is spent ──► SliceOutcome::Yielded
//!     └─ last unit done ──► commit_root ──► SliceOutcome::Committed
//!                              │
//!                              ▼
//!                   RenderTarget mutations
//! ```
//!
//! **[`element`]**: Immutable element descriptions and their typed props.
//!
//! **[`fiber`]**: Struct-of-arrays fiber store with generational handles.
//!
//! **`reconcile`**: One unit of work: materialize the node, diff the
//! children positionally.
//!
//! **[`diff`]**: The four-pass prop differ.
//!
//! **[`materialize`]**: Creates a rendered node for one element.
//!
//! **[`commit`]**: Applies deletions, placements, and updates in one go.
//!
//! **[`scheduler`]**: The budgeted work loop and the [`IdleDeadline`]
//! implementations.
//!
//! **[`target`]**: The [`RenderTarget`](target::RenderTarget) capability
//! trait; **[`headless`]** implements it in memory.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! work-loop instrumentation, with zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! # Example
//!
//! ```
//! use fibril_core::Renderer;
//! use fibril_core::element::Element;
//! use fibril_core::headless::MemoryTarget;
//!
//! let mut target = MemoryTarget::new();
//! let root = target.create_container("main");
//! let mut renderer = Renderer::new();
//!
//! renderer.render(Element::host("h2").child("Hello ").child("World"), root);
//! renderer.flush(&mut target).unwrap();
//!
//! assert_eq!(target.inner_markup(root), "<h2>Hello World</h2>");
//! ```
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables [`InstantDeadline`].
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod commit;
pub mod diff;
pub mod element;
pub mod error;
pub mod fiber;
pub mod headless;
pub mod materialize;
mod reconcile;
mod renderer;
pub mod scheduler;
pub mod target;
pub mod trace;

pub use error::{RenderError, TargetError};
pub use renderer::Renderer;
#[cfg(feature = "std")]
pub use scheduler::InstantDeadline;
pub use scheduler::{IdleDeadline, SliceOutcome, Unbounded, UnitBudget, WorkLoopConfig};
