// Copyright 2026 the Fibril Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the work loop.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! [`Renderer`](crate::Renderer) calls at each stage of a pass. All method
//! bodies default to no-ops, so implementing only the events you care about is
//! fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! Events carry no timestamps; the core has no clock. Sinks that need time
//! (see `fibril_debug::RecorderSink`) stamp events on arrival.
//!
//! A pass produces events in this order:
//!
//! ```text
//! render ─► phase_begin(Reconcile) ─► unit_of_work × n ─► phase_end(Reconcile)
//!              ▲                                                │
//!              └──────────── slice_yield ◄── (budget spent) ────┤
//!                                                               ▼
//!                       phase_begin(Commit) ─► commit ─► phase_end(Commit)
//! ```
//!
//! A `pass_abandoned` event replaces the tail when the pass is superseded by
//! another `render` or fails.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).

use crate::commit::CommitStats;
use crate::fiber::{EffectTag, FiberId};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which phase of a pass is being measured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    /// Building the work-in-progress tree, one unit at a time. Begins and ends
    /// once per slice.
    Reconcile,
    /// Applying the collected effects to the render target.
    Commit,
}

/// Why a pass was dropped before it committed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AbandonReason {
    /// A newer `render` call replaced it.
    Superseded,
    /// The render target reported an error, or an element was malformed.
    Failed,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a `render` call arms a new pass.
#[derive(Clone, Copy, Debug)]
pub struct RenderEvent {
    /// Pass counter.
    pub pass: u64,
    /// The work-in-progress root.
    pub root: FiberId,
    /// Whether a committed tree exists to diff against.
    pub has_current: bool,
}

/// Emitted after each unit of work.
#[derive(Clone, Copy, Debug)]
pub struct UnitOfWorkEvent {
    /// Pass counter.
    pub pass: u64,
    /// The fiber that was visited.
    pub fiber: FiberId,
    /// Its effect tag.
    pub effect: EffectTag,
    /// Whether a node was created for it during this unit.
    pub materialized: bool,
    /// Number of child fibers produced.
    pub children: u32,
    /// Number of old fibers added to the deletion set.
    pub deletions: u32,
}

/// Emitted when a slice hands control back with work remaining.
#[derive(Clone, Copy, Debug)]
pub struct SliceYieldEvent {
    /// Pass counter.
    pub pass: u64,
    /// Units run in this slice.
    pub units: u32,
    /// Total units run in this pass so far.
    pub total_units: u32,
}

/// Marks the beginning of a phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseBeginEvent {
    /// Pass counter.
    pub pass: u64,
    /// Which phase is starting.
    pub phase: PhaseKind,
}

/// Marks the end of a phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseEndEvent {
    /// Pass counter.
    pub pass: u64,
    /// Which phase is ending.
    pub phase: PhaseKind,
}

/// Emitted after a pass committed.
#[derive(Clone, Copy, Debug)]
pub struct CommitEvent {
    /// Pass counter.
    pub pass: u64,
    /// Total units run in the pass.
    pub units: u32,
    /// What the commit did.
    pub stats: CommitStats,
    /// Fibers of the previous generation freed back to the store.
    pub retired: u32,
}

/// Emitted when a pass is dropped without committing.
#[derive(Clone, Copy, Debug)]
pub struct PassAbandonedEvent {
    /// Pass counter of the dropped pass.
    pub pass: u64,
    /// Why it was dropped.
    pub reason: AbandonReason,
    /// Units that had run.
    pub units: u32,
    /// Work-in-progress fibers freed.
    pub freed: u32,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the work loop.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a new pass is armed.
    fn on_render(&mut self, e: &RenderEvent) {
        _ = e;
    }

    /// Called after each unit of work.
    fn on_unit_of_work(&mut self, e: &UnitOfWorkEvent) {
        _ = e;
    }

    /// Called when a slice yields with work remaining.
    fn on_slice_yield(&mut self, e: &SliceYieldEvent) {
        _ = e;
    }

    /// Called at the beginning of a phase.
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        _ = e;
    }

    /// Called at the end of a phase.
    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        _ = e;
    }

    /// Called after a commit.
    fn on_commit(&mut self, e: &CommitEvent) {
        _ = e;
    }

    /// Called when a pass is dropped.
    fn on_pass_abandoned(&mut self, e: &PassAbandonedEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl Default for Tracer<'_> {
    fn default() -> Self {
        Self::none()
    }
}

/// Generates one forwarding method per event.
macro_rules! forward {
    ($(#[$doc:meta] $method:ident => $hook:ident($ty:ty);)*) => {
        $(
            #[$doc]
            #[inline]
            pub fn $method(&mut self, e: &$ty) {
                #[cfg(feature = "trace")]
                if let Some(s) = &mut self.sink {
                    s.$hook(e);
                }
                #[cfg(not(feature = "trace"))]
                {
                    _ = e;
                }
            }
        )*
    };
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    forward! {
        /// Emits a [`RenderEvent`].
        render => on_render(RenderEvent);
        /// Emits a [`UnitOfWorkEvent`].
        unit_of_work => on_unit_of_work(UnitOfWorkEvent);
        /// Emits a [`SliceYieldEvent`].
        slice_yield => on_slice_yield(SliceYieldEvent);
        /// Emits a [`PhaseBeginEvent`].
        phase_begin => on_phase_begin(PhaseBeginEvent);
        /// Emits a [`PhaseEndEvent`].
        phase_end => on_phase_end(PhaseEndEvent);
        /// Emits a [`CommitEvent`].
        commit => on_commit(CommitEvent);
        /// Emits a [`PassAbandonedEvent`].
        pass_abandoned => on_pass_abandoned(PassAbandonedEvent);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
