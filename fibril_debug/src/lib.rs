// Copyright 2026 the Fibril Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, pretty-printing, tracing bridge, and Chrome trace export for
//! fibril diagnostics.
//!
//! This crate provides [`TraceSink`](fibril_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output.
//! - [`recorder::RecorderSink`]: compact binary recording with
//!   [`recorder::decode`] for playback.
//! - [`chrome::export`]: writes Chrome Trace Event Format JSON from recorded
//!   bytes.
//! - [`tracing_sink::TracingSink`]: forwards events to `tracing`.
//! - [`Fanout`]: sends each event to two sinks.

pub mod chrome;
pub mod pretty;
pub mod recorder;
pub mod tracing_sink;

use fibril_core::trace::{
    CommitEvent, PassAbandonedEvent, PhaseBeginEvent, PhaseEndEvent, RenderEvent,
    SliceYieldEvent, TraceSink, UnitOfWorkEvent,
};

/// A [`TraceSink`] that forwards every event to two sinks, first `A` then `B`.
///
/// Nest to reach more than two.
#[derive(Debug, Default)]
pub struct Fanout<A, B>(pub A, pub B);

impl<A: TraceSink, B: TraceSink> TraceSink for Fanout<A, B> {
    fn on_render(&mut self, e: &RenderEvent) {
        self.0.on_render(e);
        self.1.on_render(e);
    }

    fn on_unit_of_work(&mut self, e: &UnitOfWorkEvent) {
        self.0.on_unit_of_work(e);
        self.1.on_unit_of_work(e);
    }

    fn on_slice_yield(&mut self, e: &SliceYieldEvent) {
        self.0.on_slice_yield(e);
        self.1.on_slice_yield(e);
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.0.on_phase_begin(e);
        self.1.on_phase_begin(e);
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.0.on_phase_end(e);
        self.1.on_phase_end(e);
    }

    fn on_commit(&mut self, e: &CommitEvent) {
        self.0.on_commit(e);
        self.1.on_commit(e);
    }

    fn on_pass_abandoned(&mut self, e: &PassAbandonedEvent) {
        self.0.on_pass_abandoned(e);
        self.1.on_pass_abandoned(e);
    }
}
