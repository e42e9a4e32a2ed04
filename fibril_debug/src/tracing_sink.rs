// Copyright 2026 the Fibril Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bridge into the `tracing` ecosystem.
//!
//! [`TracingSink`] turns trace events into `tracing` events under the
//! `fibril` target, so an application that already installs a subscriber gets
//! work-loop diagnostics without extra plumbing. Levels:
//!
//! | Event                         | Level   |
//! |-------------------------------|---------|
//! | unit of work, phase begin/end | `TRACE` |
//! | render, slice yield           | `DEBUG` |
//! | commit                        | `DEBUG` |
//! | pass superseded               | `DEBUG` |
//! | pass failed                   | `WARN`  |

use fibril_core::trace::{
    AbandonReason, CommitEvent, PassAbandonedEvent, PhaseBeginEvent, PhaseEndEvent, RenderEvent,
    SliceYieldEvent, TraceSink, UnitOfWorkEvent,
};

/// A [`TraceSink`] that forwards every event to `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl TraceSink for TracingSink {
    fn on_render(&mut self, e: &RenderEvent) {
        tracing::debug!(
            target: "fibril",
            pass = e.pass,
            root = ?e.root,
            has_current = e.has_current,
            "render requested"
        );
    }

    fn on_unit_of_work(&mut self, e: &UnitOfWorkEvent) {
        tracing::trace!(
            target: "fibril",
            pass = e.pass,
            fiber = ?e.fiber,
            effect = ?e.effect,
            materialized = e.materialized,
            children = e.children,
            deletions = e.deletions,
            "unit of work"
        );
    }

    fn on_slice_yield(&mut self, e: &SliceYieldEvent) {
        tracing::debug!(
            target: "fibril",
            pass = e.pass,
            units = e.units,
            total_units = e.total_units,
            "slice yielded"
        );
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        tracing::trace!(target: "fibril", pass = e.pass, phase = ?e.phase, "phase begin");
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        tracing::trace!(target: "fibril", pass = e.pass, phase = ?e.phase, "phase end");
    }

    fn on_commit(&mut self, e: &CommitEvent) {
        tracing::debug!(
            target: "fibril",
            pass = e.pass,
            units = e.units,
            placements = e.stats.placements,
            updates = e.stats.updates,
            deletions = e.stats.deletions,
            prop_mutations = e.stats.props.total(),
            retired = e.retired,
            "committed"
        );
    }

    fn on_pass_abandoned(&mut self, e: &PassAbandonedEvent) {
        match e.reason {
            AbandonReason::Superseded => tracing::debug!(
                target: "fibril",
                pass = e.pass,
                units = e.units,
                freed = e.freed,
                "pass superseded by a newer render"
            ),
            AbandonReason::Failed => tracing::warn!(
                target: "fibril",
                pass = e.pass,
                units = e.units,
                freed = e.freed,
                "pass failed and was abandoned"
            ),
        }
    }
}
