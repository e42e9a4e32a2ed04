// Copyright 2026 the Fibril Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][spec] JSON to the given writer.
//!
//! Phases become duration slices on thread 0; renders, units, yields, commits,
//! and abandoned passes become instant events carrying their payload in
//! `args`.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for record in decode(bytes) {
        let ts = nanos_to_us(record.at_nanos);
        let pass = record.pass;
        let event = match record.event {
            RecordedEvent::Render { root, has_current } => json!({
                "ph": "i",
                "name": "Render",
                "cat": "Pass",
                "ts": ts,
                "pid": 0,
                "tid": 0,
                "s": "g",
                "args": {
                    "pass": pass,
                    "root": root.index,
                    "has_current": has_current,
                }
            }),
            RecordedEvent::UnitOfWork {
                fiber,
                effect,
                materialized,
                children,
                deletions,
            } => json!({
                "ph": "i",
                "name": "UnitOfWork",
                "cat": "Reconcile",
                "ts": ts,
                "pid": 0,
                "tid": 0,
                "s": "t",
                "args": {
                    "pass": pass,
                    "fiber": fiber.index,
                    "effect": format!("{effect:?}"),
                    "materialized": materialized,
                    "children": children,
                    "deletions": deletions,
                }
            }),
            RecordedEvent::SliceYield { units, total_units } => json!({
                "ph": "i",
                "name": "Yield",
                "cat": "Scheduler",
                "ts": ts,
                "pid": 0,
                "tid": 0,
                "s": "t",
                "args": {
                    "pass": pass,
                    "units": units,
                    "total_units": total_units,
                }
            }),
            RecordedEvent::PhaseBegin(phase) => json!({
                "ph": "B",
                "name": format!("{phase:?}"),
                "cat": "Pass",
                "ts": ts,
                "pid": 0,
                "tid": 0,
                "args": {
                    "pass": pass,
                }
            }),
            RecordedEvent::PhaseEnd(phase) => json!({
                "ph": "E",
                "name": format!("{phase:?}"),
                "cat": "Pass",
                "ts": ts,
                "pid": 0,
                "tid": 0,
                "args": {
                    "pass": pass,
                }
            }),
            RecordedEvent::Commit {
                units,
                stats,
                retired,
            } => json!({
                "ph": "i",
                "name": "Commit",
                "cat": "Summary",
                "ts": ts,
                "pid": 0,
                "tid": 0,
                "s": "g",
                "args": {
                    "pass": pass,
                    "units": units,
                    "placements": stats.placements,
                    "updates": stats.updates,
                    "deletions": stats.deletions,
                    "prop_mutations": stats.props.total(),
                    "retired": retired,
                }
            }),
            RecordedEvent::PassAbandoned {
                reason,
                units,
                freed,
            } => json!({
                "ph": "i",
                "name": "PassAbandoned",
                "cat": "Summary",
                "ts": ts,
                "pid": 0,
                "tid": 0,
                "s": "g",
                "args": {
                    "pass": pass,
                    "reason": format!("{reason:?}"),
                    "units": units,
                    "freed": freed,
                }
            }),
        };
        events.push(event);
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

#[expect(
    clippy::cast_precision_loss,
    reason = "trace viewers take float microseconds"
)]
fn nanos_to_us(nanos: u64) -> f64 {
    nanos as f64 / 1000.0
}
