// Copyright 2026 the Fibril Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Units of work
//! are indented under their slice so a yielded pass reads as a list of slices.

use std::io::Write;

use fibril_core::fiber::EffectTag;
use fibril_core::trace::{
    AbandonReason, CommitEvent, PassAbandonedEvent, PhaseBeginEvent, PhaseEndEvent, PhaseKind,
    RenderEvent, SliceYieldEvent, TraceSink, UnitOfWorkEvent,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    /// Whether unit-of-work lines are written.
    units: bool,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("units", &self.units)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self {
            writer,
            units: true,
        }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            units: true,
        }
    }

    /// Drops the per-unit lines, keeping one line per slice and commit.
    #[must_use]
    pub fn without_units(mut self) -> Self {
        self.units = false;
        self
    }

    /// Consumes the sink and returns the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn phase_name(phase: PhaseKind) -> &'static str {
    match phase {
        PhaseKind::Reconcile => "reconcile",
        PhaseKind::Commit => "commit",
    }
}

fn effect_name(effect: EffectTag) -> &'static str {
    match effect {
        EffectTag::None => "root",
        EffectTag::Placement => "place",
        EffectTag::Update => "update",
        EffectTag::Deletion => "delete",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_render(&mut self, e: &RenderEvent) {
        let base = if e.has_current { "current" } else { "none" };
        let _ = writeln!(
            self.writer,
            "[render] pass={} root={:?} baseline={base}",
            e.pass, e.root,
        );
    }

    fn on_unit_of_work(&mut self, e: &UnitOfWorkEvent) {
        if !self.units {
            return;
        }
        let created = if e.materialized { " +node" } else { "" };
        let _ = writeln!(
            self.writer,
            "    [unit] {:?} {}{created} children={} deletions={}",
            e.fiber,
            effect_name(e.effect),
            e.children,
            e.deletions,
        );
    }

    fn on_slice_yield(&mut self, e: &SliceYieldEvent) {
        let _ = writeln!(
            self.writer,
            "[yield] pass={} units={} total={}",
            e.pass, e.units, e.total_units,
        );
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        let _ = writeln!(
            self.writer,
            "  [phase:begin] pass={} {}",
            e.pass,
            phase_name(e.phase),
        );
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        let _ = writeln!(
            self.writer,
            "  [phase:end] pass={} {}",
            e.pass,
            phase_name(e.phase),
        );
    }

    fn on_commit(&mut self, e: &CommitEvent) {
        let s = &e.stats;
        let _ = writeln!(
            self.writer,
            "[commit] pass={} units={} placed={} updated={} deleted={} \
             props=-{}l/{}r/{}s/+{}l retired={}",
            e.pass,
            e.units,
            s.placements,
            s.updates,
            s.deletions,
            s.props.listeners_removed,
            s.props.attributes_reset,
            s.props.attributes_set,
            s.props.listeners_added,
            e.retired,
        );
    }

    fn on_pass_abandoned(&mut self, e: &PassAbandonedEvent) {
        let reason = match e.reason {
            AbandonReason::Superseded => "superseded",
            AbandonReason::Failed => "FAILED",
        };
        let _ = writeln!(
            self.writer,
            "[abandon] pass={} {reason} after {} units, freed {}",
            e.pass, e.units, e.freed,
        );
    }
}

#[cfg(test)]
mod tests {
    use fibril_core::Renderer;
    use fibril_core::element::Element;
    use fibril_core::headless::MemoryTarget;
    use fibril_core::trace::Tracer;

    use super::*;

    fn run(sink: &mut dyn TraceSink) {
        let mut target = MemoryTarget::new();
        let container = target.create_container("main");
        let mut renderer = Renderer::new();
        let mut tracer = Tracer::new(sink);
        renderer.render_traced(Element::host("h2").child("Hello"), container, &mut tracer);
        renderer.flush_traced(&mut target, &mut tracer).unwrap();
    }

    #[test]
    fn pretty_print_pass() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        run(&mut sink);
        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert!(output.starts_with("[render] pass=1"), "got: {output}");
        assert!(output.contains("[unit]"), "got: {output}");
        assert!(output.contains("place +node"), "got: {output}");
        assert!(output.contains("placed=2"), "got: {output}");
    }

    #[test]
    fn without_units_skips_unit_lines() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new()).without_units();
        run(&mut sink);
        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert!(!output.contains("[unit]"), "got: {output}");
        assert!(output.contains("[commit]"), "got: {output}");
    }
}
