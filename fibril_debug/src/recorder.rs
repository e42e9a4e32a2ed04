// Copyright 2026 the Fibril Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records, each stamped with the
//! nanoseconds elapsed since the recorder was created. [`decode`] reads them
//! back as an iterator of [`Record`].
//!
//! Fiber handles are stored as their slot index and generation; the decoded
//! form keeps them as plain numbers.

use std::time::Instant;

use fibril_core::commit::CommitStats;
use fibril_core::diff::PropChanges;
use fibril_core::fiber::{EffectTag, FiberId};
use fibril_core::trace::{
    AbandonReason, CommitEvent, PassAbandonedEvent, PhaseBeginEvent, PhaseEndEvent, PhaseKind,
    RenderEvent, SliceYieldEvent, TraceSink, UnitOfWorkEvent,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_RENDER: u8 = 1;
const TAG_UNIT_OF_WORK: u8 = 2;
const TAG_SLICE_YIELD: u8 = 3;
const TAG_PHASE_BEGIN: u8 = 4;
const TAG_PHASE_END: u8 = 5;
const TAG_COMMIT: u8 = 6;
const TAG_PASS_ABANDONED: u8 = 7;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug)]
pub struct RecorderSink {
    buf: Vec<u8>,
    origin: Instant,
}

impl Default for RecorderSink {
    fn default() -> Self {
        Self::new()
    }
}

impl RecorderSink {
    /// Creates an empty recorder whose clock starts now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::new(),
            origin: Instant::now(),
        }
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn begin(&mut self, tag: u8, pass: u64) {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "a u64 of nanoseconds covers centuries of recording"
        )]
        let at = self.origin.elapsed().as_nanos() as u64;
        self.write_u8(tag);
        self.write_u64(at);
        self.write_u64(pass);
    }

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_fiber(&mut self, id: FiberId) {
        self.write_u32(id.index());
        self.write_u32(id.generation());
    }

    fn write_phase(&mut self, p: PhaseKind) {
        self.write_u8(match p {
            PhaseKind::Reconcile => 0,
            PhaseKind::Commit => 1,
        });
    }

    fn write_effect(&mut self, e: EffectTag) {
        self.write_u8(match e {
            EffectTag::None => 0,
            EffectTag::Placement => 1,
            EffectTag::Update => 2,
            EffectTag::Deletion => 3,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_render(&mut self, e: &RenderEvent) {
        self.begin(TAG_RENDER, e.pass);
        self.write_fiber(e.root);
        self.write_bool(e.has_current);
    }

    fn on_unit_of_work(&mut self, e: &UnitOfWorkEvent) {
        self.begin(TAG_UNIT_OF_WORK, e.pass);
        self.write_fiber(e.fiber);
        self.write_effect(e.effect);
        self.write_bool(e.materialized);
        self.write_u32(e.children);
        self.write_u32(e.deletions);
    }

    fn on_slice_yield(&mut self, e: &SliceYieldEvent) {
        self.begin(TAG_SLICE_YIELD, e.pass);
        self.write_u32(e.units);
        self.write_u32(e.total_units);
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.begin(TAG_PHASE_BEGIN, e.pass);
        self.write_phase(e.phase);
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.begin(TAG_PHASE_END, e.pass);
        self.write_phase(e.phase);
    }

    fn on_commit(&mut self, e: &CommitEvent) {
        self.begin(TAG_COMMIT, e.pass);
        self.write_u32(e.units);
        self.write_u32(e.stats.placements);
        self.write_u32(e.stats.updates);
        self.write_u32(e.stats.deletions);
        self.write_u32(e.stats.props.listeners_removed);
        self.write_u32(e.stats.props.attributes_reset);
        self.write_u32(e.stats.props.attributes_set);
        self.write_u32(e.stats.props.listeners_added);
        self.write_u32(e.retired);
    }

    fn on_pass_abandoned(&mut self, e: &PassAbandonedEvent) {
        self.begin(TAG_PASS_ABANDONED, e.pass);
        self.write_u8(match e.reason {
            AbandonReason::Superseded => 0,
            AbandonReason::Failed => 1,
        });
        self.write_u32(e.units);
        self.write_u32(e.freed);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A fiber handle as recorded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordedFiber {
    /// Slot index.
    pub index: u32,
    /// Slot generation.
    pub generation: u32,
}

/// One decoded record.
#[derive(Clone, Debug)]
pub struct Record {
    /// Nanoseconds since the recorder was created.
    pub at_nanos: u64,
    /// Pass counter of the event.
    pub pass: u64,
    /// The event.
    pub event: RecordedEvent,
}

/// A decoded event from a binary recording.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordedEvent {
    /// A [`RenderEvent`].
    Render {
        /// Work-in-progress root.
        root: RecordedFiber,
        /// Whether a committed tree existed.
        has_current: bool,
    },
    /// A [`UnitOfWorkEvent`].
    UnitOfWork {
        /// Visited fiber.
        fiber: RecordedFiber,
        /// Its effect tag.
        effect: EffectTag,
        /// Whether a node was created.
        materialized: bool,
        /// Child fibers produced.
        children: u32,
        /// Old fibers marked for deletion.
        deletions: u32,
    },
    /// A [`SliceYieldEvent`].
    SliceYield {
        /// Units in the slice.
        units: u32,
        /// Units in the pass so far.
        total_units: u32,
    },
    /// A [`PhaseBeginEvent`].
    PhaseBegin(PhaseKind),
    /// A [`PhaseEndEvent`].
    PhaseEnd(PhaseKind),
    /// A [`CommitEvent`].
    Commit {
        /// Units in the pass.
        units: u32,
        /// What the commit did.
        stats: CommitStats,
        /// Fibers freed from the previous generation.
        retired: u32,
    },
    /// A [`PassAbandonedEvent`].
    PassAbandoned {
        /// Why.
        reason: AbandonReason,
        /// Units that had run.
        units: u32,
        /// Fibers freed.
        freed: u32,
    },
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`Record`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded records.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn read_u8(&mut self) -> Option<u8> {
        if self.remaining() < 1 {
            return None;
        }
        let v = self.data[self.pos];
        self.pos += 1;
        Some(v)
    }

    fn read_bool(&mut self) -> Option<bool> {
        Some(self.read_u8()? != 0)
    }

    fn read_u32(&mut self) -> Option<u32> {
        if self.remaining() < 4 {
            return None;
        }
        let v = u32::from_le_bytes(self.data[self.pos..self.pos + 4].try_into().ok()?);
        self.pos += 4;
        Some(v)
    }

    fn read_u64(&mut self) -> Option<u64> {
        if self.remaining() < 8 {
            return None;
        }
        let v = u64::from_le_bytes(self.data[self.pos..self.pos + 8].try_into().ok()?);
        self.pos += 8;
        Some(v)
    }

    fn read_fiber(&mut self) -> Option<RecordedFiber> {
        Some(RecordedFiber {
            index: self.read_u32()?,
            generation: self.read_u32()?,
        })
    }

    fn read_phase(&mut self) -> Option<PhaseKind> {
        Some(match self.read_u8()? {
            0 => PhaseKind::Reconcile,
            _ => PhaseKind::Commit,
        })
    }

    fn read_effect(&mut self) -> Option<EffectTag> {
        Some(match self.read_u8()? {
            0 => EffectTag::None,
            1 => EffectTag::Placement,
            2 => EffectTag::Update,
            _ => EffectTag::Deletion,
        })
    }

    fn decode_event(&mut self, tag: u8) -> Option<RecordedEvent> {
        Some(match tag {
            TAG_RENDER => RecordedEvent::Render {
                root: self.read_fiber()?,
                has_current: self.read_bool()?,
            },
            TAG_UNIT_OF_WORK => RecordedEvent::UnitOfWork {
                fiber: self.read_fiber()?,
                effect: self.read_effect()?,
                materialized: self.read_bool()?,
                children: self.read_u32()?,
                deletions: self.read_u32()?,
            },
            TAG_SLICE_YIELD => RecordedEvent::SliceYield {
                units: self.read_u32()?,
                total_units: self.read_u32()?,
            },
            TAG_PHASE_BEGIN => RecordedEvent::PhaseBegin(self.read_phase()?),
            TAG_PHASE_END => RecordedEvent::PhaseEnd(self.read_phase()?),
            TAG_COMMIT => RecordedEvent::Commit {
                units: self.read_u32()?,
                stats: CommitStats {
                    placements: self.read_u32()?,
                    updates: self.read_u32()?,
                    deletions: self.read_u32()?,
                    props: PropChanges {
                        listeners_removed: self.read_u32()?,
                        attributes_reset: self.read_u32()?,
                        attributes_set: self.read_u32()?,
                        listeners_added: self.read_u32()?,
                    },
                },
                retired: self.read_u32()?,
            },
            TAG_PASS_ABANDONED => RecordedEvent::PassAbandoned {
                reason: match self.read_u8()? {
                    0 => AbandonReason::Superseded,
                    _ => AbandonReason::Failed,
                },
                units: self.read_u32()?,
                freed: self.read_u32()?,
            },
            _ => return None, // unknown tag → stop iteration
        })
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = Record;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        let at_nanos = self.read_u64()?;
        let pass = self.read_u64()?;
        let event = self.decode_event(tag)?;
        Some(Record {
            at_nanos,
            pass,
            event,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
