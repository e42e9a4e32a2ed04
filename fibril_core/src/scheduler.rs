// Copyright 2026 the Fibril Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cooperative work loop with pluggable idle budgets.
//!
//! The host calls [`Renderer::work_loop`] whenever it has idle time, passing an
//! [`IdleDeadline`] that reports how much of that time is left. The loop runs
//! units of work until the deadline drops below
//! [`WorkLoopConfig::yield_threshold`] (or the per-slice unit cap is reached),
//! then returns a [`SliceOutcome`] telling the host whether to call again.
//!
//! At least one unit runs per slice, so a pass always makes progress even
//! under a budget that is spent on arrival. Commit is never split: once the
//! last unit has run, the same slice commits regardless of the budget.

use core::cell::Cell;
use core::time::Duration;

use crate::commit::CommitStats;
use crate::error::RenderError;
use crate::fiber::FiberId;
use crate::renderer::Renderer;
use crate::target::RenderTarget;
use crate::trace::{PhaseBeginEvent, PhaseEndEvent, PhaseKind, SliceYieldEvent, Tracer};

/// Reports how much idle time the host has left for the current slice.
pub trait IdleDeadline {
    /// Remaining time. Called once after every unit of work.
    fn time_remaining(&self) -> Duration;
}

/// A deadline that never runs out.
#[derive(Clone, Copy, Debug, Default)]
pub struct Unbounded;

impl IdleDeadline for Unbounded {
    fn time_remaining(&self) -> Duration {
        Duration::MAX
    }
}

/// A deadline measured in units of work instead of time.
///
/// Starts with `units` milliseconds and loses one on every query, so under
/// the [`browser`](WorkLoopConfig::browser) preset a slice runs exactly
/// `units` units (at least one). Deterministic, for tests and replays.
#[derive(Clone, Debug)]
pub struct UnitBudget {
    remaining: Cell<u32>,
}

impl UnitBudget {
    /// Creates a budget of `units` units.
    #[must_use]
    pub const fn new(units: u32) -> Self {
        Self {
            remaining: Cell::new(units),
        }
    }

    /// Units left.
    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining.get()
    }
}

impl IdleDeadline for UnitBudget {
    fn time_remaining(&self) -> Duration {
        let left = self.remaining.get().saturating_sub(1);
        self.remaining.set(left);
        Duration::from_millis(left.into())
    }
}

/// A wall-clock deadline.
#[cfg(feature = "std")]
#[derive(Clone, Copy, Debug)]
pub struct InstantDeadline {
    end: std::time::Instant,
}

#[cfg(feature = "std")]
impl InstantDeadline {
    /// A deadline `budget` from now.
    #[must_use]
    pub fn after(budget: Duration) -> Self {
        Self {
            end: std::time::Instant::now() + budget,
        }
    }
}

#[cfg(feature = "std")]
impl IdleDeadline for InstantDeadline {
    fn time_remaining(&self) -> Duration {
        self.end.saturating_duration_since(std::time::Instant::now())
    }
}

/// Configuration for [`Renderer::work_loop`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorkLoopConfig {
    /// Yield once the deadline reports less than this.
    pub yield_threshold: Duration,
    /// Yield after this many units in one slice, whatever the deadline says.
    pub max_units_per_slice: Option<u32>,
}

impl WorkLoopConfig {
    /// Idle-callback scheduling: yield when under a millisecond is left.
    #[must_use]
    pub const fn browser() -> Self {
        Self {
            yield_threshold: Duration::from_millis(1),
            max_units_per_slice: None,
        }
    }

    /// Never yield; every slice drains the pass and commits.
    #[must_use]
    pub const fn synchronous() -> Self {
        Self {
            yield_threshold: Duration::ZERO,
            max_units_per_slice: None,
        }
    }
}

impl Default for WorkLoopConfig {
    fn default() -> Self {
        Self::browser()
    }
}

/// How a slice ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SliceOutcome {
    /// There was no pass in flight.
    Idle,
    /// The budget ran out with units left; call again on the next idle period.
    Yielded {
        /// Units run in this slice.
        units: u32,
    },
    /// The pass finished and was committed.
    Committed {
        /// Units run in this slice.
        units: u32,
        /// What the commit did.
        stats: CommitStats,
    },
}

impl SliceOutcome {
    /// Returns `true` if the host should schedule another slice.
    #[must_use]
    pub const fn has_pending_work(&self) -> bool {
        matches!(self, Self::Yielded { .. })
    }
}

impl<N: Clone> Renderer<N> {
    /// Runs one slice of the pass in flight under `deadline`.
    ///
    /// Nodes left over from abandoned passes are handed to
    /// [`RenderTarget::discard`] first.
    ///
    /// If a unit or the commit fails, the pass is abandoned: its
    /// work-in-progress tree is freed and the renderer is idle. Its nodes are
    /// discarded at the start of the next slice. A failed discard is returned
    /// without touching the pass in flight. Mutations a failed commit already issued are not
    /// rolled back.
    pub fn work_loop<T, D>(
        &mut self,
        target: &mut T,
        deadline: &D,
        tracer: &mut Tracer<'_>,
    ) -> Result<SliceOutcome, RenderError>
    where
        T: RenderTarget<Node = N> + ?Sized,
        D: IdleDeadline + ?Sized,
    {
        self.release_discarded(target)?;
        if self.wip_root.is_none() {
            return Ok(SliceOutcome::Idle);
        }

        let mut units = 0;
        if self.next_unit.is_some() {
            let pass = self.pass;
            tracer.phase_begin(&PhaseBeginEvent {
                pass,
                phase: PhaseKind::Reconcile,
            });
            while let Some(fiber) = self.next_unit {
                self.run_unit(target, fiber, tracer)?;
                units += 1;
                if self.next_unit.is_some() && self.should_yield(deadline, units) {
                    tracer.phase_end(&PhaseEndEvent {
                        pass,
                        phase: PhaseKind::Reconcile,
                    });
                    tracer.slice_yield(&SliceYieldEvent {
                        pass,
                        units,
                        total_units: self.pass_units,
                    });
                    return Ok(SliceOutcome::Yielded { units });
                }
            }
            tracer.phase_end(&PhaseEndEvent {
                pass,
                phase: PhaseKind::Reconcile,
            });
        }

        let stats = self.commit(target, tracer)?;
        Ok(SliceOutcome::Committed { units, stats })
    }

    /// Drains the pass in flight and commits it, ignoring idle budgets.
    ///
    /// Returns the commit statistics, or `None` if there was nothing to do.
    pub fn flush<T>(&mut self, target: &mut T) -> Result<Option<CommitStats>, RenderError>
    where
        T: RenderTarget<Node = N> + ?Sized,
    {
        self.flush_traced(target, &mut Tracer::none())
    }

    /// [`flush`](Self::flush) with tracing.
    pub fn flush_traced<T>(
        &mut self,
        target: &mut T,
        tracer: &mut Tracer<'_>,
    ) -> Result<Option<CommitStats>, RenderError>
    where
        T: RenderTarget<Node = N> + ?Sized,
    {
        loop {
            match self.work_loop(target, &Unbounded, tracer)? {
                SliceOutcome::Idle => return Ok(None),
                SliceOutcome::Yielded { .. } => {}
                SliceOutcome::Committed { stats, .. } => return Ok(Some(stats)),
            }
        }
    }

    /// Runs exactly one unit of work and never commits.
    ///
    /// Returns the fiber that was visited, or `None` if no unit is pending. A
    /// later [`work_loop`](Self::work_loop) or [`flush`](Self::flush) picks up
    /// where this left off.
    pub fn step<T>(&mut self, target: &mut T) -> Result<Option<FiberId>, RenderError>
    where
        T: RenderTarget<Node = N> + ?Sized,
    {
        self.release_discarded(target)?;
        let Some(fiber) = self.next_unit else {
            return Ok(None);
        };
        self.run_unit(target, fiber, &mut Tracer::none())?;
        Ok(Some(fiber))
    }

    fn should_yield<D: IdleDeadline + ?Sized>(&self, deadline: &D, units: u32) -> bool {
        deadline.time_remaining() < self.config.yield_threshold
            || self
                .config
                .max_units_per_slice
                .is_some_and(|max| units >= max)
    }
}
