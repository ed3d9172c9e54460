//! Completion Reporter - First meaningful content instrumentation.
//!
//! Emits at most one [`CompletionReport`] per load cycle, measuring the time
//! from fetch start until the initial reveal window is non-empty.
//!
//! The reporter runs as an effect over the reveal window and the collection
//! revision, so it re-checks after every mutation instead of only at mount.
//! It fires iff:
//! - the current cycle has not reported yet
//! - a fetch-start timestamp exists
//! - the current cycle's collection is published
//! - `min(visible, len) > 0`
//!
//! With [`ReportTiming::AfterPaint`] the check only arms the reporter; the
//! timestamp is captured by the next [`CompletionReporter::paint_committed`].

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use serde::Serialize;
use spark_signals::effect;
use tracing::info;

use super::reveal::{RevealFlags, RevealState};
use crate::config::ReportTiming;
use crate::engine::Clock;
use crate::types::Millis;

/// The first-screen timing signal for one load cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionReport {
    pub cycle: u64,
    /// Milliseconds from fetch start to completion.
    pub duration_ms: Millis,
    /// Items in the window when the report fired.
    pub first_screen_count: usize,
    pub total_count: usize,
    /// Wall-clock time the report was emitted.
    pub reported_at: jiff::Timestamp,
}

// =============================================================================
// Sinks
// =============================================================================

/// Receives completion reports.
pub trait ReportSink {
    fn report(&self, report: &CompletionReport);
}

impl<F: Fn(&CompletionReport)> ReportSink for F {
    fn report(&self, report: &CompletionReport) {
        self(report)
    }
}

/// Sink that only logs. The reporter logs every report anyway; use this
/// when nothing else consumes them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl ReportSink for LogSink {
    fn report(&self, _report: &CompletionReport) {}
}

// =============================================================================
// CompletionReporter
// =============================================================================

pub struct CompletionReporter {
    state: Rc<RevealState>,
    clock: Rc<dyn Clock>,
    sink: Rc<dyn ReportSink>,
    timing: ReportTiming,
    paint_pending: Cell<bool>,
}

impl CompletionReporter {
    pub fn new(
        state: Rc<RevealState>,
        clock: Rc<dyn Clock>,
        sink: Rc<dyn ReportSink>,
        timing: ReportTiming,
    ) -> Rc<Self> {
        Rc::new(Self {
            state,
            clock,
            sink,
            timing,
            paint_pending: Cell::new(false),
        })
    }

    /// Start observing the reveal state. Returns the stop function.
    pub fn attach(self: &Rc<Self>) -> Box<dyn FnOnce()> {
        let reporter = self.clone();
        let stop = effect(move || {
            reporter.observe();
        });
        Box::new(stop)
    }

    /// Check the firing condition against the current state.
    ///
    /// Reads the window and revision signals, so calling this from an effect
    /// subscribes it to both.
    pub fn observe(&self) -> Option<CompletionReport> {
        let visible = self.state.visible_count();
        let _ = self.state.revision();

        let first_screen = self.eligible(visible)?;
        match self.timing {
            ReportTiming::OnCommit => self.fire(first_screen),
            ReportTiming::AfterPaint => {
                self.paint_pending.set(true);
                None
            }
        }
    }

    /// Called by the view layer after it has painted the current window.
    pub fn paint_committed(&self) -> Option<CompletionReport> {
        if !self.paint_pending.get() {
            return None;
        }
        let first_screen = self.eligible(self.state.visible_count())?;
        self.fire(first_screen)
    }

    /// Window size to report, if a report is due.
    fn eligible(&self, visible: usize) -> Option<usize> {
        if self.state.flags().contains(RevealFlags::REPORTED) {
            return None;
        }
        self.state.fetch_started_at()?;
        if !self.state.is_current_cycle_published() {
            return None;
        }
        let first_screen = visible.min(self.state.len());
        (first_screen > 0).then_some(first_screen)
    }

    fn fire(&self, first_screen_count: usize) -> Option<CompletionReport> {
        let started_at = self.state.fetch_started_at()?;
        if !self.state.mark_reported() {
            return None;
        }
        self.paint_pending.set(false);

        let report = CompletionReport {
            cycle: self.state.cycle(),
            duration_ms: (self.clock.now() - started_at).max(0.0),
            first_screen_count,
            total_count: self.state.len(),
            reported_at: jiff::Timestamp::now(),
        };

        info!(
            cycle = report.cycle,
            duration_ms = report.duration_ms,
            first_screen_count = report.first_screen_count,
            total_count = report.total_count,
            "first screen complete"
        );
        self.sink.report(&report);
        Some(report)
    }
}

impl fmt::Debug for CompletionReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionReporter")
            .field("timing", &self.timing)
            .field("paint_pending", &self.paint_pending.get())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
