//! Mount API - One deal list instance and its lifecycle.
//!
//! [`DealList`] wires the reveal state, the completion reporter effect, the
//! scroll-proximity trigger and the instance's timer queue together. The
//! view layer talks only to this handle.
//!
//! # Example
//!
//! ```ignore
//! use deal_reveal::{ClockSource, DealList, LogSink, RevealConfig};
//!
//! let list = DealList::mount(
//!     RevealConfig::default(),
//!     Rc::new(ClockSource::detect()),
//!     Rc::new(LogSink),
//! );
//! list.load(&source, "1");
//!
//! // host loop
//! loop {
//!     draw(&list.visible_slice());
//!     list.paint_committed();
//!     list.on_viewport(last_row_in_view);
//!     list.tick();
//! }
//! ```
//!
//! # Lifecycle
//!
//! Dropping the handle (or calling [`DealList::unmount`]) stops the reporter
//! effect and clears the timer queue, so no preload or countdown tick can
//! run against a torn-down list.

use std::cell::RefCell;
use std::rc::Rc;

use spark_signals::{signal, Signal};
use tracing::{info, warn};

use super::load::{DealSource, LoadStatus, LoadTicket};
use crate::config::RevealConfig;
use crate::engine::{Clock, TimerQueue};
use crate::error::LoadError;
use crate::state::{
    CompletionReport, CompletionReporter, Countdown, GrowthOutcome, ReportSink, RevealState,
    RevealStats, ScrollProximity, VisibleSlice,
};
use crate::types::{DealRecord, Millis};

// =============================================================================
// DealList
// =============================================================================

/// A mounted deal list.
pub struct DealList {
    config: RevealConfig,
    clock: Rc<dyn Clock>,
    timers: TimerQueue,
    state: Rc<RevealState>,
    reporter: Rc<CompletionReporter>,
    proximity: RefCell<ScrollProximity>,
    status: Signal<LoadStatus>,
    stop_effect: Option<Box<dyn FnOnce()>>,
}

impl DealList {
    /// Mount a list. The completion reporter starts observing immediately.
    pub fn mount(config: RevealConfig, clock: Rc<dyn Clock>, sink: Rc<dyn ReportSink>) -> Self {
        let timers = TimerQueue::new(clock.clone());
        let state = RevealState::new(&config);
        let reporter =
            CompletionReporter::new(state.clone(), clock.clone(), sink, config.report_timing);
        let stop_effect = reporter.attach();
        let proximity = RefCell::new(ScrollProximity::new(config.proximity_threshold));

        Self {
            config,
            clock,
            timers,
            state,
            reporter,
            proximity,
            status: signal(LoadStatus::Idle),
            stop_effect: Some(stop_effect),
        }
    }

    // -------------------------------------------------------------------------
    // Load cycle
    // -------------------------------------------------------------------------

    /// Start a load cycle: stamp the fetch start and re-enable reporting.
    pub fn begin_load(&self) -> LoadTicket {
        let started_at = self.clock.now();
        let cycle = self.state.begin_cycle(started_at);
        self.status.set(LoadStatus::Loading);
        LoadTicket { cycle, started_at }
    }

    /// Complete a load cycle with the fetch result.
    ///
    /// On success the collection is published and the window reset before
    /// this returns, so the next growth request already sees the new cycle.
    /// Failures and empty results publish nothing visible and never report.
    /// A ticket from a superseded cycle changes nothing.
    pub fn finish_load(
        &self,
        ticket: LoadTicket,
        result: Result<Vec<DealRecord>, LoadError>,
    ) -> LoadStatus {
        if ticket.cycle != self.state.cycle() {
            self.state.note_stale("load completion", ticket.cycle);
            return self.status();
        }

        let (items, status) = match result {
            Ok(items) if items.is_empty() => (Vec::new(), LoadStatus::Empty),
            Ok(items) => {
                let total = items.len();
                (items, LoadStatus::Ready { total })
            }
            Err(err) => {
                warn!(cycle = ticket.cycle, error = %err, "deal load failed");
                (
                    Vec::new(),
                    LoadStatus::Failed {
                        reason: err.to_string(),
                    },
                )
            }
        };

        info!(
            cycle = ticket.cycle,
            total = items.len(),
            fetch_ms = self.clock.now() - ticket.started_at,
            "deal load finished"
        );

        self.state.publish(ticket.cycle, items);
        self.proximity.borrow_mut().rearm();
        self.status.set(status.clone());
        status
    }

    /// Run a whole load cycle against a synchronous source.
    pub fn load(&self, source: &dyn DealSource, restaurant_id: &str) -> LoadStatus {
        let ticket = self.begin_load();
        let result = source.fetch_deals(restaurant_id);
        self.finish_load(ticket, result)
    }

    // -------------------------------------------------------------------------
    // View-facing reads
    // -------------------------------------------------------------------------

    /// The disclosed prefix of the collection.
    pub fn visible_slice(&self) -> VisibleSlice {
        self.state.visible_slice()
    }

    pub fn visible_count(&self) -> usize {
        self.state.visible_count()
    }

    pub fn visible_signal(&self) -> Signal<usize> {
        self.state.visible_signal()
    }

    pub fn total(&self) -> usize {
        self.state.len()
    }

    pub fn status(&self) -> LoadStatus {
        self.status.get()
    }

    pub fn status_signal(&self) -> Signal<LoadStatus> {
        self.status.clone()
    }

    pub fn stats(&self) -> RevealStats {
        self.state.stats()
    }

    pub fn config(&self) -> &RevealConfig {
        &self.config
    }

    pub fn reveal_state(&self) -> &Rc<RevealState> {
        &self.state
    }

    // -------------------------------------------------------------------------
    // View-facing events
    // -------------------------------------------------------------------------

    /// Scroll-proximity callback: request one growth step.
    pub fn on_growth_triggered(&self) -> GrowthOutcome {
        self.state.request_growth(&self.timers)
    }

    /// Report the last item index currently in view. Forwards to
    /// [`DealList::on_growth_triggered`] when the proximity edge fires.
    pub fn on_viewport(&self, last_in_view: usize) -> Option<GrowthOutcome> {
        let fire = self
            .proximity
            .borrow_mut()
            .update(self.state.visible_count(), last_in_view);
        fire.then(|| self.on_growth_triggered())
    }

    /// The view layer finished painting the current window.
    pub fn paint_committed(&self) -> Option<CompletionReport> {
        self.reporter.paint_committed()
    }

    /// Countdown for a badge, driven by this list's timers.
    pub fn countdown(&self, source: &str) -> Countdown {
        Countdown::new(&self.timers, source)
    }

    // -------------------------------------------------------------------------
    // Host loop
    // -------------------------------------------------------------------------

    /// Run due timers (preloads, countdown ticks). Returns how many ran.
    pub fn tick(&self) -> usize {
        self.timers.run_due()
    }

    /// When the host loop next needs to call [`DealList::tick`].
    pub fn next_deadline(&self) -> Option<Millis> {
        self.timers.next_deadline()
    }

    pub fn timers(&self) -> &TimerQueue {
        &self.timers
    }

    /// Stop reporting and drop every pending timer.
    pub fn unmount(self) {
        drop(self);
    }

    fn teardown(&mut self) {
        if let Some(stop) = self.stop_effect.take() {
            stop();
        }
        self.timers.clear();
    }
}

impl Drop for DealList {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Mount a deal list. See [`DealList::mount`].
pub fn mount(config: RevealConfig, clock: Rc<dyn Clock>, sink: Rc<dyn ReportSink>) -> DealList {
    DealList::mount(config, clock, sink)
}

/// Unmount and clean up.
pub fn unmount(list: DealList) {
    list.unmount();
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ManualClock;
    use crate::state::LogSink;

    fn deals(n: usize) -> Vec<DealRecord> {
        (0..n)
            .map(|i| DealRecord {
                deal_id: i.to_string(),
                deal_image: String::new(),
                badges: Vec::new(),
                deal_title: format!("deal {i}"),
                price: 1.0,
                original_price: 2.0,
                button_text: String::new(),
            })
            .collect()
    }

    fn setup() -> (ManualClock, DealList) {
        let clock = ManualClock::new(0.0);
        let list = DealList::mount(
            RevealConfig::default(),
            Rc::new(clock.clone()),
            Rc::new(LogSink),
        );
        (clock, list)
    }

    #[test]
    fn test_status_transitions() {
        let (_clock, list) = setup();
        assert_eq!(list.status(), LoadStatus::Idle);

        let ticket = list.begin_load();
        assert_eq!(list.status(), LoadStatus::Loading);

        let status = list.finish_load(ticket, Ok(deals(6)));
        assert_eq!(status, LoadStatus::Ready { total: 6 });
        assert!(list.status().is_ready());
    }

    #[test]
    fn test_empty_result_is_empty_status() {
        let (_clock, list) = setup();
        let ticket = list.begin_load();
        assert_eq!(list.finish_load(ticket, Ok(Vec::new())), LoadStatus::Empty);
        assert_eq!(list.visible_count(), 0);
    }

    #[test]
    fn test_failure_clears_previous_window() {
        let (_clock, list) = setup();
        let ticket = list.begin_load();
        list.finish_load(ticket, Ok(deals(6)));
        assert_eq!(list.visible_count(), 4);

        let ticket = list.begin_load();
        let status = list.finish_load(ticket, Err(LoadError::unavailable("timeout")));
        assert!(matches!(status, LoadStatus::Failed { .. }));
        assert_eq!(list.visible_count(), 0);
        assert_eq!(list.total(), 0);
    }

    #[test]
    fn test_stale_ticket_ignored() {
        let (_clock, list) = setup();
        let old = list.begin_load();
        let new = list.begin_load();

        list.finish_load(old, Ok(deals(9)));
        assert_eq!(list.total(), 0);
        assert_eq!(list.status(), LoadStatus::Loading);
        assert_eq!(list.stats().stale_discarded, 1);

        list.finish_load(new, Ok(deals(2)));
        assert_eq!(list.visible_count(), 2);
    }

    #[test]
    fn test_viewport_drives_growth() {
        let (_clock, list) = setup();
        let ticket = list.begin_load();
        list.finish_load(ticket, Ok(deals(20)));

        assert_eq!(list.on_viewport(0), None);
        let outcome = list.on_viewport(1).unwrap();
        assert!(outcome.grew());
        assert_eq!(list.visible_count(), 8);

        // Still near the old tail, but 6 remain now: re-armed, not fired.
        assert_eq!(list.on_viewport(1), None);
    }

    #[test]
    fn test_unmount_clears_timers() {
        let (clock, list) = setup();
        let ticket = list.begin_load();
        list.finish_load(ticket, Ok(deals(20)));
        list.on_growth_triggered();
        let _countdown = list.countdown("00:10:00");
        let timers = list.timers().clone();
        assert_eq!(timers.len(), 2);

        list.unmount();
        assert!(timers.is_empty());
        clock.advance(5_000.0);
        assert_eq!(timers.run_due(), 0);
    }
}
