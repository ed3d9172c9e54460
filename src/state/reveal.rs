//! Reveal State - Progressive disclosure of a fetched deal collection.
//!
//! Holds the reveal window (`visible` items out of the collection) and the
//! disclosure controller that moves it:
//! - `reset` on arrival of a new collection (initial window)
//! - `request_growth` on a scroll-proximity trigger (step + deferred preload)
//!
//! # Invariants
//!
//! - `0 <= visible <= len(collection)`
//! - `visible` only decreases through `reset`
//! - every deferred preload carries the load cycle it was scheduled in and
//!   is discarded if that cycle is no longer current when it fires
//!
//! # Reactivity
//!
//! The window is mirrored into a `Signal<usize>` and every publish bumps a
//! revision signal, so effects that read [`RevealState::visible_count`] or
//! [`RevealState::visible_slice`] re-run after each mutation. Effects run
//! synchronously inside the commit; a growth request issued from such an
//! effect sees `IN_FLIGHT` and is skipped.

use std::cell::{Cell, RefCell};
use std::ops::Deref;
use std::rc::{Rc, Weak};

use bitflags::bitflags;
use spark_signals::{signal, Signal};
use tracing::{debug, trace};

use crate::config::RevealConfig;
use crate::engine::TimerQueue;
use crate::types::{DealRecord, Millis};

bitflags! {
    /// Per-instance reveal flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct RevealFlags: u8 {
        /// A growth step is committing.
        const IN_FLIGHT = 1 << 0;
        /// The completion report for the current cycle has been emitted.
        const REPORTED  = 1 << 1;
    }
}

// =============================================================================
// Outcomes
// =============================================================================

/// Why a growth request changed nothing. Not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Another growth step is still committing.
    InFlight,
    /// Every item is already disclosed (or there are none).
    Exhausted,
}

/// Result of [`RevealState::request_growth`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowthOutcome {
    Grew {
        from: usize,
        to: usize,
        preload_scheduled: bool,
    },
    Skipped(SkipReason),
}

impl GrowthOutcome {
    pub fn grew(&self) -> bool {
        matches!(self, GrowthOutcome::Grew { .. })
    }
}

/// Counters for observability and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RevealStats {
    pub growth_steps: u32,
    pub growth_skipped: u32,
    pub preloads_applied: u32,
    /// Preloads and load completions dropped for belonging to a superseded
    /// cycle.
    pub stale_discarded: u32,
}

// =============================================================================
// VisibleSlice
// =============================================================================

/// The disclosed prefix of the collection.
///
/// Shares the collection allocation; a later publish does not affect it.
#[derive(Debug, Clone)]
pub struct VisibleSlice {
    items: Rc<[DealRecord]>,
    len: usize,
}

impl VisibleSlice {
    /// Size of the whole collection this slice was taken from.
    pub fn total(&self) -> usize {
        self.items.len()
    }

    /// The whole collection, disclosed or not.
    pub fn collection(&self) -> &[DealRecord] {
        &self.items
    }
}

impl Deref for VisibleSlice {
    type Target = [DealRecord];

    fn deref(&self) -> &[DealRecord] {
        &self.items[..self.len]
    }
}

// =============================================================================
// RevealState
// =============================================================================

/// Reveal window, flags and load-cycle bookkeeping for one list instance.
pub struct RevealState {
    initial_visible_count: usize,
    load_more_step: usize,
    preload_step: usize,
    preload_delay_ms: u64,

    items: RefCell<Rc<[DealRecord]>>,
    visible: Cell<usize>,
    flags: Cell<RevealFlags>,

    /// Current load cycle. Bumped when a fetch begins.
    cycle: Cell<u64>,
    /// Cycle whose collection is currently published.
    published_cycle: Cell<u64>,
    fetch_started_at: Cell<Option<Millis>>,

    visible_signal: Signal<usize>,
    revision: Signal<u64>,
    stats: Cell<RevealStats>,
}

impl RevealState {
    pub fn new(config: &RevealConfig) -> Rc<Self> {
        Rc::new(Self {
            initial_visible_count: config.initial_visible_count,
            load_more_step: config.load_more_step,
            preload_step: config.preload_step,
            preload_delay_ms: config.preload_delay_ms,
            items: RefCell::new(Rc::from(Vec::new())),
            visible: Cell::new(0),
            flags: Cell::new(RevealFlags::empty()),
            cycle: Cell::new(0),
            published_cycle: Cell::new(0),
            fetch_started_at: Cell::new(None),
            visible_signal: signal(0),
            revision: signal(0),
            stats: Cell::new(RevealStats::default()),
        })
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Disclosed item count. Tracks the window when read inside an effect.
    pub fn visible_count(&self) -> usize {
        self.visible_signal.get()
    }

    /// Signal mirroring the window, for view-layer effects.
    pub fn visible_signal(&self) -> Signal<usize> {
        self.visible_signal.clone()
    }

    /// Collection revision, bumped on every publish.
    pub fn revision(&self) -> u64 {
        self.revision.get()
    }

    /// The first `visible_count` items. Tracks window and collection.
    pub fn visible_slice(&self) -> VisibleSlice {
        let _ = self.revision.get();
        let len = self.visible_signal.get();
        let items = self.items.borrow().clone();
        let len = len.min(items.len());
        VisibleSlice { items, len }
    }

    /// Size of the published collection.
    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn flags(&self) -> RevealFlags {
        self.flags.get()
    }

    pub fn cycle(&self) -> u64 {
        self.cycle.get()
    }

    /// Whether the published collection belongs to the current cycle.
    pub fn is_current_cycle_published(&self) -> bool {
        self.cycle.get() != 0 && self.published_cycle.get() == self.cycle.get()
    }

    pub fn fetch_started_at(&self) -> Option<Millis> {
        self.fetch_started_at.get()
    }

    pub fn stats(&self) -> RevealStats {
        self.stats.get()
    }

    // -------------------------------------------------------------------------
    // Load cycle
    // -------------------------------------------------------------------------

    /// Start a new load cycle. Returns its id.
    ///
    /// Clears `REPORTED` before anything of the new cycle can be published,
    /// and retires every preload scheduled under the previous cycle.
    pub fn begin_cycle(&self, started_at: Millis) -> u64 {
        let cycle = self.cycle.get() + 1;
        self.cycle.set(cycle);
        self.fetch_started_at.set(Some(started_at));
        self.remove_flags(RevealFlags::REPORTED);
        debug!(cycle, started_at, "load cycle started");
        cycle
    }

    /// Publish the collection for `cycle` and reset the window.
    ///
    /// Returns false (and changes nothing) if `cycle` has been superseded.
    pub fn publish(&self, cycle: u64, items: Vec<DealRecord>) -> bool {
        if cycle != self.cycle.get() {
            self.note_stale("load completion", cycle);
            return false;
        }

        *self.items.borrow_mut() = Rc::from(items);
        self.published_cycle.set(cycle);
        self.reset();
        self.revision.set(self.revision.get().wrapping_add(1));
        true
    }

    /// Set the window to the initial size, clamped to the collection.
    pub fn reset(&self) {
        let initial = self.initial_visible_count.min(self.len());
        self.remove_flags(RevealFlags::IN_FLIGHT);
        debug!(cycle = self.cycle.get(), visible = initial, "reveal window reset");
        self.commit(initial);
    }

    /// Mark the current cycle as reported. Returns false if it already was.
    pub(crate) fn mark_reported(&self) -> bool {
        let flags = self.flags.get();
        if flags.contains(RevealFlags::REPORTED) {
            return false;
        }
        self.flags.set(flags | RevealFlags::REPORTED);
        true
    }

    // -------------------------------------------------------------------------
    // Growth
    // -------------------------------------------------------------------------

    /// Disclose the next step and schedule one deferred preload.
    ///
    /// The preload commits `min(next + preload_step, len)` after the
    /// configured delay whether or not another growth is in flight then,
    /// unless its cycle has been superseded. It never shrinks the window.
    pub fn request_growth(self: &Rc<Self>, timers: &TimerQueue) -> GrowthOutcome {
        if self.flags.get().contains(RevealFlags::IN_FLIGHT) {
            return self.skip(SkipReason::InFlight);
        }

        let len = self.len();
        let from = self.visible.get();
        if from >= len {
            return self.skip(SkipReason::Exhausted);
        }

        self.insert_flags(RevealFlags::IN_FLIGHT);
        let next = (from + self.load_more_step).min(len);
        self.commit(next);
        self.remove_flags(RevealFlags::IN_FLIGHT);

        self.bump_stats(|stats| stats.growth_steps += 1);
        debug!(cycle = self.cycle.get(), from, to = next, total = len, "reveal window grew");

        let preload_scheduled = next < len && self.preload_step > 0;
        if preload_scheduled {
            self.schedule_preload(timers, next);
        }

        GrowthOutcome::Grew {
            from,
            to: next,
            preload_scheduled,
        }
    }

    fn schedule_preload(self: &Rc<Self>, timers: &TimerQueue, next: usize) {
        let state: Weak<Self> = Rc::downgrade(self);
        // Tag with the collection being grown, not a fetch still in flight.
        let cycle = self.published_cycle.get();
        let step = self.preload_step;

        timers
            .set_timeout(self.preload_delay_ms, move || {
                if let Some(state) = state.upgrade() {
                    state.apply_preload(cycle, next + step);
                }
            })
            .detach();
    }

    fn apply_preload(&self, cycle: u64, target: usize) {
        if cycle != self.cycle.get() || cycle != self.published_cycle.get() {
            self.note_stale("preload", cycle);
            return;
        }

        let target = target.min(self.len());
        let current = self.visible.get();
        if target <= current {
            trace!(cycle, current, target, "preload already covered");
            return;
        }

        self.commit(target);
        self.bump_stats(|stats| stats.preloads_applied += 1);
        debug!(cycle, from = current, to = target, "preload applied");
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn commit(&self, count: usize) {
        self.visible.set(count);
        self.visible_signal.set(count);
    }

    fn skip(&self, reason: SkipReason) -> GrowthOutcome {
        self.bump_stats(|stats| stats.growth_skipped += 1);
        trace!(?reason, visible = self.visible.get(), "growth skipped");
        GrowthOutcome::Skipped(reason)
    }

    pub(crate) fn note_stale(&self, what: &'static str, cycle: u64) {
        self.bump_stats(|stats| stats.stale_discarded += 1);
        debug!(what, stale_cycle = cycle, current_cycle = self.cycle.get(), "discarded stale callback");
    }

    fn bump_stats(&self, f: impl FnOnce(&mut RevealStats)) {
        let mut stats = self.stats.get();
        f(&mut stats);
        self.stats.set(stats);
    }

    fn insert_flags(&self, flags: RevealFlags) {
        self.flags.set(self.flags.get() | flags);
    }

    fn remove_flags(&self, flags: RevealFlags) {
        self.flags.set(self.flags.get() - flags);
    }
}

// =============================================================================
// Tests
// =============================================================================
