//! Timer queue - single-threaded one-shot and periodic callbacks.
//!
//! A [`TimerQueue`] belongs to one list instance. Nothing fires on its own:
//! the host loop calls [`TimerQueue::run_due`] and every callback whose
//! deadline has passed runs to completion on the calling thread, in deadline
//! order (ties broken by scheduling order).
//!
//! # Ownership
//!
//! - [`TimerHandle`] cancels its timer when dropped.
//! - [`TimerHandle::detach`] hands ownership to the queue; the timer then
//!   lives until it fires or the queue is cleared.
//! - Clearing the queue drops every pending callback.
//!
//! ```ignore
//! let queue = TimerQueue::new(clock.clone());
//! let _tick = queue.set_interval(1000, move || {
//!     remaining -= 1;
//!     if remaining == 0 { IntervalFlow::Stop } else { IntervalFlow::Continue }
//! });
//! // host loop
//! queue.run_due();
//! ```

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use super::clock::Clock;
use crate::types::Millis;

/// Identifies a scheduled timer within its queue.
pub type TimerId = u64;

/// Returned by interval callbacks to keep or release the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalFlow {
    Continue,
    Stop,
}

enum Task {
    Once(Box<dyn FnOnce()>),
    Every {
        period: Millis,
        tick: Box<dyn FnMut() -> IntervalFlow>,
    },
}

struct Entry {
    deadline: Millis,
    task: Task,
}

#[derive(Default)]
struct QueueState {
    next_id: TimerId,
    /// Keyed by id, so iteration order is scheduling order.
    entries: BTreeMap<TimerId, Entry>,
    /// Interval currently running outside the map, and whether it was cancelled.
    running: Option<(TimerId, bool)>,
}

impl QueueState {
    fn next_due(&self, now: Millis, horizon: TimerId) -> Option<TimerId> {
        self.entries
            .iter()
            .filter(|(id, entry)| **id < horizon && entry.deadline <= now)
            .min_by(|(a_id, a), (b_id, b)| {
                a.deadline.total_cmp(&b.deadline).then(a_id.cmp(b_id))
            })
            .map(|(id, _)| *id)
    }
}

// =============================================================================
// TimerQueue
// =============================================================================

/// Deadline-ordered callbacks driven by an injected [`Clock`].
#[derive(Clone)]
pub struct TimerQueue {
    state: Rc<RefCell<QueueState>>,
    clock: Rc<dyn Clock>,
}

impl TimerQueue {
    pub fn new(clock: Rc<dyn Clock>) -> Self {
        Self {
            state: Rc::new(RefCell::new(QueueState::default())),
            clock,
        }
    }

    /// The clock deadlines are measured against.
    pub fn clock(&self) -> &Rc<dyn Clock> {
        &self.clock
    }

    /// Run `f` once, `delay_ms` from now.
    pub fn set_timeout(&self, delay_ms: u64, f: impl FnOnce() + 'static) -> TimerHandle {
        self.insert(delay_ms as Millis, Task::Once(Box::new(f)))
    }

    /// Run `f` every `period_ms` until it returns [`IntervalFlow::Stop`] or
    /// the handle is dropped. A zero period is treated as 1ms.
    pub fn set_interval(
        &self,
        period_ms: u64,
        f: impl FnMut() -> IntervalFlow + 'static,
    ) -> TimerHandle {
        let period = period_ms.max(1) as Millis;
        self.insert(
            period,
            Task::Every {
                period,
                tick: Box::new(f),
            },
        )
    }

    fn insert(&self, delay: Millis, task: Task) -> TimerHandle {
        let deadline = self.clock.now() + delay;
        let mut state = self.state.borrow_mut();
        let id = state.next_id;
        state.next_id += 1;
        state.entries.insert(id, Entry { deadline, task });
        TimerHandle {
            id,
            queue: Rc::downgrade(&self.state),
            detached: false,
        }
    }

    /// Run every callback that is due. Returns how many ran.
    ///
    /// Timers scheduled by a callback during this pass wait for the next one.
    /// An interval that fell several periods behind fires once per missed
    /// period.
    pub fn run_due(&self) -> usize {
        let now = self.clock.now();
        let horizon = self.state.borrow().next_id;
        let mut ran = 0;

        loop {
            let (id, entry) = {
                let mut state = self.state.borrow_mut();
                let Some(id) = state.next_due(now, horizon) else {
                    break;
                };
                let Some(entry) = state.entries.remove(&id) else {
                    break;
                };
                (id, entry)
            };

            ran += 1;
            match entry.task {
                Task::Once(f) => f(),
                Task::Every { period, mut tick } => {
                    self.state.borrow_mut().running = Some((id, false));
                    let flow = tick();
                    let mut state = self.state.borrow_mut();
                    let cancelled = matches!(state.running.take(), Some((_, true)));
                    if flow == IntervalFlow::Continue && !cancelled {
                        state.entries.insert(
                            id,
                            Entry {
                                deadline: entry.deadline + period,
                                task: Task::Every { period, tick },
                            },
                        );
                    }
                }
            }
        }

        ran
    }

    /// Deadline of the earliest pending timer.
    pub fn next_deadline(&self) -> Option<Millis> {
        self.state
            .borrow()
            .entries
            .values()
            .map(|entry| entry.deadline)
            .min_by(|a, b| a.total_cmp(b))
    }

    pub fn len(&self) -> usize {
        self.state.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every pending callback, including a running interval's reschedule.
    pub fn clear(&self) {
        let drained = {
            let mut state = self.state.borrow_mut();
            if let Some((_, cancelled)) = state.running.as_mut() {
                *cancelled = true;
            }
            std::mem::take(&mut state.entries)
        };
        drop(drained);
    }
}

impl fmt::Debug for TimerQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerQueue")
            .field("pending", &self.len())
            .finish()
    }
}

// =============================================================================
// TimerHandle
// =============================================================================

/// Owns one scheduled timer. Dropping it cancels the timer.
#[must_use = "dropping a TimerHandle cancels the timer; call detach() to keep it"]
pub struct TimerHandle {
    id: TimerId,
    queue: Weak<RefCell<QueueState>>,
    detached: bool,
}

impl TimerHandle {
    pub fn id(&self) -> TimerId {
        self.id
    }

    /// Whether the timer is still scheduled (or is the interval running now).
    pub fn is_active(&self) -> bool {
        self.queue.upgrade().is_some_and(|state| {
            let state = state.borrow();
            state.entries.contains_key(&self.id)
                || matches!(state.running, Some((id, false)) if id == self.id)
        })
    }

    /// Cancel now instead of at drop.
    pub fn cancel(self) {
        drop(self);
    }

    /// Let the timer outlive this handle.
    pub fn detach(mut self) {
        self.detached = true;
    }

    fn cancel_in_queue(&self) {
        let Some(state) = self.queue.upgrade() else {
            return;
        };
        let removed = {
            let mut state = state.borrow_mut();
            if let Some((id, cancelled)) = state.running.as_mut() {
                if *id == self.id {
                    *cancelled = true;
                }
            }
            state.entries.remove(&self.id)
        };
        drop(removed);
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        if !self.detached {
            self.cancel_in_queue();
        }
    }
}

impl fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerHandle")
            .field("id", &self.id)
            .field("detached", &self.detached)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::clock::ManualClock;
    use std::cell::Cell;

    fn setup() -> (ManualClock, TimerQueue) {
        let clock = ManualClock::new(0.0);
        let queue = TimerQueue::new(Rc::new(clock.clone()));
        (clock, queue)
    }

    #[test]
    fn test_timeout_fires_once_at_deadline() {
        let (clock, queue) = setup();
        let fired = Rc::new(Cell::new(0));
        let fired_clone = fired.clone();

        queue
            .set_timeout(300, move || fired_clone.set(fired_clone.get() + 1))
            .detach();

        clock.advance(299.0);
        assert_eq!(queue.run_due(), 0);

        clock.advance(1.0);
        assert_eq!(queue.run_due(), 1);
        assert_eq!(fired.get(), 1);

        clock.advance(1000.0);
        assert_eq!(queue.run_due(), 0);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_dropping_handle_cancels() {
        let (clock, queue) = setup();
        let fired = Rc::new(Cell::new(false));
        let fired_clone = fired.clone();

        let handle = queue.set_timeout(10, move || fired_clone.set(true));
        assert!(handle.is_active());
        drop(handle);

        clock.advance(20.0);
        queue.run_due();
        assert!(!fired.get());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_deadline_order_with_ties() {
        let (clock, queue) = setup();
        let order = Rc::new(RefCell::new(Vec::new()));

        for (label, delay) in [("late", 50), ("first", 10), ("second", 10)] {
            let order = order.clone();
            queue
                .set_timeout(delay, move || order.borrow_mut().push(label))
                .detach();
        }

        clock.advance(100.0);
        assert_eq!(queue.run_due(), 3);
        assert_eq!(*order.borrow(), vec!["first", "second", "late"]);
    }

    #[test]
    fn test_interval_catches_up_and_stops() {
        let (clock, queue) = setup();
        let ticks = Rc::new(Cell::new(0));
        let ticks_clone = ticks.clone();

        let handle = queue.set_interval(1000, move || {
            ticks_clone.set(ticks_clone.get() + 1);
            if ticks_clone.get() == 3 {
                IntervalFlow::Stop
            } else {
                IntervalFlow::Continue
            }
        });

        clock.advance(1000.0);
        queue.run_due();
        assert_eq!(ticks.get(), 1);
        assert!(handle.is_active());

        clock.advance(5000.0);
        queue.run_due();
        assert_eq!(ticks.get(), 3);
        assert!(!handle.is_active());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_timer_scheduled_during_run_waits_for_next_pass() {
        let (clock, queue) = setup();
        let inner_fired = Rc::new(Cell::new(false));
        let inner_clone = inner_fired.clone();
        let queue_clone = queue.clone();

        queue
            .set_timeout(0, move || {
                let inner = inner_clone.clone();
                queue_clone.set_timeout(0, move || inner.set(true)).detach();
            })
            .detach();

        assert_eq!(queue.run_due(), 1);
        assert!(!inner_fired.get());

        clock.advance(1.0);
        assert_eq!(queue.run_due(), 1);
        assert!(inner_fired.get());
    }

    #[test]
    fn test_clear_from_inside_interval_releases_it() {
        let (clock, queue) = setup();
        let queue_clone = queue.clone();
        let ticks = Rc::new(Cell::new(0));
        let ticks_clone = ticks.clone();

        queue
            .set_interval(10, move || {
                ticks_clone.set(ticks_clone.get() + 1);
                queue_clone.clear();
                IntervalFlow::Continue
            })
            .detach();

        clock.advance(100.0);
        queue.run_due();
        assert_eq!(ticks.get(), 1);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_next_deadline() {
        let (_clock, queue) = setup();
        assert_eq!(queue.next_deadline(), None);
        let _a = queue.set_timeout(300, || {});
        let _b = queue.set_timeout(120, || {});
        assert_eq!(queue.next_deadline(), Some(120.0));
    }
}
