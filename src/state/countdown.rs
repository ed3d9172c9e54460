//! Countdown badges - "H:MM:SS" strings that tick down once per second.
//!
//! A [`Countdown`] is either idle (nothing left, shows `00:00:00`) or
//! ticking. Changing its source string restarts it from the parsed value.
//! The per-second interval is owned by the countdown and released when it
//! reaches zero, when the source changes, or when the countdown is dropped.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use spark_signals::{signal, Signal};
use tracing::trace;

use crate::engine::{IntervalFlow, TimerHandle, TimerQueue};

/// Tick period.
pub const TICK_MS: u64 = 1000;

// =============================================================================
// Parsing / formatting
// =============================================================================

/// Convert `"H:MM:SS"` to seconds.
///
/// Missing trailing components count as zero (`"2"` is two hours). Each
/// component is read like a lenient integer parse: leading whitespace and
/// sign, then digits; anything unparsable is zero.
pub fn parse_time_to_seconds(time: &str) -> i64 {
    let mut parts = time.split(':');
    let mut next = || parts.next().map(parse_component).unwrap_or(0);
    let hours = next();
    let minutes = next();
    let seconds = next();
    hours
        .saturating_mul(3600)
        .saturating_add(minutes.saturating_mul(60))
        .saturating_add(seconds)
}

fn parse_component(part: &str) -> i64 {
    let part = part.trim_start();
    let (negative, digits) = match part.as_bytes().first() {
        Some(b'-') => (true, &part[1..]),
        Some(b'+') => (false, &part[1..]),
        _ => (false, part),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    let value = digits[..end].parse::<i64>().unwrap_or(0);
    if negative { -value } else { value }
}

/// Convert seconds to `"HH:MM:SS"`. Non-positive totals give `"00:00:00"`.
///
/// Hours are not wrapped; 100 hours formats as `"100:00:00"`.
pub fn format_seconds_to_string(total_seconds: i64) -> String {
    if total_seconds <= 0 {
        return "00:00:00".to_string();
    }
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

// =============================================================================
// Countdown
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownPhase {
    Idle,
    Ticking,
}

struct CountdownState {
    remaining: Signal<i64>,
}

/// A live countdown for one badge.
pub struct Countdown {
    state: Rc<CountdownState>,
    source: RefCell<Option<String>>,
    timer: RefCell<Option<TimerHandle>>,
    timers: TimerQueue,
}

impl Countdown {
    /// Create a countdown and start it from `source`.
    pub fn new(timers: &TimerQueue, source: &str) -> Self {
        let countdown = Self {
            state: Rc::new(CountdownState {
                remaining: signal(0),
            }),
            source: RefCell::new(None),
            timer: RefCell::new(None),
            timers: timers.clone(),
        };
        countdown.set_source(source);
        countdown
    }

    /// Restart from `source` if it differs from the current one.
    pub fn set_source(&self, source: &str) {
        if self.source.borrow().as_deref() == Some(source) {
            return;
        }
        *self.source.borrow_mut() = Some(source.to_string());

        // Dropping the handle removes the old interval from the queue.
        if let Some(previous) = self.timer.borrow_mut().take() {
            trace!(timer = previous.id(), "countdown restarted");
        }

        let seconds = parse_time_to_seconds(source).max(0);
        self.state.remaining.set(seconds);
        if seconds > 0 {
            let handle = self.start_ticking();
            *self.timer.borrow_mut() = Some(handle);
        }
    }

    fn start_ticking(&self) -> TimerHandle {
        let state = Rc::downgrade(&self.state);
        self.timers.set_interval(TICK_MS, move || {
            let Some(state) = state.upgrade() else {
                return IntervalFlow::Stop;
            };
            let remaining = (state.remaining.get() - 1).max(0);
            state.remaining.set(remaining);
            if remaining == 0 {
                IntervalFlow::Stop
            } else {
                IntervalFlow::Continue
            }
        })
    }

    /// Seconds left. Tracks the countdown when read inside an effect.
    pub fn remaining(&self) -> i64 {
        self.state.remaining.get()
    }

    pub fn remaining_signal(&self) -> Signal<i64> {
        self.state.remaining.clone()
    }

    /// Current `"HH:MM:SS"` display.
    pub fn display(&self) -> String {
        format_seconds_to_string(self.remaining())
    }

    pub fn phase(&self) -> CountdownPhase {
        if self.remaining() > 0 {
            CountdownPhase::Ticking
        } else {
            CountdownPhase::Idle
        }
    }

    /// Whether the per-second interval is still scheduled.
    pub fn is_timer_active(&self) -> bool {
        self.timer
            .borrow()
            .as_ref()
            .is_some_and(TimerHandle::is_active)
    }
}

impl fmt::Debug for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Countdown")
            .field("source", &self.source.borrow())
            .field("remaining", &self.state.remaining.get())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
