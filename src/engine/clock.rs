//! Clock sources.
//!
//! Everything in the engine reads time through [`Clock`], so tests and demos
//! can swap in a [`ManualClock`] and drive timers deterministically.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

use crate::types::Millis;

/// A source of milliseconds. Only differences between readings are meaningful.
pub trait Clock {
    fn now(&self) -> Millis;
}

impl<C: Clock + ?Sized> Clock for Rc<C> {
    fn now(&self) -> Millis {
        (**self).now()
    }
}

// =============================================================================
// ClockSource
// =============================================================================

/// The platform clock: monotonic when the target has one, wall-clock otherwise.
#[derive(Debug, Clone, Copy)]
pub enum ClockSource {
    /// Milliseconds since this source was created.
    Monotonic { origin: Instant },
    /// Milliseconds since the Unix epoch. Can jump if the system clock moves.
    Wall,
}

impl ClockSource {
    /// Pick the best clock for the current target.
    ///
    /// `wasm32-unknown-unknown` has no `Instant`, so it falls back to wall time.
    pub fn detect() -> Self {
        if cfg!(all(target_arch = "wasm32", target_os = "unknown")) {
            ClockSource::Wall
        } else {
            ClockSource::monotonic()
        }
    }

    pub fn monotonic() -> Self {
        ClockSource::Monotonic {
            origin: Instant::now(),
        }
    }

    pub fn is_monotonic(&self) -> bool {
        matches!(self, ClockSource::Monotonic { .. })
    }
}

impl Default for ClockSource {
    fn default() -> Self {
        Self::detect()
    }
}

impl Clock for ClockSource {
    fn now(&self) -> Millis {
        match self {
            ClockSource::Monotonic { origin } => origin.elapsed().as_secs_f64() * 1000.0,
            ClockSource::Wall => jiff::Timestamp::now().as_microsecond() as f64 / 1000.0,
        }
    }
}

// =============================================================================
// ManualClock
// =============================================================================

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Millis>>,
}

impl ManualClock {
    pub fn new(start: Millis) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    /// Move time forward. Negative steps are ignored.
    pub fn advance(&self, ms: Millis) {
        if ms > 0.0 {
            self.now.set(self.now.get() + ms);
        }
    }

    pub fn set(&self, ms: Millis) {
        self.now.set(ms);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Millis {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monotonic_never_goes_backwards() {
        let clock = ClockSource::monotonic();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
        assert!(a >= 0.0);
    }

    #[test]
    fn test_wall_clock_is_epoch_based() {
        // 2020-01-01T00:00:00Z in milliseconds.
        assert!(ClockSource::Wall.now() > 1_577_836_800_000.0);
    }

    #[test]
    fn test_detect_prefers_monotonic_on_native() {
        assert!(ClockSource::detect().is_monotonic());
    }

    #[test]
    fn test_manual_clock_shared_between_clones() {
        let clock = ManualClock::new(10.0);
        let other = clock.clone();
        clock.advance(5.5);
        assert_eq!(other.now(), 15.5);

        other.advance(-3.0);
        assert_eq!(clock.now(), 15.5);

        other.set(100.0);
        assert_eq!(clock.now(), 100.0);
    }
}
