//! Engine - Time and scheduling primitives.
//!
//! The engine owns the two leaf services the reveal state builds on:
//! - Clock: monotonic-preferred time source with a wall-clock fallback
//! - Timers: per-instance queue of one-shot and periodic callbacks
//!
//! # Scheduling model
//!
//! Single-threaded and cooperative. Timers never fire on another thread;
//! the host loop calls [`TimerQueue::run_due`] and each due callback runs to
//! completion before the next one starts.

mod clock;
mod timers;

pub use clock::*;
pub use timers::*;
