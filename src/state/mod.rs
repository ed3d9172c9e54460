//! State Module - Runtime state for one deal list
//!
//! This module contains the reactive state systems behind a deal list:
//!
//! - **Reveal** - Reveal window, disclosure controller, deferred preload
//! - **Report** - Completion reporter (first meaningful content timing)
//! - **Scroll** - Scroll offset and scroll-proximity trigger
//! - **Countdown** - Per-badge countdown timers

pub mod countdown;
pub mod report;
pub mod reveal;
pub mod scroll;

pub use countdown::{format_seconds_to_string, parse_time_to_seconds, Countdown, CountdownPhase};
pub use report::{CompletionReport, CompletionReporter, LogSink, ReportSink};
pub use reveal::{GrowthOutcome, RevealFlags, RevealState, RevealStats, SkipReason, VisibleSlice};
pub use scroll::ScrollProximity;
