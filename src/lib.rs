//! # deal-reveal
//!
//! Incremental reveal and first-screen instrumentation for deal lists.
//!
//! Built on [spark-signals](https://github.com/RLabs-Inc/spark-signals) for fine-grained reactivity.
//!
//! ## Architecture
//!
//! A mounted [`DealList`] owns one reveal window over an ordered deal
//! collection. The window starts small and grows in fixed steps as the view
//! nears its end; a deferred preload widens it a little further once the
//! user has paused. A completion reporter watches the window and emits one
//! timing report per load cycle, as soon as the first screen has content.
//!
//! ```text
//! DealSource → finish_load → RevealState ──▶ visible_slice → ListRenderer
//!                                 │  ▲                          │
//!                 reporter effect ┘  └── on_viewport ◀── last_in_view
//!                                 │
//!                         CompletionReport → ReportSink
//! ```
//!
//! Everything runs on the host thread. Deferred work goes through the
//! list's own [`TimerQueue`], which the host drives with [`DealList::tick`].
//!
//! ## Modules
//!
//! - [`types`] - Deal, badge and restaurant records
//! - [`config`] - Reveal tuning knobs (TOML)
//! - [`error`] - Load and config errors
//! - [`engine`] - Clock and timer queue
//! - [`state`] - Reveal window, reporter, scroll proximity, countdowns
//! - [`pipeline`] - Load cycle and the mounted list handle
//! - [`source`] - Response envelope and an in-memory deal source
//! - [`platform`] - API and asset URL resolution per host
//! - [`renderer`] - Terminal renderer

pub mod config;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod platform;
pub mod renderer;
pub mod source;
pub mod state;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use config::{ReportTiming, RevealConfig};

pub use error::{ConfigError, LoadError};

pub use engine::{Clock, ClockSource, IntervalFlow, ManualClock, TimerHandle, TimerQueue};

pub use state::{
    // Reveal
    GrowthOutcome, RevealFlags, RevealState, RevealStats, SkipReason, VisibleSlice,
    // Report
    CompletionReport, CompletionReporter, LogSink, ReportSink,
    // Scroll
    ScrollProximity,
    // Countdown
    format_seconds_to_string, parse_time_to_seconds, Countdown, CountdownPhase,
};

pub use pipeline::{mount, unmount, DealList, DealSource, LoadStatus, LoadTicket};

pub use source::{decode_deals_response, Envelope, StaticDealSource};

pub use platform::PlatformContext;

pub use renderer::{card_lines, Frame, ListRenderer};
