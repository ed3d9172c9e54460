//! Load Pipeline
//!
//! This module connects the data load cycle to the reveal state and exposes
//! the mounted list to the view layer.
//!
//! # Data Flow
//!
//! ```text
//! begin_load → fetch (DealSource) → finish_load → reset window → view renders slice
//!     → reporter effect fires once → scroll proximity → growth → deferred preload
//! ```
//!
//! ## Key Design Principles
//!
//! - **Synchronous publish**: the window is reset before `finish_load` returns
//! - **Cycle tickets**: results and timers from a superseded cycle are dropped
//! - **Failures stay here**: a failed fetch becomes a status, never an error in
//!   the reveal state or the reporter

pub mod load;
pub mod mount;

pub use load::{DealSource, LoadStatus, LoadTicket};
pub use mount::{mount, unmount, DealList};
