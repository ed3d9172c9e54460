//! Data load cycle - fetch bookkeeping around the deal collection.
//!
//! A load cycle runs from [`DealList::begin_load`](super::DealList::begin_load)
//! to at most one completion report. The fetch itself belongs to a
//! [`DealSource`]; this module only defines the ticket that ties a fetch
//! result back to the cycle that started it, and the status shown while it
//! runs.

use crate::error::LoadError;
use crate::types::{DealRecord, Millis};

/// Produces the ordered deal collection for a restaurant.
pub trait DealSource {
    fn fetch_deals(&self, restaurant_id: &str) -> Result<Vec<DealRecord>, LoadError>;
}

impl<S: DealSource + ?Sized> DealSource for &S {
    fn fetch_deals(&self, restaurant_id: &str) -> Result<Vec<DealRecord>, LoadError> {
        (**self).fetch_deals(restaurant_id)
    }
}

/// Proof that a fetch was started for a given cycle.
///
/// Completing with a ticket from a superseded cycle is a no-op.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadTicket {
    pub cycle: u64,
    pub started_at: Millis,
}

/// What the list should display for the current cycle.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LoadStatus {
    /// No load has started.
    #[default]
    Idle,
    Loading,
    Ready {
        total: usize,
    },
    /// The fetch succeeded with no deals.
    Empty,
    /// The fetch failed; nothing is disclosed and nothing is reported.
    Failed {
        reason: String,
    },
}

impl LoadStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, LoadStatus::Ready { .. })
    }
}
