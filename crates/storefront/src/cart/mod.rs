//! Client-side cart state kept in step with the backend.
//!
//! # Architecture
//!
//! - [`QueryStore`] caches the cart under [`QueryKey::CART`]
//! - [`OptimisticMutation`] applies a local change, sends the request, then
//!   commits the response or rolls back to the snapshot
//! - [`CartSync`] exposes the cart operations on top of a [`CartBackend`]
//!
//! Cart changes always reach the backend. A newer change takes the cache
//! away from an older one still in flight, whose response is then
//! discarded; a failure is still reported to the shopper. Fetches are
//! cancelled by any cart change and never replace an optimistic value.

mod backend;
mod optimistic;
mod store;
mod sync;
pub mod transforms;

use std::time::Duration;

use thiserror::Error;

use crate::api::ApiError;

pub use backend::CartBackend;
#[cfg(test)]
pub use backend::MockCartBackend;
pub use optimistic::{OptimisticMutation, Settle};
pub use store::{FetchTicket, Lease, QueryKey, QueryStore};
pub use sync::CartSync;

/// Errors from cart operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The backend rejected the request or could not be reached.
    #[error("Request failed: {0}")]
    Request(#[from] ApiError),

    /// The backend did not answer in time.
    #[error("Request timed out after {0:?}")]
    TimedOut(Duration),

    /// A cart change or invalidation cancelled the fetch.
    #[error("Superseded by a newer cart operation")]
    Superseded,

    /// Quantity below 1.
    #[error("Quantity must be at least 1, got {0}")]
    InvalidQuantity(i64),
}

impl SyncError {
    /// The backend-provided message suitable for shoppers, if any.
    #[must_use]
    pub fn user_message(&self) -> Option<&str> {
        match self {
            Self::Request(err) => err.user_message(),
            _ => None,
        }
    }
}
