//! Booking Store
//!
//! Typed load/save of [`Booking`] records over a [`StateStore`]. The store
//! never interprets field semantics; it only separates "no entry" from
//! "entry that does not decode".

use crate::{
    error::{Error, Result},
    state::StateStore,
    types::{Booking, BookingId},
};
use std::fmt;
use std::sync::Arc;

/// Typed pass-through to the ledger
#[derive(Clone)]
pub struct BookingStore {
    state: Arc<dyn StateStore>,
}

impl fmt::Debug for BookingStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BookingStore").finish_non_exhaustive()
    }
}

impl BookingStore {
    /// Create store over a ledger backend
    pub fn new(state: Arc<dyn StateStore>) -> Self {
        Self { state }
    }

    /// Load booking by ID
    pub fn load(&self, booking_id: BookingId) -> Result<Booking> {
        let key = booking_id.ledger_key();

        let bytes = self
            .state
            .get_state(&key)
            .map_err(|e| persistence(&key, e))?
            .ok_or(Error::NotFound { booking_id })?;

        let booking: Booking = serde_json::from_slice(&bytes).map_err(|e| {
            tracing::warn!(key = %key, error = %e, "Undecodable booking record");
            Error::CorruptRecord {
                key: key.clone(),
                reason: e.to_string(),
            }
        })?;

        if booking.id() != booking_id {
            return Err(Error::CorruptRecord {
                key,
                reason: format!("record carries bookingId {}", booking.id()),
            });
        }

        tracing::debug!(booking_id = %booking_id, status = %booking.status(), "Booking loaded");

        Ok(booking)
    }

    /// Save booking under its ID
    pub fn save(&self, booking: &Booking) -> Result<()> {
        let key = booking.id().ledger_key();

        let bytes = serde_json::to_vec(booking).map_err(|e| Error::Persistence {
            key: key.clone(),
            reason: format!("encoding failed: {}", e),
        })?;

        self.state
            .put_state(&key, &bytes)
            .map_err(|e| persistence(&key, e))?;

        tracing::debug!(booking_id = %booking.id(), status = %booking.status(), "Booking saved");

        Ok(())
    }
}

fn persistence(key: &str, err: Error) -> Error {
    match err {
        err @ Error::Persistence { .. } => err,
        other => Error::Persistence {
            key: key.to_string(),
            reason: other.to_string(),
        },
    }
}
