//! Error types for the booking ledger

use crate::types::BookingId;
use thiserror::Error;

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ledger errors
#[derive(Error, Debug)]
pub enum Error {
    /// No ledger entry exists for the booking
    #[error("Booking not found: {booking_id}")]
    NotFound {
        /// Requested booking
        booking_id: BookingId,
    },

    /// Ledger entry exists but does not decode into a booking
    #[error("Corrupt booking record at key {key}: {reason}")]
    CorruptRecord {
        /// Ledger key
        key: String,
        /// Decoder message
        reason: String,
    },

    /// Ledger read or write failed
    #[error("Persistence error at key {key}: {reason}")]
    Persistence {
        /// Ledger key
        key: String,
        /// Backend message
        reason: String,
    },

    /// Storage backend error (RocksDB)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rocksdb::Error> for Error {
    fn from(err: rocksdb::Error) -> Self {
        Error::Storage(err.to_string())
    }
}
