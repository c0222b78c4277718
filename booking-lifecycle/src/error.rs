//! Error types for the booking lifecycle

use crate::operation::Operation;
use booking_ledger::{BookingId, BookingStatus};
use thiserror::Error;

/// Result type for lifecycle operations
pub type Result<T> = std::result::Result<T, Error>;

/// Lifecycle errors
///
/// Each variant carries enough context (booking, operation, status) to be
/// diagnosed without the logs.
#[derive(Error, Debug)]
pub enum Error {
    /// Caller role is not allowed to run the operation
    #[error("Unauthorized: {operation} requires {required}, caller is '{caller}'")]
    Unauthorized {
        /// Attempted operation
        operation: Operation,
        /// Accepted role tokens
        required: String,
        /// Role token presented by the caller
        caller: String,
    },

    /// No record for the booking
    #[error("Booking not found: {booking_id}")]
    NotFound {
        /// Requested booking
        booking_id: BookingId,
    },

    /// Create on an existing booking id
    #[error("Duplicate booking: {booking_id} already exists")]
    DuplicateBooking {
        /// Existing booking
        booking_id: BookingId,
    },

    /// Stored bytes do not decode into a booking
    #[error("Corrupt booking record at key {key}: {reason}")]
    CorruptRecord {
        /// Ledger key
        key: String,
        /// Decoder message
        reason: String,
    },

    /// Malformed or out-of-range input
    #[error("Invalid argument for {operation}: {reason}")]
    InvalidArgument {
        /// Operation that rejected the input
        operation: Operation,
        /// What was wrong
        reason: String,
    },

    /// Transition not permitted from the current status
    #[error("Invalid state transition: cannot {operation} booking {booking_id} in status {current}")]
    InvalidStateTransition {
        /// Booking
        booking_id: BookingId,
        /// Attempted operation
        operation: Operation,
        /// Status found on the ledger
        current: BookingStatus,
    },

    /// Payables requested before the hotel settled the bill
    #[error("Settlement pending: payables cannot be computed for booking {booking_id} (status {current}, isSettled=false)")]
    SettlementPending {
        /// Booking
        booking_id: BookingId,
        /// Status found on the ledger
        current: BookingStatus,
    },

    /// Mutation would persist a record breaking a booking invariant
    #[error("Invariant violation for booking {booking_id} during {operation}: {reason}")]
    InvariantViolation {
        /// Booking
        booking_id: BookingId,
        /// Operation that produced the record
        operation: Operation,
        /// Broken invariant
        reason: String,
    },

    /// Reply payload could not be encoded
    #[error("Encoding error for key {key}: {reason}")]
    Encoding {
        /// Ledger key of the booking being encoded
        key: String,
        /// Encoder message
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

    /// Function name has no handler
    #[error("Function of the name {0} doesn't exist")]
    UnknownFunction(String),

    /// Ledger backend error outside a booking operation (open, close)
    #[error("Ledger error: {0}")]
    Ledger(booking_ledger::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Metrics registry error
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Short label used as the metrics outcome
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Unauthorized { .. } => "unauthorized",
            Error::NotFound { .. } => "not_found",
            Error::DuplicateBooking { .. } => "duplicate_booking",
            Error::CorruptRecord { .. } => "corrupt_record",
            Error::InvalidArgument { .. } => "invalid_argument",
            Error::InvalidStateTransition { .. } => "invalid_state_transition",
            Error::SettlementPending { .. } => "settlement_pending",
            Error::InvariantViolation { .. } => "invariant_violation",
            Error::Encoding { .. } => "encoding",
            Error::Persistence { .. } => "persistence",
            Error::UnknownFunction(_) => "unknown_function",
            Error::Ledger(_) => "ledger",
            Error::Config(_) => "config",
            Error::Metrics(_) => "metrics",
            Error::Io(_) => "io",
        }
    }
}

impl From<booking_ledger::Error> for Error {
    fn from(err: booking_ledger::Error) -> Self {
        match err {
            booking_ledger::Error::NotFound { booking_id } => Error::NotFound { booking_id },
            booking_ledger::Error::CorruptRecord { key, reason } => {
                Error::CorruptRecord { key, reason }
            }
            booking_ledger::Error::Persistence { key, reason } => Error::Persistence { key, reason },
            other => Error::Ledger(other),
        }
    }
}
