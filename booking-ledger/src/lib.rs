//! Booking Ledger
//!
//! Typed access to hotel-booking records kept on a shared key-value ledger.
//!
//! # Architecture
//!
//! - **State seam**: [`StateStore`] is the external ledger (`get`/`put` of
//!   opaque bytes). Ordering and commit belong to the ledger, not to us.
//! - **Backends**: [`MemoryStateStore`] for tests and local runs,
//!   [`RocksStateStore`] for a durable node.
//! - **Booking Store**: [`BookingStore`] loads and saves one [`Booking`]
//!   per ledger key, telling "absent" apart from "malformed".
//!
//! # Invariants
//!
//! - One ledger entry per booking, keyed by the decimal booking id
//! - The booking id inside the payload always matches its key
//! - Amounts are exact decimals, never binary floats

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod types;
pub mod state;
pub mod storage;
pub mod store;
pub mod error;
pub mod config;

// Re-exports
pub use error::{Error, Result};
pub use types::{Booking, BookingId, BookingRecord, BookingStatus, TravelAgentId};
pub use state::{MemoryStateStore, StateStore};
pub use storage::RocksStateStore;
pub use store::BookingStore;
pub use config::Config;
