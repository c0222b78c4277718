//! Booking Lifecycle
//!
//! Role-gated lifecycle of travel-agency hotel bookings and the commission
//! owed to the travel agent once the hotel has settled the bill.
//!
//! # Architecture
//!
//! Every invocation is a single load → validate → mutate → save against one
//! booking key:
//!
//! 1. **Routing**: [`Router`] resolves the function name to an [`Operation`]
//!    and checks the caller's role against that operation's entry
//! 2. **Validation**: [`BookingService`] re-checks the role, the arguments
//!    and the booking's current status
//! 3. **Persistence**: the new state is written back through the
//!    [`BookingStore`](booking_ledger::BookingStore), once
//!
//! # Roles
//!
//! | Operation | Roles |
//! |---|---|
//! | `initBooking` | `TA` |
//! | `updateSettled` | `HOTEL` |
//! | `updatePayables` | `CTAC` |
//! | `cancelBooking` | `TA`, `HOTEL` |
//! | `getStatus`, `ping` | any |
//!
//! # Example
//!
//! ```
//! use booking_ledger::{BookingStore, MemoryStateStore};
//! use booking_lifecycle::{BookingService, CommissionRate, Invocation, Metrics, Router};
//! use std::sync::Arc;
//!
//! # fn main() -> booking_lifecycle::Result<()> {
//! let store = BookingStore::new(Arc::new(MemoryStateStore::new()));
//! let service = BookingService::new(store, CommissionRate::default());
//! let router = Router::new(service, Metrics::new()?);
//!
//! router.invoke(&Invocation::new("initBooking", "TA", ["ta1", "101", "1200.00"]))?;
//! router.invoke(&Invocation::new("updateSettled", "HOTEL", ["101", "1150.00"]))?;
//! router.invoke(&Invocation::new("updatePayables", "CTAC", ["101"]))?;
//!
//! let status = router.invoke(&Invocation::new("getStatus", "TA", ["101"]))?;
//! let booking: booking_ledger::Booking = serde_json::from_slice(&status).unwrap();
//! assert_eq!(booking.record().payables, rust_decimal_macros::dec!(23.00));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod types;
pub mod operation;
pub mod service;
pub mod router;
pub mod metrics;
pub mod error;
pub mod config;

// Re-exports
pub use error::{Error, Result};
pub use types::{CallerRole, Invocation};
pub use operation::Operation;
pub use service::BookingService;
pub use router::Router;
pub use metrics::Metrics;
pub use config::{CommissionRate, Config, LedgerBackend, DEFAULT_COMMISSION_RATE};
