//! Core types for the booking ledger
//!
//! All types are designed for:
//! - Stable JSON field names across versions
//! - Exact arithmetic (Decimal for money)
//! - Identity kept apart from the mutable payload

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Booking identifier, also the ledger key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingId(u64);

impl BookingId {
    /// Create new booking ID
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get raw value
    pub const fn get(&self) -> u64 {
        self.0
    }

    /// Ledger key the booking is stored under
    pub fn ledger_key(&self) -> String {
        self.0.to_string()
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BookingId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // u64::from_str accepts a leading '+', ledger keys never carry one
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(format!("'{}' is not a decimal booking id", s));
        }
        s.parse::<u64>()
            .map(Self)
            .map_err(|e| format!("'{}' is not a booking id: {}", s, e))
    }
}

impl From<u64> for BookingId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Travel agent identifier, lower-cased for key stability
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TravelAgentId(String);

impl TravelAgentId {
    /// Normalise and validate an agent id
    pub fn parse(raw: &str) -> Option<Self> {
        let id = raw.trim().to_lowercase();
        if id.is_empty() {
            None
        } else {
            Some(Self(id))
        }
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TravelAgentId {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw).ok_or_else(|| "travel agent id is empty".to_string())
    }
}

impl From<TravelAgentId> for String {
    fn from(id: TravelAgentId) -> Self {
        id.0
    }
}

impl fmt::Display for TravelAgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Booking lifecycle status
///
/// Persisted as its integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum BookingStatus {
    /// Initial state
    Reservation = 0,
    /// Guest is staying
    InHouse = 1,
    /// Stay concluded (terminal)
    Checkout = 2,
    /// Cancelled (terminal)
    Cancel = 3,
}

impl BookingStatus {
    /// Integer code used on the ledger
    pub const fn code(&self) -> u8 {
        *self as u8
    }

    /// Name used in logs and error messages
    pub const fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Reservation => "RESERVATION",
            BookingStatus::InHouse => "INHOUSE",
            BookingStatus::Checkout => "CHECKOUT",
            BookingStatus::Cancel => "CANCEL",
        }
    }

    /// Check if no further status transition is allowed
    pub const fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Checkout | BookingStatus::Cancel)
    }

    /// Check whether `next` is reachable in one step
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        use BookingStatus::*;

        matches!(
            (*self, next),
            (Reservation, InHouse)
                | (Reservation, Checkout)
                | (Reservation, Cancel)
                | (InHouse, Checkout)
                | (InHouse, Cancel)
        )
    }
}

impl TryFrom<u8> for BookingStatus {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(BookingStatus::Reservation),
            1 => Ok(BookingStatus::InHouse),
            2 => Ok(BookingStatus::Checkout),
            3 => Ok(BookingStatus::Cancel),
            other => Err(format!("unknown booking status code {}", other)),
        }
    }
}

impl From<BookingStatus> for u8 {
    fn from(status: BookingStatus) -> Self {
        status.code()
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutable part of a booking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRecord {
    /// Owning travel agent
    #[serde(rename = "TravelAgentId")]
    pub travel_agent_id: TravelAgentId,

    /// Guest's total charge
    #[serde(rename = "totalBill")]
    pub total_bill: Decimal,

    /// Hotel has finalised the bill
    #[serde(rename = "isSettled")]
    pub is_settled: bool,

    /// Commission owed to the travel agent
    #[serde(rename = "payables")]
    pub payables: Decimal,

    /// Lifecycle status
    #[serde(rename = "status")]
    pub status: BookingStatus,
}

impl BookingRecord {
    /// Fresh reservation: unsettled, no payables
    pub fn reservation(travel_agent_id: TravelAgentId, total_bill: Decimal) -> Self {
        Self {
            travel_agent_id,
            total_bill,
            is_settled: false,
            payables: Decimal::ZERO,
            status: BookingStatus::Reservation,
        }
    }
}

/// A booking as stored on the ledger
///
/// The id is fixed at construction; updates only ever see the
/// [`BookingRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    #[serde(rename = "bookingId")]
    booking_id: BookingId,

    #[serde(flatten)]
    record: BookingRecord,
}

impl Booking {
    /// Create booking
    pub fn new(booking_id: BookingId, record: BookingRecord) -> Self {
        Self { booking_id, record }
    }

    /// Booking ID
    pub fn id(&self) -> BookingId {
        self.booking_id
    }

    /// Current payload
    pub fn record(&self) -> &BookingRecord {
        &self.record
    }

    /// Payload for in-place updates
    pub fn record_mut(&mut self) -> &mut BookingRecord {
        &mut self.record
    }

    /// Current status
    pub fn status(&self) -> BookingStatus {
        self.record.status
    }

    /// First persisted invariant this booking breaks, if any
    pub fn invariant_violation(&self) -> Option<String> {
        let r = &self.record;

        if r.total_bill < Decimal::ZERO {
            return Some(format!("totalBill {} is negative", r.total_bill));
        }
        if r.payables < Decimal::ZERO {
            return Some(format!("payables {} is negative", r.payables));
        }
        if !r.is_settled && !r.payables.is_zero() {
            return Some(format!("payables {} recorded before settlement", r.payables));
        }

        None
    }
}
