//! Booking Lifecycle Service
//!
//! Implements the role-gated operations and the status rules:
//!
//! | Current status | Event | Roles | New status |
//! |---|---|---|---|
//! | (none) | create | TA | RESERVATION |
//! | RESERVATION / INHOUSE | settle | HOTEL | CHECKOUT |
//! | CHECKOUT | settle | HOTEL | CHECKOUT (bill rewritten, payables cleared) |
//! | RESERVATION / INHOUSE | cancel | TA, HOTEL | CANCEL |
//! | settled | compute payables | CTAC | unchanged |
//!
//! Every operation validates completely, including the persisted booking
//! invariants, before its single `save`, so a failed call never leaves a
//! partial write behind.

use crate::{
    config::CommissionRate,
    operation::Operation,
    types::CallerRole,
    Error, Result,
};
use booking_ledger::{Booking, BookingId, BookingRecord, BookingStatus, BookingStore, TravelAgentId};
use rust_decimal::Decimal;

/// Lifecycle service over a booking store
#[derive(Debug, Clone)]
pub struct BookingService {
    /// Booking store
    store: BookingStore,

    /// Commission applied by `compute_payables`
    commission_rate: CommissionRate,
}

impl BookingService {
    /// Create new service
    pub fn new(store: BookingStore, commission_rate: CommissionRate) -> Self {
        Self {
            store,
            commission_rate,
        }
    }

    /// Commission rate in use
    pub fn commission_rate(&self) -> CommissionRate {
        self.commission_rate
    }

    /// Create a reservation (TA)
    pub fn create_booking(
        &self,
        role: CallerRole,
        travel_agent_id: &str,
        booking_id: BookingId,
        total_bill: Decimal,
    ) -> Result<Booking> {
        let operation = Operation::InitBooking;
        authorize(operation, role)?;

        let travel_agent_id =
            TravelAgentId::parse(travel_agent_id).ok_or_else(|| Error::InvalidArgument {
                operation,
                reason: "travelAgentId is empty".to_string(),
            })?;
        non_negative(operation, "totalBill", total_bill)?;

        match self.store.load(booking_id) {
            Ok(_) => return Err(Error::DuplicateBooking { booking_id }),
            Err(booking_ledger::Error::NotFound { .. }) => {}
            Err(e) => return Err(e.into()),
        }

        let booking = Booking::new(
            booking_id,
            BookingRecord::reservation(travel_agent_id, total_bill),
        );
        self.save_checked(operation, &booking)?;

        tracing::info!(
            booking_id = %booking_id,
            travel_agent_id = %booking.record().travel_agent_id,
            total_bill = %total_bill,
            "Booking created"
        );

        Ok(booking)
    }

    /// Finalise the guest's bill (HOTEL)
    ///
    /// Moves RESERVATION and INHOUSE bookings to CHECKOUT. A CHECKOUT booking
    /// may be settled again. Payables are cleared until CTAC recomputes them
    /// from the new bill.
    pub fn settle_booking(
        &self,
        role: CallerRole,
        booking_id: BookingId,
        final_bill: Decimal,
    ) -> Result<Booking> {
        let operation = Operation::UpdateSettled;
        authorize(operation, role)?;
        non_negative(operation, "finalBill", final_bill)?;

        let mut booking = self.store.load(booking_id)?;
        let current = booking.status();

        if current == BookingStatus::Cancel {
            return Err(Error::InvalidStateTransition {
                booking_id,
                operation,
                current,
            });
        }

        let record = booking.record_mut();
        record.total_bill = final_bill;
        record.is_settled = true;
        record.payables = Decimal::ZERO;
        if !current.is_terminal() {
            record.status = BookingStatus::Checkout;
        }

        self.save_checked(operation, &booking)?;

        tracing::info!(
            booking_id = %booking_id,
            from = %current,
            to = %booking.status(),
            total_bill = %final_bill,
            "Booking settled"
        );

        Ok(booking)
    }

    /// Compute the travel agent's commission (CTAC)
    ///
    /// A pure function of the settled bill, so repeating it is harmless.
    pub fn compute_payables(&self, role: CallerRole, booking_id: BookingId) -> Result<Booking> {
        let operation = Operation::UpdatePayables;
        authorize(operation, role)?;

        let mut booking = self.store.load(booking_id)?;

        if !booking.record().is_settled {
            return Err(Error::SettlementPending {
                booking_id,
                current: booking.status(),
            });
        }

        let payables = self.commission_rate.commission_on(booking.record().total_bill);
        booking.record_mut().payables = payables;

        self.save_checked(operation, &booking)?;

        tracing::info!(
            booking_id = %booking_id,
            total_bill = %booking.record().total_bill,
            payables = %payables,
            "Payables computed"
        );

        Ok(booking)
    }

    /// Cancel a booking that has not concluded (TA or HOTEL)
    pub fn cancel_booking(&self, role: CallerRole, booking_id: BookingId) -> Result<Booking> {
        let operation = Operation::CancelBooking;
        authorize(operation, role)?;

        let mut booking = self.store.load(booking_id)?;
        let current = booking.status();

        if current.is_terminal() {
            return Err(Error::InvalidStateTransition {
                booking_id,
                operation,
                current,
            });
        }

        booking.record_mut().status = BookingStatus::Cancel;
        self.save_checked(operation, &booking)?;

        tracing::info!(booking_id = %booking_id, from = %current, role = %role, "Booking cancelled");

        Ok(booking)
    }

    /// Read a booking (any caller)
    pub fn get_status(&self, booking_id: BookingId) -> Result<Booking> {
        Ok(self.store.load(booking_id)?)
    }

    /// Persist only records that keep the booking invariants
    fn save_checked(&self, operation: Operation, booking: &Booking) -> Result<()> {
        if let Some(reason) = booking.invariant_violation() {
            tracing::error!(
                booking_id = %booking.id(),
                operation = %operation,
                reason = %reason,
                "Refusing to persist booking"
            );
            return Err(Error::InvariantViolation {
                booking_id: booking.id(),
                operation,
                reason,
            });
        }
        Ok(self.store.save(booking)?)
    }
}

// The router checks roles too; the service does not rely on it.
fn authorize(operation: Operation, role: CallerRole) -> Result<()> {
    if operation.permits(role) {
        return Ok(());
    }

    tracing::warn!(operation = %operation, role = %role, "Unauthorized invocation");

    Err(Error::Unauthorized {
        operation,
        required: operation.roles_label(),
        caller: role.token().to_string(),
    })
}

fn non_negative(operation: Operation, field: &str, amount: Decimal) -> Result<()> {
    if amount < Decimal::ZERO {
        return Err(Error::InvalidArgument {
            operation,
            reason: format!("{} must be >= 0, got {}", field, amount),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use booking_ledger::{MemoryStateStore, StateStore};
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn test_service() -> (BookingService, Arc<MemoryStateStore>) {
        let ledger = Arc::new(MemoryStateStore::new());
        let store = BookingStore::new(ledger.clone());
        (BookingService::new(store, CommissionRate::default()), ledger)
    }

    fn id(n: u64) -> BookingId {
        BookingId::new(n)
    }

    fn seed(ledger: &MemoryStateStore, booking: &Booking) {
        ledger.insert(booking.id().ledger_key(), serde_json::to_vec(booking).unwrap());
    }

    #[test]
    fn test_create_booking() {
        let (service, _) = test_service();

        let booking = service
            .create_booking(CallerRole::TravelAgent, "TA1", id(101), dec!(1200.00))
            .unwrap();

        assert_eq!(booking.id(), id(101));
        assert_eq!(booking.status(), BookingStatus::Reservation);
        assert_eq!(booking.record().travel_agent_id.as_str(), "ta1");
        assert!(!booking.record().is_settled);
        assert!(booking.record().payables.is_zero());

        let stored = service.get_status(id(101)).unwrap();
        assert_eq!(stored, booking);
    }

    #[test]
    fn test_create_requires_ta() {
        let (service, ledger) = test_service();

        for role in [CallerRole::Hotel, CallerRole::Ctac] {
            let err = service
                .create_booking(role, "ta1", id(1), dec!(10))
                .unwrap_err();
            assert!(matches!(err, Error::Unauthorized { operation: Operation::InitBooking, .. }));
        }
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_create_duplicate_keeps_original() {
        let (service, _) = test_service();
        service
            .create_booking(CallerRole::TravelAgent, "ta1", id(7), dec!(100))
            .unwrap();

        let err = service
            .create_booking(CallerRole::TravelAgent, "ta2", id(7), dec!(999))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateBooking { booking_id } if booking_id == id(7)));

        let stored = service.get_status(id(7)).unwrap();
        assert_eq!(stored.record().travel_agent_id.as_str(), "ta1");
        assert_eq!(stored.record().total_bill, dec!(100));
    }

    #[test]
    fn test_create_rejects_bad_arguments() {
        let (service, ledger) = test_service();

        let err = service
            .create_booking(CallerRole::TravelAgent, "ta1", id(1), dec!(-0.01))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));

        let err = service
            .create_booking(CallerRole::TravelAgent, "  ", id(1), dec!(1))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));

        assert!(ledger.is_empty());
    }

    #[test]
    fn test_create_over_corrupt_record() {
        let (service, ledger) = test_service();
        ledger.insert("5", "{");

        let err = service
            .create_booking(CallerRole::TravelAgent, "ta1", id(5), dec!(1))
            .unwrap_err();
        assert!(matches!(err, Error::CorruptRecord { .. }));
        assert_eq!(ledger.raw("5"), Some(b"{".to_vec()));
    }

    #[test]
    fn test_settle_moves_to_checkout() {
        let (service, _) = test_service();
        service
            .create_booking(CallerRole::TravelAgent, "ta1", id(101), dec!(1200.00))
            .unwrap();

        let booking = service
            .settle_booking(CallerRole::Hotel, id(101), dec!(500.0))
            .unwrap();

        assert!(booking.record().is_settled);
        assert_eq!(booking.status(), BookingStatus::Checkout);
        assert_eq!(booking.record().total_bill, dec!(500.0));
    }

    #[test]
    fn test_settle_from_inhouse() {
        let (service, ledger) = test_service();
        let mut booking = Booking::new(
            id(3),
            BookingRecord::reservation(TravelAgentId::parse("ta1").unwrap(), dec!(80)),
        );
        booking.record_mut().status = BookingStatus::InHouse;
        seed(&ledger, &booking);

        let settled = service
            .settle_booking(CallerRole::Hotel, id(3), dec!(90))
            .unwrap();
        assert_eq!(settled.status(), BookingStatus::Checkout);
    }

    #[test]
    fn test_resettle_checkout_clears_payables() {
        let (service, _) = test_service();
        service
            .create_booking(CallerRole::TravelAgent, "ta1", id(4), dec!(100))
            .unwrap();
        service.settle_booking(CallerRole::Hotel, id(4), dec!(100)).unwrap();
        service.compute_payables(CallerRole::Ctac, id(4)).unwrap();

        let booking = service.settle_booking(CallerRole::Hotel, id(4), dec!(200)).unwrap();
        assert_eq!(booking.status(), BookingStatus::Checkout);
        assert_eq!(booking.record().total_bill, dec!(200));
        assert!(booking.record().payables.is_zero());
        assert!(service.get_status(id(4)).unwrap().record().payables.is_zero());

        let booking = service.compute_payables(CallerRole::Ctac, id(4)).unwrap();
        assert_eq!(booking.record().payables, dec!(4));
    }

    #[test]
    fn test_settle_errors() {
        let (service, _) = test_service();

        let err = service
            .settle_booking(CallerRole::Hotel, id(404), dec!(1))
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));

        service
            .create_booking(CallerRole::TravelAgent, "ta1", id(9), dec!(50))
            .unwrap();

        let err = service
            .settle_booking(CallerRole::TravelAgent, id(9), dec!(1))
            .unwrap_err();
        assert!(matches!(err, Error::Unauthorized { .. }));

        let err = service
            .settle_booking(CallerRole::Hotel, id(9), dec!(-1))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));

        service.cancel_booking(CallerRole::TravelAgent, id(9)).unwrap();
        let err = service
            .settle_booking(CallerRole::Hotel, id(9), dec!(1))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidStateTransition { current: BookingStatus::Cancel, .. }
        ));

        let stored = service.get_status(id(9)).unwrap();
        assert!(!stored.record().is_settled);
        assert_eq!(stored.record().total_bill, dec!(50));
    }

    #[test]
    fn test_payables_require_settlement() {
        let (service, _) = test_service();
        service
            .create_booking(CallerRole::TravelAgent, "ta1", id(11), dec!(1000.0))
            .unwrap();

        let err = service.compute_payables(CallerRole::Ctac, id(11)).unwrap_err();
        assert!(matches!(err, Error::SettlementPending { booking_id, .. } if booking_id == id(11)));

        service.settle_booking(CallerRole::Hotel, id(11), dec!(1000.0)).unwrap();
        let booking = service.compute_payables(CallerRole::Ctac, id(11)).unwrap();
        assert_eq!(booking.record().payables, dec!(20.0));
    }

    #[test]
    fn test_payables_idempotent() {
        let (service, ledger) = test_service();
        service
            .create_booking(CallerRole::TravelAgent, "ta1", id(12), dec!(333.33))
            .unwrap();
        service.settle_booking(CallerRole::Hotel, id(12), dec!(333.33)).unwrap();

        let first = service.compute_payables(CallerRole::Ctac, id(12)).unwrap();
        let bytes = ledger.raw("12").unwrap();
        let second = service.compute_payables(CallerRole::Ctac, id(12)).unwrap();

        assert_eq!(first, second);
        assert_eq!(ledger.raw("12").unwrap(), bytes);
        assert_eq!(second.record().payables, dec!(6.6666));
    }

    #[test]
    fn test_payables_custom_rate() {
        let ledger = Arc::new(MemoryStateStore::new());
        let rate = CommissionRate::new(dec!(0.1)).unwrap();
        let service = BookingService::new(BookingStore::new(ledger), rate);

        service
            .create_booking(CallerRole::TravelAgent, "ta1", id(1), dec!(10))
            .unwrap();
        service.settle_booking(CallerRole::Hotel, id(1), dec!(250)).unwrap();
        let booking = service.compute_payables(CallerRole::Ctac, id(1)).unwrap();

        assert_eq!(booking.record().payables, dec!(25));
    }

    #[test]
    fn test_payables_requires_ctac() {
        let (service, _) = test_service();
        let err = service
            .compute_payables(CallerRole::Hotel, id(1))
            .unwrap_err();
        assert!(matches!(err, Error::Unauthorized { .. }));
    }

    #[test]
    fn test_cancel_rules() {
        let (service, _) = test_service();
        for n in 1..=3 {
            service
                .create_booking(CallerRole::TravelAgent, "ta1", id(n), dec!(10))
                .unwrap();
        }

        let booking = service.cancel_booking(CallerRole::TravelAgent, id(1)).unwrap();
        assert_eq!(booking.status(), BookingStatus::Cancel);

        let booking = service.cancel_booking(CallerRole::Hotel, id(2)).unwrap();
        assert_eq!(booking.status(), BookingStatus::Cancel);

        let err = service.cancel_booking(CallerRole::Ctac, id(3)).unwrap_err();
        assert!(matches!(err, Error::Unauthorized { .. }));

        // Terminal states stay put
        let err = service.cancel_booking(CallerRole::Hotel, id(1)).unwrap_err();
        assert!(matches!(err, Error::InvalidStateTransition { .. }));

        service.settle_booking(CallerRole::Hotel, id(3), dec!(10)).unwrap();
        let err = service.cancel_booking(CallerRole::TravelAgent, id(3)).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidStateTransition { current: BookingStatus::Checkout, .. }
        ));
    }

    #[test]
    fn test_ledger_write_failure() {
        struct ReadOnlyLedger(MemoryStateStore);

        impl StateStore for ReadOnlyLedger {
            fn get_state(&self, key: &str) -> booking_ledger::Result<Option<Vec<u8>>> {
                self.0.get_state(key)
            }

            fn put_state(&self, _key: &str, _value: &[u8]) -> booking_ledger::Result<()> {
                Err(booking_ledger::Error::Storage("ledger is read-only".to_string()))
            }
        }

        let service = BookingService::new(
            BookingStore::new(Arc::new(ReadOnlyLedger(MemoryStateStore::new()))),
            CommissionRate::default(),
        );

        let err = service
            .create_booking(CallerRole::TravelAgent, "ta1", id(1), dec!(1))
            .unwrap_err();
        assert!(matches!(err, Error::Persistence { ref key, .. } if key == "1"));
    }

    #[test]
    fn test_missing_booking_is_not_found() {
        let (service, ledger) = test_service();

        let err = service.compute_payables(CallerRole::Ctac, id(404)).unwrap_err();
        assert!(matches!(err, Error::NotFound { booking_id } if booking_id == id(404)));

        let err = service.cancel_booking(CallerRole::TravelAgent, id(404)).unwrap_err();
        assert!(matches!(err, Error::NotFound { booking_id } if booking_id == id(404)));

        let err = service.get_status(id(404)).unwrap_err();
        assert!(matches!(err, Error::NotFound { booking_id } if booking_id == id(404)));

        assert!(ledger.is_empty());
    }

    #[test]
    fn test_corrupt_record_is_left_alone() {
        let (service, ledger) = test_service();
        ledger.insert("13", "\x00garbage");

        let err = service
            .settle_booking(CallerRole::Hotel, id(13), dec!(10))
            .unwrap_err();
        assert!(matches!(err, Error::CorruptRecord { ref key, .. } if key == "13"));

        let err = service.compute_payables(CallerRole::Ctac, id(13)).unwrap_err();
        assert!(matches!(err, Error::CorruptRecord { .. }));

        let err = service.cancel_booking(CallerRole::Hotel, id(13)).unwrap_err();
        assert!(matches!(err, Error::CorruptRecord { .. }));

        assert_eq!(ledger.raw("13"), Some(b"\x00garbage".to_vec()));
    }

    #[test]
    fn test_invariant_checked_before_save() {
        let (service, ledger) = test_service();

        // Decodes fine but carries payables on an unsettled booking
        let mut booking = Booking::new(
            id(14),
            BookingRecord::reservation(TravelAgentId::parse("ta1").unwrap(), dec!(100)),
        );
        booking.record_mut().payables = dec!(2);
        seed(&ledger, &booking);
        let before = ledger.raw("14").unwrap();

        let err = service.cancel_booking(CallerRole::Hotel, id(14)).unwrap_err();
        assert!(matches!(
            err,
            Error::InvariantViolation { operation: Operation::CancelBooking, ref reason, .. }
                if reason.contains("before settlement")
        ));
        assert_eq!(ledger.raw("14").unwrap(), before);

        // Settlement clears the stale commission, so the record heals
        let settled = service.settle_booking(CallerRole::Hotel, id(14), dec!(100)).unwrap();
        assert!(settled.record().payables.is_zero());
        assert!(settled.invariant_violation().is_none());
    }
}
