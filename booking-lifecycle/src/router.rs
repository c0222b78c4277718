//! Invocation router
//!
//! Maps a raw [`Invocation`] onto the handler registered for its
//! [`Operation`]. The role gate and the argument count are read from the
//! operation itself, so adding an operation means adding one enum variant
//! and one handler.

use crate::{
    metrics::Metrics,
    operation::Operation,
    service::BookingService,
    types::{CallerRole, Invocation},
    Error, Result,
};
use booking_ledger::{Booking, BookingId};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Instant;

/// Reply to `ping`
pub const PING_REPLY: &[u8] = b"Hello, I am Alive!";

/// Arguments of one invocation after the role gate
#[derive(Debug)]
pub struct Request<'a> {
    /// Operation being served
    pub operation: Operation,

    /// Parsed caller role, `None` if the token is not a known role
    pub role: Option<CallerRole>,

    /// Raw caller token
    pub caller: &'a str,

    /// Text arguments, count already checked
    pub args: &'a [String],
}

impl Request<'_> {
    /// Caller role, required for role-gated operations
    pub fn role(&self) -> Result<CallerRole> {
        self.role.ok_or_else(|| Error::Unauthorized {
            operation: self.operation,
            required: self.operation.roles_label(),
            caller: self.caller.to_string(),
        })
    }

    /// Parse argument `index` as a booking id
    pub fn booking_id(&self, index: usize) -> Result<BookingId> {
        let raw = &self.args[index];
        BookingId::from_str(raw).map_err(|reason| Error::InvalidArgument {
            operation: self.operation,
            reason: format!("bookingId: {}", reason),
        })
    }

    /// Parse argument `index` as a decimal amount
    pub fn amount(&self, index: usize, field: &str) -> Result<Decimal> {
        let raw = &self.args[index];
        Decimal::from_str(raw).map_err(|e| Error::InvalidArgument {
            operation: self.operation,
            reason: format!("{} '{}' is not a decimal amount: {}", field, raw, e),
        })
    }
}

/// Handler for one operation
pub trait Handler: Send + Sync {
    /// Operation served
    fn operation(&self) -> Operation;

    /// Run the operation, returning the response payload
    fn handle(&self, service: &BookingService, request: &Request<'_>) -> Result<Vec<u8>>;
}

struct InitBooking;

impl Handler for InitBooking {
    fn operation(&self) -> Operation {
        Operation::InitBooking
    }

    fn handle(&self, service: &BookingService, request: &Request<'_>) -> Result<Vec<u8>> {
        let booking_id = request.booking_id(1)?;
        let total_bill = request.amount(2, "totalBill")?;
        service.create_booking(request.role()?, &request.args[0], booking_id, total_bill)?;
        Ok(Vec::new())
    }
}

struct UpdateSettled;

impl Handler for UpdateSettled {
    fn operation(&self) -> Operation {
        Operation::UpdateSettled
    }

    fn handle(&self, service: &BookingService, request: &Request<'_>) -> Result<Vec<u8>> {
        let booking_id = request.booking_id(0)?;
        let final_bill = request.amount(1, "finalBill")?;
        service.settle_booking(request.role()?, booking_id, final_bill)?;
        Ok(Vec::new())
    }
}

struct UpdatePayables;

impl Handler for UpdatePayables {
    fn operation(&self) -> Operation {
        Operation::UpdatePayables
    }

    fn handle(&self, service: &BookingService, request: &Request<'_>) -> Result<Vec<u8>> {
        service.compute_payables(request.role()?, request.booking_id(0)?)?;
        Ok(Vec::new())
    }
}

struct CancelBooking;

impl Handler for CancelBooking {
    fn operation(&self) -> Operation {
        Operation::CancelBooking
    }

    fn handle(&self, service: &BookingService, request: &Request<'_>) -> Result<Vec<u8>> {
        service.cancel_booking(request.role()?, request.booking_id(0)?)?;
        Ok(Vec::new())
    }
}

struct GetStatus;

impl Handler for GetStatus {
    fn operation(&self) -> Operation {
        Operation::GetStatus
    }

    fn handle(&self, service: &BookingService, request: &Request<'_>) -> Result<Vec<u8>> {
        let booking = service.get_status(request.booking_id(0)?)?;
        encode_booking(&booking)
    }
}

struct Ping;

impl Handler for Ping {
    fn operation(&self) -> Operation {
        Operation::Ping
    }

    fn handle(&self, _service: &BookingService, _request: &Request<'_>) -> Result<Vec<u8>> {
        Ok(PING_REPLY.to_vec())
    }
}

/// JSON reply for a booking, same layout as the ledger record
pub fn encode_booking(booking: &Booking) -> Result<Vec<u8>> {
    serde_json::to_vec(booking).map_err(|e| Error::Encoding {
        key: booking.id().ledger_key(),
        reason: e.to_string(),
    })
}

/// Dispatch table from operation to handler
pub struct Router {
    service: BookingService,
    handlers: HashMap<Operation, Box<dyn Handler>>,
    metrics: Metrics,
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("service", &self.service)
            .field("operations", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Router {
    /// Create router with every operation registered
    pub fn new(service: BookingService, metrics: Metrics) -> Self {
        let mut router = Self {
            service,
            handlers: HashMap::new(),
            metrics,
        };

        router.register(Box::new(InitBooking));
        router.register(Box::new(UpdateSettled));
        router.register(Box::new(UpdatePayables));
        router.register(Box::new(CancelBooking));
        router.register(Box::new(GetStatus));
        router.register(Box::new(Ping));

        router
    }

    fn register(&mut self, handler: Box<dyn Handler>) {
        self.handlers.insert(handler.operation(), handler);
    }

    /// Metrics collector
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Lifecycle service behind the router
    pub fn service(&self) -> &BookingService {
        &self.service
    }

    /// Route one invocation
    pub fn invoke(&self, invocation: &Invocation) -> Result<Vec<u8>> {
        let start = Instant::now();

        let Some(operation) = Operation::from_name(&invocation.function) else {
            tracing::warn!(function = %invocation.function, "Unknown function");
            self.metrics
                .record("unknown", "unknown_function", start.elapsed());
            return Err(Error::UnknownFunction(invocation.function.clone()));
        };

        let result = self.dispatch(operation, invocation);

        let outcome = match &result {
            Ok(_) => "ok",
            Err(e) => e.kind(),
        };
        self.metrics.record(operation.name(), outcome, start.elapsed());

        match &result {
            Ok(_) => tracing::debug!(operation = %operation, caller = %invocation.caller, "Invocation complete"),
            Err(e) => tracing::info!(operation = %operation, caller = %invocation.caller, error = %e, "Invocation failed"),
        }

        result
    }

    fn dispatch(&self, operation: Operation, invocation: &Invocation) -> Result<Vec<u8>> {
        let role = CallerRole::from_token(&invocation.caller);

        // Queries are open to any caller token
        if !operation.is_query() && !role.is_some_and(|r| operation.permits(r)) {
            return Err(Error::Unauthorized {
                operation,
                required: operation.roles_label(),
                caller: invocation.caller.clone(),
            });
        }

        if invocation.args.len() != operation.arity() {
            return Err(Error::InvalidArgument {
                operation,
                reason: format!(
                    "Incorrect number of arguments: expected {}, got {}",
                    operation.arity(),
                    invocation.args.len()
                ),
            });
        }

        let handler = self
            .handlers
            .get(&operation)
            .ok_or_else(|| Error::UnknownFunction(operation.name().to_string()))?;

        let request = Request {
            operation,
            role,
            caller: &invocation.caller,
            args: &invocation.args,
        };

        handler.handle(&self.service, &request)
    }
}
