//! Closed set of invocable operations
//!
//! Each operation declares its roles and argument count here; the router
//! dispatches on the enum, never on raw strings past [`Operation::from_name`].

use crate::types::CallerRole;
use std::fmt;

/// Invocable operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Create a reservation
    InitBooking,
    /// Hotel finalises the bill
    UpdateSettled,
    /// CTAC computes the agent commission
    UpdatePayables,
    /// Cancel a booking that has not concluded
    CancelBooking,
    /// Read a booking
    GetStatus,
    /// Liveness check
    Ping,
}

impl Operation {
    /// All operations, in registration order
    pub const ALL: [Operation; 6] = [
        Operation::InitBooking,
        Operation::UpdateSettled,
        Operation::UpdatePayables,
        Operation::CancelBooking,
        Operation::GetStatus,
        Operation::Ping,
    ];

    /// Function name on the wire
    pub const fn name(&self) -> &'static str {
        match self {
            Operation::InitBooking => "initBooking",
            Operation::UpdateSettled => "updateSettled",
            Operation::UpdatePayables => "updatePayables",
            Operation::CancelBooking => "cancelBooking",
            Operation::GetStatus => "getStatus",
            Operation::Ping => "ping",
        }
    }

    /// Resolve a function name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }

    /// Roles allowed to invoke; empty means any caller
    pub const fn required_roles(&self) -> &'static [CallerRole] {
        match self {
            Operation::InitBooking => &[CallerRole::TravelAgent],
            Operation::UpdateSettled => &[CallerRole::Hotel],
            Operation::UpdatePayables => &[CallerRole::Ctac],
            Operation::CancelBooking => &[CallerRole::TravelAgent, CallerRole::Hotel],
            Operation::GetStatus | Operation::Ping => &[],
        }
    }

    /// Check if `role` may invoke
    pub fn permits(&self, role: CallerRole) -> bool {
        let roles = self.required_roles();
        roles.is_empty() || roles.contains(&role)
    }

    /// Human-readable role requirement, e.g. `TA or HOTEL`
    pub fn roles_label(&self) -> String {
        let roles = self.required_roles();
        if roles.is_empty() {
            return "any role".to_string();
        }
        roles
            .iter()
            .map(CallerRole::token)
            .collect::<Vec<_>>()
            .join(" or ")
    }

    /// Number of text arguments expected
    pub const fn arity(&self) -> usize {
        match self {
            Operation::InitBooking => 3,
            Operation::UpdateSettled => 2,
            Operation::UpdatePayables | Operation::CancelBooking | Operation::GetStatus => 1,
            Operation::Ping => 0,
        }
    }

    /// Read-only operation (no ledger write)
    pub const fn is_query(&self) -> bool {
        matches!(self, Operation::GetStatus | Operation::Ping)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
