//! Caller roles and raw invocations

use std::fmt;

/// Role asserted by the external router
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallerRole {
    /// Travel agent (`TA`)
    TravelAgent,
    /// Hotel (`HOTEL`)
    Hotel,
    /// Commission-clearing party (`CTAC`)
    Ctac,
}

impl CallerRole {
    /// Wire token
    pub const fn token(&self) -> &'static str {
        match self {
            CallerRole::TravelAgent => "TA",
            CallerRole::Hotel => "HOTEL",
            CallerRole::Ctac => "CTAC",
        }
    }

    /// Parse a wire token (exact match)
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "TA" => Some(CallerRole::TravelAgent),
            "HOTEL" => Some(CallerRole::Hotel),
            "CTAC" => Some(CallerRole::Ctac),
            _ => None,
        }
    }
}

impl fmt::Display for CallerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// One call handed over by the external router
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Function name, e.g. `initBooking`
    pub function: String,

    /// Caller role token, e.g. `TA`
    pub caller: String,

    /// Text arguments
    pub args: Vec<String>,
}

impl Invocation {
    /// Create invocation
    pub fn new<I, S>(function: impl Into<String>, caller: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            function: function.into(),
            caller: caller.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse `<function> <caller> [args...]`, whitespace separated
    pub fn from_line(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let function = parts.next()?;
        let caller = parts.next()?;
        Some(Self::new(function, caller, parts))
    }
}
