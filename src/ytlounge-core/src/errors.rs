//! Error taxonomy for the onboarding flow.

use thiserror::Error;

/// Classified failures shown to the user as form errors.
///
/// `InvalidAuth` covers everything the user can fix themselves: a pairing
/// code that does not parse, a code the screen refused, a rejected API key.
/// `CannotConnect` covers unreachable upstreams. `Unknown` is the residue,
/// logged in full and shown generically.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FlowError {
    #[error("cannot connect to upstream")]
    CannotConnect,
    #[error("invalid authentication")]
    InvalidAuth,
    #[error("unknown error")]
    Unknown,
}

impl FlowError {
    /// Stable key rendered into the form the user retries from.
    pub fn base_error(&self) -> &'static str {
        match self {
            FlowError::CannotConnect => "cannot_connect",
            FlowError::InvalidAuth => "invalid_auth",
            FlowError::Unknown => "unknown",
        }
    }
}
