//! Typed deployment error enums.
//!
//! Structural graph errors live in [`crate::domain::graph`] and secret
//! errors in [`crate::domain::unit`]; this module covers the per-unit
//! deployment state machine and the ledger boundary.

use thiserror::Error;

/// Opaque failure reported by the external ledger collaborator.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct LedgerError(pub String);

/// Errors from the per-unit arm/deploy/make-agent state machine.
#[derive(Debug, Error)]
pub enum DeployError {
    /// Arming found one or more unmet preconditions. Recoverable: the
    /// caller may correct input and re-arm.
    #[error("unit '{unit}' failed to arm: {}", disqualifications.join(", "))]
    ArmDisqualified {
        unit: String,
        disqualifications: Vec<String>,
    },

    /// The external ledger call failed. Terminal for this unit; the
    /// remaining deployment plan is aborted, prior results preserved.
    #[error("deploy transaction failed for unit '{unit}': {source}")]
    Transaction {
        unit: String,
        #[source]
        source: LedgerError,
    },

    /// An operation was invoked from the wrong state. Always a usage
    /// error, never recoverable.
    #[error("invalid state for unit '{unit}': {operation} requires {required}")]
    InvalidState {
        unit: String,
        operation: &'static str,
        required: &'static str,
    },
}

impl DeployError {
    /// Name of the unit the error belongs to.
    #[must_use]
    pub fn unit(&self) -> &str {
        match self {
            DeployError::ArmDisqualified { unit, .. }
            | DeployError::Transaction { unit, .. }
            | DeployError::InvalidState { unit, .. } => unit,
        }
    }
}
