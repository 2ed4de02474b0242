pub mod money;

pub use money::Money;

/// Engine-wide error taxonomy. Every rejection names the invariant that
/// blocked the operation so callers can render an actionable message.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Malformed input, rejected before any mutation.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A status-machine guard refused the transition. State unchanged.
    #[error("Illegal transition from {from} to {to}: {reason}")]
    IllegalTransition {
        from: String,
        to: String,
        reason: String,
    },

    /// Payment would exceed the order's remaining balance. Never clamped.
    #[error("Payment of {attempted} exceeds remaining balance of {remaining}")]
    Overpayment { attempted: Money, remaining: Money },

    /// A customer/material/finishing/order id did not resolve.
    #[error("Unresolved reference: {0}")]
    UnresolvedReference(String),

    /// Persistence collaborator failure, wrapped at the manager boundary.
    #[error("Store error: {0}")]
    Store(String),
}

impl EngineError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn illegal_transition(
        from: impl ToString,
        to: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Self::IllegalTransition {
            from: from.to_string(),
            to: to.to_string(),
            reason: reason.into(),
        }
    }

    pub fn unresolved(msg: impl Into<String>) -> Self {
        Self::UnresolvedReference(msg.into())
    }

    pub fn store(err: impl std::fmt::Display) -> Self {
        Self::Store(err.to_string())
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
