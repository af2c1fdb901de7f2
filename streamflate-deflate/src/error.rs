//! Error type for the streaming encoder.
//!
//! The encoder never touches a reader or writer directly — it only ever
//! sees caller-owned byte slices — so there is no `Io` variant here. Every
//! error the driver can raise reduces to one of three conditions: an
//! internal invariant broke, the caller handed it a budget it could not
//! honor, or a stage ran before the buffer it depends on was populated.

use thiserror::Error;

/// Errors raised while driving the encoder state machine.
#[derive(Debug, Error)]
pub enum EncoderError {
    /// An internal invariant was violated — a bug in the encoder itself
    /// rather than a caller misuse.
    #[error("invariant violated: {detail}")]
    InvariantViolation {
        /// What invariant was found broken.
        detail: String,
    },

    /// The caller supplied an output budget smaller than what the current
    /// step needs to make progress.
    #[error("budget underflow: requested {requested} bytes, only {available} available")]
    BudgetUnderflow {
        /// Bytes the current step needed.
        requested: usize,
        /// Bytes the caller actually made available.
        available: usize,
    },

    /// A stage ran before its required scratch buffer was populated.
    #[error("required buffer missing for state {state}")]
    BufferMissing {
        /// Name of the driver state that expected the buffer.
        state: &'static str,
    },
}

/// Result type alias for encoder operations.
pub type Result<T> = std::result::Result<T, EncoderError>;

impl EncoderError {
    /// Create an invariant-violation error.
    pub fn invariant(detail: impl Into<String>) -> Self {
        Self::InvariantViolation {
            detail: detail.into(),
        }
    }

    /// Create a budget-underflow error.
    pub fn budget_underflow(requested: usize, available: usize) -> Self {
        Self::BudgetUnderflow {
            requested,
            available,
        }
    }

    /// Create a buffer-missing error.
    pub fn buffer_missing(state: &'static str) -> Self {
        Self::BufferMissing { state }
    }
}
