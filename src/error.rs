//! Error handling for the encryption engine
//!
//! Every fallible operation returns [`HeError`]. Both kinds abort the call
//! with no partial result. A ciphertext whose noise has outgrown the modulus
//! is not an error: it decrypts to a wrong plaintext, which only
//! [`noise_budget`](crate::Scheme::noise_budget) can reveal.

use thiserror::Error;

/// Errors raised by parameter construction and ciphertext operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeError {
    /// Invalid parameter set, detected at construction time
    #[error("parameter error: {0}")]
    Parameter(String),

    /// Operands built under different parameters, or of an unsupported length
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),
}

/// Result type for encryption operations
pub type Result<T> = std::result::Result<T, HeError>;

/// Create a `HeError::Parameter` with format string support
macro_rules! param_err {
    ($($arg:tt)*) => {
        $crate::error::HeError::Parameter(format!($($arg)*))
    };
}

/// Create a `HeError::ShapeMismatch` with format string support
macro_rules! shape_err {
    ($($arg:tt)*) => {
        $crate::error::HeError::ShapeMismatch(format!($($arg)*))
    };
}

pub(crate) use param_err;
pub(crate) use shape_err;
