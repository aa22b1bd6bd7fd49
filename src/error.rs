//! Error taxonomy shared by the fixed-layout decryptors and the readers.

use std::fmt;

use thiserror::Error;

/// Length contract a buffer was checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    Exactly(usize),
    AtLeast(usize),
    MultipleOf(usize),
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Exactly(n) => write!(f, "{:#x}", n),
            Expected::AtLeast(n) => write!(f, "at least {:#x}", n),
            Expected::MultipleOf(n) => write!(f, "a non-zero multiple of {:#x}", n),
        }
    }
}

#[derive(Debug, Error)]
pub enum CryptoError {
    /// A key, IV or fixed-size buffer had the wrong length. Raised before any
    /// cipher primitive runs.
    #[error("'{name}' must be {expected} bytes long, got {actual:#x}")]
    SizeMismatch {
        name: String,
        expected: Expected,
        actual: usize,
    },

    /// The requested window does not fit inside the region.
    #[error("read of {size:#x} bytes at offset {offset:#x} exceeds region of {length:#x} bytes")]
    OutOfRange { offset: u64, size: u64, length: u64 },

    /// The underlying byte source failed. Passed through as-is.
    #[error("byte source failed: {0}")]
    SourceFailure(#[from] std::io::Error),

    /// The cipher crate refused the operation.
    #[error("cipher primitive failed: {0}")]
    PrimitiveFailure(String),
}

impl CryptoError {
    pub(crate) fn size_mismatch(name: impl Into<String>, expected: Expected, actual: usize) -> Self {
        CryptoError::SizeMismatch {
            name: name.into(),
            expected,
            actual,
        }
    }
}

pub type Result<T> = std::result::Result<T, CryptoError>;
