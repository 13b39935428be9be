//! Arena-specific error types.

use std::error::Error;
use std::fmt;

/// Errors that can occur during arena construction or allocation.
///
/// All variants are terminal: the arena never retries internally and there
/// is no backing store to fall through to. Every error path leaves the
/// buffer bit-identical to its state before the failing call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// The requested total capacity cannot hold even a sentinel pair plus
    /// one minimum-sized element. Raised at construction, never deferred
    /// to first use.
    InsufficientCapacity {
        /// Capacity that was requested, in bytes.
        capacity: usize,
        /// Smallest capacity the configuration would accept, in bytes.
        minimum: usize,
    },
    /// No free block has sufficient magnitude for the request.
    OutOfMemory {
        /// Number of payload bytes requested.
        requested: usize,
        /// Total capacity of the arena, in bytes.
        capacity: usize,
    },
    /// The requested size was zero (or overflowed when converted to bytes).
    InvalidSize {
        /// The rejected request, in bytes.
        requested: usize,
    },
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientCapacity { capacity, minimum } => {
                write!(
                    f,
                    "insufficient capacity: {capacity} bytes, minimum is {minimum} bytes"
                )
            }
            Self::OutOfMemory {
                requested,
                capacity,
            } => {
                write!(
                    f,
                    "out of memory: requested {requested} bytes from a {capacity} byte arena"
                )
            }
            Self::InvalidSize { requested } => {
                write!(f, "invalid allocation size: {requested} bytes")
            }
        }
    }
}

impl Error for ArenaError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_diagnostic_numbers() {
        let err = ArenaError::OutOfMemory {
            requested: 200,
            capacity: 100,
        };
        let msg = err.to_string();
        assert!(msg.contains("200"));
        assert!(msg.contains("100"));
    }

    #[test]
    fn errors_are_comparable() {
        let a = ArenaError::InvalidSize { requested: 0 };
        let b = ArenaError::InvalidSize { requested: 0 };
        assert_eq!(a, b);
    }
}
