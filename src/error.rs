//! Error types for queue operations.

use std::fmt;

use thiserror::Error;

/// Result type for queue operations
pub type Result<T> = std::result::Result<T, QueueError>;

/// Which heap allocation an operation was attempting when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Allocation {
    /// The control block of a boxed queue.
    Handle,
    /// Storage for one chain element.
    Element,
    /// The owned copy of an inserted string.
    Value,
}

impl fmt::Display for Allocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Allocation::Handle => "queue handle",
            Allocation::Element => "element",
            Allocation::Value => "value copy",
        })
    }
}

/// Queue errors. A failed operation never leaves the queue partially modified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("allocation failed for {0}")]
    AllocationFailure(Allocation),

    #[error("invalid operation: {0}")]
    InvalidOperation(&'static str),
}
