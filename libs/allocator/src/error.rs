//! Allocation errors.
//!
//! Every variant is an input-contract violation raised before any numeric
//! work proceeds past validation. None of them leaves partial results.

use booking_workload::{TypeId, WorkloadError};
use thiserror::Error;

/// Result type for allocation operations.
pub type AllocResult<T> = Result<T, AllocError>;

/// Errors that can occur while allocating or sizing capacity.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AllocError {
    /// The workload itself is invalid.
    #[error(transparent)]
    Workload(#[from] WorkloadError),

    /// No work classes were supplied.
    #[error("cannot build segments from an empty work class list")]
    EmptyWorkload,

    /// A work class has no entry in a per-type requirement mapping.
    #[error("missing per-stage limit for type {type_id}")]
    MissingMapping { type_id: TypeId },

    /// The target vector does not have one value per segment.
    #[error("target vector has {actual} values but the partition has {expected} segments")]
    ShapeMismatch { expected: usize, actual: usize },

    /// A target is larger than the one before it.
    #[error(
        "targets must be non-increasing: segment {index} has {value}, \
         segment {} has {previous}",
        .index - 1
    )]
    NonMonotonicTarget {
        index: usize,
        previous: u64,
        value: u64,
    },

    /// No single capacity realizes every target at once.
    #[error(
        "targets {targets:?} are not proportional to segment arrival weights; \
         expected {expected:?}"
    )]
    NonProportionalTarget {
        targets: Vec<u64>,
        expected: Vec<u64>,
    },

    /// A capacity sweep range is empty or has a zero step.
    #[error("invalid capacity range {start}..{end} step {step}")]
    InvalidRange { start: u64, end: u64, step: u64 },

    /// A required capacity does not fit in `u64`.
    #[error("required capacity exceeds {max}", max = u64::MAX)]
    CapacityOverflow,

    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl AllocError {
    /// Returns true if the error comes from target-vector validation.
    pub fn is_target_error(&self) -> bool {
        matches!(
            self,
            AllocError::ShapeMismatch { .. }
                | AllocError::NonMonotonicTarget { .. }
                | AllocError::NonProportionalTarget { .. }
        )
    }
}
