//! Error types for workload parsing and validation.

use thiserror::Error;

use crate::TypeId;

/// Errors that can occur when building or validating a workload.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum WorkloadError {
    /// The workload has no classes.
    #[error("workload must contain at least one work class")]
    Empty,

    /// A class identifier failed validation.
    #[error("invalid type id '{value}': {reason}")]
    InvalidTypeId { value: String, reason: &'static str },

    /// Two classes share the same identifier.
    #[error("duplicate work class type: {0}")]
    DuplicateType(TypeId),

    /// A class disagrees with the first class on prefill depth.
    #[error("work class {type_id} has prefill depth {actual}, expected {expected}")]
    InconsistentPrefill {
        type_id: TypeId,
        expected: u32,
        actual: u32,
    },

    /// Arrival rate is negative, NaN or infinite.
    #[error("work class {type_id} has invalid arrival rate {value}")]
    InvalidArrivalRate { type_id: TypeId, value: f64 },
}

impl WorkloadError {
    /// Returns true if this error indicates the workload was empty.
    pub fn is_empty(&self) -> bool {
        matches!(self, WorkloadError::Empty)
    }

    /// Returns true if the classes disagree on pipeline shape.
    pub fn is_shape_error(&self) -> bool {
        matches!(
            self,
            WorkloadError::InconsistentPrefill { .. } | WorkloadError::DuplicateType(_)
        )
    }
}
