//! Work classes and validated workloads.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{TypeId, WorkloadError};

/// One request category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkClass {
    /// Unique class identifier.
    #[serde(rename = "type")]
    pub type_id: TypeId,

    /// Entry stages shared by every class.
    #[serde(rename = "prefill", default)]
    pub prefill_stage_count: u32,

    /// Additional stages this class runs after the shared entry phase.
    #[serde(rename = "decode")]
    pub decode_stage_count: u32,

    /// Relative arrival frequency.
    pub arrival_rate: f64,
}

impl WorkClass {
    /// Create a new work class.
    pub fn new(type_id: TypeId, prefill: u32, decode: u32, arrival_rate: f64) -> Self {
        Self {
            type_id,
            prefill_stage_count: prefill,
            decode_stage_count: decode,
            arrival_rate,
        }
    }

    /// Stages a single request of this class books under type-weighted
    /// sizing: one entry stage plus every decode stage.
    pub fn stage_span(&self) -> u64 {
        u64::from(self.decode_stage_count) + 1
    }

    /// Check the arrival rate is finite and non-negative.
    pub fn validate(&self) -> Result<(), WorkloadError> {
        if !self.arrival_rate.is_finite() || self.arrival_rate < 0.0 {
            return Err(WorkloadError::InvalidArrivalRate {
                type_id: self.type_id.clone(),
                value: self.arrival_rate,
            });
        }
        Ok(())
    }
}

/// A validated, immutable list of work classes.
///
/// # Invariants
///
/// - At least one class
/// - Class identifiers are unique
/// - Every class has the same prefill depth
/// - Every arrival rate is finite and non-negative
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawWorkload", into = "RawWorkload")]
pub struct Workload {
    classes: Vec<WorkClass>,
}

#[derive(Serialize, Deserialize)]
struct RawWorkload {
    classes: Vec<WorkClass>,
}

impl TryFrom<RawWorkload> for Workload {
    type Error = WorkloadError;

    fn try_from(raw: RawWorkload) -> Result<Self, Self::Error> {
        Self::new(raw.classes)
    }
}

impl From<Workload> for RawWorkload {
    fn from(workload: Workload) -> Self {
        Self {
            classes: workload.classes,
        }
    }
}

impl Workload {
    /// Validate and wrap a list of classes.
    pub fn new(classes: Vec<WorkClass>) -> Result<Self, WorkloadError> {
        let Some(first) = classes.first() else {
            return Err(WorkloadError::Empty);
        };
        let prefill = first.prefill_stage_count;

        let mut seen = BTreeSet::new();
        for class in &classes {
            class.validate()?;

            if !seen.insert(&class.type_id) {
                return Err(WorkloadError::DuplicateType(class.type_id.clone()));
            }

            if class.prefill_stage_count != prefill {
                return Err(WorkloadError::InconsistentPrefill {
                    type_id: class.type_id.clone(),
                    expected: prefill,
                    actual: class.prefill_stage_count,
                });
            }
        }

        Ok(Self { classes })
    }

    /// All classes, in input order.
    pub fn classes(&self) -> &[WorkClass] {
        &self.classes
    }

    /// Look up a class by identifier.
    pub fn get(&self, type_id: &TypeId) -> Option<&WorkClass> {
        self.classes.iter().find(|c| &c.type_id == type_id)
    }

    /// Number of classes.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// The prefill depth shared by every class.
    pub fn prefill_stage_count(&self) -> u32 {
        self.classes[0].prefill_stage_count
    }

    /// Deepest decode depth across classes.
    pub fn max_decode_stage_count(&self) -> u32 {
        self.classes
            .iter()
            .map(|c| c.decode_stage_count)
            .max()
            .unwrap_or(0)
    }

    /// Pipeline length: prefill plus the deepest decode depth.
    pub fn total_stage_count(&self) -> u64 {
        u64::from(self.prefill_stage_count()) + u64::from(self.max_decode_stage_count())
    }

    /// Sum of arrival rates over all classes.
    pub fn total_arrival_rate(&self) -> f64 {
        self.classes.iter().map(|c| c.arrival_rate).sum()
    }
}
