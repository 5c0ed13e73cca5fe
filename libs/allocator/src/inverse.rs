//! Inverse sizer: per-segment targets in, minimum capacity out.
//!
//! The forward allocator hands every segment the same capacity-per-weight
//! ratio `r = capacity / total_demand`, truncated per stage. A target vector
//! is therefore only realizable when one ratio `r` truncates to every
//! target at once:
//!
//! ```text
//! v_i <= r * w_i < v_i + 1        for every v_i > 1
//! ```
//!
//! Targets of 0 or 1 never constrain the ratio, since the forward allocator
//! already floors every stage to 1. Exactly proportional vectors and vectors
//! produced by [`forward_allocate`](crate::forward_allocate) always pass.

use serde::Serialize;
use tracing::{debug, instrument};

use crate::forward::stage_limit;
use crate::rounding::{snap_ceil, snap_floor};
use crate::segments::SegmentPartition;
use crate::{AllocError, AllocResult};

/// Relative slack applied to the ratio bounds when checking that targets
/// are proportional to segment weights. Admits ratios that disagree by less
/// than one part per million.
pub const PROPORTIONALITY_TOLERANCE: f64 = 1e-6;

/// Result of inverse sizing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InverseSizing {
    /// Smallest capacity meeting every target at once.
    pub min_capacity: u64,

    /// Smallest capacity meeting each target on its own, per segment.
    pub required_per_segment: Vec<u64>,

    /// The partition the targets were sized against.
    pub segments: SegmentPartition,
}

/// Size capacity for `targets` with the default tolerance.
pub fn inverse_size(targets: &[u64], partition: &SegmentPartition) -> AllocResult<InverseSizing> {
    inverse_size_with_tolerance(targets, partition, PROPORTIONALITY_TOLERANCE)
}

/// Size capacity for `targets`, one per-stage value per segment.
///
/// Fails with [`AllocError::InvalidConfig`] for a negative or non-finite
/// tolerance, then [`AllocError::ShapeMismatch`],
/// [`AllocError::NonMonotonicTarget`] or [`AllocError::NonProportionalTarget`],
/// checked in that order. [`AllocError::CapacityOverflow`] if a target needs
/// more than `u64::MAX`.
#[instrument(skip(partition), fields(segments = partition.len()))]
pub fn inverse_size_with_tolerance(
    targets: &[u64],
    partition: &SegmentPartition,
    tolerance: f64,
) -> AllocResult<InverseSizing> {
    validate_tolerance(tolerance)?;

    if targets.len() != partition.len() {
        return Err(AllocError::ShapeMismatch {
            expected: partition.len(),
            actual: targets.len(),
        });
    }

    if let Some(index) = (1..targets.len()).find(|&i| targets[i] > targets[i - 1]) {
        return Err(AllocError::NonMonotonicTarget {
            index,
            previous: targets[index - 1],
            value: targets[index],
        });
    }

    let total_demand = partition.total_demand();
    check_proportional(targets, partition, total_demand, tolerance)?;

    let required_per_segment = targets
        .iter()
        .zip(partition)
        .map(|(&target, segment)| {
            required_capacity(target, segment.arrival_weight, total_demand)
        })
        .collect::<AllocResult<Vec<u64>>>()?;

    let min_capacity = required_per_segment.iter().copied().max().unwrap_or(1);
    debug!(min_capacity, ?required_per_segment, "sized capacity");

    Ok(InverseSizing {
        min_capacity,
        required_per_segment,
        segments: partition.clone(),
    })
}

/// Reject a tolerance that is negative, NaN or infinite.
pub(crate) fn validate_tolerance(tolerance: f64) -> AllocResult<()> {
    if !tolerance.is_finite() || tolerance < 0.0 {
        return Err(AllocError::InvalidConfig(format!(
            "proportionality_tolerance must be finite and >= 0, got {tolerance}"
        )));
    }
    Ok(())
}

fn check_proportional(
    targets: &[u64],
    partition: &SegmentPartition,
    total_demand: f64,
    tolerance: f64,
) -> AllocResult<()> {
    let mut lower = 0.0f64;
    let mut upper = f64::INFINITY;
    let mut feasible = true;

    for (&target, segment) in targets.iter().zip(partition) {
        if target <= 1 {
            continue;
        }
        if segment.arrival_weight <= 0.0 || total_demand <= 0.0 {
            feasible = false;
            continue;
        }
        let weight = segment.arrival_weight;
        lower = lower.max(target as f64 / weight);
        upper = upper.min((target as f64 + 1.0) / weight);
    }

    if feasible && lower < upper * (1.0 + tolerance) {
        return Ok(());
    }

    // Expected shape: what the forward allocator gives at the largest ratio
    // any target asks for.
    let expected = partition
        .iter()
        .map(|segment| {
            if total_demand <= 0.0 {
                0
            } else {
                snap_floor((lower * segment.arrival_weight).max(1.0))
            }
        })
        .collect();

    Err(AllocError::NonProportionalTarget {
        targets: targets.to_vec(),
        expected,
    })
}

/// Smallest capacity at which a segment of weight `arrival_weight` receives
/// at least `target` per stage.
fn required_capacity(target: u64, arrival_weight: f64, total_demand: f64) -> AllocResult<u64> {
    if target <= 1 {
        return Ok(1);
    }

    let estimate = target as f64 * total_demand / arrival_weight;
    if estimate >= u64::MAX as f64 {
        return Err(AllocError::CapacityOverflow);
    }
    let mut capacity = snap_ceil(estimate).max(1);

    // Settle against the forward rounding so the bound is exact.
    while capacity > 1 && stage_limit(capacity - 1, arrival_weight, total_demand) >= target {
        capacity -= 1;
    }
    while stage_limit(capacity, arrival_weight, total_demand) < target {
        capacity = capacity
            .checked_add(1)
            .ok_or(AllocError::CapacityOverflow)?;
    }
    Ok(capacity)
}
