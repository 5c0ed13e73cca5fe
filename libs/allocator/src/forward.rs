//! Forward allocator: capacity in, per-stage limits out.
//!
//! Each segment receives capacity in proportion to the demand it carries
//! (`stage_count * arrival_weight`), spread evenly over its stages:
//!
//! ```text
//! per_stage = floor(max(capacity * arrival_weight / total_demand, 1))
//! ```
//!
//! Conventions:
//! - `total_demand == 0` (every arrival rate zero): every stage gets 0.
//! - Otherwise every stage gets at least 1, including at capacity 0.
//! - Zero-stage segments contribute no stage entries but still report the
//!   formula limit, so per-segment limits never increase.

use serde::Serialize;
use tracing::{debug, instrument};

use crate::rounding::snap_floor;
use crate::segments::{Segment, SegmentPartition};

/// Per-segment view of an allocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentAllocation {
    /// The segment this row describes.
    pub segment: Segment,

    /// Capacity share before truncation.
    pub share: f64,

    /// Limit applied to every stage of the segment.
    pub per_stage_limit: u64,
}

/// Dense per-stage limits, keys `0..total_stages`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationTable {
    capacity: u64,
    limits: Vec<u64>,
    segments: Vec<SegmentAllocation>,
}

impl AllocationTable {
    /// Capacity this table was computed for.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Limit for `stage`, if the stage exists.
    pub fn get(&self, stage: usize) -> Option<u64> {
        self.limits.get(stage).copied()
    }

    /// Number of stages.
    pub fn len(&self) -> usize {
        self.limits.len()
    }

    /// True when the pipeline has no stages.
    pub fn is_empty(&self) -> bool {
        self.limits.is_empty()
    }

    /// Iterate `(stage, limit)` pairs in stage order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, u64)> + '_ {
        self.limits.iter().copied().enumerate()
    }

    /// Limits as a slice indexed by stage.
    pub fn as_slice(&self) -> &[u64] {
        &self.limits
    }

    /// Per-segment rows.
    pub fn segments(&self) -> &[SegmentAllocation] {
        &self.segments
    }

    /// One per-stage limit per segment, in segment order.
    ///
    /// This is the shape the inverse sizer accepts as targets.
    pub fn per_segment_limits(&self) -> Vec<u64> {
        self.segments.iter().map(|s| s.per_stage_limit).collect()
    }

    /// Sum of limits over all stages, saturating at `u64::MAX`.
    pub fn total_booked(&self) -> u64 {
        self.limits
            .iter()
            .fold(0u64, |total, &limit| total.saturating_add(limit))
    }
}

/// Per-stage limit a segment of weight `arrival_weight` receives at
/// `capacity`, ignoring its stage count.
pub(crate) fn stage_limit(capacity: u64, arrival_weight: f64, total_demand: f64) -> u64 {
    if total_demand <= 0.0 {
        return 0;
    }
    snap_floor((capacity as f64 * arrival_weight / total_demand).max(1.0))
}

/// Distribute `capacity` over the stages of `partition`.
#[instrument(skip(partition), fields(segments = partition.len()))]
pub fn forward_allocate(capacity: u64, partition: &SegmentPartition) -> AllocationTable {
    let total_demand = partition.total_demand();
    debug!(total_demand, "computed total demand");

    let mut limits = Vec::with_capacity(partition.total_stages() as usize);
    let mut segments = Vec::with_capacity(partition.len());

    for segment in partition {
        let share = if total_demand > 0.0 {
            capacity as f64 * (segment.demand() / total_demand)
        } else {
            0.0
        };
        let per_stage_limit = stage_limit(capacity, segment.arrival_weight, total_demand);

        let first_stage = limits.len();
        limits.extend(std::iter::repeat_n(per_stage_limit, segment.stage_count as usize));

        debug!(
            index = segment.index,
            stages = ?(first_stage..limits.len()),
            arrival_weight = segment.arrival_weight,
            share,
            per_stage_limit,
            "allocated segment"
        );

        segments.push(SegmentAllocation {
            segment: segment.clone(),
            share,
            per_stage_limit,
        });
    }

    AllocationTable {
        capacity,
        limits,
        segments,
    }
}

#[cfg(test)]
mod tests {
    use booking_workload::{TypeId, WorkClass, Workload};

    use super::*;
    use crate::segments::build_segments;

    fn partition(classes: &[(u32, u32, f64)]) -> SegmentPartition {
        let classes = classes
            .iter()
            .enumerate()
            .map(|(i, &(prefill, decode, rate))| {
                WorkClass::new(
                    TypeId::parse(&format!("type{}", i + 1)).unwrap(),
                    prefill,
                    decode,
                    rate,
                )
            })
            .collect();
        build_segments(&Workload::new(classes).unwrap())
    }

    fn three_class() -> SegmentPartition {
        partition(&[(10, 10, 30.0), (10, 20, 20.0), (10, 30, 10.0)])
    }

    #[test]
    fn test_three_class_allocation() {
        let table = forward_allocate(1000, &three_class());

        // 1000 * {60, 30, 10} / 1600
        assert_eq!(table.per_segment_limits(), vec![37, 18, 6]);
        assert_eq!(table.len(), 40);
        assert_eq!(table.get(0), Some(37));
        assert_eq!(table.get(19), Some(37));
        assert_eq!(table.get(20), Some(18));
        assert_eq!(table.get(39), Some(6));
        assert_eq!(table.get(40), None);
    }

    #[test]
    fn test_shares_sum_to_capacity() {
        let table = forward_allocate(1000, &three_class());
        let total: f64 = table.segments().iter().map(|s| s.share).sum();
        assert!((total - 1000.0).abs() < 1e-9);
        assert_eq!(table.segments()[0].share, 750.0);
    }

    #[test]
    fn test_booked_total_stays_near_capacity() {
        let partition = three_class();
        let table = forward_allocate(1000, &partition);
        assert_eq!(table.total_booked(), 980);
        // Truncation loses less than one unit per stage.
        assert!(1000 - table.total_booked() < partition.total_stages());
    }

    #[test]
    fn test_zero_capacity_floors_to_one() {
        let table = forward_allocate(0, &three_class());
        assert!(table.iter().all(|(_, limit)| limit == 1));
    }

    #[test]
    fn test_zero_weight_gives_all_zero() {
        let table = forward_allocate(1000, &partition(&[(2, 3, 0.0), (2, 5, 0.0)]));
        assert_eq!(table.len(), 7);
        assert!(table.iter().all(|(_, limit)| limit == 0));
        assert_eq!(table.total_booked(), 0);
    }

    #[test]
    fn test_zero_weight_tail_still_floors_to_one() {
        let table = forward_allocate(100, &partition(&[(2, 3, 5.0), (2, 5, 0.0)]));
        assert_eq!(table.per_segment_limits(), vec![20, 1]);
    }

    #[test]
    fn test_zero_stage_segment_has_no_entries() {
        // Weights 2 and 1, total demand 0 * 2 + 4 * 1.
        let table = forward_allocate(100, &partition(&[(0, 0, 1.0), (0, 4, 1.0)]));
        assert_eq!(table.len(), 4);
        assert_eq!(table.per_segment_limits(), vec![50, 25]);
        assert!(table.iter().all(|(_, limit)| limit == 25));
    }

    #[test]
    fn test_stages_are_dense() {
        let table = forward_allocate(500, &three_class());
        let stages: Vec<usize> = table.iter().map(|(stage, _)| stage).collect();
        assert_eq!(stages, (0..40).collect::<Vec<_>>());
    }
}
