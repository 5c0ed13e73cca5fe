//! Capacity sweeps.
//!
//! Tuning experiments step the capacity across a range and compare the
//! resulting limits. A sweep only produces the tables; running anything
//! against them is the caller's business.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::forward::forward_allocate;
use crate::segments::SegmentPartition;
use crate::{AllocError, AllocResult};

/// Half-open capacity range `start..end` visited every `step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityRange {
    pub start: u64,
    pub end: u64,
    pub step: u64,
}

impl CapacityRange {
    /// Create a range, rejecting empty ranges and zero steps.
    pub fn new(start: u64, end: u64, step: u64) -> AllocResult<Self> {
        let range = Self { start, end, step };
        range.validate()?;
        Ok(range)
    }

    /// Check the range is non-empty with a positive step.
    pub fn validate(&self) -> AllocResult<()> {
        if self.step == 0 || self.start >= self.end {
            return Err(AllocError::InvalidRange {
                start: self.start,
                end: self.end,
                step: self.step,
            });
        }
        Ok(())
    }

    /// Capacities visited, in ascending order.
    pub fn capacities(&self) -> impl Iterator<Item = u64> {
        let step = self.step.max(1);
        let end = self.end;
        std::iter::successors(Some(self.start), move |&c| c.checked_add(step))
            .take_while(move |&c| c < end)
    }
}

/// Forward allocation at one capacity of a sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepPoint {
    pub capacity: u64,
    pub per_segment_limits: Vec<u64>,
    pub total_booked: u64,
}

/// Run the forward allocator at every capacity in `range`.
#[instrument(skip(partition), fields(segments = partition.len()))]
pub fn sweep_capacities(
    range: &CapacityRange,
    partition: &SegmentPartition,
) -> AllocResult<Vec<SweepPoint>> {
    range.validate()?;

    Ok(range
        .capacities()
        .map(|capacity| {
            let table = forward_allocate(capacity, partition);
            SweepPoint {
                capacity,
                per_segment_limits: table.per_segment_limits(),
                total_booked: table.total_booked(),
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use booking_workload::{TypeId, WorkClass, Workload};

    use super::*;
    use crate::segments::build_segments;

    fn two_class() -> SegmentPartition {
        let workload = Workload::new(vec![
            WorkClass::new(TypeId::parse("type1").unwrap(), 5, 10, 100.0),
            WorkClass::new(TypeId::parse("type2").unwrap(), 5, 30, 100.0),
        ])
        .unwrap();
        build_segments(&workload)
    }

    #[test]
    fn test_range_is_half_open() {
        let range = CapacityRange::new(420, 620, 20).unwrap();
        let caps: Vec<u64> = range.capacities().collect();
        assert_eq!(caps.len(), 10);
        assert_eq!(caps.first(), Some(&420));
        assert_eq!(caps.last(), Some(&600));
    }

    #[test]
    fn test_invalid_ranges() {
        assert!(CapacityRange::new(100, 100, 10).is_err());
        assert!(CapacityRange::new(200, 100, 10).is_err());
        assert!(matches!(
            CapacityRange::new(100, 200, 0).unwrap_err(),
            AllocError::InvalidRange { step: 0, .. }
        ));
    }

    #[test]
    fn test_sweep_limits_grow_with_capacity() {
        // Segments: 15 stages at weight 200, 20 stages at weight 100.
        let points = sweep_capacities(&CapacityRange::new(300, 500, 100).unwrap(), &two_class())
            .unwrap();

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].capacity, 300);
        assert_eq!(points[0].per_segment_limits, vec![12, 6]);
        assert_eq!(points[1].per_segment_limits, vec![16, 8]);
        assert!(points[0].total_booked < points[1].total_booked);
    }

    #[test]
    fn test_sweep_rejects_unvalidated_range() {
        let range = CapacityRange {
            start: 5,
            end: 1,
            step: 1,
        };
        assert!(sweep_capacities(&range, &two_class()).is_err());
    }
}
