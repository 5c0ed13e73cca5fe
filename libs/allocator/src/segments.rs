//! Segment partition builder.
//!
//! Classes share a common entry phase and then drop out of the pipeline one
//! decode depth at a time. The distinct decode depths, sorted, are the
//! segment boundaries:
//!
//! ```text
//! decode depths   10        20        30
//! stages   |<-prefill+10->|<--10-->|<--10-->|
//! active   | all classes  | d > 10 | d > 20 |
//! ```

use std::collections::BTreeSet;

use booking_workload::{WorkClass, Workload};
use serde::Serialize;
use tracing::debug;

use crate::{AllocError, AllocResult};

/// A contiguous run of stages with a constant set of active classes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    /// Position in the partition.
    pub index: usize,

    /// First stage index covered.
    pub start_stage: u64,

    /// Number of stages covered. Zero only for a leading segment with no
    /// prefill and a zero decode depth.
    pub stage_count: u64,

    /// Sum of arrival rates over the classes still active here.
    pub arrival_weight: f64,
}

impl Segment {
    /// One past the last stage index covered.
    pub fn end_stage(&self) -> u64 {
        self.start_stage + self.stage_count
    }

    /// Aggregate demand carried by this segment: stages times arrival weight.
    pub fn demand(&self) -> f64 {
        self.stage_count as f64 * self.arrival_weight
    }

    /// Whether `stage` falls inside this segment.
    pub fn contains(&self, stage: u64) -> bool {
        (self.start_stage..self.end_stage()).contains(&stage)
    }
}

/// Ordered segments covering the whole pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SegmentPartition {
    segments: Vec<Segment>,
}

impl SegmentPartition {
    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// True when there are no segments. Never the case for a built partition.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Iterate segments in pipeline order.
    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.segments.iter()
    }

    /// Segments as a slice.
    pub fn as_slice(&self) -> &[Segment] {
        &self.segments
    }

    /// Total stages covered.
    pub fn total_stages(&self) -> u64 {
        self.segments.last().map(Segment::end_stage).unwrap_or(0)
    }

    /// Sum of `stage_count * arrival_weight` over all segments.
    pub fn total_demand(&self) -> f64 {
        self.segments.iter().map(Segment::demand).sum()
    }

    /// Arrival weights in segment order.
    pub fn arrival_weights(&self) -> Vec<f64> {
        self.segments.iter().map(|s| s.arrival_weight).collect()
    }

    /// Find the segment that covers `stage`.
    pub fn segment_for_stage(&self, stage: u64) -> Option<&Segment> {
        self.segments.iter().find(|s| s.contains(stage))
    }
}

impl<'a> IntoIterator for &'a SegmentPartition {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

/// Build the partition for a validated workload.
pub fn build_segments(workload: &Workload) -> SegmentPartition {
    partition(workload.classes(), workload.prefill_stage_count())
}

/// Build the partition with an explicit prefill depth.
///
/// The classes' own `prefill_stage_count` fields are ignored; their arrival
/// rates are still validated.
pub fn build_segments_with_prefill(
    classes: &[WorkClass],
    prefill_stage_count: u32,
) -> AllocResult<SegmentPartition> {
    if classes.is_empty() {
        return Err(AllocError::EmptyWorkload);
    }
    for class in classes {
        class.validate()?;
    }
    Ok(partition(classes, prefill_stage_count))
}

fn partition(classes: &[WorkClass], prefill_stage_count: u32) -> SegmentPartition {
    let boundaries: BTreeSet<u32> = classes.iter().map(|c| c.decode_stage_count).collect();

    let mut segments = Vec::with_capacity(boundaries.len());
    let mut start_stage = 0u64;
    let mut previous: Option<u32> = None;

    for (index, &decode) in boundaries.iter().enumerate() {
        let (stage_count, arrival_weight) = match previous {
            None => (
                u64::from(prefill_stage_count) + u64::from(decode),
                classes.iter().map(|c| c.arrival_rate).sum(),
            ),
            Some(prev) => (
                u64::from(decode - prev),
                classes
                    .iter()
                    .filter(|c| c.decode_stage_count > prev)
                    .map(|c| c.arrival_rate)
                    .sum(),
            ),
        };

        debug!(index, start_stage, stage_count, arrival_weight, "built segment");

        segments.push(Segment {
            index,
            start_stage,
            stage_count,
            arrival_weight,
        });
        start_stage += stage_count;
        previous = Some(decode);
    }

    SegmentPartition { segments }
}
