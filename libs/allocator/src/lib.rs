//! Booking-limit allocation.
//!
//! This library distributes a finite booking capacity (admission credits
//! for in-flight work) across the stages of a processing pipeline, and
//! answers the inverse question of how much capacity a set of per-stage
//! limits needs. Key concepts:
//!
//! - **Segment**: a maximal run of stages in which the same work classes are
//!   still active, and so the same arrival weight applies.
//! - **Forward allocation**: capacity in, per-stage limits out.
//! - **Inverse sizing**: per-segment targets in, minimum capacity out.
//! - **Type-weighted sizing**: per-type limits in, total capacity out, with
//!   no segmentation.
//!
//! # Invariants
//!
//! - Every computation is a pure function of its inputs
//! - Segments cover `[0, prefill + max_decode)` exactly once, in order
//! - Segment arrival weights never increase along the pipeline
//! - Invalid targets are rejected, never silently adjusted

mod error;
pub mod forward;
pub mod inverse;
pub mod policy;
mod rounding;
pub mod segments;
pub mod sweep;
pub mod type_weighted;

pub use error::{AllocError, AllocResult};
pub use forward::{forward_allocate, AllocationTable, SegmentAllocation};
pub use inverse::{
    inverse_size, inverse_size_with_tolerance, InverseSizing, PROPORTIONALITY_TOLERANCE,
};
pub use policy::{plan, BookingConfig, BookingPlan, CapacityModel, SchedulerKind};
pub use segments::{build_segments, build_segments_with_prefill, Segment, SegmentPartition};
pub use sweep::{sweep_capacities, CapacityRange, SweepPoint};
pub use type_weighted::{
    type_weighted_share_back, type_weighted_size, BookingShare, TypeWeightedSizing,
};

pub use booking_workload::{TypeId, WorkClass, Workload, WorkloadError};
