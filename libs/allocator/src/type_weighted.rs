//! Type-weighted allocator.
//!
//! The non-segmented path: each class books a fixed per-stage limit over
//! its whole stage span (one entry stage plus its decode stages), and the
//! capacity is the plain sum over classes.

use std::collections::BTreeMap;

use booking_workload::{TypeId, Workload};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::rounding::snap_floor;
use crate::{AllocError, AllocResult};

/// Result of type-weighted sizing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeWeightedSizing {
    /// Sum of `required_by_type`.
    pub total_limit: u64,

    /// `per_stage_limit * stage_span` for each class.
    pub required_by_type: BTreeMap<TypeId, u64>,
}

/// One class's slice of a capacity split by arrival-weighted demand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingShare {
    /// `arrival_rate * stage_span`.
    pub prompt_rate: f64,

    /// Capacity assigned to the class before truncation.
    pub booking_share: f64,

    /// `floor(max(booking_share / stage_span, 1))`, or 0 when every class
    /// has a zero arrival rate.
    pub per_stage_limit: u64,
}

/// Capacity needed to give every class its per-stage limit.
///
/// Fails with [`AllocError::MissingMapping`] if a class has no entry in
/// `per_stage_limits`, or [`AllocError::CapacityOverflow`] if a requirement
/// or the total does not fit in `u64`. Extra entries are ignored.
#[instrument(skip_all, fields(classes = workload.len()))]
pub fn type_weighted_size(
    workload: &Workload,
    per_stage_limits: &BTreeMap<TypeId, u64>,
) -> AllocResult<TypeWeightedSizing> {
    let mut required_by_type = BTreeMap::new();

    for class in workload.classes() {
        let per_stage_limit =
            per_stage_limits
                .get(&class.type_id)
                .ok_or_else(|| AllocError::MissingMapping {
                    type_id: class.type_id.clone(),
                })?;
        let required = per_stage_limit
            .checked_mul(class.stage_span())
            .ok_or(AllocError::CapacityOverflow)?;
        required_by_type.insert(class.type_id.clone(), required);
    }

    let total_limit = required_by_type
        .values()
        .try_fold(0u64, |total, &required| total.checked_add(required))
        .ok_or(AllocError::CapacityOverflow)?;
    debug!(total_limit, ?required_by_type, "sized type-weighted capacity");

    Ok(TypeWeightedSizing {
        total_limit,
        required_by_type,
    })
}

/// Split `total_limit` across classes in proportion to their demand.
///
/// This is diagnostic: it shows what per-stage limit a demand-proportional
/// split implies. It does not reconstruct the inputs of
/// [`type_weighted_size`] unless rates and limits already agree.
#[instrument(skip(workload), fields(classes = workload.len()))]
pub fn type_weighted_share_back(
    workload: &Workload,
    total_limit: u64,
) -> BTreeMap<TypeId, BookingShare> {
    let prompt_rates: Vec<f64> = workload
        .classes()
        .iter()
        .map(|c| c.arrival_rate * c.stage_span() as f64)
        .collect();
    let total_rate: f64 = prompt_rates.iter().sum();

    workload
        .classes()
        .iter()
        .zip(prompt_rates)
        .map(|(class, prompt_rate)| {
            let share = if total_rate > 0.0 {
                (prompt_rate / total_rate) * total_limit as f64
            } else {
                0.0
            };
            let per_stage_limit = if total_rate > 0.0 {
                snap_floor((share / class.stage_span() as f64).max(1.0))
            } else {
                0
            };

            debug!(
                type_id = %class.type_id,
                share,
                per_stage_limit,
                "computed booking share"
            );

            (
                class.type_id.clone(),
                BookingShare {
                    prompt_rate,
                    booking_share: share,
                    per_stage_limit,
                },
            )
        })
        .collect()
}
