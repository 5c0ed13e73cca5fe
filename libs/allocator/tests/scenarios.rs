//! End-to-end scenarios over the public API.

use std::collections::BTreeMap;

use booking_allocator::{
    build_segments, forward_allocate, inverse_size, plan, type_weighted_share_back,
    type_weighted_size, AllocError, BookingConfig, BookingPlan, CapacityModel, SchedulerKind,
};
use booking_workload::{TypeId, WorkClass, Workload};
use rstest::rstest;

fn id(name: &str) -> TypeId {
    TypeId::parse(name).unwrap()
}

fn workload(prefill: u32, classes: &[(u32, f64)]) -> Workload {
    Workload::new(
        classes
            .iter()
            .enumerate()
            .map(|(i, &(decode, rate))| {
                WorkClass::new(id(&format!("type{}", i + 1)), prefill, decode, rate)
            })
            .collect(),
    )
    .unwrap()
}

#[test]
fn three_class_pipeline() {
    let workload = workload(10, &[(10, 30.0), (20, 20.0), (30, 10.0)]);
    let partition = build_segments(&workload);

    let shape: Vec<(u64, f64)> = partition
        .iter()
        .map(|s| (s.stage_count, s.arrival_weight))
        .collect();
    assert_eq!(shape, vec![(20, 60.0), (10, 30.0), (10, 10.0)]);

    let limits = forward_allocate(1000, &partition).per_segment_limits();
    assert!(limits[0] > limits[1]);
    assert!(limits[1] > limits[2]);
}

#[test]
fn forward_then_inverse() {
    let workload = workload(120, &[(25, 200.0), (55, 100.0)]);
    let partition = build_segments(&workload);

    for capacity in (500..5000).step_by(250) {
        let targets = forward_allocate(capacity, &partition).per_segment_limits();
        let sizing = inverse_size(&targets, &partition).unwrap();
        assert!(
            sizing.min_capacity <= capacity,
            "capacity {capacity}: sized {}",
            sizing.min_capacity
        );
    }
}

#[rstest]
#[case::non_monotonic(vec![5, 10], "NonMonotonicTarget")]
#[case::non_proportional(vec![10, 10], "NonProportionalTarget")]
#[case::too_short(vec![10], "ShapeMismatch")]
#[case::too_long(vec![10, 5, 1], "ShapeMismatch")]
fn rejected_targets(#[case] targets: Vec<u64>, #[case] kind: &str) {
    // Arrival weights 60 and 30.
    let workload = workload(5, &[(10, 30.0), (20, 30.0)]);
    let err = inverse_size(&targets, &build_segments(&workload)).unwrap_err();

    assert!(err.is_target_error());
    let matched = match err {
        AllocError::NonMonotonicTarget { .. } => "NonMonotonicTarget",
        AllocError::NonProportionalTarget { .. } => "NonProportionalTarget",
        AllocError::ShapeMismatch { .. } => "ShapeMismatch",
        _ => "other",
    };
    assert_eq!(matched, kind);
}

#[test]
fn type_weighted_sizing_and_share_back() {
    let workload = workload(10, &[(10, 300.0), (20, 200.0), (30, 100.0)]);
    let per_stage = BTreeMap::from([(id("type1"), 4), (id("type2"), 2), (id("type3"), 1)]);

    let sizing = type_weighted_size(&workload, &per_stage).unwrap();
    assert_eq!(
        sizing.required_by_type.values().copied().collect::<Vec<_>>(),
        vec![44, 42, 31]
    );
    assert_eq!(sizing.total_limit, 117);

    let shares = type_weighted_share_back(&workload, sizing.total_limit);
    let total: f64 = shares.values().map(|s| s.booking_share).sum();
    assert!((total - 117.0).abs() < 1e-9);
    assert!(shares.values().all(|s| s.per_stage_limit >= 1));
}

#[rstest]
#[case(SchedulerKind::FasterTransformer, 1, CapacityModel::BatchSized)]
#[case(SchedulerKind::Orca, 2, CapacityModel::BatchSized)]
#[case(SchedulerKind::Sarathi, 3, CapacityModel::BatchSized)]
#[case(SchedulerKind::Vllm, 4, CapacityModel::BatchSized)]
#[case(SchedulerKind::LightLlm, 5, CapacityModel::BatchSized)]
#[case(SchedulerKind::BookingLimit, 6, CapacityModel::TypeWeighted)]
#[case(SchedulerKind::NestedBookingLimit, 7, CapacityModel::Segmented)]
#[case(SchedulerKind::GeneralNestedBookingLimit, 8, CapacityModel::Segmented)]
#[case(SchedulerKind::ModifiedBookingLimit, 9, CapacityModel::TypeWeighted)]
fn scheduler_registry(
    #[case] kind: SchedulerKind,
    #[case] code: u8,
    #[case] model: CapacityModel,
) {
    assert_eq!(kind.code(), code);
    assert_eq!(kind.capacity_model(), model);

    let config = BookingConfig::new(kind, 400).unwrap();
    let plan = plan(&config, &workload(5, &[(10, 100.0), (30, 100.0)])).unwrap();
    let planned = match plan {
        BookingPlan::Unbounded => CapacityModel::BatchSized,
        BookingPlan::TypeWeighted(_) => CapacityModel::TypeWeighted,
        BookingPlan::Segmented(_) => CapacityModel::Segmented,
    };
    assert_eq!(planned, model);
}

#[test]
fn zero_rates_degrade_to_zero_allocation() {
    let workload = workload(3, &[(4, 0.0), (8, 0.0)]);
    let table = forward_allocate(1000, &build_segments(&workload));
    assert_eq!(table.total_booked(), 0);
    assert_eq!(table.len(), 11);
}
