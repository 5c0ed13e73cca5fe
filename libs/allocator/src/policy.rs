//! Scheduler kinds and booking configuration.
//!
//! A scheduler kind is resolved once, at configuration time, into the
//! capacity model that sizes it. Nothing downstream dispatches on the kind
//! again.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use booking_workload::{TypeId, Workload};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::forward::{forward_allocate, AllocationTable};
use crate::inverse::{validate_tolerance, PROPORTIONALITY_TOLERANCE};
use crate::segments::build_segments;
use crate::type_weighted::{type_weighted_share_back, BookingShare};
use crate::{AllocError, AllocResult};

/// Replica scheduler variants, with their stable integer codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerKind {
    FasterTransformer,
    Orca,
    Sarathi,
    Vllm,
    #[serde(rename = "lightllm")]
    LightLlm,
    BookingLimit,
    NestedBookingLimit,
    GeneralNestedBookingLimit,
    ModifiedBookingLimit,
}

/// How a scheduler kind consumes booking capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CapacityModel {
    /// Admission bounded by batch size; no booking limits apply.
    BatchSized,
    /// One limit per work class, sized by [`type_weighted_share_back`].
    TypeWeighted,
    /// One limit per stage, sized by [`forward_allocate`].
    Segmented,
}

impl SchedulerKind {
    /// Every kind, in code order.
    pub const ALL: [SchedulerKind; 9] = [
        SchedulerKind::FasterTransformer,
        SchedulerKind::Orca,
        SchedulerKind::Sarathi,
        SchedulerKind::Vllm,
        SchedulerKind::LightLlm,
        SchedulerKind::BookingLimit,
        SchedulerKind::NestedBookingLimit,
        SchedulerKind::GeneralNestedBookingLimit,
        SchedulerKind::ModifiedBookingLimit,
    ];

    /// Stable integer code.
    pub const fn code(self) -> u8 {
        match self {
            SchedulerKind::FasterTransformer => 1,
            SchedulerKind::Orca => 2,
            SchedulerKind::Sarathi => 3,
            SchedulerKind::Vllm => 4,
            SchedulerKind::LightLlm => 5,
            SchedulerKind::BookingLimit => 6,
            SchedulerKind::NestedBookingLimit => 7,
            SchedulerKind::GeneralNestedBookingLimit => 8,
            SchedulerKind::ModifiedBookingLimit => 9,
        }
    }

    /// Look up a kind by code.
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.code() == code)
    }

    /// Snake-case name, as used in configuration.
    pub const fn as_str(self) -> &'static str {
        match self {
            SchedulerKind::FasterTransformer => "faster_transformer",
            SchedulerKind::Orca => "orca",
            SchedulerKind::Sarathi => "sarathi",
            SchedulerKind::Vllm => "vllm",
            SchedulerKind::LightLlm => "lightllm",
            SchedulerKind::BookingLimit => "booking_limit",
            SchedulerKind::NestedBookingLimit => "nested_booking_limit",
            SchedulerKind::GeneralNestedBookingLimit => "general_nested_booking_limit",
            SchedulerKind::ModifiedBookingLimit => "modified_booking_limit",
        }
    }

    /// The capacity model this kind is sized with.
    pub const fn capacity_model(self) -> CapacityModel {
        match self {
            SchedulerKind::FasterTransformer
            | SchedulerKind::Orca
            | SchedulerKind::Sarathi
            | SchedulerKind::Vllm
            | SchedulerKind::LightLlm => CapacityModel::BatchSized,
            SchedulerKind::BookingLimit | SchedulerKind::ModifiedBookingLimit => {
                CapacityModel::TypeWeighted
            }
            SchedulerKind::NestedBookingLimit | SchedulerKind::GeneralNestedBookingLimit => {
                CapacityModel::Segmented
            }
        }
    }
}

impl fmt::Display for SchedulerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchedulerKind {
    type Err = AllocError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| AllocError::InvalidConfig(format!("unknown scheduler kind: {s}")))
    }
}

/// Explicit, immutable booking configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingConfig {
    /// Scheduler variant to size for.
    #[serde(default = "default_scheduler")]
    pub scheduler: SchedulerKind,

    /// Total capacity to distribute.
    #[serde(default)]
    pub total_limit: u64,

    /// Relative tolerance for the inverse sizer's proportionality check.
    #[serde(default = "default_tolerance")]
    pub proportionality_tolerance: f64,
}

fn default_scheduler() -> SchedulerKind {
    SchedulerKind::GeneralNestedBookingLimit
}

fn default_tolerance() -> f64 {
    PROPORTIONALITY_TOLERANCE
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            scheduler: default_scheduler(),
            total_limit: 0,
            proportionality_tolerance: default_tolerance(),
        }
    }
}

impl BookingConfig {
    /// Create a validated configuration with the default tolerance.
    pub fn new(scheduler: SchedulerKind, total_limit: u64) -> AllocResult<Self> {
        let config = Self {
            scheduler,
            total_limit,
            proportionality_tolerance: default_tolerance(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Replace the proportionality tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> AllocResult<Self> {
        self.proportionality_tolerance = tolerance;
        self.validate()?;
        Ok(self)
    }

    /// Check the tolerance is finite and non-negative.
    pub fn validate(&self) -> AllocResult<()> {
        validate_tolerance(self.proportionality_tolerance)
    }
}

/// Limits to enforce for a configured scheduler.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "model", content = "limits", rename_all = "snake_case")]
pub enum BookingPlan {
    /// Batch-sized scheduler; nothing to enforce.
    Unbounded,
    /// Per-class shares of the total limit.
    TypeWeighted(BTreeMap<TypeId, BookingShare>),
    /// Per-stage limits.
    Segmented(AllocationTable),
}

/// Resolve `config` against `workload` into the limits its scheduler uses.
#[instrument(skip_all, fields(scheduler = %config.scheduler, total_limit = config.total_limit))]
pub fn plan(config: &BookingConfig, workload: &Workload) -> AllocResult<BookingPlan> {
    config.validate()?;

    let model = config.scheduler.capacity_model();
    info!(?model, "resolved capacity model");

    Ok(match model {
        CapacityModel::BatchSized => BookingPlan::Unbounded,
        CapacityModel::TypeWeighted => {
            BookingPlan::TypeWeighted(type_weighted_share_back(workload, config.total_limit))
        }
        CapacityModel::Segmented => {
            BookingPlan::Segmented(forward_allocate(config.total_limit, &build_segments(workload)))
        }
    })
}

#[cfg(test)]
mod tests {
    use booking_workload::WorkClass;

    use super::*;

    fn workload() -> Workload {
        Workload::new(vec![
            WorkClass::new(TypeId::parse("type1").unwrap(), 10, 10, 30.0),
            WorkClass::new(TypeId::parse("type2").unwrap(), 10, 20, 20.0),
            WorkClass::new(TypeId::parse("type3").unwrap(), 10, 30, 10.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_codes_are_unique_and_round_trip() {
        for kind in SchedulerKind::ALL {
            assert_eq!(SchedulerKind::from_code(kind.code()), Some(kind));
            assert_eq!(kind.to_string().parse::<SchedulerKind>().unwrap(), kind);
        }
        assert_eq!(SchedulerKind::from_code(0), None);
        assert_eq!(SchedulerKind::from_code(10), None);
    }

    #[test]
    fn test_unknown_kind() {
        let err = "round_robin".parse::<SchedulerKind>().unwrap_err();
        assert!(matches!(err, AllocError::InvalidConfig(_)));
    }

    #[test]
    fn test_serde_names_match_display() {
        for kind in SchedulerKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{kind}\""));
        }
    }

    #[test]
    fn test_config_defaults_from_empty_document() {
        let config: BookingConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, BookingConfig::default());
        assert_eq!(config.proportionality_tolerance, PROPORTIONALITY_TOLERANCE);
    }

    #[test]
    fn test_config_rejects_bad_tolerance() {
        let config = BookingConfig::new(SchedulerKind::Vllm, 10).unwrap();
        assert!(config.clone().with_tolerance(-1.0).is_err());
        assert!(config.with_tolerance(f64::NAN).is_err());
    }

    #[test]
    fn test_plan_segmented() {
        let config = BookingConfig::new(SchedulerKind::GeneralNestedBookingLimit, 1000).unwrap();
        match plan(&config, &workload()).unwrap() {
            BookingPlan::Segmented(table) => {
                assert_eq!(table.per_segment_limits(), vec![37, 18, 6]);
            }
            other => panic!("unexpected plan: {other:?}"),
        }
    }

    #[test]
    fn test_plan_type_weighted() {
        let config = BookingConfig::new(SchedulerKind::ModifiedBookingLimit, 1000).unwrap();
        match plan(&config, &workload()).unwrap() {
            BookingPlan::TypeWeighted(shares) => assert_eq!(shares.len(), 3),
            other => panic!("unexpected plan: {other:?}"),
        }
    }

    #[test]
    fn test_plan_batch_sized() {
        let config = BookingConfig::new(SchedulerKind::Sarathi, 1000).unwrap();
        assert_eq!(plan(&config, &workload()).unwrap(), BookingPlan::Unbounded);
    }

    #[test]
    fn test_plan_revalidates_deserialized_config() {
        let config: BookingConfig =
            serde_json::from_str(r#"{"proportionality_tolerance": -0.5}"#).unwrap();
        assert!(plan(&config, &workload()).is_err());
    }
}
