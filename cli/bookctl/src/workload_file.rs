//! Workload file loading.
//!
//! A workload file is TOML (or JSON, by extension) with the class list and
//! the optional inputs the individual commands read:
//!
//! ```toml
//! targets = [37, 18, 6]
//!
//! [[classes]]
//! type = "type1"
//! prefill = 10
//! decode = 10
//! arrival_rate = 30
//!
//! [per_stage_limits]
//! type1 = 4
//!
//! [booking]
//! scheduler = "general_nested_booking_limit"
//! total_limit = 1000
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use booking_allocator::BookingConfig;
use booking_workload::{TypeId, WorkClass, Workload};
use serde::Deserialize;
use tracing::debug;

use crate::error::CliError;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawWorkloadFile {
    classes: Vec<WorkClass>,

    #[serde(default)]
    per_stage_limits: BTreeMap<TypeId, u64>,

    #[serde(default)]
    targets: Option<Vec<u64>>,

    #[serde(default)]
    booking: Option<BookingConfig>,
}

/// A parsed and validated workload file.
#[derive(Debug, Clone)]
pub struct WorkloadFile {
    pub workload: Workload,
    pub per_stage_limits: BTreeMap<TypeId, u64>,
    pub targets: Option<Vec<u64>>,
    pub booking: Option<BookingConfig>,
}

impl WorkloadFile {
    /// Read and validate a workload file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CliError::WorkloadNotFound(path.to_path_buf()).into());
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read workload {}", path.display()))?;

        let file = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&contents),
            Some("toml") | None => Self::from_toml_str(&contents),
            Some(_) => return Err(CliError::UnsupportedFormat(path.to_path_buf()).into()),
        }
        .with_context(|| format!("invalid workload {}", path.display()))?;

        debug!(
            path = %path.display(),
            classes = file.workload.len(),
            "loaded workload"
        );
        Ok(file)
    }

    /// Parse a TOML workload document.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let raw: RawWorkloadFile = toml::from_str(contents)?;
        Self::from_raw(raw)
    }

    /// Parse a JSON workload document.
    pub fn from_json_str(contents: &str) -> Result<Self> {
        let raw: RawWorkloadFile = serde_json::from_str(contents)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawWorkloadFile) -> Result<Self> {
        let workload = Workload::new(raw.classes)?;
        if let Some(booking) = &raw.booking {
            booking.validate()?;
        }

        Ok(Self {
            workload,
            per_stage_limits: raw.per_stage_limits,
            targets: raw.targets,
            booking: raw.booking,
        })
    }
}
