//! Inverse sizing command.

use anyhow::Result;
use booking_allocator::{build_segments, inverse_size_with_tolerance};
use clap::Args;
use tabled::Tabled;

use crate::error::CliError;
use crate::output::{fmt_f64, fmt_stages, print_rows, print_success, OutputFormat};

use super::CommandContext;

/// Find the minimum capacity that yields per-segment targets.
#[derive(Debug, Args)]
pub struct SizeCommand {
    /// Per-segment limits, comma separated. Defaults to `targets` from the workload.
    #[arg(long, value_delimiter = ',')]
    targets: Option<Vec<u64>>,

    /// Relative tolerance of the proportionality check.
    #[arg(long)]
    tolerance: Option<f64>,
}

#[derive(Debug, Tabled)]
struct RequiredRow {
    #[tabled(rename = "Segment")]
    index: usize,

    #[tabled(rename = "Stages")]
    stages: String,

    #[tabled(rename = "Arrival Weight", display = "fmt_f64")]
    arrival_weight: f64,

    #[tabled(rename = "Target")]
    target: u64,

    #[tabled(rename = "Required")]
    required: u64,
}

impl SizeCommand {
    pub fn run(self, ctx: CommandContext) -> Result<()> {
        let file = ctx.load_workload()?;
        let tolerance = ctx.tolerance(&file, self.tolerance);
        let targets = self
            .targets
            .or_else(|| file.targets.clone())
            .ok_or_else(|| {
                CliError::MissingInput("no targets; pass --targets or set targets".to_string())
            })?;

        let partition = build_segments(&file.workload);
        let sizing = inverse_size_with_tolerance(&targets, &partition, tolerance)?;

        let rows: Vec<RequiredRow> = sizing
            .segments
            .iter()
            .zip(&targets)
            .zip(&sizing.required_per_segment)
            .map(|((segment, &target), &required)| RequiredRow {
                index: segment.index,
                stages: fmt_stages(segment.start_stage, segment.end_stage()),
                arrival_weight: segment.arrival_weight,
                target,
                required,
            })
            .collect();
        print_rows(&rows, &sizing, ctx.format);

        if ctx.format == OutputFormat::Table {
            print_success(&format!("minimum capacity {}", sizing.min_capacity));
        }

        Ok(())
    }
}
