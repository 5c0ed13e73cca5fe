//! Forward allocation command.

use anyhow::Result;
use booking_allocator::{build_segments, forward_allocate, SegmentAllocation};
use clap::Args;
use tabled::Tabled;

use crate::error::CliError;
use crate::output::{fmt_f64, fmt_stages, print_info, print_rows, OutputFormat};

use super::CommandContext;

/// Distribute a capacity over pipeline stages.
#[derive(Debug, Args)]
pub struct AllocateCommand {
    /// Total capacity. Defaults to `booking.total_limit` from the workload.
    #[arg(long, short = 'c')]
    capacity: Option<u64>,

    /// Print one row per stage instead of one per segment.
    #[arg(long)]
    per_stage: bool,
}

#[derive(Debug, Tabled)]
struct SegmentLimitRow {
    #[tabled(rename = "Segment")]
    index: usize,

    #[tabled(rename = "Stages")]
    stages: String,

    #[tabled(rename = "Share", display = "fmt_f64")]
    share: f64,

    #[tabled(rename = "Per-Stage Limit")]
    per_stage_limit: u64,
}

impl From<&SegmentAllocation> for SegmentLimitRow {
    fn from(alloc: &SegmentAllocation) -> Self {
        Self {
            index: alloc.segment.index,
            stages: fmt_stages(alloc.segment.start_stage, alloc.segment.end_stage()),
            share: alloc.share,
            per_stage_limit: alloc.per_stage_limit,
        }
    }
}

#[derive(Debug, Tabled)]
struct StageLimitRow {
    #[tabled(rename = "Stage")]
    stage: usize,

    #[tabled(rename = "Limit")]
    limit: u64,
}

impl AllocateCommand {
    pub fn run(self, ctx: CommandContext) -> Result<()> {
        let file = ctx.load_workload()?;
        let capacity = ctx.capacity(&file, self.capacity).ok_or_else(|| {
            CliError::MissingInput(
                "no capacity; pass --capacity or set booking.total_limit".to_string(),
            )
        })?;

        let table = forward_allocate(capacity, &build_segments(&file.workload));

        if self.per_stage {
            let rows: Vec<StageLimitRow> = table
                .iter()
                .map(|(stage, limit)| StageLimitRow { stage, limit })
                .collect();
            print_rows(&rows, table.as_slice(), ctx.format);
        } else {
            let rows: Vec<SegmentLimitRow> =
                table.segments().iter().map(SegmentLimitRow::from).collect();
            print_rows(&rows, &table, ctx.format);
        }

        if ctx.format == OutputFormat::Table {
            print_info(&format!(
                "capacity {}, booked {} across {} stages",
                table.capacity(),
                table.total_booked(),
                table.len()
            ));
        }

        Ok(())
    }
}
