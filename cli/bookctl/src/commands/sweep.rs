//! Capacity sweep command.

use anyhow::Result;
use booking_allocator::{build_segments, sweep_capacities, CapacityRange, SweepPoint};
use clap::Args;
use tabled::Tabled;

use crate::output::{fmt_limits, print_rows};

use super::CommandContext;

/// Run the forward allocator over `start..end` in `step` increments.
#[derive(Debug, Args)]
pub struct SweepCommand {
    /// First capacity (inclusive).
    #[arg(long)]
    start: u64,

    /// Last capacity (exclusive).
    #[arg(long)]
    end: u64,

    /// Increment between capacities.
    #[arg(long, default_value_t = 1)]
    step: u64,
}

#[derive(Debug, Tabled)]
struct SweepRow {
    #[tabled(rename = "Capacity")]
    capacity: u64,

    #[tabled(rename = "Per-Segment Limits")]
    limits: String,

    #[tabled(rename = "Booked")]
    total_booked: u64,
}

impl From<&SweepPoint> for SweepRow {
    fn from(point: &SweepPoint) -> Self {
        Self {
            capacity: point.capacity,
            limits: fmt_limits(&point.per_segment_limits),
            total_booked: point.total_booked,
        }
    }
}

impl SweepCommand {
    pub fn run(self, ctx: CommandContext) -> Result<()> {
        let range = CapacityRange::new(self.start, self.end, self.step)?;
        let file = ctx.load_workload()?;

        let points = sweep_capacities(&range, &build_segments(&file.workload))?;

        let rows: Vec<SweepRow> = points.iter().map(SweepRow::from).collect();
        print_rows(&rows, &points, ctx.format);

        Ok(())
    }
}
