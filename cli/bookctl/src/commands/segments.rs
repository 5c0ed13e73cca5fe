//! Segment partition command.

use anyhow::Result;
use booking_allocator::{build_segments, Segment};
use clap::Args;
use tabled::Tabled;

use crate::output::{fmt_f64, fmt_stages, print_info, print_rows, OutputFormat};

use super::CommandContext;

/// Show the segment partition.
#[derive(Debug, Args)]
pub struct SegmentsCommand {}

#[derive(Debug, Tabled)]
struct SegmentRow {
    #[tabled(rename = "Segment")]
    index: usize,

    #[tabled(rename = "Stages")]
    stages: String,

    #[tabled(rename = "Count")]
    stage_count: u64,

    #[tabled(rename = "Arrival Weight", display = "fmt_f64")]
    arrival_weight: f64,

    #[tabled(rename = "Demand", display = "fmt_f64")]
    demand: f64,
}

impl From<&Segment> for SegmentRow {
    fn from(segment: &Segment) -> Self {
        Self {
            index: segment.index,
            stages: fmt_stages(segment.start_stage, segment.end_stage()),
            stage_count: segment.stage_count,
            arrival_weight: segment.arrival_weight,
            demand: segment.demand(),
        }
    }
}

impl SegmentsCommand {
    pub fn run(self, ctx: CommandContext) -> Result<()> {
        let file = ctx.load_workload()?;
        let partition = build_segments(&file.workload);

        let rows: Vec<SegmentRow> = partition.iter().map(SegmentRow::from).collect();
        print_rows(&rows, &partition, ctx.format);

        if ctx.format == OutputFormat::Table {
            print_info(&format!(
                "{} stages, total demand {:.2}",
                partition.total_stages(),
                partition.total_demand()
            ));
        }

        Ok(())
    }
}
