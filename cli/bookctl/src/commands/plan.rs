//! Scheduler planning commands.

use anyhow::Result;
use booking_allocator::{plan, BookingConfig, BookingPlan, CapacityModel, SchedulerKind};
use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{fmt_limits, fmt_stages, print_info, print_rows, print_single, OutputFormat};

use super::CommandContext;

/// Resolve a scheduler against the workload.
#[derive(Debug, Args)]
pub struct PlanCommand {
    /// Scheduler kind. Defaults to `booking.scheduler` from the workload.
    #[arg(long)]
    scheduler: Option<SchedulerKind>,

    /// Capacity. Defaults to `booking.total_limit` from the workload.
    #[arg(long)]
    total_limit: Option<u64>,
}

#[derive(Debug, Serialize)]
struct PlanOutput<'a> {
    scheduler: SchedulerKind,
    code: u8,
    total_limit: u64,
    #[serde(flatten)]
    plan: &'a BookingPlan,
}

#[derive(Debug, Tabled)]
struct LimitRow {
    #[tabled(rename = "Key")]
    key: String,

    #[tabled(rename = "Limit")]
    limit: u64,
}

#[derive(Debug, Serialize, Tabled)]
struct SchedulerRow {
    #[tabled(rename = "Code")]
    code: u8,

    #[tabled(rename = "Name")]
    name: &'static str,

    #[tabled(rename = "Model")]
    #[serde(skip)]
    model_name: &'static str,

    #[tabled(skip)]
    model: CapacityModel,
}

impl PlanCommand {
    pub fn run(self, ctx: CommandContext) -> Result<()> {
        let file = ctx.load_workload()?;
        let base = file.booking.clone().unwrap_or_default();

        let config = BookingConfig::new(
            self.scheduler.unwrap_or(base.scheduler),
            self.total_limit.unwrap_or(base.total_limit),
        )?
        .with_tolerance(base.proportionality_tolerance)?;

        let resolved = plan(&config, &file.workload)?;

        if ctx.format == OutputFormat::Json {
            print_single(&PlanOutput {
                scheduler: config.scheduler,
                code: config.scheduler.code(),
                total_limit: config.total_limit,
                plan: &resolved,
            });
            return Ok(());
        }

        print_info(&format!(
            "{} (code {}) uses the {} model",
            config.scheduler,
            config.scheduler.code(),
            model_name(config.scheduler.capacity_model())
        ));

        let rows: Vec<LimitRow> = match &resolved {
            BookingPlan::Unbounded => {
                print_info("admission is bounded by batch size; no booking limits apply");
                return Ok(());
            }
            BookingPlan::TypeWeighted(shares) => shares
                .iter()
                .map(|(type_id, share)| LimitRow {
                    key: type_id.to_string(),
                    limit: share.per_stage_limit,
                })
                .collect(),
            BookingPlan::Segmented(table) => table
                .segments()
                .iter()
                .map(|alloc| LimitRow {
                    key: fmt_stages(alloc.segment.start_stage, alloc.segment.end_stage()),
                    limit: alloc.per_stage_limit,
                })
                .collect(),
        };
        print_rows(&rows, &resolved, ctx.format);

        if let BookingPlan::Segmented(table) = &resolved {
            print_info(&format!(
                "per-segment limits {}",
                fmt_limits(&table.per_segment_limits())
            ));
        }

        Ok(())
    }
}

/// List every scheduler kind with its code and capacity model.
pub fn list_schedulers(ctx: CommandContext) -> Result<()> {
    let rows: Vec<SchedulerRow> = SchedulerKind::ALL
        .into_iter()
        .map(|kind| SchedulerRow {
            code: kind.code(),
            name: kind.as_str(),
            model_name: model_name(kind.capacity_model()),
            model: kind.capacity_model(),
        })
        .collect();
    print_rows(&rows, &rows, ctx.format);
    Ok(())
}

fn model_name(model: CapacityModel) -> &'static str {
    match model {
        CapacityModel::BatchSized => "batch_sized",
        CapacityModel::TypeWeighted => "type_weighted",
        CapacityModel::Segmented => "segmented",
    }
}
