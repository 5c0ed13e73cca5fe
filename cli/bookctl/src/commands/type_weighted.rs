//! Type-weighted sizing commands.

use anyhow::Result;
use booking_allocator::{type_weighted_share_back, type_weighted_size, TypeId};
use clap::Args;
use tabled::Tabled;

use crate::error::CliError;
use crate::output::{fmt_f64, print_rows, print_success, OutputFormat};

use super::CommandContext;

/// Size capacity from the workload's `[per_stage_limits]`.
#[derive(Debug, Args)]
pub struct TypeSizeCommand {}

/// Split a capacity across classes by arrival-weighted demand.
#[derive(Debug, Args)]
pub struct ShareBackCommand {
    /// Capacity to split. Defaults to the total that `type-size` computes,
    /// then to `booking.total_limit`.
    #[arg(long)]
    total_limit: Option<u64>,
}

#[derive(Debug, Tabled)]
struct RequiredRow {
    #[tabled(rename = "Type")]
    type_id: TypeId,

    #[tabled(rename = "Span")]
    stage_span: u64,

    #[tabled(rename = "Per-Stage Limit")]
    per_stage_limit: u64,

    #[tabled(rename = "Required")]
    required: u64,
}

#[derive(Debug, Tabled)]
struct ShareRow {
    #[tabled(rename = "Type")]
    type_id: TypeId,

    #[tabled(rename = "Prompt Rate", display = "fmt_f64")]
    prompt_rate: f64,

    #[tabled(rename = "Share", display = "fmt_f64")]
    booking_share: f64,

    #[tabled(rename = "Per-Stage Limit")]
    per_stage_limit: u64,
}

impl TypeSizeCommand {
    pub fn run(self, ctx: CommandContext) -> Result<()> {
        let file = ctx.load_workload()?;
        let sizing = type_weighted_size(&file.workload, &file.per_stage_limits)?;

        let rows: Vec<RequiredRow> = file
            .workload
            .classes()
            .iter()
            .map(|class| RequiredRow {
                type_id: class.type_id.clone(),
                stage_span: class.stage_span(),
                per_stage_limit: file
                    .per_stage_limits
                    .get(&class.type_id)
                    .copied()
                    .unwrap_or_default(),
                required: sizing
                    .required_by_type
                    .get(&class.type_id)
                    .copied()
                    .unwrap_or_default(),
            })
            .collect();
        print_rows(&rows, &sizing, ctx.format);

        if ctx.format == OutputFormat::Table {
            print_success(&format!("total limit {}", sizing.total_limit));
        }

        Ok(())
    }
}

impl ShareBackCommand {
    pub fn run(self, ctx: CommandContext) -> Result<()> {
        let file = ctx.load_workload()?;
        let total_limit = match self.total_limit {
            Some(limit) => limit,
            None if !file.per_stage_limits.is_empty() => {
                type_weighted_size(&file.workload, &file.per_stage_limits)?.total_limit
            }
            None => ctx.capacity(&file, None).ok_or_else(|| {
                CliError::MissingInput(
                    "no total limit; pass --total-limit or set [per_stage_limits]".to_string(),
                )
            })?,
        };

        let shares = type_weighted_share_back(&file.workload, total_limit);

        let rows: Vec<ShareRow> = shares
            .iter()
            .map(|(type_id, share)| ShareRow {
                type_id: type_id.clone(),
                prompt_rate: share.prompt_rate,
                booking_share: share.booking_share,
                per_stage_limit: share.per_stage_limit,
            })
            .collect();
        print_rows(&rows, &shares, ctx.format);

        Ok(())
    }
}
