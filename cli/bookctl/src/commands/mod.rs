//! CLI commands.

mod allocate;
mod config;
mod plan;
mod segments;
mod size;
mod sweep;
mod type_weighted;

use std::path::PathBuf;

use anyhow::Result;
use booking_allocator::PROPORTIONALITY_TOLERANCE;
use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::logging;
use crate::output::OutputFormat;
use crate::workload_file::WorkloadFile;

/// bookctl - inspect booking-limit allocations for a workload.
#[derive(Debug, Parser)]
#[command(name = "bookctl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format (table or json).
    #[arg(long, global = true, env = "BOOKCTL_FORMAT")]
    format: Option<String>,

    /// Workload file (TOML or JSON). Defaults to ./workload.toml.
    #[arg(long, short = 'w', global = true, env = "BOOKCTL_WORKLOAD", value_name = "PATH")]
    workload: Option<PathBuf>,

    /// Log filter (e.g. `debug` or `booking_allocator=trace`).
    #[arg(long, global = true, env = "BOOKCTL_LOG_LEVEL")]
    log_level: Option<String>,

    /// Emit logs as JSON on stderr.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show the segment partition of the workload.
    Segments(segments::SegmentsCommand),

    /// Distribute a capacity over pipeline stages.
    Allocate(allocate::AllocateCommand),

    /// Find the minimum capacity for per-segment targets.
    Size(size::SizeCommand),

    /// Size capacity from fixed per-type limits.
    TypeSize(type_weighted::TypeSizeCommand),

    /// Split a capacity across types by arrival-weighted demand.
    ShareBack(type_weighted::ShareBackCommand),

    /// Allocate across a range of capacities.
    Sweep(sweep::SweepCommand),

    /// Resolve the configured scheduler into the limits it enforces.
    Plan(plan::PlanCommand),

    /// List known scheduler kinds.
    Schedulers,

    /// Show the effective CLI configuration.
    Config,

    /// Show CLI version.
    Version,
}

impl Cli {
    /// Run the CLI command.
    pub fn run(self) -> Result<()> {
        let config = Config::load()?;

        let log_level = self
            .log_level
            .clone()
            .unwrap_or_else(|| config.log_level.clone());
        logging::init(&log_level, self.log_json);

        let format = OutputFormat::from_name(self.format.as_deref().unwrap_or(&config.format));
        let workload_path = self
            .workload
            .clone()
            .unwrap_or_else(|| config.workload.clone());

        let ctx = CommandContext {
            config,
            format,
            workload_path,
        };

        match self.command {
            Commands::Segments(cmd) => cmd.run(ctx),
            Commands::Allocate(cmd) => cmd.run(ctx),
            Commands::Size(cmd) => cmd.run(ctx),
            Commands::TypeSize(cmd) => cmd.run(ctx),
            Commands::ShareBack(cmd) => cmd.run(ctx),
            Commands::Sweep(cmd) => cmd.run(ctx),
            Commands::Plan(cmd) => cmd.run(ctx),
            Commands::Schedulers => plan::list_schedulers(ctx),
            Commands::Config => config::show_config(ctx),
            Commands::Version => {
                println!("bookctl {}", env!("CARGO_PKG_VERSION"));
                Ok(())
            }
        }
    }
}

/// Shared command context.
pub struct CommandContext {
    pub config: Config,
    pub format: OutputFormat,
    pub workload_path: PathBuf,
}

impl CommandContext {
    /// Load the selected workload file.
    pub fn load_workload(&self) -> Result<WorkloadFile> {
        WorkloadFile::load(&self.workload_path)
    }

    /// Resolve the proportionality tolerance: flag, then the workload's
    /// `[booking]` table, then user config, then the library default.
    pub fn tolerance(&self, file: &WorkloadFile, flag: Option<f64>) -> f64 {
        flag.or(file.booking.as_ref().map(|b| b.proportionality_tolerance))
            .or(self.config.proportionality_tolerance)
            .unwrap_or(PROPORTIONALITY_TOLERANCE)
    }

    /// Resolve a capacity: flag, then the workload's `[booking]` table.
    pub fn capacity(&self, file: &WorkloadFile, flag: Option<u64>) -> Option<u64> {
        flag.or(file.booking.as_ref().map(|b| b.total_limit))
    }
}

#[cfg(test)]
mod tests {
    use booking_allocator::{BookingConfig, SchedulerKind};
    use clap::CommandFactory;

    use super::*;

    fn ctx(config: Config) -> CommandContext {
        CommandContext {
            config,
            format: OutputFormat::Table,
            workload_path: PathBuf::from("workload.toml"),
        }
    }

    fn file(booking: Option<BookingConfig>) -> WorkloadFile {
        let mut file = WorkloadFile::from_json_str(
            r#"{"classes": [{"type": "a", "decode": 3, "arrival_rate": 1}]}"#,
        )
        .unwrap();
        file.booking = booking;
        file
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_tolerance_precedence() {
        let booking = BookingConfig::new(SchedulerKind::NestedBookingLimit, 10)
            .unwrap()
            .with_tolerance(0.5)
            .unwrap();
        let config = Config {
            proportionality_tolerance: Some(0.25),
            ..Config::default()
        };

        assert_eq!(ctx(config.clone()).tolerance(&file(Some(booking.clone())), Some(0.75)), 0.75);
        assert_eq!(ctx(config.clone()).tolerance(&file(Some(booking)), None), 0.5);
        assert_eq!(ctx(config).tolerance(&file(None), None), 0.25);
        assert_eq!(
            ctx(Config::default()).tolerance(&file(None), None),
            PROPORTIONALITY_TOLERANCE
        );
    }

    #[test]
    fn test_capacity_precedence() {
        let booking = BookingConfig::new(SchedulerKind::NestedBookingLimit, 10).unwrap();
        let ctx = ctx(Config::default());
        assert_eq!(ctx.capacity(&file(Some(booking.clone())), Some(99)), Some(99));
        assert_eq!(ctx.capacity(&file(Some(booking)), None), Some(10));
        assert_eq!(ctx.capacity(&file(None), None), None);
    }

    #[test]
    fn test_parse_size_targets() {
        let cli = Cli::try_parse_from(["bookctl", "size", "--targets", "37,18,6"]).unwrap();
        assert!(matches!(cli.command, Commands::Size(_)));
    }
}
