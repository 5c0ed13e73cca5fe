//! Configuration display command.

use anyhow::Result;
use serde::Serialize;

use crate::config::{config_path, Config};
use crate::output::{print_info, print_single, OutputFormat};

use super::CommandContext;

#[derive(Debug, Serialize)]
struct EffectiveConfig<'a> {
    config_path: String,
    workload: String,
    format: &'static str,
    stored: &'a Config,
}

/// Show the config file location and the values in effect.
pub fn show_config(ctx: CommandContext) -> Result<()> {
    let path = config_path()?;
    let format = match ctx.format {
        OutputFormat::Table => "table",
        OutputFormat::Json => "json",
    };

    if ctx.format == OutputFormat::Json {
        print_single(&EffectiveConfig {
            config_path: path.display().to_string(),
            workload: ctx.workload_path.display().to_string(),
            format,
            stored: &ctx.config,
        });
        return Ok(());
    }

    print_info(&format!("config file: {}", path.display()));
    println!("  workload:  {}", ctx.workload_path.display());
    println!("  format:    {format}");
    println!("  log level: {}", ctx.config.log_level);
    match ctx.config.proportionality_tolerance {
        Some(tolerance) => println!("  tolerance: {tolerance}"),
        None => println!("  tolerance: (library default)"),
    }

    Ok(())
}
