//! Error handling and display for the CLI.

use std::path::PathBuf;

use booking_allocator::AllocError;
use colored::Colorize;
use thiserror::Error;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Workload file not found: {}", .0.display())]
    WorkloadNotFound(PathBuf),

    #[error("Unsupported workload file extension: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("Missing input: {0}")]
    MissingInput(String),
}

/// Print an error in a user-friendly format.
pub fn print_error(err: &anyhow::Error) {
    eprintln!("{} {}", "Error:".red().bold(), err);

    for cause in err.chain().skip(1) {
        eprintln!("  {} {}", "caused by:".dimmed(), cause);
    }

    if let Some(hint) = hint_for(err) {
        eprintln!("\n{}", format!("Hint: {hint}").yellow());
    }
}

fn hint_for(err: &anyhow::Error) -> Option<&'static str> {
    if let Some(cli_err) = err.downcast_ref::<CliError>() {
        return match cli_err {
            CliError::WorkloadNotFound(_) => {
                Some("Pass --workload PATH or set BOOKCTL_WORKLOAD.")
            }
            CliError::UnsupportedFormat(_) => Some("Use a .toml or .json workload file."),
            CliError::MissingInput(_) => None,
        };
    }

    match err.downcast_ref::<AllocError>()? {
        AllocError::MissingMapping { .. } => {
            Some("Add an entry for every class under [per_stage_limits].")
        }
        AllocError::ShapeMismatch { .. } => {
            Some("Run `bookctl segments` to see how many segments the workload has.")
        }
        AllocError::NonMonotonicTarget { .. } => {
            Some("Targets must not increase from one segment to the next.")
        }
        AllocError::NonProportionalTarget { .. } => Some(
            "Use the expected vector, or widen the check with --tolerance.",
        ),
        AllocError::InvalidRange { .. } => Some("The sweep needs start < end and step > 0."),
        AllocError::CapacityOverflow => Some("Lower the targets or per-stage limits."),
        AllocError::InvalidConfig(_) => {
            Some("Tolerances must be finite and non-negative (--tolerance, [booking]).")
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hint_for_alloc_error() {
        let err = anyhow::Error::new(AllocError::ShapeMismatch {
            expected: 3,
            actual: 2,
        });
        assert!(hint_for(&err).unwrap().contains("bookctl segments"));
    }

    #[test]
    fn test_hint_for_cli_error() {
        let err = anyhow::Error::new(CliError::WorkloadNotFound(PathBuf::from("w.toml")));
        assert!(hint_for(&err).unwrap().contains("--workload"));
    }

    #[test]
    fn test_hint_for_capacity_overflow() {
        let err = anyhow::Error::new(AllocError::CapacityOverflow);
        assert!(hint_for(&err).unwrap().contains("Lower"));
    }

    #[test]
    fn test_no_hint_for_plain_error() {
        let err = anyhow::anyhow!("boom");
        assert!(hint_for(&err).is_none());
    }
}
