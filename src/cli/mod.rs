pub mod demo;
pub mod departments;
pub mod export;
pub mod init;
pub mod report;
pub mod status;

use std::path::PathBuf;

use chrono::Datelike;
use clap::{Parser, Subcommand};

use crate::departments::Taxonomy;
use crate::error::{PlanError, Result};
use crate::pipeline::Selection;
use crate::settings::{load_settings, resolve_data_dir};
use crate::source::{JsonDirSource, Snapshot};

/// Parse a month option: `M`, `MM` or `YYYY-MM`. Returns (year, month).
pub(crate) fn parse_month_opt(month: &Option<String>) -> Result<(Option<i32>, Option<u32>)> {
    let Some(m) = month else {
        return Ok((None, None));
    };
    let bad = || PlanError::Other(format!("Invalid --month '{m}' (expected M or YYYY-MM)"));
    let parts: Vec<&str> = m.trim().split('-').collect();
    let (year, month) = match parts.as_slice() {
        [month] => (None, month.parse::<u32>().map_err(|_| bad())?),
        [year, month] => (
            Some(year.parse::<i32>().map_err(|_| bad())?),
            month.parse::<u32>().map_err(|_| bad())?,
        ),
        _ => return Err(bad()),
    };
    if !(1..=12).contains(&month) {
        return Err(PlanError::InvalidMonth(month));
    }
    Ok((year, Some(month)))
}

pub(crate) fn current_year() -> i32 {
    chrono::Local::now().year()
}

pub(crate) fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

/// Everything a command needs to compute a view.
pub(crate) struct Context {
    pub data_dir: PathBuf,
    pub snapshot: Snapshot,
    pub taxonomy: Taxonomy,
}

impl Context {
    pub fn load(data_dir: Option<&str>, year: i32) -> Self {
        let settings = load_settings();
        let data_dir = resolve_data_dir(data_dir);
        let source = JsonDirSource::new(&data_dir);
        let snapshot = Snapshot::fetch(&source, year, settings.department_type.as_deref());
        Self {
            data_dir,
            snapshot,
            taxonomy: Taxonomy::new(&settings.taxonomy),
        }
    }
}

/// Build a selection from the shared `--year/--month/--department` options.
pub(crate) fn selection(
    year: Option<i32>,
    month: &Option<String>,
    department: Option<String>,
) -> Result<Selection> {
    let (month_year, month) = parse_month_opt(month)?;
    Selection::new(year.or(month_year).unwrap_or_else(current_year), month, department)
}

#[derive(Parser)]
#[command(name = "plangrid", about = "Annual planning reconciliation and progress reports.")]
pub struct Cli {
    /// Data directory holding the JSON collections (default: from settings)
    #[arg(long = "data-dir", global = true)]
    pub data_dir: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Save settings and create the data directory.
    Init,
    /// Write a sample data set to explore plangrid.
    Demo {
        /// Year to generate data for (default: current year)
        #[arg(long)]
        year: Option<i32>,
    },
    /// Generate reports.
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
    /// Export the grid to CSV or the full view to JSON.
    Export {
        #[command(subcommand)]
        command: ExportCommands,
    },
    /// Show every known department and whether it is reported.
    Departments {
        #[arg(long)]
        year: Option<i32>,
    },
    /// Show settings, data directory and record counts.
    Status {
        #[arg(long)]
        year: Option<i32>,
    },
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Month × department grid of target and current values.
    Grid {
        /// Year filter: YYYY
        #[arg(long)]
        year: Option<i32>,
        /// Month filter: M or YYYY-MM
        #[arg(long)]
        month: Option<String>,
        /// Department filter
        #[arg(long)]
        department: Option<String>,
    },
    /// Completion statistics per module and overall.
    Stats {
        #[arg(long)]
        year: Option<i32>,
    },
    /// Drill into one grid cell and list its contributing records.
    Cell {
        #[arg(long)]
        year: Option<i32>,
        /// Month: M or YYYY-MM
        #[arg(long)]
        month: String,
        #[arg(long)]
        department: String,
    },
    /// List one module's records with resolved department, month and status.
    Records {
        /// Module: department_targets, monthly_progress, major_events, action_plans, annual_plans
        module: String,
        #[arg(long)]
        year: Option<i32>,
    },
}

#[derive(Subcommand)]
pub enum ExportCommands {
    /// Export the grid to CSV.
    Grid {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        month: Option<String>,
        #[arg(long)]
        department: Option<String>,
        /// Output file path (default: <data_dir>/exports/grid-YYYY.csv)
        #[arg(long)]
        output: Option<String>,
    },
    /// Export grid, totals and statistics to JSON.
    View {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        month: Option<String>,
        #[arg(long)]
        department: Option<String>,
        /// Output file path (default: <data_dir>/exports/view-YYYY.json)
        #[arg(long)]
        output: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_month_opt() {
        assert_eq!(parse_month_opt(&None).unwrap(), (None, None));
        assert_eq!(parse_month_opt(&Some("3".into())).unwrap(), (None, Some(3)));
        assert_eq!(
            parse_month_opt(&Some("2025-03".into())).unwrap(),
            (Some(2025), Some(3))
        );
        assert!(parse_month_opt(&Some("2025-13".into())).is_err());
        assert!(parse_month_opt(&Some("March".into())).is_err());
        assert!(parse_month_opt(&Some("2025-03-01".into())).is_err());
    }

    #[test]
    fn test_selection_prefers_explicit_year() {
        let s = selection(Some(2024), &Some("2025-03".into()), None).unwrap();
        assert_eq!(s.year, 2024);
        assert_eq!(s.month, Some(3));
        let s = selection(None, &Some("2023-07".into()), Some("销售部".into())).unwrap();
        assert_eq!(s.year, 2023);
        assert_eq!(s.department.as_deref(), Some("销售部"));
        assert_eq!(selection(None, &None, None).unwrap().year, current_year());
    }

    #[test]
    fn test_cli_parses_global_data_dir() {
        let args = ["plangrid", "report", "grid", "--data-dir", "/tmp/x", "--month", "4"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.data_dir.as_deref(), Some("/tmp/x"));
        assert!(matches!(
            cli.command,
            Commands::Report { command: ReportCommands::Grid { .. } }
        ));
    }
}
