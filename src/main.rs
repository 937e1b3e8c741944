mod cli;
mod dates;
mod departments;
mod error;
mod fmt;
mod grid;
mod indexer;
mod models;
mod pipeline;
mod settings;
mod source;
mod stats;
mod status;
mod totals;

use clap::Parser;

use cli::{Cli, Commands, ExportCommands, ReportCommands};

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let data_dir = cli.data_dir.as_deref();

    let result = match cli.command {
        Commands::Init => cli::init::run(data_dir),
        Commands::Demo { year } => cli::demo::run(data_dir, year),
        Commands::Report { command } => match command {
            ReportCommands::Grid {
                year,
                month,
                department,
            } => cli::report::grid(data_dir, year, month, department),
            ReportCommands::Stats { year } => cli::report::stats(data_dir, year),
            ReportCommands::Cell {
                year,
                month,
                department,
            } => cli::report::cell(data_dir, year, month, department),
            ReportCommands::Records { module, year } => {
                cli::report::records(data_dir, &module, year)
            }
        },
        Commands::Export { command } => match command {
            ExportCommands::Grid {
                year,
                month,
                department,
                output,
            } => cli::export::grid(data_dir, year, month, department, output).map(|_| ()),
            ExportCommands::View {
                year,
                month,
                department,
                output,
            } => cli::export::view(data_dir, year, month, department, output).map(|_| ()),
        },
        Commands::Departments { year } => cli::departments::run(data_dir, year),
        Commands::Status { year } => cli::status::run(data_dir, year),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
