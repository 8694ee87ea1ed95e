mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::analysis::{AnalyzeArgs, CashFlowArgs};
use commands::financing::{PaymentArgs, ScheduleArgs};
use commands::income::RentRollArgs;

/// Rental property cash flow and return-on-investment calculator
#[derive(Parser)]
#[command(
    name = "rroi",
    version,
    about = "Rental property cash flow and first-year ROI",
    long_about = "A CLI for evaluating a rental property purchase with decimal precision. \
                  Computes mortgage payments and amortisation schedules, totals a rent \
                  roll, and breaks first-year return into cash flow, principal paydown \
                  and appreciation."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log debug diagnostics to stderr (overrides RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Fixed-rate monthly mortgage payment
    Payment(PaymentArgs),
    /// Month-by-month amortisation schedule
    Schedule(ScheduleArgs),
    /// Total monthly rent from per-unit-type rents and unit counts
    RentRoll(RentRollArgs),
    /// Monthly cash flow after debt service and operating expenses
    CashFlow(CashFlowArgs),
    /// Full analysis: cash flow, first-year ROI, cap rate and leverage
    Analyze(AnalyzeArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Payment(args) => commands::financing::run_payment(args),
        Commands::Schedule(args) => commands::financing::run_schedule(args),
        Commands::RentRoll(args) => commands::income::run_rent_roll(args),
        Commands::CashFlow(args) => commands::analysis::run_cash_flow(args),
        Commands::Analyze(args) => commands::analysis::run_analyze(args),
        Commands::Version => {
            println!("rroi {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            if let Some(serde_json::Value::Array(warnings)) = value.get("warnings") {
                for w in warnings.iter().filter_map(|w| w.as_str()) {
                    tracing::debug!(warning = w, "computation warning");
                }
            }
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
