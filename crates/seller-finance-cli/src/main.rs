mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::deal::DealArgs;
use commands::payment::PaymentArgs;
use commands::scenario::ScenarioArgs;

/// Seller-financed real estate deal analysis
#[derive(Parser)]
#[command(
    name = "sfc",
    version,
    about = "Seller-financed real estate deal analysis",
    long_about = "A CLI for analyzing seller-financed real estate purchases with decimal \
                  precision. Computes first loan and seller note payments, balloon \
                  exposure, DSCR, cap rate, cash-on-cash return, LTV and a 0-100 deal \
                  score, and keeps named scenarios for side-by-side comparison."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log engine activity to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a deal: payments, balloons, DSCR, returns and deal score
    Analyze(DealArgs),
    /// First-year amortization schedules for both instruments
    Schedule(DealArgs),
    /// Monthly payment and remaining balance for a single loan
    Payment(PaymentArgs),
    /// Save, list, load and delete named scenarios
    Scenario(ScenarioArgs),
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
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Analyze(args) => commands::deal::run_analyze(args),
        Commands::Schedule(args) => commands::deal::run_schedule(args),
        Commands::Payment(args) => commands::payment::run_payment(args),
        Commands::Scenario(args) => commands::scenario::run_scenario(args),
        Commands::Version => {
            println!("sfc {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
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
