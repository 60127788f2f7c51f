mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::check::{CheckArgs, QuickCheckArgs};
use commands::compare::CompareArgs;
use commands::config::ValidateConfigArgs;
use commands::floor::{FloorArgs, InstallationArgs, WeightedArgs};
use commands::revenue::{MarginArgs, RevenueArgs, SimpleMarginArgs};

/// Broadband floor price validation
#[derive(Parser)]
#[command(
    name = "fpv",
    version,
    about = "Broadband floor price validation",
    long_about = "Computes the minimum acceptable monthly price for a broadband package \
                  (speed, installation distance, equipment, contract length, fixed IP) \
                  and checks a proposed sales price against it after discount and the \
                  regulator fee."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Pricing configuration file (JSON or YAML); compiled-in default when omitted
    #[arg(long, global = true)]
    config: Option<String>,

    /// Log pipeline stages to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Floor price for existing customers, with the full breakdown
    Floor(FloorArgs),
    /// Installation cost for a distance
    Installation(InstallationArgs),
    /// Existing, new and weighted floors for a customer mix
    Weighted(WeightedArgs),
    /// Net revenue after discount and regulator fee
    Revenue(RevenueArgs),
    /// Margin of net revenue over a floor
    Margin(MarginArgs),
    /// Markup of a proposed price over a floor (legacy)
    SimpleMargin(SimpleMarginArgs),
    /// Weighted floors for every catalog speed
    Compare(CompareArgs),
    /// Full price check against existing, new and weighted floors
    Check(CheckArgs),
    /// Proposed price against the existing-customer floor only
    QuickCheck(QuickCheckArgs),
    /// Print the pricing configuration in effect
    ShowConfig,
    /// Validate a pricing configuration file
    ValidateConfig(ValidateConfigArgs),
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

fn init_logging(verbose: bool) {
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

fn run(cli: &Cli) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let config = || input::config::load_config(cli.config.as_deref());

    match &cli.command {
        Commands::Floor(args) => commands::floor::run_floor(args, config()?.as_ref()),
        Commands::Installation(args) => {
            commands::floor::run_installation(args, config()?.as_ref())
        }
        Commands::Weighted(args) => commands::floor::run_weighted(args, config()?.as_ref()),
        Commands::Revenue(args) => commands::revenue::run_revenue(args),
        Commands::Margin(args) => commands::revenue::run_margin(args),
        Commands::SimpleMargin(args) => commands::revenue::run_simple_margin(args),
        Commands::Compare(args) => commands::compare::run_compare(args, config()?.as_ref()),
        Commands::Check(args) => commands::check::run_check(args, config()?.as_ref()),
        Commands::QuickCheck(args) => commands::check::run_quick_check(args, config()?.as_ref()),
        Commands::ShowConfig => commands::config::run_show_config(config()?.as_ref()),
        Commands::ValidateConfig(args) => commands::config::run_validate_config(args),
        Commands::Version => Ok(serde_json::json!({ "version": env!("CARGO_PKG_VERSION") })),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
