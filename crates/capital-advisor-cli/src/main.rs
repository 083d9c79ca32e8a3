mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::report::ReportArgs;
use commands::scenarios::{CompareArgs, SimulateArgs};
use commands::valuation::{DcfArgs, ValuationArgs, WaccArgs};

/// Private-company valuation and funding scenario analysis
#[derive(Parser)]
#[command(
    name = "capadv",
    version,
    about = "Private-company valuation and funding scenario analysis",
    long_about = "Estimate what a private company is worth using PER, PBR, EBITDA multiple, \
                  year purchase, DCF and net asset methods, and compare how equity, debt \
                  or self funding changes the owner's stake over three years."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Value a company with every applicable method
    Valuation(ValuationArgs),
    /// Run the detailed DCF with sensitivity grid
    Dcf(DcfArgs),
    /// Derive WACC from CAPM and book capital structure
    Wacc(WaccArgs),
    /// Simulate one funding scenario over three years
    Simulate(SimulateArgs),
    /// Compare equity, debt and self funding
    Compare(CompareArgs),
    /// List default industry multiples and betas
    Industries,
    /// Render a markdown report
    Report(ReportArgs),
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

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Valuation(args) => commands::valuation::run_valuation(args),
        Commands::Dcf(args) => commands::valuation::run_dcf(args),
        Commands::Wacc(args) => commands::valuation::run_wacc(args),
        Commands::Simulate(args) => commands::scenarios::run_simulate(args),
        Commands::Compare(args) => commands::scenarios::run_compare(args),
        Commands::Industries => commands::valuation::run_industries(),
        Commands::Report(args) => match commands::report::run_report(args) {
            Ok(markdown) => {
                print!("{markdown}");
                return;
            }
            Err(e) => Err(e),
        },
        Commands::Version => {
            println!("capadv {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
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
