use chrono::{Local, NaiveDate};
use clap::{Args, ValueEnum};

use capital_advisor_core::report;
use capital_advisor_core::scenarios::simulator::{self, SimulationInput};
use capital_advisor_core::valuation::estimates::{self, ValuationInput};

use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ReportKind {
    Valuation,
    Scenario,
}

/// Arguments for markdown report export
#[derive(Args)]
pub struct ReportArgs {
    /// Which report to render
    #[arg(value_enum)]
    pub kind: ReportKind,

    /// Path to JSON input file (valuation or simulation input)
    #[arg(long)]
    pub input: Option<String>,

    /// Report date as YYYY-MM-DD (defaults to today)
    #[arg(long)]
    pub date: Option<String>,
}

pub fn run_report(args: ReportArgs) -> Result<String, Box<dyn std::error::Error>> {
    let data = if let Some(ref path) = args.input {
        input::file::read_json_value(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        return Err("--input file or piped JSON is required for reports".into());
    };

    let generated_on = match args.date {
        Some(ref d) => NaiveDate::parse_from_str(d, "%Y-%m-%d")
            .map_err(|e| format!("Invalid --date '{d}': {e}"))?,
        None => Local::now().date_naive(),
    };

    let markdown = match args.kind {
        ReportKind::Valuation => {
            let valuation_input: ValuationInput = serde_json::from_value(data)?;
            let valuation = estimates::calculate_valuation(&valuation_input)?;
            report::render_valuation_report(
                &valuation_input.snapshot,
                &valuation.result,
                generated_on,
            )
        }
        ReportKind::Scenario => {
            let sim_input: SimulationInput = serde_json::from_value(data)?;
            let result = simulator::run_simulation(&sim_input)?;
            report::render_scenario_report(&result.result, generated_on)
        }
    };

    Ok(markdown)
}
