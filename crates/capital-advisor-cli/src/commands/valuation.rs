use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use capital_advisor_core::valuation::dcf::{self, DcfInput, DcfParameters};
use capital_advisor_core::valuation::estimates::{self, ValuationInput};
use capital_advisor_core::valuation::wacc::{self, WaccInput};
use capital_advisor_core::{Industry, IndustryProfile};

use super::SnapshotArgs;
use crate::input;

/// CAPM and projection assumptions shared by valuation, dcf and wacc
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct ParameterArgs {
    /// Risk-free rate in percent (default 0.5)
    #[arg(long)]
    pub risk_free_rate: Option<Decimal>,

    /// Market risk premium in percent (default 6.0)
    #[arg(long, alias = "mrp")]
    pub market_risk_premium: Option<Decimal>,

    /// Pre-tax cost of debt in percent (default 2.0)
    #[arg(long)]
    pub cost_of_debt: Option<Decimal>,

    /// Corporate tax rate as a fraction (default 0.30)
    #[arg(long)]
    pub tax_rate: Option<Decimal>,
}

impl ParameterArgs {
    fn to_parameters(&self) -> DcfParameters {
        let defaults = DcfParameters::default();
        DcfParameters {
            risk_free_rate: self.risk_free_rate.unwrap_or(defaults.risk_free_rate),
            market_risk_premium: self
                .market_risk_premium
                .unwrap_or(defaults.market_risk_premium),
            cost_of_debt: self.cost_of_debt.unwrap_or(defaults.cost_of_debt),
            tax_rate: self.tax_rate.unwrap_or(defaults.tax_rate),
            ..defaults
        }
    }
}

/// Arguments for the multi-method valuation
#[derive(Args)]
pub struct ValuationArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub snapshot: SnapshotArgs,

    #[command(flatten)]
    pub parameters: ParameterArgs,
}

/// Arguments for the detailed DCF
#[derive(Args)]
pub struct DcfArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub snapshot: SnapshotArgs,

    #[command(flatten)]
    pub parameters: ParameterArgs,

    /// Projection years
    #[arg(long, default_value = "5")]
    pub years: u32,
}

/// Arguments for the standalone WACC
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct WaccArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Industry used for the default beta
    #[arg(long, default_value = "other")]
    pub industry: String,

    /// Explicit beta, overriding the industry beta
    #[arg(long)]
    pub beta: Option<Decimal>,

    /// Total assets (book value)
    #[arg(long)]
    pub total_assets: Option<Decimal>,

    /// Total liabilities (book value)
    #[arg(long)]
    pub total_liabilities: Option<Decimal>,

    #[command(flatten)]
    pub parameters: ParameterArgs,
}

pub fn run_valuation(args: ValuationArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let valuation_input: ValuationInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        ValuationInput {
            snapshot: args.snapshot.to_snapshot()?,
            profile: None,
            parameters: args.parameters.to_parameters(),
        }
    };

    let result = estimates::calculate_valuation(&valuation_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_dcf(args: DcfArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let dcf_input: DcfInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        DcfInput {
            snapshot: args.snapshot.to_snapshot()?,
            profile: None,
            parameters: DcfParameters {
                projection_years: args.years,
                ..args.parameters.to_parameters()
            },
        }
    };

    let result = dcf::calculate_dcf(&dcf_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_wacc(args: WaccArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let wacc_input: WaccInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        let industry: Industry = args.industry.parse()?;
        WaccInput {
            industry,
            beta: args.beta,
            total_assets: args
                .total_assets
                .ok_or("--total-assets is required (or provide --input)")?,
            total_liabilities: args
                .total_liabilities
                .ok_or("--total-liabilities is required (or provide --input)")?,
            parameters: args.parameters.to_parameters(),
        }
    };

    let result = wacc::calculate_wacc(&wacc_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_industries() -> Result<Value, Box<dyn std::error::Error>> {
    Ok(serde_json::to_value(IndustryProfile::table())?)
}
