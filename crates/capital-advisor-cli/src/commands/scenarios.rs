use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;

use capital_advisor_core::scenarios::comparator::{self, ComparisonInput};
use capital_advisor_core::scenarios::outlook::GrowthOutlook;
use capital_advisor_core::scenarios::simulator::{
    self, ScenarioBaseline, ScenarioKind, ScenarioParameters, SimulationInput,
};
use capital_advisor_core::Industry;

use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KindArg {
    Equity,
    Debt,
    #[value(name = "self")]
    SelfFunded,
    Custom,
}

impl From<KindArg> for ScenarioKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Equity => ScenarioKind::EquityFunded,
            KindArg::Debt => ScenarioKind::DebtFunded,
            KindArg::SelfFunded => ScenarioKind::SelfFunded,
            KindArg::Custom => ScenarioKind::Custom,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutlookArg {
    Optimistic,
    Base,
    Pessimistic,
}

impl From<OutlookArg> for GrowthOutlook {
    fn from(outlook: OutlookArg) -> Self {
        match outlook {
            OutlookArg::Optimistic => GrowthOutlook::Optimistic,
            OutlookArg::Base => GrowthOutlook::Base,
            OutlookArg::Pessimistic => GrowthOutlook::Pessimistic,
        }
    }
}

/// Baseline and growth flags shared by simulate and compare
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct GrowthArgs {
    /// Current annual revenue
    #[arg(long)]
    pub revenue: Option<Decimal>,

    /// Current operating profit
    #[arg(long)]
    pub profit: Option<Decimal>,

    /// Comma-separated growth for years 1..3 in percent (e.g. 15,12,10)
    #[arg(long, value_delimiter = ',')]
    pub growth: Option<Vec<Decimal>>,

    /// Base growth rate in percent, expanded with --outlook
    #[arg(long)]
    pub growth_rate: Option<Decimal>,

    /// Outlook used to expand --growth-rate
    #[arg(long, value_enum, default_value = "base")]
    pub outlook: OutlookArg,

    /// Earnings multiple; defaults to the industry PER
    #[arg(long)]
    pub pe_multiple: Option<Decimal>,

    /// Industry for the default earnings multiple
    #[arg(long, default_value = "other")]
    pub industry: String,

    /// Amount raised
    #[arg(long, default_value = "0")]
    pub funding: Decimal,
}

impl GrowthArgs {
    fn baseline(&self) -> Result<ScenarioBaseline, Box<dyn std::error::Error>> {
        Ok(ScenarioBaseline {
            revenue: self
                .revenue
                .ok_or("--revenue is required (or provide --input)")?,
            profit: self
                .profit
                .ok_or("--profit is required (or provide --input)")?,
        })
    }

    fn growth_rates(&self) -> Result<[Decimal; 3], Box<dyn std::error::Error>> {
        if let Some(ref rates) = self.growth {
            return match rates.as_slice() {
                [y1, y2, y3] => Ok([*y1, *y2, *y3]),
                _ => Err("--growth takes exactly three rates".into()),
            };
        }
        let base = self
            .growth_rate
            .ok_or("--growth or --growth-rate is required (or provide --input)")?;
        Ok(GrowthOutlook::from(self.outlook).growth_rates(base))
    }

    fn pe_multiple(&self) -> Result<Decimal, Box<dyn std::error::Error>> {
        match self.pe_multiple {
            Some(pe) => Ok(pe),
            None => {
                let industry: Industry = self.industry.parse()?;
                Ok(industry.profile().per)
            }
        }
    }
}

/// Arguments for a single scenario simulation
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct SimulateArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Funding route
    #[arg(long, value_enum, default_value = "equity")]
    pub kind: KindArg,

    #[command(flatten)]
    pub growth: GrowthArgs,

    /// Owner dilution at year 1 in percent
    #[arg(long)]
    pub dilution: Option<Decimal>,

    /// Annual loan rate in percent
    #[arg(long)]
    pub interest_rate: Option<Decimal>,

    /// Margin improvement in points per year
    #[arg(long, default_value = "1")]
    pub margin_improvement: Decimal,
}

/// Arguments for the three-way comparison
#[derive(Args)]
pub struct CompareArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub growth: GrowthArgs,
}

pub fn run_simulate(args: SimulateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let sim_input: SimulationInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        let kind = ScenarioKind::from(args.kind);
        let mut parameters = ScenarioParameters::for_kind(
            kind,
            args.growth.funding,
            args.growth.growth_rates()?,
            args.growth.pe_multiple()?,
        );
        if let Some(dilution) = args.dilution {
            parameters.dilution_percent = dilution;
        }
        if let Some(rate) = args.interest_rate {
            parameters.interest_rate = rate;
        }
        parameters.margin_improvement_per_year = args.margin_improvement;
        SimulationInput {
            baseline: args.growth.baseline()?,
            parameters,
        }
    };

    let result = simulator::run_simulation(&sim_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_compare(args: CompareArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let comparison_input: ComparisonInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        ComparisonInput {
            baseline: args.growth.baseline()?,
            yearly_growth_rates: args.growth.growth_rates()?,
            pe_multiple: args.growth.pe_multiple()?,
            funding_amount: args.growth.funding,
        }
    };

    let result = comparator::compare_scenarios(&comparison_input)?;
    Ok(serde_json::to_value(result)?)
}
