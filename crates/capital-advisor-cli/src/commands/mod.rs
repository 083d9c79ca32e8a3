pub mod report;
pub mod scenarios;
pub mod valuation;

use clap::Args;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use capital_advisor_core::{FinancialSnapshot, Industry};

/// Company financials shared by the valuation commands
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct SnapshotArgs {
    /// Annual revenue
    #[arg(long)]
    pub revenue: Option<Decimal>,

    /// Operating profit (may be negative)
    #[arg(long)]
    pub profit: Option<Decimal>,

    /// Total assets (defaults to 1.2x revenue)
    #[arg(long)]
    pub total_assets: Option<Decimal>,

    /// Total liabilities (defaults to 0.5x revenue)
    #[arg(long)]
    pub total_liabilities: Option<Decimal>,

    /// Annual depreciation (defaults to 5% of revenue)
    #[arg(long)]
    pub depreciation: Option<Decimal>,

    /// Year-over-year growth in percent (e.g. 10 for 10%)
    #[arg(long, default_value = "0")]
    pub growth_rate: Decimal,

    /// Industry, e.g. manufacturing, it_software, healthcare
    #[arg(long, default_value = "other")]
    pub industry: String,
}

impl SnapshotArgs {
    pub fn to_snapshot(&self) -> Result<FinancialSnapshot, Box<dyn std::error::Error>> {
        let revenue = self
            .revenue
            .ok_or("--revenue is required (or provide --input)")?;
        let operating_profit = self
            .profit
            .ok_or("--profit is required (or provide --input)")?;
        let industry: Industry = self.industry.parse()?;
        Ok(FinancialSnapshot {
            revenue,
            operating_profit,
            total_assets: self.total_assets.unwrap_or(revenue * dec!(1.2)),
            total_liabilities: self.total_liabilities.unwrap_or(revenue * dec!(0.5)),
            depreciation: self.depreciation.unwrap_or(revenue * dec!(0.05)),
            growth_rate: self.growth_rate,
            industry,
        })
    }
}
