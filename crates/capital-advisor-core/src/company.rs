use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::CapitalAdvisorError;
use crate::industry::Industry;
use crate::types::{Money, Percent, Rate};
use crate::CapitalAdvisorResult;

/// Margin assumed when revenue is zero and profit / revenue is undefined.
pub const FALLBACK_MARGIN: Rate = dec!(0.1);

/// One period of a private company's financials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialSnapshot {
    /// Annual revenue
    pub revenue: Money,
    /// Operating (ordinary) profit; may be negative
    pub operating_profit: Money,
    /// Total assets (book value)
    pub total_assets: Money,
    /// Total liabilities (book value)
    pub total_liabilities: Money,
    /// Annual depreciation and amortisation
    #[serde(default)]
    pub depreciation: Money,
    /// Year-over-year revenue growth, in percent
    #[serde(default)]
    pub growth_rate: Percent,
    #[serde(default)]
    pub industry: Industry,
}

impl FinancialSnapshot {
    /// Total assets less total liabilities. May be negative.
    pub fn net_assets(&self) -> Money {
        self.total_assets - self.total_liabilities
    }

    /// Operating profit plus depreciation.
    pub fn ebitda(&self) -> Money {
        self.operating_profit + self.depreciation
    }

    /// Operating margin, or [`FALLBACK_MARGIN`] when revenue is zero.
    pub fn profit_margin(&self) -> Rate {
        margin_or_fallback(self.operating_profit, self.revenue)
    }

    /// Reject inputs that make the valuation meaningless. Negative net
    /// assets and negative profit are valid.
    pub fn validate(&self) -> CapitalAdvisorResult<()> {
        let non_negative = [
            ("revenue", self.revenue),
            ("total_assets", self.total_assets),
            ("total_liabilities", self.total_liabilities),
            ("depreciation", self.depreciation),
        ];
        for (field, value) in non_negative {
            if value < Decimal::ZERO {
                return Err(CapitalAdvisorError::InvalidInput {
                    field: field.into(),
                    reason: format!("Must be non-negative, got {value}"),
                });
            }
        }
        Ok(())
    }
}

/// `profit / revenue`, substituting [`FALLBACK_MARGIN`] for zero revenue.
pub fn margin_or_fallback(profit: Money, revenue: Money) -> Rate {
    if revenue > Decimal::ZERO {
        profit / revenue
    } else {
        FALLBACK_MARGIN
    }
}
