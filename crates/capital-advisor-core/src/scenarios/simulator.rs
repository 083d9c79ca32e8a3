use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::company::{margin_or_fallback, FinancialSnapshot};
use crate::error::CapitalAdvisorError;
use crate::scenarios::{checked_add, checked_mul, growth_factor};
use crate::types::{pct_change, with_metadata, ComputationOutput, Money, Multiple, Percent, Rate};
use crate::CapitalAdvisorResult;

/// Owner's starting stake.
const FULL_OWNERSHIP: Percent = dec!(100);
/// Placement fee on an equity raise.
const EQUITY_ISSUE_COST: Rate = dec!(0.05);
/// Arrangement fee on a bank loan.
const LOAN_ARRANGEMENT_COST: Rate = dec!(0.02);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// How the growth plan is financed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    /// Venture / equity raise; dilutes the owner once at year 1
    #[serde(alias = "vc", alias = "equity")]
    EquityFunded,
    /// Bank loan; flat interest charged every year
    #[serde(alias = "bank", alias = "debt")]
    DebtFunded,
    /// Organic growth with no outside money
    #[serde(alias = "self")]
    SelfFunded,
    Custom,
}

impl ScenarioKind {
    /// Dilution assumed when the caller does not specify one.
    pub fn default_dilution(self) -> Percent {
        match self {
            ScenarioKind::EquityFunded | ScenarioKind::Custom => dec!(20),
            ScenarioKind::DebtFunded | ScenarioKind::SelfFunded => Decimal::ZERO,
        }
    }

    /// Loan rate assumed when the caller does not specify one.
    pub fn default_interest_rate(self) -> Percent {
        match self {
            ScenarioKind::DebtFunded => dec!(2.0),
            _ => Decimal::ZERO,
        }
    }

    /// One-off cost of raising `funding_amount`; reported, not deducted.
    pub fn upfront_cost(self, funding_amount: Money) -> Money {
        match self {
            ScenarioKind::EquityFunded => funding_amount * EQUITY_ISSUE_COST,
            ScenarioKind::DebtFunded => funding_amount * LOAN_ARRANGEMENT_COST,
            ScenarioKind::SelfFunded | ScenarioKind::Custom => Decimal::ZERO,
        }
    }
}

impl std::fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScenarioKind::EquityFunded => write!(f, "Equity funded"),
            ScenarioKind::DebtFunded => write!(f, "Debt funded"),
            ScenarioKind::SelfFunded => write!(f, "Self funded"),
            ScenarioKind::Custom => write!(f, "Custom"),
        }
    }
}

/// Starting point of a simulation: the company today.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioBaseline {
    pub revenue: Money,
    pub profit: Money,
}

impl From<&FinancialSnapshot> for ScenarioBaseline {
    fn from(snapshot: &FinancialSnapshot) -> Self {
        Self {
            revenue: snapshot.revenue,
            profit: snapshot.operating_profit,
        }
    }
}

impl ScenarioBaseline {
    /// Profit / revenue, or the 10% fallback when revenue is zero.
    pub fn margin(&self) -> Rate {
        margin_or_fallback(self.profit, self.revenue)
    }
}

/// Assumptions for one funding scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioParameters {
    pub kind: ScenarioKind,
    #[serde(default)]
    pub funding_amount: Money,
    /// Owner dilution at year 1, in percent
    #[serde(default)]
    pub dilution_percent: Percent,
    /// Annual loan rate in percent; only charged for debt-funded scenarios
    #[serde(default)]
    pub interest_rate: Percent,
    /// Revenue growth for years 1, 2 and 3, in percent
    pub yearly_growth_rates: [Percent; 3],
    /// Margin improvement in percentage points per year
    #[serde(default)]
    pub margin_improvement_per_year: Percent,
    /// Earnings multiple used to value the company each year
    pub pe_multiple: Multiple,
}

impl ScenarioParameters {
    /// Parameters with the kind's default dilution and interest rate.
    /// Self-funded scenarios never carry a funding amount.
    pub fn for_kind(
        kind: ScenarioKind,
        funding_amount: Money,
        yearly_growth_rates: [Percent; 3],
        pe_multiple: Multiple,
    ) -> Self {
        Self {
            kind,
            funding_amount: if kind == ScenarioKind::SelfFunded {
                Decimal::ZERO
            } else {
                funding_amount
            },
            dilution_percent: kind.default_dilution(),
            interest_rate: kind.default_interest_rate(),
            yearly_growth_rates,
            margin_improvement_per_year: Decimal::ONE,
            pe_multiple,
        }
    }

    fn annual_interest(&self) -> CapitalAdvisorResult<Money> {
        if self.kind == ScenarioKind::DebtFunded {
            checked_mul(
                "annual interest",
                self.funding_amount,
                self.interest_rate / Decimal::ONE_HUNDRED,
            )
        } else {
            Ok(Decimal::ZERO)
        }
    }
}

/// Input for a single scenario simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationInput {
    pub baseline: ScenarioBaseline,
    pub parameters: ScenarioParameters,
}

/// One year of the simulation. Year 0 is the unmodified baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearProjection {
    pub year: u32,
    pub revenue: Money,
    pub profit: Money,
    /// Modelled margin before interest
    pub profit_margin: Rate,
    pub company_value: Money,
    pub owner_equity_percent: Percent,
    pub owner_value: Money,
}

/// Final year compared with year 0. Percent changes are `None` when the
/// baseline figure is zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSummary {
    pub revenue_change_pct: Option<Percent>,
    pub company_value_change_pct: Option<Percent>,
    /// Change in owner stake, in percentage points
    pub owner_equity_change: Percent,
    pub owner_value_change_pct: Option<Percent>,
}

/// Output of a scenario simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub parameters: ScenarioParameters,
    /// Years 0 through 3
    pub projections: Vec<YearProjection>,
    /// Annual interest deducted from profit (debt-funded only)
    pub annual_interest: Money,
    /// One-off fundraising cost, informational
    pub upfront_cost: Money,
    pub summary: ScenarioSummary,
}

impl ScenarioResult {
    pub fn final_year(&self) -> Option<&YearProjection> {
        self.projections.last()
    }
}

/// Values carried from one simulated year to the next.
#[derive(Debug, Clone, Copy)]
struct Carry {
    revenue: Money,
    owner_equity_percent: Percent,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Simulate one funding scenario over years 0..=3.
pub fn run_simulation(
    input: &SimulationInput,
) -> CapitalAdvisorResult<ComputationOutput<ScenarioResult>> {
    simulate(&input.baseline, &input.parameters)
}

/// Project revenue, profit, company value and owner value year by year.
///
/// Revenue compounds from the previous year's figure; dilution happens once
/// at year 1; debt-funded scenarios pay flat, non-amortising interest in
/// every projected year. Negative profit and value are valid results.
pub fn simulate(
    baseline: &ScenarioBaseline,
    params: &ScenarioParameters,
) -> CapitalAdvisorResult<ComputationOutput<ScenarioResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate(baseline, params, &mut warnings)?;

    let baseline_margin = baseline.margin();
    if baseline.revenue.is_zero() {
        warnings.push("Baseline revenue is zero; margin falls back to 10%".into());
    }
    let annual_interest = params.annual_interest()?;
    let dilution_factor = Decimal::ONE - params.dilution_percent / Decimal::ONE_HUNDRED;

    let opening_value = checked_mul("company value", baseline.profit, params.pe_multiple)?;
    let year0 = YearProjection {
        year: 0,
        revenue: baseline.revenue,
        profit: baseline.profit,
        profit_margin: baseline_margin,
        company_value: opening_value,
        owner_equity_percent: FULL_OWNERSHIP,
        owner_value: opening_value,
    };
    let opening = Carry {
        revenue: baseline.revenue,
        owner_equity_percent: FULL_OWNERSHIP,
    };

    let (_, projections) = params.yearly_growth_rates.iter().zip(1u32..).try_fold(
        (opening, vec![year0]),
        |(carry, mut rows), (growth, year)| -> CapitalAdvisorResult<(Carry, Vec<YearProjection>)> {
            let revenue = checked_mul("revenue", carry.revenue, growth_factor(*growth)?)?;
            let improvement = checked_mul(
                "margin improvement",
                params.margin_improvement_per_year / Decimal::ONE_HUNDRED,
                Decimal::from(year),
            )?;
            let profit_margin = checked_add("profit margin", baseline_margin, improvement)?;
            let profit = checked_add(
                "profit",
                checked_mul("profit", revenue, profit_margin)?,
                -annual_interest,
            )?;
            let company_value = checked_mul("company value", profit, params.pe_multiple)?;

            let owner_equity_percent = if year == 1 && params.dilution_percent > Decimal::ZERO {
                carry.owner_equity_percent * dilution_factor
            } else {
                carry.owner_equity_percent
            };
            let owner_value = checked_mul(
                "owner value",
                company_value,
                owner_equity_percent / Decimal::ONE_HUNDRED,
            )?;

            rows.push(YearProjection {
                year,
                revenue,
                profit,
                profit_margin,
                company_value,
                owner_equity_percent,
                owner_value,
            });
            Ok((
                Carry {
                    revenue,
                    owner_equity_percent,
                },
                rows,
            ))
        },
    )?;

    let summary = summarise(&projections);
    if let Some(last) = projections.last() {
        if last.owner_value < Decimal::ZERO {
            warnings.push(format!(
                "Owner value is negative by year {} ({})",
                last.year, last.owner_value
            ));
        }
    }

    let output = ScenarioResult {
        parameters: params.clone(),
        projections,
        annual_interest,
        upfront_cost: params.kind.upfront_cost(params.funding_amount),
        summary,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "3-year funding scenario simulation (earnings multiple)",
        &serde_json::json!({
            "baseline": baseline,
            "scenario": params.kind,
            "baseline_margin": baseline_margin.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn validate(
    baseline: &ScenarioBaseline,
    params: &ScenarioParameters,
    warnings: &mut Vec<String>,
) -> CapitalAdvisorResult<()> {
    if baseline.revenue < Decimal::ZERO {
        return Err(CapitalAdvisorError::InvalidInput {
            field: "baseline.revenue".into(),
            reason: "Revenue cannot be negative".into(),
        });
    }
    if params.funding_amount < Decimal::ZERO {
        return Err(CapitalAdvisorError::InvalidInput {
            field: "funding_amount".into(),
            reason: "Funding amount cannot be negative".into(),
        });
    }
    if params.dilution_percent < Decimal::ZERO || params.dilution_percent > Decimal::ONE_HUNDRED {
        return Err(CapitalAdvisorError::InvalidInput {
            field: "dilution_percent".into(),
            reason: "Dilution must be between 0 and 100".into(),
        });
    }
    if params.interest_rate < Decimal::ZERO {
        return Err(CapitalAdvisorError::InvalidInput {
            field: "interest_rate".into(),
            reason: "Interest rate cannot be negative".into(),
        });
    }

    if params.kind != ScenarioKind::DebtFunded && !params.interest_rate.is_zero() {
        warnings.push(format!(
            "Interest rate ignored for {} scenario",
            params.kind
        ));
    }
    if params.kind == ScenarioKind::SelfFunded && params.dilution_percent > Decimal::ZERO {
        warnings.push("Self-funded scenario carries dilution; owner stake is reduced".into());
    }
    if params.pe_multiple <= Decimal::ZERO {
        warnings.push(format!(
            "Non-positive earnings multiple ({}); company values will not be meaningful",
            params.pe_multiple
        ));
    }
    Ok(())
}

fn summarise(projections: &[YearProjection]) -> ScenarioSummary {
    match (projections.first(), projections.last()) {
        (Some(first), Some(last)) => ScenarioSummary {
            revenue_change_pct: pct_change(first.revenue, last.revenue),
            company_value_change_pct: pct_change(first.company_value, last.company_value),
            owner_equity_change: last.owner_equity_percent - first.owner_equity_percent,
            owner_value_change_pct: pct_change(first.owner_value, last.owner_value),
        },
        _ => ScenarioSummary {
            revenue_change_pct: None,
            company_value_change_pct: None,
            owner_equity_change: Decimal::ZERO,
            owner_value_change_pct: None,
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn baseline() -> ScenarioBaseline {
        ScenarioBaseline {
            revenue: dec!(500),
            profit: dec!(50),
        }
    }

    fn equity_params() -> ScenarioParameters {
        ScenarioParameters {
            kind: ScenarioKind::EquityFunded,
            funding_amount: dec!(100),
            dilution_percent: dec!(20),
            interest_rate: Decimal::ZERO,
            yearly_growth_rates: [dec!(15), dec!(12), dec!(10)],
            margin_improvement_per_year: dec!(1),
            pe_multiple: dec!(15),
        }
    }

    #[test]
    fn test_equity_funded_year1() {
        let result = simulate(&baseline(), &equity_params()).unwrap();
        let y1 = &result.result.projections[1];
        assert_eq!(y1.revenue, dec!(575));
        assert_eq!(y1.profit_margin, dec!(0.11));
        assert_eq!(y1.profit, dec!(63.25));
        assert_eq!(y1.company_value, dec!(948.75));
        assert_eq!(y1.owner_equity_percent, dec!(80));
        assert_eq!(y1.owner_value, dec!(759.0));
    }

    #[test]
    fn test_year0_is_baseline() {
        let result = simulate(&baseline(), &equity_params()).unwrap();
        let y0 = &result.result.projections[0];
        assert_eq!(y0.year, 0);
        assert_eq!(y0.revenue, dec!(500));
        assert_eq!(y0.profit, dec!(50));
        assert_eq!(y0.owner_equity_percent, dec!(100));
        assert_eq!(y0.company_value, dec!(750));
        assert_eq!(y0.owner_value, dec!(750));
    }

    #[test]
    fn test_revenue_compounds_from_previous_year() {
        let result = simulate(&baseline(), &equity_params()).unwrap();
        let p = &result.result.projections;
        assert_eq!(p.len(), 4);
        assert_eq!(p[2].revenue, dec!(575) * dec!(1.12));
        assert_eq!(p[3].revenue, dec!(575) * dec!(1.12) * dec!(1.10));
        // Margin improves by one point per year from the baseline
        assert_eq!(p[3].profit_margin, dec!(0.13));
    }

    #[test]
    fn test_dilution_applies_once() {
        let result = simulate(&baseline(), &equity_params()).unwrap();
        let equity: Vec<Decimal> = result
            .result
            .projections
            .iter()
            .map(|p| p.owner_equity_percent)
            .collect();
        assert_eq!(equity, vec![dec!(100), dec!(80), dec!(80), dec!(80)]);
        assert_eq!(result.result.summary.owner_equity_change, dec!(-20));
    }

    #[test]
    fn test_self_funded_keeps_full_ownership() {
        let params = ScenarioParameters::for_kind(
            ScenarioKind::SelfFunded,
            dec!(100),
            [dec!(7.5), dec!(6), dec!(5)],
            dec!(15),
        );
        assert_eq!(params.funding_amount, Decimal::ZERO);
        let result = simulate(&baseline(), &params).unwrap();
        assert!(result
            .result
            .projections
            .iter()
            .all(|p| p.owner_equity_percent == dec!(100)));
        assert_eq!(result.result.upfront_cost, Decimal::ZERO);
    }

    #[test]
    fn test_debt_funded_flat_interest() {
        let params = ScenarioParameters {
            kind: ScenarioKind::DebtFunded,
            funding_amount: dec!(100),
            dilution_percent: Decimal::ZERO,
            interest_rate: dec!(2.0),
            yearly_growth_rates: [dec!(12), dec!(9.6), dec!(8)],
            margin_improvement_per_year: dec!(1),
            pe_multiple: dec!(15),
        };
        let result = simulate(&baseline(), &params).unwrap();
        let out = &result.result;
        assert_eq!(out.annual_interest, dec!(2));
        // Year 1: 560 * 0.11 - 2 = 59.6
        assert_eq!(out.projections[1].revenue, dec!(560));
        assert_eq!(out.projections[1].profit, dec!(59.6));
        // Interest is charged every projected year
        for p in &out.projections[1..] {
            assert_eq!(p.profit, p.revenue * p.profit_margin - dec!(2));
        }
        assert_eq!(out.upfront_cost, dec!(2));
    }

    #[test]
    fn test_interest_ignored_outside_debt() {
        let mut params = equity_params();
        params.interest_rate = dec!(5);
        let result = simulate(&baseline(), &params).unwrap();
        assert_eq!(result.result.annual_interest, Decimal::ZERO);
        assert_eq!(result.result.projections[1].profit, dec!(63.25));
        assert!(result.warnings.iter().any(|w| w.contains("Interest rate ignored")));
    }

    #[test]
    fn test_negative_profit_propagates() {
        let base = ScenarioBaseline {
            revenue: dec!(100),
            profit: dec!(-20),
        };
        let mut params = equity_params();
        params.margin_improvement_per_year = Decimal::ZERO;
        let result = simulate(&base, &params).unwrap();
        let last = result.result.final_year().unwrap();
        assert!(last.profit < Decimal::ZERO);
        assert!(last.company_value < Decimal::ZERO);
        assert!(last.owner_value < Decimal::ZERO);
    }

    #[test]
    fn test_summary_changes() {
        let result = simulate(&baseline(), &equity_params()).unwrap();
        let s = &result.result.summary;
        // 500 -> 708.4 = +41.68%
        let expected = (dec!(575) * dec!(1.12) * dec!(1.10) - dec!(500)) / dec!(500) * dec!(100);
        assert_eq!(s.revenue_change_pct, Some(expected));
    }

    #[test]
    fn test_zero_baseline_profit_has_no_value_change_pct() {
        let base = ScenarioBaseline {
            revenue: dec!(100),
            profit: Decimal::ZERO,
        };
        let result = simulate(&base, &equity_params()).unwrap();
        assert!(result.result.summary.owner_value_change_pct.is_none());
    }

    #[test]
    fn test_invalid_dilution_rejected() {
        let mut params = equity_params();
        params.dilution_percent = dec!(120);
        assert!(simulate(&baseline(), &params).is_err());
    }

    #[test]
    fn test_overflow_is_an_error() {
        let base = ScenarioBaseline {
            revenue: dec!(1_000_000_000_000_000_000_000_000_000),
            profit: dec!(100_000_000_000_000_000_000_000_000),
        };
        let mut params = equity_params();
        params.yearly_growth_rates = [dec!(900), dec!(900), dec!(900)];
        match simulate(&base, &params) {
            Err(CapitalAdvisorError::FinancialImpossibility(msg)) => {
                assert!(msg.contains("overflows"));
            }
            other => panic!("expected FinancialImpossibility, got {other:?}"),
        }
    }

    #[test]
    fn test_deterministic() {
        let a = simulate(&baseline(), &equity_params()).unwrap();
        let b = simulate(&baseline(), &equity_params()).unwrap();
        assert_eq!(a.result, b.result);
    }
}
