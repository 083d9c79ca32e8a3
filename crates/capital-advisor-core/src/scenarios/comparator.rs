use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::CapitalAdvisorError;
use crate::scenarios::simulator::{ScenarioBaseline, ScenarioKind};
use crate::scenarios::{checked_mul, growth_factor};
use crate::types::{with_metadata, ComputationOutput, Money, Multiple, Percent};
use crate::CapitalAdvisorResult;

/// A preset in the fixed comparison order.
struct Preset {
    kind: ScenarioKind,
    dilution_percent: Percent,
    growth_scale: Decimal,
    raises_funding: bool,
}

const PRESETS: [Preset; 3] = [
    Preset {
        kind: ScenarioKind::EquityFunded,
        dilution_percent: dec!(20),
        growth_scale: Decimal::ONE,
        raises_funding: true,
    },
    Preset {
        kind: ScenarioKind::DebtFunded,
        dilution_percent: Decimal::ZERO,
        growth_scale: dec!(0.8),
        raises_funding: true,
    },
    Preset {
        kind: ScenarioKind::SelfFunded,
        dilution_percent: Decimal::ZERO,
        growth_scale: dec!(0.5),
        raises_funding: false,
    },
];

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonInput {
    pub baseline: ScenarioBaseline,
    /// Growth for years 1, 2 and 3 under the equity-funded plan, in percent
    pub yearly_growth_rates: [Percent; 3],
    pub pe_multiple: Multiple,
    /// Shown on the equity and debt rows; does not affect values
    #[serde(default)]
    pub funding_amount: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub scenario: ScenarioKind,
    pub funding_amount: Money,
    pub dilution_percent: Percent,
    pub growth_rates: [Percent; 3],
    pub final_revenue: Money,
    pub final_profit: Money,
    pub company_value: Money,
    pub owner_equity_percent: Percent,
    pub final_owner_value: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonOutput {
    /// Always equity, debt, self in that order
    pub rows: Vec<ComparisonRow>,
    pub best_scenario: ScenarioKind,
    pub best_owner_value: Money,
}

impl ComparisonOutput {
    pub fn row(&self, kind: ScenarioKind) -> Option<&ComparisonRow> {
        self.rows.iter().find(|r| r.scenario == kind)
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Rank the three canonical funding presets by third-year owner value.
///
/// Each preset compounds its (scaled) growth rates into a single year-3
/// revenue and applies the baseline margin unchanged; no margin improvement
/// or interest is modelled. Ties go to the earlier preset.
pub fn compare_scenarios(
    input: &ComparisonInput,
) -> CapitalAdvisorResult<ComputationOutput<ComparisonOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let baseline = &input.baseline;
    if baseline.revenue < Decimal::ZERO {
        return Err(CapitalAdvisorError::InvalidInput {
            field: "baseline.revenue".into(),
            reason: "Revenue cannot be negative".into(),
        });
    }
    if input.funding_amount < Decimal::ZERO {
        return Err(CapitalAdvisorError::InvalidInput {
            field: "funding_amount".into(),
            reason: "Funding amount cannot be negative".into(),
        });
    }
    if baseline.revenue.is_zero() {
        warnings.push("Baseline revenue is zero; every scenario ends at zero value".into());
    }

    let margin = baseline.margin();
    let rows: Vec<ComparisonRow> = PRESETS
        .iter()
        .map(|preset| project_preset(preset, input, margin))
        .collect::<CapitalAdvisorResult<_>>()?;

    let best = rows
        .iter()
        .skip(1)
        .fold(&rows[0], |best, row| {
            if row.final_owner_value > best.final_owner_value {
                row
            } else {
                best
            }
        });
    let best_scenario = best.scenario;
    let best_owner_value = best.final_owner_value;

    if best_owner_value <= Decimal::ZERO {
        warnings.push("No scenario yields a positive owner value".into());
    }

    let output = ComparisonOutput {
        rows,
        best_scenario,
        best_owner_value,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Three-preset funding comparison (aggregate 3-year projection)",
        &serde_json::json!({
            "baseline": baseline,
            "yearly_growth_rates": input.yearly_growth_rates,
            "pe_multiple": input.pe_multiple.to_string(),
            "baseline_margin": margin.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn project_preset(
    preset: &Preset,
    input: &ComparisonInput,
    margin: Decimal,
) -> CapitalAdvisorResult<ComparisonRow> {
    let growth_rates = input.yearly_growth_rates.map(|g| g * preset.growth_scale);
    let final_revenue = growth_rates
        .iter()
        .try_fold(input.baseline.revenue, |revenue, g| {
            checked_mul("revenue", revenue, growth_factor(*g)?)
        })?;
    let final_profit = checked_mul("profit", final_revenue, margin)?;
    let company_value = checked_mul("company value", final_profit, input.pe_multiple)?;
    let owner_equity_percent = Decimal::ONE_HUNDRED - preset.dilution_percent;
    let final_owner_value = checked_mul(
        "owner value",
        company_value,
        owner_equity_percent / Decimal::ONE_HUNDRED,
    )?;

    Ok(ComparisonRow {
        scenario: preset.kind,
        funding_amount: if preset.raises_funding {
            input.funding_amount
        } else {
            Decimal::ZERO
        },
        dilution_percent: preset.dilution_percent,
        growth_rates,
        final_revenue,
        final_profit,
        company_value,
        owner_equity_percent,
        final_owner_value,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn input(growth: [Decimal; 3]) -> ComparisonInput {
        ComparisonInput {
            baseline: ScenarioBaseline {
                revenue: dec!(500),
                profit: dec!(50),
            },
            yearly_growth_rates: growth,
            pe_multiple: dec!(15),
            funding_amount: dec!(100),
        }
    }

    #[test]
    fn test_rows_in_fixed_order() {
        let out = compare_scenarios(&input([dec!(15), dec!(12), dec!(10)])).unwrap();
        let kinds: Vec<ScenarioKind> = out.result.rows.iter().map(|r| r.scenario).collect();
        assert_eq!(
            kinds,
            vec![
                ScenarioKind::EquityFunded,
                ScenarioKind::DebtFunded,
                ScenarioKind::SelfFunded
            ]
        );
    }

    #[test]
    fn test_equity_row_values() {
        let out = compare_scenarios(&input([dec!(15), dec!(12), dec!(10)])).unwrap();
        let row = out.result.row(ScenarioKind::EquityFunded).unwrap();
        // 500 * 1.15 * 1.12 * 1.10 = 708.4
        assert_eq!(row.final_revenue, dec!(708.4));
        assert_eq!(row.final_profit, dec!(70.84));
        assert_eq!(row.company_value, dec!(1062.6));
        assert_eq!(row.owner_equity_percent, dec!(80));
        assert_eq!(row.final_owner_value, dec!(850.08));
    }

    #[test]
    fn test_growth_scaling_and_funding() {
        let out = compare_scenarios(&input([dec!(15), dec!(12), dec!(10)])).unwrap();
        let debt = out.result.row(ScenarioKind::DebtFunded).unwrap();
        assert_eq!(debt.growth_rates, [dec!(12.0), dec!(9.6), dec!(8.0)]);
        assert_eq!(debt.funding_amount, dec!(100));
        let own = out.result.row(ScenarioKind::SelfFunded).unwrap();
        assert_eq!(own.growth_rates, [dec!(7.5), dec!(6.0), dec!(5.0)]);
        assert_eq!(own.funding_amount, Decimal::ZERO);
        assert_eq!(own.owner_equity_percent, dec!(100));
    }

    #[test]
    fn test_best_is_debt_for_moderate_growth() {
        // Debt: 500 * 1.12 * 1.096 * 1.08 = 662.8608 -> owner value 994.2912
        // Equity: 850.08
        let out = compare_scenarios(&input([dec!(15), dec!(12), dec!(10)])).unwrap();
        assert_eq!(out.result.best_scenario, ScenarioKind::DebtFunded);
        assert_eq!(out.result.best_owner_value, dec!(994.2912));
    }

    #[test]
    fn test_tie_goes_to_first_preset() {
        // Zero growth: equity 600, debt 750, self 750 -> debt listed first
        let out = compare_scenarios(&input([Decimal::ZERO; 3])).unwrap();
        assert_eq!(out.result.best_scenario, ScenarioKind::DebtFunded);
        let own = out.result.row(ScenarioKind::SelfFunded).unwrap();
        assert_eq!(own.final_owner_value, out.result.best_owner_value);
    }

    #[test]
    fn test_zero_revenue_all_zero() {
        let mut inp = input([dec!(10), dec!(10), dec!(10)]);
        inp.baseline.revenue = Decimal::ZERO;
        let out = compare_scenarios(&inp).unwrap();
        assert!(out.result.rows.iter().all(|r| r.final_owner_value.is_zero()));
        assert_eq!(out.result.best_scenario, ScenarioKind::EquityFunded);
        assert!(!out.warnings.is_empty());
    }

    #[test]
    fn test_overflow_is_an_error() {
        let mut inp = input([dec!(900), dec!(900), dec!(900)]);
        inp.baseline.revenue = dec!(1_000_000_000_000_000_000_000_000_000);
        inp.baseline.profit = dec!(100_000_000_000_000_000_000_000_000);
        assert!(matches!(
            compare_scenarios(&inp),
            Err(CapitalAdvisorError::FinancialImpossibility(_))
        ));
    }

    #[test]
    fn test_negative_funding_rejected() {
        let mut inp = input([dec!(10), dec!(10), dec!(10)]);
        inp.funding_amount = dec!(-1);
        assert!(compare_scenarios(&inp).is_err());
    }
}
