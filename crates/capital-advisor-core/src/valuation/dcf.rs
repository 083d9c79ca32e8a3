use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::company::FinancialSnapshot;
use crate::error::CapitalAdvisorError;
use crate::industry::IndustryProfile;
use crate::types::{with_metadata, ComputationOutput, Money, Percent, Rate};
use crate::CapitalAdvisorResult;

use super::sensitivity::{build_sensitivity_grid, SensitivityGrid, TerminalBasis};
use super::wacc::{derive_wacc, WaccOutput};

/// Each projection year keeps 90% of the previous year's growth rate.
const GROWTH_DECAY: Decimal = dec!(0.9);
/// Operating margin improvement per projection year (1 point).
const MARGIN_STEP: Rate = dec!(0.01);
/// Working-capital build as a fraction of revenue, scaled by growth.
const WORKING_CAPITAL_RATIO: Rate = dec!(0.02);
/// Maintenance + growth capex relative to depreciation.
const CAPEX_TO_DEPRECIATION: Decimal = dec!(1.2);
/// Perpetual growth is 30% of current growth ...
const PERPETUAL_GROWTH_SHARE: Decimal = dec!(0.3);
/// ... capped at 2.5%.
const PERPETUAL_GROWTH_CAP: Percent = dec!(2.5);
/// Share of liabilities treated as interest-bearing net debt.
const NET_DEBT_SHARE: Rate = dec!(0.5);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Market and tax assumptions for the DCF. CAPM inputs are in percentage
/// points; the tax rate is a fraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DcfParameters {
    /// Risk-free rate (Japanese government bond yield)
    pub risk_free_rate: Percent,
    /// Equity market risk premium
    pub market_risk_premium: Percent,
    /// Pre-tax cost of debt
    pub cost_of_debt: Percent,
    /// Corporate tax rate
    pub tax_rate: Rate,
    /// Explicit forecast horizon
    pub projection_years: u32,
}

impl Default for DcfParameters {
    fn default() -> Self {
        Self {
            risk_free_rate: dec!(0.5),
            market_risk_premium: dec!(6.0),
            cost_of_debt: dec!(2.0),
            tax_rate: dec!(0.30),
            projection_years: 5,
        }
    }
}

impl DcfParameters {
    pub fn validate(&self) -> CapitalAdvisorResult<()> {
        if self.tax_rate < Decimal::ZERO || self.tax_rate > Decimal::ONE {
            return Err(CapitalAdvisorError::InvalidInput {
                field: "tax_rate".into(),
                reason: "Tax rate must be between 0 and 1".into(),
            });
        }
        if self.projection_years == 0 {
            return Err(CapitalAdvisorError::InvalidInput {
                field: "projection_years".into(),
                reason: "At least one projection year is required".into(),
            });
        }
        if self.cost_of_debt < Decimal::ZERO {
            return Err(CapitalAdvisorError::InvalidInput {
                field: "cost_of_debt".into(),
                reason: "Cost of debt cannot be negative".into(),
            });
        }
        Ok(())
    }
}

/// Input for a standalone DCF valuation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DcfInput {
    pub snapshot: FinancialSnapshot,
    /// Override for the industry defaults (beta, exit multiple)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<IndustryProfile>,
    #[serde(default)]
    pub parameters: DcfParameters,
}

/// Method used for the continuing value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminalMethod {
    /// TV = FCF_n * (1+g) / (WACC - g)
    GordonGrowth,
    /// TV = FCF_n * EBITDA multiple; used when WACC <= g
    ExitMultiple,
}

/// One explicit projection year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FcfProjectionYear {
    pub year: u32,
    /// Decayed growth rate applied this year
    pub growth_rate: Percent,
    pub projected_revenue: Money,
    pub projected_profit: Money,
    pub nopat: Money,
    pub depreciation: Money,
    pub working_capital_change: Money,
    pub capex: Money,
    pub free_cash_flow: Money,
    /// 1 / (1 + WACC)^year
    pub discount_factor: Decimal,
    pub present_value: Money,
}

/// Output of the DCF valuation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcfOutput {
    /// CAPM / WACC breakdown
    pub wacc_breakdown: WaccOutput,
    /// WACC used for discounting, in percent
    pub wacc: Percent,
    pub projections: Vec<FcfProjectionYear>,
    /// Sum of the explicit-period present values
    pub fcf_present_value_total: Money,
    pub final_year_fcf: Money,
    /// Perpetual growth rate, in percent; capped at 2.5 with no floor
    pub perpetual_growth_rate: Percent,
    pub terminal_method: TerminalMethod,
    /// Undiscounted terminal value
    pub terminal_value: Money,
    pub terminal_present_value: Money,
    pub enterprise_value: Money,
    /// Assumed interest-bearing debt (half of total liabilities)
    pub net_debt: Money,
    pub equity_value: Money,
    pub sensitivity: SensitivityGrid,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run the 5-year FCF DCF for a validated snapshot.
pub fn calculate_dcf(input: &DcfInput) -> CapitalAdvisorResult<ComputationOutput<DcfOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    input.snapshot.validate()?;
    let profile = input
        .profile
        .clone()
        .unwrap_or_else(|| input.snapshot.industry.profile());

    let output = compute_dcf(&input.snapshot, &profile, &input.parameters, &mut warnings)?;

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "5-Year FCF DCF (CAPM WACC, Gordon growth terminal value)",
        input,
        warnings,
        elapsed,
        output,
    ))
}

/// Pure DCF computation used by both [`calculate_dcf`] and the
/// multi-method valuation.
pub fn compute_dcf(
    snapshot: &FinancialSnapshot,
    profile: &IndustryProfile,
    params: &DcfParameters,
    warnings: &mut Vec<String>,
) -> CapitalAdvisorResult<DcfOutput> {
    params.validate()?;

    // --- WACC ---
    let wacc_breakdown = derive_wacc(
        profile.beta,
        snapshot.total_assets,
        snapshot.total_liabilities,
        params,
        warnings,
    );
    let wacc = wacc_breakdown.wacc;
    let discount_base = Decimal::ONE + wacc / Decimal::ONE_HUNDRED;
    if discount_base.is_zero() {
        return Err(CapitalAdvisorError::FinancialImpossibility(format!(
            "WACC of {wacc}% makes the discount factor undefined"
        )));
    }
    if discount_base < Decimal::ZERO {
        warnings.push(format!(
            "WACC of {wacc}% is below -100%; discount factors alternate in sign"
        ));
    }

    if snapshot.revenue.is_zero() {
        warnings.push("Revenue is zero; DCF margin falls back to 10%".into());
    }

    // --- Explicit projections ---
    let projections = build_projections(snapshot, params, discount_base)?;
    let fcf_present_value_total: Money = projections.iter().map(|p| p.present_value).sum();
    let final_year_fcf = projections
        .last()
        .map(|p| p.free_cash_flow)
        .ok_or_else(|| {
            CapitalAdvisorError::InsufficientData("No projection years generated".into())
        })?;

    // --- Terminal value ---
    let perpetual_growth_rate =
        (snapshot.growth_rate * PERPETUAL_GROWTH_SHARE).min(PERPETUAL_GROWTH_CAP);
    if perpetual_growth_rate < Decimal::ZERO {
        warnings.push(format!(
            "Negative perpetual growth rate ({perpetual_growth_rate}%) used in the terminal value"
        ));
    }

    let terminal_discount = compound(discount_base, params.projection_years)?;
    let (terminal_method, terminal_value) = if wacc > perpetual_growth_rate {
        let tv = final_year_fcf * (Decimal::ONE + perpetual_growth_rate / Decimal::ONE_HUNDRED)
            / ((wacc - perpetual_growth_rate) / Decimal::ONE_HUNDRED);
        (TerminalMethod::GordonGrowth, tv)
    } else {
        warnings.push(format!(
            "WACC ({wacc}%) does not exceed perpetual growth ({perpetual_growth_rate}%); \
             terminal value uses the {}x exit multiple",
            profile.ebitda_multiple
        ));
        (
            TerminalMethod::ExitMultiple,
            final_year_fcf * profile.ebitda_multiple,
        )
    };
    let terminal_present_value = terminal_value / terminal_discount;

    // --- Equity bridge ---
    let enterprise_value = fcf_present_value_total + terminal_present_value;
    let net_debt = snapshot.total_liabilities * NET_DEBT_SHARE;
    let equity_value = enterprise_value - net_debt;

    if !enterprise_value.is_zero() && terminal_present_value / enterprise_value > dec!(0.75) {
        warnings.push(
            "Terminal value exceeds 75% of enterprise value; result is driven by perpetuity assumptions"
                .into(),
        );
    }

    let sensitivity = build_sensitivity_grid(
        &TerminalBasis {
            final_year_fcf,
            fcf_present_value_total,
            net_debt,
            projection_years: params.projection_years,
        },
        wacc,
        perpetual_growth_rate,
    );

    Ok(DcfOutput {
        wacc_breakdown,
        wacc,
        projections,
        fcf_present_value_total,
        final_year_fcf,
        perpetual_growth_rate,
        terminal_method,
        terminal_value,
        terminal_present_value,
        enterprise_value,
        net_debt,
        equity_value,
        sensitivity,
    })
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn build_projections(
    snapshot: &FinancialSnapshot,
    params: &DcfParameters,
    discount_base: Decimal,
) -> CapitalAdvisorResult<Vec<FcfProjectionYear>> {
    let base_margin = snapshot.profit_margin();
    let after_tax = Decimal::ONE - params.tax_rate;
    let mut projections = Vec::with_capacity(params.projection_years as usize);

    for year in 1..=params.projection_years {
        let growth_rate = snapshot.growth_rate * compound(GROWTH_DECAY, year - 1)?;
        let growth_factor = compound(Decimal::ONE + growth_rate / Decimal::ONE_HUNDRED, year)?;

        let projected_revenue = snapshot.revenue * growth_factor;
        let improved_margin = base_margin + MARGIN_STEP * Decimal::from(year);
        let projected_profit = projected_revenue * improved_margin;
        let nopat = projected_profit * after_tax;

        let depreciation = snapshot.depreciation * growth_factor;
        let working_capital_change =
            projected_revenue * WORKING_CAPITAL_RATIO * (growth_rate / Decimal::ONE_HUNDRED);
        let capex = depreciation * CAPEX_TO_DEPRECIATION;

        // FCF = NOPAT + D&A - delta NWC - CapEx
        let free_cash_flow = nopat + depreciation - working_capital_change - capex;

        let discount = compound(discount_base, year)?;
        let present_value = free_cash_flow / discount;

        projections.push(FcfProjectionYear {
            year,
            growth_rate,
            projected_revenue,
            projected_profit,
            nopat,
            depreciation,
            working_capital_change,
            capex,
            free_cash_flow,
            discount_factor: Decimal::ONE / discount,
            present_value,
        });
    }

    Ok(projections)
}

/// `base^exp` with overflow reported rather than panicking.
fn compound(base: Decimal, exp: u32) -> CapitalAdvisorResult<Decimal> {
    base.checked_powi(exp as i64).ok_or_else(|| {
        CapitalAdvisorError::FinancialImpossibility(format!(
            "Compounding {base} over {exp} years overflows"
        ))
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::industry::Industry;
    use rust_decimal_macros::dec;

    fn sample_snapshot() -> FinancialSnapshot {
        FinancialSnapshot {
            revenue: dec!(500),
            operating_profit: dec!(50),
            total_assets: dec!(600),
            total_liabilities: dec!(250),
            depreciation: dec!(25),
            growth_rate: dec!(15),
            industry: Industry::ItSoftware,
        }
    }

    fn sample_input() -> DcfInput {
        DcfInput {
            snapshot: sample_snapshot(),
            profile: None,
            parameters: DcfParameters::default(),
        }
    }

    fn close(a: Decimal, b: Decimal) -> bool {
        (a - b).abs() < dec!(0.0000001)
    }

    #[test]
    fn test_five_projection_years() {
        let result = calculate_dcf(&sample_input()).unwrap();
        let out = &result.result;
        assert_eq!(out.projections.len(), 5);
        let years: Vec<u32> = out.projections.iter().map(|p| p.year).collect();
        assert_eq!(years, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_year1_fcf() {
        let result = calculate_dcf(&sample_input()).unwrap();
        let y1 = &result.result.projections[0];

        // Growth = 15, revenue = 500 * 1.15 = 575
        assert_eq!(y1.growth_rate, dec!(15));
        assert!(close(y1.projected_revenue, dec!(575)));
        // Margin = 0.10 + 0.01 = 0.11 => profit 63.25
        assert!(close(y1.projected_profit, dec!(63.25)));
        // NOPAT = 63.25 * 0.7 = 44.275
        assert!(close(y1.nopat, dec!(44.275)));
        // D&A = 25 * 1.15 = 28.75, capex = 34.5
        assert!(close(y1.depreciation, dec!(28.75)));
        assert!(close(y1.capex, dec!(34.5)));
        // dNWC = 575 * 0.02 * 0.15 = 1.725
        assert!(close(y1.working_capital_change, dec!(1.725)));
        // FCF = 44.275 + 28.75 - 1.725 - 34.5 = 36.8
        assert!(close(y1.free_cash_flow, dec!(36.8)));
    }

    #[test]
    fn test_growth_decays_and_compounds() {
        let result = calculate_dcf(&sample_input()).unwrap();
        let y2 = &result.result.projections[1];
        // Growth = 15 * 0.9 = 13.5, revenue = 500 * 1.135^2
        assert_eq!(y2.growth_rate, dec!(13.5));
        assert!(close(y2.projected_revenue, dec!(500) * dec!(1.135) * dec!(1.135)));
    }

    #[test]
    fn test_pv_sum_and_equity_bridge() {
        let result = calculate_dcf(&sample_input()).unwrap();
        let out = &result.result;
        let pv_sum: Decimal = out.projections.iter().map(|p| p.present_value).sum();
        assert_eq!(out.fcf_present_value_total, pv_sum);
        assert_eq!(
            out.enterprise_value,
            out.fcf_present_value_total + out.terminal_present_value
        );
        assert_eq!(out.net_debt, dec!(125));
        assert_eq!(out.equity_value, out.enterprise_value - dec!(125));
    }

    #[test]
    fn test_gordon_terminal_value() {
        let result = calculate_dcf(&sample_input()).unwrap();
        let out = &result.result;
        // g = min(2.5, 15 * 0.3) = 2.5
        assert_eq!(out.perpetual_growth_rate, dec!(2.5));
        assert_eq!(out.terminal_method, TerminalMethod::GordonGrowth);
        let expected_tv = out.final_year_fcf * dec!(1.025) / ((out.wacc - dec!(2.5)) / dec!(100));
        assert!(close(out.terminal_value, expected_tv));
    }

    #[test]
    fn test_exit_multiple_fallback() {
        // High growth with a tiny WACC forces WACC <= g
        let mut input = sample_input();
        input.parameters.risk_free_rate = Decimal::ZERO;
        input.parameters.market_risk_premium = dec!(1);
        input.parameters.cost_of_debt = Decimal::ZERO;
        input.snapshot.industry = Industry::RetailServices; // beta 0.8
        let result = calculate_dcf(&input).unwrap();
        let out = &result.result;
        assert!(out.wacc <= out.perpetual_growth_rate);
        assert_eq!(out.terminal_method, TerminalMethod::ExitMultiple);
        assert_eq!(out.terminal_value, out.final_year_fcf * dec!(4));
        assert!(result.warnings.iter().any(|w| w.contains("exit multiple")));
    }

    #[test]
    fn test_negative_growth_has_no_floor() {
        let mut input = sample_input();
        input.snapshot.growth_rate = dec!(-10);
        let result = calculate_dcf(&input).unwrap();
        // -10 * 0.3 = -3, flows into Gordon unfloored
        assert_eq!(result.result.perpetual_growth_rate, dec!(-3));
        assert_eq!(result.result.terminal_method, TerminalMethod::GordonGrowth);
        assert!(result.warnings.iter().any(|w| w.contains("Negative perpetual growth")));
    }

    #[test]
    fn test_zero_revenue_guard() {
        let mut input = sample_input();
        input.snapshot.revenue = Decimal::ZERO;
        let result = calculate_dcf(&input).unwrap();
        assert!(result.result.projections.iter().all(|p| p.projected_revenue.is_zero()));
        assert!(result.warnings.iter().any(|w| w.contains("Revenue is zero")));
    }

    #[test]
    fn test_profile_override_changes_beta() {
        let mut input = sample_input();
        let mut profile = Industry::ItSoftware.profile();
        profile.beta = dec!(2.0);
        input.profile = Some(profile);
        let result = calculate_dcf(&input).unwrap();
        assert_eq!(result.result.wacc_breakdown.cost_of_equity, dec!(12.5));
    }

    #[test]
    fn test_sensitivity_base_case_matches_equity() {
        let result = calculate_dcf(&sample_input()).unwrap();
        let out = &result.result;
        let (row, col) = out.sensitivity.base_case_position;
        let base = out.sensitivity.equity_values[row][col].unwrap();
        assert!(close(base, out.equity_value));
    }

    #[test]
    fn test_wacc_below_minus_100_still_computes() {
        let mut input = sample_input();
        input.snapshot.total_assets = dec!(100);
        input.snapshot.total_liabilities = dec!(10000);
        let result = calculate_dcf(&input).unwrap();
        let out = &result.result;
        assert_eq!(out.wacc, dec!(-681.7));
        assert_eq!(out.projections.len(), 5);
        // Base of 1 - 6.817 is negative, so odd years discount to a negative factor
        assert!(out.projections[0].discount_factor < Decimal::ZERO);
        assert!(out.projections[1].discount_factor > Decimal::ZERO);
        assert_eq!(out.terminal_method, TerminalMethod::ExitMultiple);
        assert_eq!(out.equity_value, out.enterprise_value - dec!(5000));
        assert!(result.warnings.iter().any(|w| w.contains("below -100%")));
    }

    #[test]
    fn test_wacc_of_minus_100_is_undefined() {
        // All-equity with Ke = -100% zeroes the discount base
        let mut input = sample_input();
        input.snapshot.total_liabilities = Decimal::ZERO;
        input.parameters.risk_free_rate = dec!(-100);
        input.parameters.market_risk_premium = Decimal::ZERO;
        assert!(matches!(
            calculate_dcf(&input),
            Err(CapitalAdvisorError::FinancialImpossibility(_))
        ));
    }

    #[test]
    fn test_negative_revenue_rejected() {
        let mut input = sample_input();
        input.snapshot.revenue = dec!(-100);
        assert!(calculate_dcf(&input).is_err());
    }

    #[test]
    fn test_deterministic() {
        let a = calculate_dcf(&sample_input()).unwrap();
        let b = calculate_dcf(&sample_input()).unwrap();
        assert_eq!(a.result, b.result);
    }
}
