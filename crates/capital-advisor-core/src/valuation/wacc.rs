use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::CapitalAdvisorError;
use crate::industry::Industry;
use crate::types::{with_metadata, ComputationOutput, Money, Percent, Rate};
use crate::CapitalAdvisorResult;

use super::dcf::DcfParameters;

/// Debt ratio assumed when total assets are zero.
const DEFAULT_DEBT_RATIO: Rate = dec!(0.3);

/// Input parameters for a book-value WACC calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaccInput {
    /// Industry used to look up the CAPM beta
    #[serde(default)]
    pub industry: Industry,
    /// Explicit beta; overrides the industry beta when provided
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beta: Option<Decimal>,
    /// Total assets (book value), used for the capital-structure weights
    pub total_assets: Money,
    /// Total liabilities (book value)
    pub total_liabilities: Money,
    /// CAPM and tax assumptions
    #[serde(default)]
    pub parameters: DcfParameters,
}

/// Output of the WACC calculation. Rates are in percentage points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaccOutput {
    /// Weighted average cost of capital
    pub wacc: Percent,
    /// Cost of equity via simple CAPM
    pub cost_of_equity: Percent,
    /// After-tax cost of debt
    pub after_tax_cost_of_debt: Percent,
    /// Beta used in the calculation
    pub beta: Decimal,
    /// Liabilities / assets
    pub debt_ratio: Rate,
    /// 1 - debt ratio
    pub equity_ratio: Rate,
    /// True when total assets were zero and the default debt ratio was used
    pub default_capital_structure: bool,
}

/// Calculate WACC from book capital structure using CAPM.
///
/// Cost of equity: Ke = Rf + Beta * MRP
/// After-tax cost of debt: Kd_at = Kd * (1 - t)
/// WACC = Ke * E/A + Kd_at * D/A, with D/A defaulting to 0.3 when assets are zero
pub fn calculate_wacc(input: &WaccInput) -> CapitalAdvisorResult<ComputationOutput<WaccOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.total_assets < Decimal::ZERO || input.total_liabilities < Decimal::ZERO {
        return Err(CapitalAdvisorError::InvalidInput {
            field: "total_assets / total_liabilities".into(),
            reason: "Balance sheet totals cannot be negative".into(),
        });
    }
    input.parameters.validate()?;

    let beta = input.beta.unwrap_or_else(|| input.industry.profile().beta);
    let output = derive_wacc(
        beta,
        input.total_assets,
        input.total_liabilities,
        &input.parameters,
        &mut warnings,
    );

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "WACC via simple CAPM (book capital structure)",
        input,
        warnings,
        elapsed,
        output,
    ))
}

/// Core WACC derivation shared with the DCF calculator.
pub(crate) fn derive_wacc(
    beta: Decimal,
    total_assets: Money,
    total_liabilities: Money,
    params: &DcfParameters,
    warnings: &mut Vec<String>,
) -> WaccOutput {
    let cost_of_equity = params.risk_free_rate + beta * params.market_risk_premium;

    let default_capital_structure = total_assets <= Decimal::ZERO;
    let debt_ratio = if default_capital_structure {
        warnings.push(format!(
            "Total assets are zero; assuming a debt ratio of {DEFAULT_DEBT_RATIO}"
        ));
        DEFAULT_DEBT_RATIO
    } else {
        total_liabilities / total_assets
    };
    let equity_ratio = Decimal::ONE - debt_ratio;

    if debt_ratio > Decimal::ONE {
        warnings.push(format!(
            "Liabilities exceed assets (debt ratio {debt_ratio}); equity weight is negative"
        ));
    }

    let after_tax_cost_of_debt = params.cost_of_debt * (Decimal::ONE - params.tax_rate);
    let wacc = cost_of_equity * equity_ratio + after_tax_cost_of_debt * debt_ratio;

    if beta > dec!(3.0) {
        warnings.push(format!(
            "High beta ({beta}): betas above 3.0 are unusual"
        ));
    }
    if wacc <= Decimal::ZERO {
        warnings.push(format!("Non-positive WACC ({wacc}%); discounting will inflate value"));
    }

    WaccOutput {
        wacc,
        cost_of_equity,
        after_tax_cost_of_debt,
        beta,
        debt_ratio,
        equity_ratio,
        default_capital_structure,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_input() -> WaccInput {
        WaccInput {
            industry: Industry::ItSoftware,
            beta: None,
            total_assets: dec!(600),
            total_liabilities: dec!(250),
            parameters: DcfParameters::default(),
        }
    }

    #[test]
    fn test_capm_cost_of_equity() {
        let result = calculate_wacc(&sample_input()).unwrap();
        // Ke = 0.5 + 1.3 * 6.0 = 8.3
        assert_eq!(result.result.cost_of_equity, dec!(8.3));
        assert_eq!(result.result.beta, dec!(1.3));
    }

    #[test]
    fn test_wacc_book_weights() {
        let result = calculate_wacc(&sample_input()).unwrap();
        let out = &result.result;
        // D/A = 250/600, Kd_at = 2.0 * 0.7 = 1.4
        let debt_ratio = dec!(250) / dec!(600);
        assert_eq!(out.debt_ratio, debt_ratio);
        assert_eq!(out.after_tax_cost_of_debt, dec!(1.4));
        let expected = dec!(8.3) * (Decimal::ONE - debt_ratio) + dec!(1.4) * debt_ratio;
        assert!((out.wacc - expected).abs() < dec!(0.000000001));
        // ~5.425
        assert!((out.wacc - dec!(5.425)).abs() < dec!(0.001));
    }

    #[test]
    fn test_zero_assets_uses_default_debt_ratio() {
        let mut input = sample_input();
        input.total_assets = Decimal::ZERO;
        input.total_liabilities = Decimal::ZERO;
        let result = calculate_wacc(&input).unwrap();
        assert_eq!(result.result.debt_ratio, dec!(0.3));
        assert_eq!(result.result.equity_ratio, dec!(0.7));
        assert!(result.result.default_capital_structure);
        assert!(result.warnings.iter().any(|w| w.contains("debt ratio")));
    }

    #[test]
    fn test_explicit_beta_overrides_industry() {
        let mut input = sample_input();
        input.beta = Some(dec!(2.0));
        let result = calculate_wacc(&input).unwrap();
        assert_eq!(result.result.cost_of_equity, dec!(12.5));
    }

    #[test]
    fn test_other_industry_beta_is_one() {
        let mut input = sample_input();
        input.industry = Industry::Other;
        let result = calculate_wacc(&input).unwrap();
        assert_eq!(result.result.beta, Decimal::ONE);
        assert_eq!(result.result.cost_of_equity, dec!(6.5));
    }

    #[test]
    fn test_negative_assets_rejected() {
        let mut input = sample_input();
        input.total_assets = dec!(-1);
        assert!(calculate_wacc(&input).is_err());
    }
}
