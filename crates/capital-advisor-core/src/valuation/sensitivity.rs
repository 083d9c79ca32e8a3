use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Percent};

/// Bounds applied to the perpetual growth candidates (not to WACC).
const GROWTH_FLOOR: Percent = dec!(0);
const GROWTH_CAP: Percent = dec!(5);

/// WACC x perpetual-growth sensitivity of DCF equity value.
///
/// `equity_values[i][j]` is the equity value at `growth_rates[i]` and
/// `wacc_rates[j]`; `None` marks a cell where WACC does not exceed growth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityGrid {
    pub growth_rates: Vec<Percent>,
    pub wacc_rates: Vec<Percent>,
    pub equity_values: Vec<Vec<Option<Money>>>,
    /// Position of the base case in the matrix (row, col)
    pub base_case_position: (usize, usize),
}

/// The fixed explicit-period results that every sensitivity cell reuses.
#[derive(Debug, Clone, Copy)]
pub struct TerminalBasis {
    pub final_year_fcf: Money,
    pub fcf_present_value_total: Money,
    pub net_debt: Money,
    pub projection_years: u32,
}

impl TerminalBasis {
    /// Equity value with the Gordon terminal value re-priced at `wacc` and
    /// `growth`. Explicit-period present values are not re-discounted.
    pub fn equity_value_at(&self, wacc: Percent, growth: Percent) -> Option<Money> {
        if wacc <= growth {
            return None;
        }
        let discount_base = Decimal::ONE + wacc / Decimal::ONE_HUNDRED;
        if discount_base.is_zero() {
            return None;
        }
        let terminal_value = self.final_year_fcf * (Decimal::ONE + growth / Decimal::ONE_HUNDRED)
            / ((wacc - growth) / Decimal::ONE_HUNDRED);
        let discount = discount_base.checked_powi(self.projection_years as i64)?;
        let terminal_pv = terminal_value.checked_div(discount)?;
        Some(self.fcf_present_value_total + terminal_pv - self.net_debt)
    }
}

/// Build the 3 x 5 grid around the base case: growth +/- 1 point (clamped
/// to 0..=5), WACC +/- 1 and 2 points (unclamped).
pub fn build_sensitivity_grid(
    basis: &TerminalBasis,
    wacc: Percent,
    perpetual_growth_rate: Percent,
) -> SensitivityGrid {
    let growth_rates = vec![
        (perpetual_growth_rate - Decimal::ONE).clamp(GROWTH_FLOOR, GROWTH_CAP),
        perpetual_growth_rate,
        (perpetual_growth_rate + Decimal::ONE).clamp(GROWTH_FLOOR, GROWTH_CAP),
    ];
    let wacc_rates: Vec<Percent> = [dec!(-2), dec!(-1), dec!(0), dec!(1), dec!(2)]
        .iter()
        .map(|offset| wacc + offset)
        .collect();

    let equity_values = growth_rates
        .iter()
        .map(|g| {
            wacc_rates
                .iter()
                .map(|w| basis.equity_value_at(*w, *g))
                .collect()
        })
        .collect();

    SensitivityGrid {
        growth_rates,
        wacc_rates,
        equity_values,
        base_case_position: (1, 2),
    }
}
