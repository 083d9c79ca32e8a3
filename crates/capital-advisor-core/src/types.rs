use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Monetary amounts, in the caller's currency unit (e.g. millions of yen).
pub type Money = Decimal;

/// Fractions (0.30 = 30%). Used for tax rates and profit margins.
pub type Rate = Decimal;

/// Percentage points (2.5 = 2.5%). Used for growth, WACC, CAPM inputs,
/// interest and dilution, which the valuation formulas express in points.
pub type Percent = Decimal;

/// Valuation multiples (e.g. 8x EBITDA, 15x earnings)
pub type Multiple = Decimal;

/// Envelope returned by every operation: the result plus the inputs it
/// was computed from and any guards or fallbacks that fired.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Build and timing information. Only `result` is deterministic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Wrap a result in the output envelope.
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

/// Percentage change from `base` to `value`, `None` when the base is zero
/// or the change does not fit in a `Decimal`.
pub fn pct_change(base: Decimal, value: Decimal) -> Option<Percent> {
    value
        .checked_sub(base)?
        .checked_div(base)?
        .checked_mul(Decimal::ONE_HUNDRED)
}
