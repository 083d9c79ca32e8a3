use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::company::FinancialSnapshot;
use crate::error::CapitalAdvisorError;
use crate::industry::IndustryProfile;
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::CapitalAdvisorResult;

use super::dcf::{compute_dcf, DcfOutput, DcfParameters};

/// Negotiation band around the median estimate.
const NEGOTIATION_DISCOUNT: Decimal = dec!(0.8);
const NEGOTIATION_PREMIUM: Decimal = dec!(1.2);
/// Growth above which an earnings multiple is considered well suited.
const GROWTH_COMPANY_THRESHOLD: Decimal = dec!(10);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Valuation methods, in the order they are evaluated and reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValuationMethod {
    Per,
    Pbr,
    EbitdaMultiple,
    YearPurchase,
    Dcf,
    NetAsset,
}

impl std::fmt::Display for ValuationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValuationMethod::Per => write!(f, "PER"),
            ValuationMethod::Pbr => write!(f, "PBR"),
            ValuationMethod::EbitdaMultiple => write!(f, "EBITDA multiple"),
            ValuationMethod::YearPurchase => write!(f, "Year purchase"),
            ValuationMethod::Dcf => write!(f, "DCF"),
            ValuationMethod::NetAsset => write!(f, "Net asset"),
        }
    }
}

/// How well a method fits the company's profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Suitability {
    Recommended,
    Conditional,
    /// Floor value; shown for reference rather than pricing
    ReferenceOnly,
}

/// One method's value for the company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationEstimate {
    pub method: ValuationMethod,
    pub value: Money,
    /// False when the method's precondition fails; such estimates are
    /// reported but excluded from the summary.
    pub precondition_met: bool,
    pub suitability: Suitability,
}

/// Statistics over the included estimates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationSummary {
    pub count: usize,
    /// Element at index count / 2 of the ascending values (upper middle for
    /// even counts)
    pub median: Money,
    pub min: Money,
    pub max: Money,
    pub mean: Money,
    /// First method (in evaluation order) producing the minimum
    pub min_method: ValuationMethod,
    /// First method (in evaluation order) producing the maximum
    pub max_method: ValuationMethod,
    /// Median x 0.8
    pub negotiation_low: Money,
    /// Median x 1.2
    pub negotiation_high: Money,
}

/// Input for the multi-method valuation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationInput {
    pub snapshot: FinancialSnapshot,
    /// Custom multiples; defaults to the snapshot industry's profile
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<IndustryProfile>,
    #[serde(default)]
    pub parameters: DcfParameters,
}

/// Output of the multi-method valuation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationOutput {
    /// All attempted methods in evaluation order
    pub estimates: Vec<ValuationEstimate>,
    pub summary: ValuationSummary,
    /// DCF detail; absent only if the DCF could not be computed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dcf: Option<DcfOutput>,
}

impl ValuationOutput {
    /// Estimates whose precondition holds, in evaluation order.
    pub fn included(&self) -> impl Iterator<Item = &ValuationEstimate> {
        self.estimates.iter().filter(|e| e.precondition_met)
    }

    pub fn estimate(&self, method: ValuationMethod) -> Option<&ValuationEstimate> {
        self.estimates.iter().find(|e| e.method == method)
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Value a company, resolving the industry profile from the snapshot when
/// no override is supplied.
pub fn calculate_valuation(
    input: &ValuationInput,
) -> CapitalAdvisorResult<ComputationOutput<ValuationOutput>> {
    let profile = input
        .profile
        .clone()
        .unwrap_or_else(|| input.snapshot.industry.profile());
    compute_estimates(&input.snapshot, &profile, &input.parameters)
}

/// Apply the six valuation methods to one snapshot and summarise them.
///
/// Each method is evaluated independently: an unmet precondition drops
/// that method from the summary, and a DCF failure drops only the DCF.
pub fn compute_estimates(
    snapshot: &FinancialSnapshot,
    profile: &IndustryProfile,
    params: &DcfParameters,
) -> CapitalAdvisorResult<ComputationOutput<ValuationOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    // --- Validate ---
    snapshot.validate()?;
    params.validate()?;

    let profit = snapshot.operating_profit;
    let net_assets = snapshot.net_assets();
    let ebitda = snapshot.ebitda();
    let growth = snapshot.growth_rate;

    let mut estimates = vec![
        ValuationEstimate {
            method: ValuationMethod::Per,
            value: profit * profile.per,
            precondition_met: profit > Decimal::ZERO,
            suitability: if profit > Decimal::ZERO && growth > GROWTH_COMPANY_THRESHOLD {
                Suitability::Recommended
            } else {
                Suitability::Conditional
            },
        },
        ValuationEstimate {
            method: ValuationMethod::Pbr,
            value: net_assets * profile.pbr,
            precondition_met: net_assets > Decimal::ZERO,
            suitability: Suitability::Recommended,
        },
        ValuationEstimate {
            method: ValuationMethod::EbitdaMultiple,
            value: ebitda * profile.ebitda_multiple,
            precondition_met: ebitda > Decimal::ZERO,
            suitability: Suitability::Recommended,
        },
        ValuationEstimate {
            method: ValuationMethod::YearPurchase,
            value: net_assets + profit * profile.year_purchase_multiple,
            precondition_met: true,
            suitability: Suitability::Recommended,
        },
    ];

    // --- DCF ---
    let dcf = match compute_dcf(snapshot, profile, params, &mut warnings) {
        Ok(dcf) => {
            if dcf.equity_value <= Decimal::ZERO {
                warnings.push(format!(
                    "DCF equity value is non-positive ({}); included in the summary",
                    dcf.equity_value
                ));
            }
            estimates.push(ValuationEstimate {
                method: ValuationMethod::Dcf,
                value: dcf.equity_value,
                precondition_met: true,
                suitability: if growth > Decimal::ZERO {
                    Suitability::Recommended
                } else {
                    Suitability::Conditional
                },
            });
            Some(dcf)
        }
        Err(e) => {
            warnings.push(format!("DCF excluded: {e}"));
            None
        }
    };

    estimates.push(ValuationEstimate {
        method: ValuationMethod::NetAsset,
        value: net_assets,
        precondition_met: true,
        suitability: Suitability::ReferenceOnly,
    });

    for e in estimates.iter().filter(|e| !e.precondition_met) {
        warnings.push(format!("{} excluded: precondition not met", e.method));
    }

    let summary = summarise(&estimates)?;

    let output = ValuationOutput {
        estimates,
        summary,
        dcf,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Multi-method valuation (PER, PBR, EBITDA, year purchase, DCF, net asset)",
        &serde_json::json!({
            "snapshot": snapshot,
            "profile": profile,
            "parameters": params,
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn summarise(estimates: &[ValuationEstimate]) -> CapitalAdvisorResult<ValuationSummary> {
    let included: Vec<&ValuationEstimate> =
        estimates.iter().filter(|e| e.precondition_met).collect();
    let count = included.len();
    if count == 0 {
        return Err(CapitalAdvisorError::InsufficientData(
            "No valuation method produced an estimate".into(),
        ));
    }

    let mut sorted: Vec<Money> = included.iter().map(|e| e.value).collect();
    sorted.sort();

    let min = sorted[0];
    let max = sorted[count - 1];
    let median = sorted[count / 2];
    let mean = sorted.iter().copied().sum::<Decimal>() / Decimal::from(count as u64);

    let first_with = |target: Money| {
        included
            .iter()
            .find(|e| e.value == target)
            .map(|e| e.method)
            .unwrap_or(ValuationMethod::NetAsset)
    };

    Ok(ValuationSummary {
        count,
        median,
        min,
        max,
        mean,
        min_method: first_with(min),
        max_method: first_with(max),
        negotiation_low: median * NEGOTIATION_DISCOUNT,
        negotiation_high: median * NEGOTIATION_PREMIUM,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
