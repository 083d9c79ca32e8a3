use napi::Result as NapiResult;
use napi_derive::napi;

use capital_advisor_core::IndustryProfile;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Valuation
// ---------------------------------------------------------------------------

#[napi]
pub fn value_company(input_json: String) -> NapiResult<String> {
    let input: capital_advisor_core::valuation::estimates::ValuationInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = capital_advisor_core::valuation::estimates::calculate_valuation(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn calculate_dcf(input_json: String) -> NapiResult<String> {
    let input: capital_advisor_core::valuation::dcf::DcfInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        capital_advisor_core::valuation::dcf::calculate_dcf(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn calculate_wacc(input_json: String) -> NapiResult<String> {
    let input: capital_advisor_core::valuation::wacc::WaccInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        capital_advisor_core::valuation::wacc::calculate_wacc(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn industry_profiles() -> NapiResult<String> {
    serde_json::to_string(&IndustryProfile::table()).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[napi]
pub fn simulate_scenario(input_json: String) -> NapiResult<String> {
    let input: capital_advisor_core::scenarios::simulator::SimulationInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = capital_advisor_core::scenarios::simulator::run_simulation(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn compare_scenarios(input_json: String) -> NapiResult<String> {
    let input: capital_advisor_core::scenarios::comparator::ComparisonInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = capital_advisor_core::scenarios::comparator::compare_scenarios(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
