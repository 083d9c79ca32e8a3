pub mod comparator;
pub mod outlook;
pub mod simulator;

use rust_decimal::Decimal;

use crate::error::CapitalAdvisorError;
use crate::CapitalAdvisorResult;

/// `a * b`, reporting overflow of the named quantity instead of panicking.
pub(crate) fn checked_mul(what: &str, a: Decimal, b: Decimal) -> CapitalAdvisorResult<Decimal> {
    a.checked_mul(b).ok_or_else(|| overflow(what))
}

/// `a + b`, reporting overflow of the named quantity instead of panicking.
pub(crate) fn checked_add(what: &str, a: Decimal, b: Decimal) -> CapitalAdvisorResult<Decimal> {
    a.checked_add(b).ok_or_else(|| overflow(what))
}

/// Growth factor `1 + rate/100` for a rate in percent.
pub(crate) fn growth_factor(rate: Decimal) -> CapitalAdvisorResult<Decimal> {
    checked_add("growth factor", Decimal::ONE, rate / Decimal::ONE_HUNDRED)
}

fn overflow(what: &str) -> CapitalAdvisorError {
    CapitalAdvisorError::FinancialImpossibility(format!("{what} overflows decimal range"))
}
