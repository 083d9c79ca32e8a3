use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::Percent;

/// Growth outlook used to derive the three yearly growth rates of a
/// scenario from the company's current growth rate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthOutlook {
    Optimistic,
    #[default]
    Base,
    Pessimistic,
}

impl GrowthOutlook {
    fn factors(self) -> [Decimal; 3] {
        match self {
            GrowthOutlook::Optimistic => [dec!(1.5), dec!(1.3), dec!(1.2)],
            GrowthOutlook::Base => [dec!(1.0), dec!(0.9), dec!(0.8)],
            GrowthOutlook::Pessimistic => [dec!(0.5), dec!(0.6), dec!(0.7)],
        }
    }

    /// Yearly growth rates for years 1-3, truncated to whole percent.
    pub fn growth_rates(self, base_growth: Percent) -> [Percent; 3] {
        self.factors().map(|f| (base_growth * f).trunc())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_outlook() {
        assert_eq!(
            GrowthOutlook::Base.growth_rates(dec!(15)),
            [dec!(15), dec!(13), dec!(12)]
        );
    }

    #[test]
    fn test_optimistic_outlook() {
        // 22.5, 19.5, 18 => truncated
        assert_eq!(
            GrowthOutlook::Optimistic.growth_rates(dec!(15)),
            [dec!(22), dec!(19), dec!(18)]
        );
    }

    #[test]
    fn test_pessimistic_truncates_toward_zero() {
        // -10 * 0.5 = -5, * 0.6 = -6, * 0.7 = -7
        assert_eq!(
            GrowthOutlook::Pessimistic.growth_rates(dec!(-10)),
            [dec!(-5), dec!(-6), dec!(-7)]
        );
        // -15 * 0.5 = -7.5 => -7
        assert_eq!(GrowthOutlook::Pessimistic.growth_rates(dec!(-15))[0], dec!(-7));
    }
}
