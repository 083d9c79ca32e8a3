use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::types::Multiple;

/// Industry category used to look up default valuation multiples.
///
/// Unknown names deserialize to [`Industry::Other`], whose profile carries
/// the market beta of 1.0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Industry {
    Manufacturing,
    #[serde(alias = "it", alias = "software")]
    ItSoftware,
    Healthcare,
    #[serde(alias = "energy")]
    EnvironmentEnergy,
    #[serde(alias = "retail")]
    RetailServices,
    #[serde(alias = "construction", alias = "real_estate")]
    ConstructionRealEstate,
    #[default]
    #[serde(other)]
    Other,
}

impl Industry {
    pub const ALL: [Industry; 7] = [
        Industry::Manufacturing,
        Industry::ItSoftware,
        Industry::Healthcare,
        Industry::EnvironmentEnergy,
        Industry::RetailServices,
        Industry::ConstructionRealEstate,
        Industry::Other,
    ];

    /// Default multiples and CAPM beta for this industry.
    pub fn profile(self) -> IndustryProfile {
        let (per, pbr, ebitda_multiple, year_purchase_multiple, beta) = match self {
            Industry::Manufacturing => (dec!(15), dec!(1.2), dec!(5), dec!(3), dec!(1.0)),
            Industry::ItSoftware => (dec!(25), dec!(3.0), dec!(8), dec!(5), dec!(1.3)),
            Industry::Healthcare => (dec!(20), dec!(2.0), dec!(7), dec!(4), dec!(0.9)),
            Industry::EnvironmentEnergy => (dec!(18), dec!(1.5), dec!(6), dec!(4), dec!(1.1)),
            Industry::RetailServices => (dec!(12), dec!(1.0), dec!(4), dec!(3), dec!(0.8)),
            Industry::ConstructionRealEstate => (dec!(10), dec!(0.8), dec!(5), dec!(3), dec!(1.2)),
            Industry::Other => (dec!(15), dec!(1.2), dec!(5), dec!(3), dec!(1.0)),
        };
        IndustryProfile {
            industry: self,
            per,
            pbr,
            ebitda_multiple,
            year_purchase_multiple,
            beta,
        }
    }
}

impl std::fmt::Display for Industry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Industry::Manufacturing => write!(f, "Manufacturing"),
            Industry::ItSoftware => write!(f, "IT / Software"),
            Industry::Healthcare => write!(f, "Healthcare"),
            Industry::EnvironmentEnergy => write!(f, "Environment / Energy"),
            Industry::RetailServices => write!(f, "Retail / Services"),
            Industry::ConstructionRealEstate => write!(f, "Construction / Real Estate"),
            Industry::Other => write!(f, "Other"),
        }
    }
}

impl FromStr for Industry {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = s.trim().to_ascii_lowercase().replace(['-', ' ', '/'], "_");
        Ok(match normalised.as_str() {
            "manufacturing" => Industry::Manufacturing,
            "it_software" | "it" | "software" => Industry::ItSoftware,
            "healthcare" => Industry::Healthcare,
            "environment_energy" | "energy" => Industry::EnvironmentEnergy,
            "retail_services" | "retail" => Industry::RetailServices,
            "construction_real_estate" | "construction" | "real_estate" => {
                Industry::ConstructionRealEstate
            }
            _ => Industry::Other,
        })
    }
}

/// Default multiples for one industry. Immutable lookup data; callers may
/// still build a custom profile to override individual multiples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndustryProfile {
    pub industry: Industry,
    /// Price-to-earnings multiple applied to operating profit
    pub per: Multiple,
    /// Price-to-book multiple applied to net assets
    pub pbr: Multiple,
    /// EV/EBITDA multiple, also the DCF exit-multiple fallback
    pub ebitda_multiple: Multiple,
    /// Years of operating profit added to net assets (year-purchase method)
    pub year_purchase_multiple: Multiple,
    /// CAPM equity beta
    pub beta: Decimal,
}

impl IndustryProfile {
    pub fn for_industry(industry: Industry) -> Self {
        industry.profile()
    }

    /// Profiles for every industry in display order.
    pub fn table() -> Vec<IndustryProfile> {
        Industry::ALL.iter().map(|i| i.profile()).collect()
    }
}

impl Default for IndustryProfile {
    fn default() -> Self {
        Industry::Other.profile()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_it_profile() {
        let p = Industry::ItSoftware.profile();
        assert_eq!(p.per, dec!(25));
        assert_eq!(p.pbr, dec!(3.0));
        assert_eq!(p.ebitda_multiple, dec!(8));
        assert_eq!(p.year_purchase_multiple, dec!(5));
        assert_eq!(p.beta, dec!(1.3));
    }

    #[test]
    fn test_unknown_industry_deserializes_to_other() {
        let industry: Industry = serde_json::from_str("\"shipbuilding\"").unwrap();
        assert_eq!(industry, Industry::Other);
        assert_eq!(industry.profile().beta, Decimal::ONE);
    }

    #[test]
    fn test_industry_aliases() {
        let industry: Industry = serde_json::from_str("\"it\"").unwrap();
        assert_eq!(industry, Industry::ItSoftware);
        assert_eq!("Real Estate".parse::<Industry>().unwrap(), Industry::ConstructionRealEstate);
        assert_eq!("unknown".parse::<Industry>().unwrap(), Industry::Other);
    }

    #[test]
    fn test_table_covers_all_industries() {
        let table = IndustryProfile::table();
        assert_eq!(table.len(), 7);
        assert_eq!(table[0].industry, Industry::Manufacturing);
        assert_eq!(table[6], IndustryProfile::default());
    }
}
