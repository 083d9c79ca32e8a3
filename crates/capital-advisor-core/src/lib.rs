pub mod company;
pub mod error;
pub mod industry;
pub mod types;

#[cfg(feature = "valuation")]
pub mod valuation;

#[cfg(feature = "scenarios")]
pub mod scenarios;

#[cfg(feature = "report")]
pub mod report;

pub use company::FinancialSnapshot;
pub use error::CapitalAdvisorError;
pub use industry::{Industry, IndustryProfile};
pub use types::*;

/// Standard result type for all capital-advisor operations
pub type CapitalAdvisorResult<T> = Result<T, CapitalAdvisorError>;
