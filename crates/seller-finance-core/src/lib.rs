pub mod amortization;
pub mod deal;
pub mod error;
pub mod loan;
pub mod seller_note;
pub mod types;

#[cfg(feature = "schedule")]
pub mod schedule;

#[cfg(feature = "scenarios")]
pub mod scenario;

pub use error::SellerFinanceError;
pub use types::*;

/// Standard result type for fallible seller-finance operations
pub type SellerFinanceResult<T> = Result<T, SellerFinanceError>;
