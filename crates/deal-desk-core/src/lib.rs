pub mod error;
pub mod fees;
pub mod payment;
pub mod types;

#[cfg(feature = "desking")]
pub mod desking;

#[cfg(feature = "credit")]
pub mod credit;

#[cfg(feature = "gross")]
pub mod gross;

pub use error::DealDeskError;
pub use types::*;

/// Standard result type for all deal-desk operations
pub type DealDeskResult<T> = Result<T, DealDeskError>;
