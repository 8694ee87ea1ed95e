pub mod error;
pub mod types;

#[cfg(feature = "financing")]
pub mod financing;

#[cfg(feature = "income")]
pub mod income;

#[cfg(feature = "analysis")]
pub mod analysis;

#[cfg(feature = "analysis")]
pub mod parse;

pub use error::RentalRoiError;
pub use types::*;

/// Standard result type for all rental-roi operations
pub type RentalRoiResult<T> = Result<T, RentalRoiError>;
