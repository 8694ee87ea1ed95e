use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::RentalRoiError;
use crate::RentalRoiResult;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Percentages expressed as percent (6 = 6%), the way a form collects them.
pub type Percent = Decimal;

/// A monthly cash outflow. Always holds a value <= 0.
///
/// Expenses are carried as negative amounts so that net cash flow is a plain
/// sum of income and outflows. The only ways in are `from_cost`, which negates
/// a non-negative magnitude, and deserialisation, which rejects positive values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Outflow(Money);

impl Outflow {
    pub const ZERO: Outflow = Outflow(Decimal::ZERO);

    /// Build an outflow from a cost magnitude (e.g. 100 for a $100 bill).
    pub fn from_cost(field: &str, cost: Money) -> Result<Self, RentalRoiError> {
        if cost < Decimal::ZERO {
            return Err(RentalRoiError::InvalidInput {
                field: field.into(),
                reason: "Expense magnitude must be non-negative".into(),
            });
        }
        if cost.is_zero() {
            return Ok(Outflow::ZERO);
        }
        Ok(Outflow(-cost))
    }

    /// Signed amount (<= 0).
    pub fn amount(self) -> Money {
        self.0
    }

    /// Cost magnitude (>= 0).
    pub fn magnitude(self) -> Money {
        -self.0
    }

    /// What remains of this outflow once `part` of it is taken out.
    ///
    /// Both operands are <= 0, so the difference cannot overflow; a `part`
    /// larger than the whole leaves `ZERO`.
    pub fn excluding(self, part: Outflow) -> Outflow {
        let rest = self.0 - part.0;
        if rest >= Decimal::ZERO {
            return Outflow::ZERO;
        }
        Outflow(rest)
    }

    /// Sum of two outflows, `None` if the total leaves `Decimal`'s range.
    pub fn checked_add(self, rhs: Outflow) -> Option<Outflow> {
        self.0.checked_add(rhs.0).map(Outflow)
    }
}

impl TryFrom<Decimal> for Outflow {
    type Error = RentalRoiError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        if value > Decimal::ZERO {
            return Err(RentalRoiError::InvalidInput {
                field: "outflow".into(),
                reason: format!("Outflows are stored as negative amounts, got {value}"),
            });
        }
        Ok(Outflow(value))
    }
}

impl From<Outflow> for Decimal {
    fn from(o: Outflow) -> Self {
        o.0
    }
}

impl fmt::Display for Outflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reject a negative amount for a field that only admits costs or prices.
pub fn ensure_non_negative(field: &str, value: Money) -> RentalRoiResult<()> {
    if value < Decimal::ZERO {
        return Err(RentalRoiError::InvalidInput {
            field: field.into(),
            reason: "Value cannot be negative".into(),
        });
    }
    Ok(())
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> RentalRoiResult<ComputationOutput<T>> {
    Ok(ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions)?,
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    })
}
