use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::RentalRoiError;
use crate::types::{ensure_non_negative, Money};
use crate::RentalRoiResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Unit types for which fair-market rent estimates are published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitType {
    Efficiency,
    OneBedroom,
    TwoBedroom,
    ThreeBedroom,
    FourBedroom,
}

impl UnitType {
    pub const ALL: [UnitType; 5] = [
        UnitType::Efficiency,
        UnitType::OneBedroom,
        UnitType::TwoBedroom,
        UnitType::ThreeBedroom,
        UnitType::FourBedroom,
    ];

    pub fn bedrooms(self) -> u8 {
        match self {
            UnitType::Efficiency => 0,
            UnitType::OneBedroom => 1,
            UnitType::TwoBedroom => 2,
            UnitType::ThreeBedroom => 3,
            UnitType::FourBedroom => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            UnitType::Efficiency => "Efficiency",
            UnitType::OneBedroom => "One-Bedroom",
            UnitType::TwoBedroom => "Two-Bedroom",
            UnitType::ThreeBedroom => "Three-Bedroom",
            UnitType::FourBedroom => "Four-Bedroom",
        }
    }
}

impl fmt::Display for UnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for UnitType {
    type Err = RentalRoiError;

    /// Accepts `one_bedroom`, `One-Bedroom`, `1br`, `studio` and similar.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        match key.as_str() {
            "efficiency" | "studio" | "0br" | "0" => Ok(UnitType::Efficiency),
            "onebedroom" | "1br" | "1" => Ok(UnitType::OneBedroom),
            "twobedroom" | "2br" | "2" => Ok(UnitType::TwoBedroom),
            "threebedroom" | "3br" | "3" => Ok(UnitType::ThreeBedroom),
            "fourbedroom" | "4br" | "4" => Ok(UnitType::FourBedroom),
            _ => Err(RentalRoiError::Parse {
                field: "unit_type".into(),
                value: s.to_string(),
            }),
        }
    }
}

/// Rent estimate for one unit type, with the number of such units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentRollEntry {
    pub unit_type: UnitType,
    pub monthly_rent_per_unit: Money,
    #[serde(default)]
    pub unit_count: u32,
}

/// One priced line of the rent roll.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentRollLine {
    pub unit_type: UnitType,
    pub monthly_rent_per_unit: Money,
    pub unit_count: u32,
    pub monthly_rent: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentRollSummary {
    pub lines: Vec<RentRollLine>,
    pub total_units: u64,
    pub total_monthly_rent: Money,
    /// Unit types with no row at all (not rows with a zero count)
    pub missing_unit_types: Vec<UnitType>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Total monthly rent: sum of rent per unit times unit count.
///
/// Only sums the rows it is given. Unit types absent from `entries` are not
/// zero-filled; rows with a zero count contribute nothing. A negative rent
/// fails with `InvalidInput`.
pub fn aggregate(entries: &[RentRollEntry]) -> RentalRoiResult<Money> {
    let mut total = Decimal::ZERO;
    for entry in entries {
        total = total
            .checked_add(line_rent(entry)?)
            .ok_or_else(|| RentalRoiError::out_of_range("rent_roll"))?;
    }
    Ok(total)
}

/// Line-by-line breakdown of the rent roll plus coverage information.
pub fn summarize(entries: &[RentRollEntry]) -> RentalRoiResult<RentRollSummary> {
    let lines = entries
        .iter()
        .map(|e| {
            Ok(RentRollLine {
                unit_type: e.unit_type,
                monthly_rent_per_unit: e.monthly_rent_per_unit,
                unit_count: e.unit_count,
                monthly_rent: line_rent(e)?,
            })
        })
        .collect::<RentalRoiResult<Vec<_>>>()?;

    Ok(RentRollSummary {
        total_units: entries.iter().map(|e| u64::from(e.unit_count)).sum(),
        total_monthly_rent: aggregate(entries)?,
        missing_unit_types: missing_unit_types(entries),
        lines,
    })
}

/// Fails with `IncompleteRentData` unless every unit type has a rent estimate.
///
/// Callers treat this as advisory: aggregation still proceeds on whatever
/// rows are present.
pub fn ensure_complete(entries: &[RentRollEntry]) -> RentalRoiResult<()> {
    let missing = missing_unit_types(entries);
    if missing.is_empty() {
        return Ok(());
    }
    Err(RentalRoiError::IncompleteRentData {
        found: UnitType::ALL.len() - missing.len(),
        expected: UnitType::ALL.len(),
    })
}

fn line_rent(entry: &RentRollEntry) -> RentalRoiResult<Money> {
    let field = format!("rent_roll.{}", entry.unit_type.label());
    ensure_non_negative(&field, entry.monthly_rent_per_unit)?;
    entry
        .monthly_rent_per_unit
        .checked_mul(Decimal::from(entry.unit_count))
        .ok_or_else(|| RentalRoiError::out_of_range(&field))
}

fn missing_unit_types(entries: &[RentRollEntry]) -> Vec<UnitType> {
    UnitType::ALL
        .iter()
        .copied()
        .filter(|t| !entries.iter().any(|e| e.unit_type == *t))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
