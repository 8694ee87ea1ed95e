//! Boundary between free-text form fields and the typed analysis input.
//!
//! Every numeric field arrives as the text the user typed. Parsing happens
//! here, once, before any arithmetic: malformed text is a `Parse` error,
//! a negative amount where none is allowed is `InvalidInput`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::analysis::cash_flow::PropertyExpenses;
use crate::analysis::property::PropertyAnalysisInput;
use crate::error::RentalRoiError;
use crate::financing::amortization::FinancingTerms;
use crate::income::rent_roll::{RentRollEntry, UnitType};
use crate::types::Money;
use crate::RentalRoiResult;

/// Raw form state, one string per input box.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisForm {
    pub property_name: Option<String>,
    pub purchase_price: Option<String>,
    pub down_payment: Option<String>,
    pub closing_costs: Option<String>,
    pub annual_rate_percent: Option<String>,
    pub term_years: Option<String>,
    pub estimated_annual_appreciation_percent: Option<String>,
    pub annual_property_taxes: Option<String>,
    pub annual_insurance: Option<String>,
    pub monthly_management: Option<String>,
    pub monthly_maintenance_repair: Option<String>,
    pub monthly_landscaping: Option<String>,
    pub monthly_utilities: Option<String>,
    pub monthly_rental_income: Option<String>,
    pub rent_roll: Vec<RentRollFormRow>,
}

/// A rent estimate row with the unit count the user typed next to it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RentRollFormRow {
    pub unit_type: String,
    pub monthly_rent_per_unit: String,
    pub unit_count: String,
}

impl AnalysisForm {
    pub fn parse(&self) -> RentalRoiResult<PropertyAnalysisInput> {
        let expenses = PropertyExpenses {
            annual_property_taxes: optional_money(
                "annual_property_taxes",
                self.annual_property_taxes.as_deref(),
            )?,
            annual_insurance: optional_money("annual_insurance", self.annual_insurance.as_deref())?,
            monthly_management: optional_money(
                "monthly_management",
                self.monthly_management.as_deref(),
            )?,
            monthly_maintenance_repair: optional_money(
                "monthly_maintenance_repair",
                self.monthly_maintenance_repair.as_deref(),
            )?,
            monthly_landscaping: optional_money(
                "monthly_landscaping",
                self.monthly_landscaping.as_deref(),
            )?,
            monthly_utilities: optional_money("monthly_utilities", self.monthly_utilities.as_deref())?,
        };

        let financing = FinancingTerms {
            annual_rate_percent: required_money(
                "annual_rate_percent",
                self.annual_rate_percent.as_deref(),
            )?,
            term_years: parse_term_years(self.term_years.as_deref())?,
        };

        let monthly_rental_income = match non_blank(self.monthly_rental_income.as_deref()) {
            Some(raw) => Some(parse_non_negative("monthly_rental_income", raw)?),
            None => None,
        };

        let rent_roll = if self.rent_roll.is_empty() {
            None
        } else {
            Some(
                self.rent_roll
                    .iter()
                    .map(RentRollFormRow::parse)
                    .collect::<RentalRoiResult<Vec<_>>>()?,
            )
        };

        Ok(PropertyAnalysisInput {
            property_name: non_blank(self.property_name.as_deref()).map(str::to_string),
            purchase_price: required_money("purchase_price", self.purchase_price.as_deref())?,
            down_payment: required_money("down_payment", self.down_payment.as_deref())?,
            closing_costs: optional_money("closing_costs", self.closing_costs.as_deref())?,
            // Appreciation may be negative in a falling market
            estimated_annual_appreciation_percent: match non_blank(
                self.estimated_annual_appreciation_percent.as_deref(),
            ) {
                Some(raw) => parse_decimal("estimated_annual_appreciation_percent", raw)?,
                None => Decimal::ZERO,
            },
            financing,
            expenses,
            monthly_rental_income,
            rent_roll,
        })
    }
}

impl RentRollFormRow {
    pub fn parse(&self) -> RentalRoiResult<RentRollEntry> {
        let unit_type = UnitType::from_str(&self.unit_type)?;
        let field = format!("rent_roll.{}", unit_type.label());
        let monthly_rent_per_unit = parse_non_negative(&field, &self.monthly_rent_per_unit)?;
        let unit_count = match non_blank(Some(self.unit_count.as_str())) {
            Some(raw) => raw.parse::<u32>().map_err(|_| RentalRoiError::Parse {
                field: format!("{field}.unit_count"),
                value: raw.to_string(),
            })?,
            None => 0,
        };
        Ok(RentRollEntry {
            unit_type,
            monthly_rent_per_unit,
            unit_count,
        })
    }
}

/// Parse a decimal number, tolerating surrounding whitespace.
pub fn parse_decimal(field: &str, raw: &str) -> RentalRoiResult<Decimal> {
    Decimal::from_str(raw.trim()).map_err(|_| RentalRoiError::Parse {
        field: field.into(),
        value: raw.to_string(),
    })
}

/// Parse a decimal number that must not be negative.
pub fn parse_non_negative(field: &str, raw: &str) -> RentalRoiResult<Money> {
    let value = parse_decimal(field, raw)?;
    if value < Decimal::ZERO {
        return Err(RentalRoiError::InvalidInput {
            field: field.into(),
            reason: format!("Value cannot be negative, got {value}"),
        });
    }
    Ok(value)
}

fn required_money(field: &str, raw: Option<&str>) -> RentalRoiResult<Money> {
    match non_blank(raw) {
        Some(raw) => parse_non_negative(field, raw),
        None => Err(RentalRoiError::InvalidInput {
            field: field.into(),
            reason: "Required".into(),
        }),
    }
}

fn optional_money(field: &str, raw: Option<&str>) -> RentalRoiResult<Money> {
    match non_blank(raw) {
        Some(raw) => parse_non_negative(field, raw),
        None => Ok(Decimal::ZERO),
    }
}

fn parse_term_years(raw: Option<&str>) -> RentalRoiResult<u32> {
    let raw = non_blank(raw).ok_or_else(|| RentalRoiError::InvalidInput {
        field: "term_years".into(),
        reason: "Required".into(),
    })?;
    raw.parse::<u32>().map_err(|_| RentalRoiError::Parse {
        field: "term_years".into(),
        value: raw.to_string(),
    })
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}
