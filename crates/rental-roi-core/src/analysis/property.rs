use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::analysis::cash_flow::{self, CashFlowResult, InvestmentInputs, PropertyExpenses};
use crate::analysis::returns::{self, RoiBreakdown};
use crate::error::RentalRoiError;
use crate::financing::amortization::FinancingTerms;
use crate::income::rent_roll::{self, RentRollEntry, RentRollSummary};
use crate::types::{ensure_non_negative, with_metadata, ComputationOutput, Money, Percent};
use crate::RentalRoiResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Everything needed to analyse one purchase. Built fresh per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyAnalysisInput {
    /// Free-form label, typically the selected street address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_name: Option<String>,
    pub purchase_price: Money,
    pub down_payment: Money,
    #[serde(default)]
    pub closing_costs: Money,
    #[serde(default)]
    pub estimated_annual_appreciation_percent: Percent,
    pub financing: FinancingTerms,
    #[serde(default)]
    pub expenses: PropertyExpenses,
    /// Gross monthly rent entered directly
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_rental_income: Option<Money>,
    /// Per-unit-type rent estimates with unit counts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rent_roll: Option<Vec<RentRollEntry>>,
}

/// Where the monthly rental income figure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RentalIncomeSource {
    Direct,
    RentRoll,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyAnalysisOutput {
    pub loan_amount: Money,
    pub monthly_rental_income: Money,
    pub rental_income_source: RentalIncomeSource,
    pub cash_flow: CashFlowResult,
    pub returns: RoiBreakdown,
    /// Annual NOI / (price + closing costs), percent
    pub cap_rate_percent: Percent,
    /// Loan / purchase price, percent
    pub loan_to_value_percent: Percent,
    /// NOI / debt service
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debt_service_coverage_ratio: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rent_roll: Option<RentRollSummary>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Cash flow and first-year ROI for a leveraged rental purchase.
///
/// Returns a `ComputationOutput<PropertyAnalysisOutput>` with the structured
/// result, warnings for weak or incomplete figures, and computation metadata.
pub fn analyze_property(
    input: &PropertyAnalysisInput,
) -> RentalRoiResult<ComputationOutput<PropertyAnalysisOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_input(input)?;

    let (monthly_rental_income, rental_income_source, rent_roll_summary) =
        resolve_rental_income(input, &mut warnings)?;

    let inputs = InvestmentInputs {
        purchase_price: input.purchase_price,
        down_payment: input.down_payment,
        closing_costs: input.closing_costs,
        estimated_annual_appreciation_percent: input.estimated_annual_appreciation_percent,
        monthly_rental_income,
    };

    let loan_amount = inputs.loan_amount()?;
    let cash_flow = cash_flow::analyze(&inputs, &input.financing, &input.expenses)?;
    let roi = returns::total_return(&inputs, &input.financing, &cash_flow)?;
    let cap_rate_percent = returns::cap_rate_percent(&cash_flow, &inputs)?;

    let loan_to_value_percent = loan_amount
        .checked_mul(dec!(100))
        .and_then(|scaled| scaled.checked_div(input.purchase_price))
        .ok_or_else(|| RentalRoiError::out_of_range("loan_to_value_percent"))?;

    let debt_service = cash_flow.monthly_debt_service.magnitude();
    let debt_service_coverage_ratio = if debt_service.is_zero() {
        None
    } else {
        let dscr = cash_flow
            .monthly_net_operating_income()
            .checked_div(debt_service)
            .ok_or_else(|| RentalRoiError::out_of_range("debt_service_coverage_ratio"))?;
        Some(dscr)
    };

    // --- Warnings ---
    if cash_flow.net_monthly_cash_flow < Decimal::ZERO {
        warnings.push(format!(
            "Net monthly cash flow of {:.2} is negative: rent does not cover expenses and debt service",
            cash_flow.net_monthly_cash_flow
        ));
    }

    if let Some(dscr) = debt_service_coverage_ratio {
        if dscr < dec!(1.2) {
            warnings.push(format!(
                "DSCR of {dscr:.2} is below 1.20x, most lenders require more coverage"
            ));
        }
    }

    if loan_to_value_percent > dec!(80) {
        warnings.push(format!(
            "LTV of {loan_to_value_percent:.1}% exceeds 80%, expect mortgage insurance or a higher rate"
        ));
    }

    let output = PropertyAnalysisOutput {
        loan_amount,
        monthly_rental_income,
        rental_income_source,
        cash_flow,
        returns: roi,
        cap_rate_percent,
        loan_to_value_percent,
        debt_service_coverage_ratio,
        rent_roll: rent_roll_summary,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    with_metadata(
        "Rental Property Cash Flow and First-Year ROI",
        input,
        warnings,
        elapsed,
        output,
    )
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Field checks that do not depend on which rent source is used. The rent
/// figure itself is checked once it is resolved.
fn validate_input(input: &PropertyAnalysisInput) -> RentalRoiResult<()> {
    if let Some(income) = input.monthly_rental_income {
        ensure_non_negative("monthly_rental_income", income)?;
    }

    let purchase = InvestmentInputs {
        purchase_price: input.purchase_price,
        down_payment: input.down_payment,
        closing_costs: input.closing_costs,
        estimated_annual_appreciation_percent: input.estimated_annual_appreciation_percent,
        monthly_rental_income: Decimal::ZERO,
    };
    purchase.validate()?;
    input.expenses.validate()
}

/// A non-empty rent roll wins over a directly entered figure. An empty roll,
/// which is what a failed rent lookup produces, only stands in when there is
/// no direct figure.
fn resolve_rental_income(
    input: &PropertyAnalysisInput,
    warnings: &mut Vec<String>,
) -> RentalRoiResult<(Money, RentalIncomeSource, Option<RentRollSummary>)> {
    match (input.rent_roll.as_deref(), input.monthly_rental_income) {
        (Some([]), Some(direct)) => {
            warnings.push(
                "Rent roll is empty; using the direct monthly rental income".into(),
            );
            Ok((direct, RentalIncomeSource::Direct, None))
        }
        (Some(entries), direct) => {
            if direct.is_some() {
                warnings.push(
                    "Both a rent roll and a direct monthly rental income were supplied; using the rent roll total"
                        .into(),
                );
            }
            if let Err(e) = rent_roll::ensure_complete(entries) {
                warnings.push(format!(
                    "{e}; rental income covers only the unit types supplied"
                ));
            }
            let summary = rent_roll::summarize(entries)?;
            Ok((
                summary.total_monthly_rent,
                RentalIncomeSource::RentRoll,
                Some(summary),
            ))
        }
        (None, Some(direct)) => Ok((direct, RentalIncomeSource::Direct, None)),
        (None, None) => Err(RentalRoiError::InvalidInput {
            field: "monthly_rental_income".into(),
            reason: "Provide either a monthly rental income or a rent roll".into(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
