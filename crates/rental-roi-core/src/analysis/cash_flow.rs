use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::RentalRoiError;
use crate::financing::amortization::{monthly_payment, FinancingTerms};
use crate::types::{ensure_non_negative, Money, Outflow, Percent};
use crate::RentalRoiResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Purchase-side inputs for one analysis request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentInputs {
    pub purchase_price: Money,
    pub down_payment: Money,
    pub closing_costs: Money,
    /// Expected price appreciation over the first year, in percent
    pub estimated_annual_appreciation_percent: Percent,
    /// Gross monthly rent, either entered directly or taken from the rent roll
    pub monthly_rental_income: Money,
}

impl InvestmentInputs {
    /// Price must be positive and the other amounts non-negative. Appreciation
    /// may be negative. The down payment cannot exceed the price.
    pub fn validate(&self) -> RentalRoiResult<()> {
        if self.purchase_price <= Decimal::ZERO {
            return Err(RentalRoiError::InvalidInput {
                field: "purchase_price".into(),
                reason: "Purchase price must be positive".into(),
            });
        }
        ensure_non_negative("down_payment", self.down_payment)?;
        ensure_non_negative("closing_costs", self.closing_costs)?;
        ensure_non_negative("monthly_rental_income", self.monthly_rental_income)?;
        self.loan_amount().map(|_| ())
    }

    /// Amount financed: purchase price less down payment.
    pub fn loan_amount(&self) -> RentalRoiResult<Money> {
        let loan = self.purchase_price - self.down_payment;
        if loan < Decimal::ZERO {
            return Err(RentalRoiError::InvalidLoanTerms {
                field: "down_payment".into(),
                reason: "Down payment cannot exceed the purchase price".into(),
            });
        }
        Ok(loan)
    }
}

/// Operating expenses. Taxes and insurance are annual; the rest monthly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyExpenses {
    #[serde(default)]
    pub annual_property_taxes: Money,
    #[serde(default)]
    pub annual_insurance: Money,
    #[serde(default)]
    pub monthly_management: Money,
    #[serde(default)]
    pub monthly_maintenance_repair: Money,
    #[serde(default)]
    pub monthly_landscaping: Money,
    #[serde(default)]
    pub monthly_utilities: Money,
}

impl PropertyExpenses {
    /// Every expense line is a cost and so cannot be negative.
    pub fn validate(&self) -> RentalRoiResult<()> {
        ensure_non_negative("annual_property_taxes", self.annual_property_taxes)?;
        ensure_non_negative("annual_insurance", self.annual_insurance)?;
        ensure_non_negative("monthly_management", self.monthly_management)?;
        ensure_non_negative("monthly_maintenance_repair", self.monthly_maintenance_repair)?;
        ensure_non_negative("monthly_landscaping", self.monthly_landscaping)?;
        ensure_non_negative("monthly_utilities", self.monthly_utilities)
    }
}

/// Monthly cash flow. Every expense field is an `Outflow` (<= 0).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowResult {
    pub monthly_rental_income: Money,
    pub monthly_debt_service: Outflow,
    pub monthly_tax_insurance: Outflow,
    pub monthly_management_cost: Outflow,
    pub monthly_maintenance_cost: Outflow,
    pub total_monthly_expenses: Outflow,
    /// Rental income plus total (negative) expenses
    pub net_monthly_cash_flow: Money,
}

impl CashFlowResult {
    /// Taxes, insurance, management and upkeep: every expense except debt service.
    pub fn monthly_operating_expenses(&self) -> Outflow {
        self.total_monthly_expenses.excluding(self.monthly_debt_service)
    }

    /// Monthly net operating income: rent less operating costs, before debt service.
    pub fn monthly_net_operating_income(&self) -> Money {
        self.monthly_rental_income + self.monthly_operating_expenses().amount()
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Net monthly cash flow after debt service and operating expenses.
pub fn analyze(
    inputs: &InvestmentInputs,
    financing: &FinancingTerms,
    expenses: &PropertyExpenses,
) -> RentalRoiResult<CashFlowResult> {
    inputs.validate()?;
    expenses.validate()?;
    let loan_amount = inputs.loan_amount()?;

    let payment = monthly_payment(
        loan_amount,
        financing.annual_rate_percent,
        financing.term_years,
    )?;
    let monthly_debt_service = Outflow::from_cost("monthly_debt_service", payment)?;

    let annual_tax_insurance = checked_sum(
        "annual_property_taxes + annual_insurance",
        &[expenses.annual_property_taxes, expenses.annual_insurance],
    )?;
    let monthly_tax_insurance = Outflow::from_cost(
        "annual_property_taxes + annual_insurance",
        annual_tax_insurance / dec!(12),
    )?;

    let monthly_management_cost =
        Outflow::from_cost("monthly_management", expenses.monthly_management)?;

    let monthly_maintenance_cost = Outflow::from_cost(
        "monthly_maintenance_repair + monthly_landscaping + monthly_utilities",
        checked_sum(
            "monthly_maintenance_repair + monthly_landscaping + monthly_utilities",
            &[
                expenses.monthly_maintenance_repair,
                expenses.monthly_landscaping,
                expenses.monthly_utilities,
            ],
        )?,
    )?;

    let total_monthly_expenses = [
        monthly_tax_insurance,
        monthly_management_cost,
        monthly_maintenance_cost,
    ]
    .into_iter()
    .try_fold(monthly_debt_service, Outflow::checked_add)
    .ok_or_else(|| RentalRoiError::out_of_range("total_monthly_expenses"))?;

    // Income is >= 0 and expenses <= 0, so the sum stays in range
    let net_monthly_cash_flow = inputs.monthly_rental_income + total_monthly_expenses.amount();

    Ok(CashFlowResult {
        monthly_rental_income: inputs.monthly_rental_income,
        monthly_debt_service,
        monthly_tax_insurance,
        monthly_management_cost,
        monthly_maintenance_cost,
        total_monthly_expenses,
        net_monthly_cash_flow,
    })
}

fn checked_sum(field: &str, amounts: &[Money]) -> RentalRoiResult<Money> {
    amounts
        .iter()
        .try_fold(Decimal::ZERO, |acc, a| acc.checked_add(*a))
        .ok_or_else(|| RentalRoiError::out_of_range(field))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
