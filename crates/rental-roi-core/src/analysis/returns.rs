use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::analysis::cash_flow::{CashFlowResult, InvestmentInputs};
use crate::error::RentalRoiError;
use crate::financing::amortization::{principal_paid_over_months, FinancingTerms, LoanTerms};
use crate::types::{Money, Percent};
use crate::RentalRoiResult;

const FIRST_YEAR_MONTHS: u32 = 12;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A first-year return expressed both in dollars and as a percentage of the
/// cash invested.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnComponent {
    pub dollars: Money,
    pub percent: Percent,
}

/// First-year ROI decomposed into cash flow, principal paydown and
/// appreciation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiBreakdown {
    /// Down payment plus closing costs
    pub initial_investment: Money,
    pub cash_flow_dollars: Money,
    pub cash_flow_return_percent: Percent,
    pub debt_reduction_dollars: Money,
    pub debt_reduction_return_percent: Percent,
    pub appreciation_dollars: Money,
    pub appreciation_return_percent: Percent,
    pub total_dollars: Money,
    pub total_return_percent: Percent,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Cash actually invested: down payment plus closing costs.
pub fn initial_investment(inputs: &InvestmentInputs) -> RentalRoiResult<Money> {
    inputs.validate()?;
    let invested = inputs
        .down_payment
        .checked_add(inputs.closing_costs)
        .ok_or_else(|| RentalRoiError::out_of_range("initial_investment"))?;
    if invested <= Decimal::ZERO {
        return Err(RentalRoiError::InvalidLoanTerms {
            field: "initial_investment".into(),
            reason: "Down payment plus closing costs must be positive".into(),
        });
    }
    Ok(invested)
}

/// Annualised NOI over effective acquisition cost (price + closing costs),
/// in percent. Independent of how the purchase is financed.
pub fn cap_rate_percent(
    cash_flow: &CashFlowResult,
    inputs: &InvestmentInputs,
) -> RentalRoiResult<Percent> {
    inputs.validate()?;
    let acquisition_cost = inputs
        .purchase_price
        .checked_add(inputs.closing_costs)
        .ok_or_else(|| RentalRoiError::out_of_range("purchase_price + closing_costs"))?;
    if acquisition_cost <= Decimal::ZERO {
        return Err(RentalRoiError::InvalidLoanTerms {
            field: "purchase_price".into(),
            reason: "Purchase price plus closing costs must be positive".into(),
        });
    }

    let monthly_noi =
        inputs.monthly_rental_income + cash_flow.monthly_operating_expenses().amount();

    monthly_noi
        .checked_mul(dec!(1200))
        .and_then(|annual| annual.checked_div(acquisition_cost))
        .ok_or_else(|| RentalRoiError::out_of_range("cap_rate_percent"))
}

/// Twelve months of net cash flow (cash-on-cash return).
pub fn annual_cash_flow_return(
    cash_flow: &CashFlowResult,
    initial_investment: Money,
) -> RentalRoiResult<ReturnComponent> {
    let dollars = cash_flow
        .net_monthly_cash_flow
        .checked_mul(dec!(12))
        .ok_or_else(|| RentalRoiError::out_of_range("net_monthly_cash_flow"))?;
    component(dollars, initial_investment)
}

/// Principal repaid by the first twelve payments.
pub fn debt_reduction_return(
    loan: &LoanTerms,
    initial_investment: Money,
) -> RentalRoiResult<ReturnComponent> {
    let dollars = principal_paid_over_months(
        loan.principal,
        loan.annual_rate_percent,
        loan.term_years,
        FIRST_YEAR_MONTHS,
    )?;
    component(dollars, initial_investment)
}

/// One year of price appreciation on the purchase price.
pub fn appreciation_return(
    inputs: &InvestmentInputs,
    initial_investment: Money,
) -> RentalRoiResult<ReturnComponent> {
    inputs.validate()?;
    let dollars = inputs
        .purchase_price
        .checked_mul(inputs.estimated_annual_appreciation_percent)
        .ok_or_else(|| RentalRoiError::out_of_range("estimated_annual_appreciation_percent"))?
        / dec!(100);
    component(dollars, initial_investment)
}

/// All three first-year returns and their sum.
pub fn total_return(
    inputs: &InvestmentInputs,
    financing: &FinancingTerms,
    cash_flow: &CashFlowResult,
) -> RentalRoiResult<RoiBreakdown> {
    let invested = initial_investment(inputs)?;
    let loan = financing.for_principal(inputs.loan_amount()?)?;

    let cash = annual_cash_flow_return(cash_flow, invested)?;
    let debt = debt_reduction_return(&loan, invested)?;
    let appreciation = appreciation_return(inputs, invested)?;

    let total_dollars = [debt.dollars, appreciation.dollars]
        .into_iter()
        .try_fold(cash.dollars, Decimal::checked_add)
        .ok_or_else(|| RentalRoiError::out_of_range("total_dollars"))?;
    let total_return_percent = [debt.percent, appreciation.percent]
        .into_iter()
        .try_fold(cash.percent, Decimal::checked_add)
        .ok_or_else(|| RentalRoiError::out_of_range("total_return_percent"))?;

    Ok(RoiBreakdown {
        initial_investment: invested,
        cash_flow_dollars: cash.dollars,
        cash_flow_return_percent: cash.percent,
        debt_reduction_dollars: debt.dollars,
        debt_reduction_return_percent: debt.percent,
        appreciation_dollars: appreciation.dollars,
        appreciation_return_percent: appreciation.percent,
        total_dollars,
        total_return_percent,
    })
}

fn component(dollars: Money, initial_investment: Money) -> RentalRoiResult<ReturnComponent> {
    if initial_investment <= Decimal::ZERO {
        return Err(RentalRoiError::InvalidLoanTerms {
            field: "initial_investment".into(),
            reason: "Returns are measured against a positive cash investment".into(),
        });
    }
    let percent = dollars
        .checked_mul(dec!(100))
        .and_then(|scaled| scaled.checked_div(initial_investment))
        .ok_or_else(|| RentalRoiError::out_of_range("initial_investment"))?;
    Ok(ReturnComponent { dollars, percent })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::cash_flow::{analyze, PropertyExpenses};
    use rust_decimal_macros::dec;

    fn sample_inputs() -> InvestmentInputs {
        InvestmentInputs {
            purchase_price: dec!(300000),
            down_payment: dec!(60000),
            closing_costs: dec!(9000),
            estimated_annual_appreciation_percent: dec!(3),
            monthly_rental_income: dec!(2200),
        }
    }

    fn sample_financing() -> FinancingTerms {
        FinancingTerms {
            annual_rate_percent: dec!(6),
            term_years: 30,
        }
    }

    fn sample_cash_flow() -> CashFlowResult {
        let expenses = PropertyExpenses {
            annual_property_taxes: dec!(3600),
            annual_insurance: dec!(1200),
            monthly_management: dec!(100),
            monthly_maintenance_repair: dec!(50),
            monthly_landscaping: dec!(20),
            monthly_utilities: dec!(30),
        };
        analyze(&sample_inputs(), &sample_financing(), &expenses).unwrap()
    }

    #[test]
    fn test_initial_investment() {
        assert_eq!(initial_investment(&sample_inputs()).unwrap(), dec!(69000));
    }

    #[test]
    fn test_zero_initial_investment_rejected() {
        let mut inputs = sample_inputs();
        inputs.down_payment = Decimal::ZERO;
        inputs.closing_costs = Decimal::ZERO;
        assert!(matches!(
            initial_investment(&inputs),
            Err(RentalRoiError::InvalidLoanTerms { .. })
        ));
    }

    #[test]
    fn test_cap_rate() {
        // NOI = 1600/mo => 19200/yr over 309000
        let cap = cap_rate_percent(&sample_cash_flow(), &sample_inputs()).unwrap();
        assert!((cap - dec!(6.2136)).abs() < dec!(0.0001), "got {cap}");
    }

    #[test]
    fn test_appreciation_return() {
        let r = appreciation_return(&sample_inputs(), dec!(69000)).unwrap();
        assert_eq!(r.dollars, dec!(9000));
        assert!((r.percent - dec!(13.04)).abs() < dec!(0.01));
    }

    #[test]
    fn test_cash_flow_return() {
        let r = annual_cash_flow_return(&sample_cash_flow(), dec!(69000)).unwrap();
        assert!((r.dollars - dec!(1932.94)).abs() < dec!(0.01), "got {}", r.dollars);
        assert!((r.percent - dec!(2.80)).abs() < dec!(0.01));
    }

    #[test]
    fn test_component_rejects_zero_denominator() {
        assert!(matches!(
            component(dec!(100), Decimal::ZERO),
            Err(RentalRoiError::InvalidLoanTerms { .. })
        ));
    }

    #[test]
    fn test_total_is_sum_of_parts() {
        let roi = total_return(&sample_inputs(), &sample_financing(), &sample_cash_flow()).unwrap();
        assert_eq!(
            roi.total_dollars,
            roi.cash_flow_dollars + roi.debt_reduction_dollars + roi.appreciation_dollars
        );
        assert_eq!(
            roi.total_return_percent,
            roi.cash_flow_return_percent
                + roi.debt_reduction_return_percent
                + roi.appreciation_return_percent
        );
    }

    #[test]
    fn test_initial_investment_rejects_negative_closing_costs() {
        // 60000 - 9000 would still be a positive investment
        let mut inputs = sample_inputs();
        inputs.closing_costs = dec!(-9000);
        match initial_investment(&inputs) {
            Err(RentalRoiError::InvalidInput { field, .. }) => assert_eq!(field, "closing_costs"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_appreciation_overflow_is_an_error() {
        let mut inputs = sample_inputs();
        inputs.purchase_price = Decimal::MAX;
        inputs.down_payment = dec!(1000000);
        assert!(matches!(
            appreciation_return(&inputs, dec!(1000000)),
            Err(RentalRoiError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_component_overflow_is_an_error() {
        assert!(matches!(
            component(Decimal::MAX, dec!(0.0001)),
            Err(RentalRoiError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_negative_appreciation_allowed() {
        let mut inputs = sample_inputs();
        inputs.estimated_annual_appreciation_percent = dec!(-2);
        let r = appreciation_return(&inputs, dec!(69000)).unwrap();
        assert_eq!(r.dollars, dec!(-6000));
    }
}
