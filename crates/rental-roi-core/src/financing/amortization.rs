use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::RentalRoiError;
use crate::types::{Money, Percent};
use crate::RentalRoiResult;

const MONTHS_PER_YEAR: u32 = 12;

/// Longest amortisation period accepted.
pub const MAX_TERM_YEARS: u32 = 50;

/// Residual balance below one cent on the final payment counts as repaid.
const BALANCE_TOLERANCE: Decimal = dec!(0.01);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A fixed-rate, fully amortising mortgage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    /// Amount borrowed
    pub principal: Money,
    /// Nominal annual interest rate in percent (6 = 6%)
    pub annual_rate_percent: Percent,
    /// Amortisation period in years
    pub term_years: u32,
}

impl LoanTerms {
    /// Validated constructor. Fails with `InvalidLoanTerms` for a
    /// non-positive principal, a term of zero or over `MAX_TERM_YEARS`, or a
    /// negative rate.
    pub fn new(
        principal: Money,
        annual_rate_percent: Percent,
        term_years: u32,
    ) -> RentalRoiResult<Self> {
        validate_terms(principal, annual_rate_percent, term_years)?;
        Ok(LoanTerms {
            principal,
            annual_rate_percent,
            term_years,
        })
    }

    pub fn total_months(&self) -> RentalRoiResult<u32> {
        total_months(self.term_years)
    }

    pub fn monthly_rate(&self) -> Decimal {
        self.annual_rate_percent / dec!(1200)
    }

    pub fn monthly_payment(&self) -> RentalRoiResult<Money> {
        monthly_payment(self.principal, self.annual_rate_percent, self.term_years)
    }
}

/// Rate and term as entered by the buyer. The principal is derived from the
/// purchase (price less down payment), so it is not part of this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancingTerms {
    pub annual_rate_percent: Percent,
    pub term_years: u32,
}

impl FinancingTerms {
    pub fn for_principal(&self, principal: Money) -> RentalRoiResult<LoanTerms> {
        LoanTerms::new(principal, self.annual_rate_percent, self.term_years)
    }
}

/// One row of an amortisation schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationMonth {
    /// 1-based payment number
    pub index: u32,
    /// Scheduled payment date, when a first payment date was supplied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<NaiveDate>,
    /// Fixed monthly payment (interest + principal)
    pub payment: Money,
    pub interest_portion: Money,
    pub principal_portion: Money,
    /// Balance after this payment
    pub remaining_balance: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Standard fixed-rate mortgage payment: P * r / (1 - (1+r)^-n)
///
/// `r` is the monthly rate (annual percent / 1200) and `n` the number of
/// monthly payments. A zero rate is straight-line: P / n.
pub fn monthly_payment(
    principal: Money,
    annual_rate_percent: Percent,
    term_years: u32,
) -> RentalRoiResult<Money> {
    validate_terms(principal, annual_rate_percent, term_years)?;

    let monthly_rate = annual_rate_percent / dec!(1200);
    let n = total_months(term_years)?;

    if monthly_rate.is_zero() {
        return Ok(principal / Decimal::from(n));
    }

    // (1 + r)^n via iterative multiplication. On overflow (1+r)^-n is
    // indistinguishable from zero and the payment tends to P * r.
    let growth = Decimal::ONE
        .checked_add(monthly_rate)
        .ok_or_else(|| loan_out_of_range("annual_rate_percent"))?;
    let mut compound = Some(Decimal::ONE);
    for _ in 0..n {
        compound = compound.and_then(|c| c.checked_mul(growth));
    }
    let discount = match compound {
        Some(c) => Decimal::ONE / c,
        None => Decimal::ZERO,
    };

    let denominator = Decimal::ONE - discount;
    if denominator <= Decimal::ZERO {
        return Err(RentalRoiError::InvalidLoanTerms {
            field: "annual_rate_percent".into(),
            reason: "Rate too small to amortise at decimal precision".into(),
        });
    }

    principal
        .checked_mul(monthly_rate)
        .and_then(|interest| interest.checked_div(denominator))
        .ok_or_else(|| loan_out_of_range("principal"))
}

/// Cumulative principal repaid over the first `month_count` payments.
///
/// Runs the amortisation month by month with the fixed payment. A
/// `month_count` beyond the loan term is not rejected; past the final
/// payment the simulated balance goes negative.
pub fn principal_paid_over_months(
    principal: Money,
    annual_rate_percent: Percent,
    term_years: u32,
    month_count: u32,
) -> RentalRoiResult<Money> {
    let payment = monthly_payment(principal, annual_rate_percent, term_years)?;
    let monthly_rate = annual_rate_percent / dec!(1200);

    let mut balance = principal;
    let mut paid = Decimal::ZERO;
    for _ in 0..month_count {
        let step = amortize_step(balance, payment, monthly_rate)?;
        paid = paid
            .checked_add(step.principal_portion)
            .ok_or_else(|| loan_out_of_range("month_count"))?;
        balance = step.balance;
    }

    Ok(paid)
}

/// Full month-by-month schedule for the life of the loan.
pub fn amortization_schedule(
    terms: &LoanTerms,
    first_payment_date: Option<NaiveDate>,
) -> RentalRoiResult<Vec<AmortizationMonth>> {
    let payment = terms.monthly_payment()?;
    let monthly_rate = terms.monthly_rate();
    let n = terms.total_months()?;

    let mut rows = Vec::with_capacity(n as usize);
    let mut balance = terms.principal;

    for index in 1..=n {
        let step = amortize_step(balance, payment, monthly_rate)?;
        balance = step.balance;

        if index == n && balance.abs() < BALANCE_TOLERANCE {
            balance = Decimal::ZERO;
        }

        let payment_date = match first_payment_date {
            Some(first) => Some(payment_date_for(first, index)?),
            None => None,
        };

        rows.push(AmortizationMonth {
            index,
            payment_date,
            payment,
            interest_portion: step.interest_portion,
            principal_portion: step.principal_portion,
            remaining_balance: balance,
        });
    }

    Ok(rows)
}

/// Outstanding balance after `months` payments.
pub fn remaining_balance_after(terms: &LoanTerms, months: u32) -> RentalRoiResult<Money> {
    let n = terms.total_months()?;
    if months > n {
        return Err(RentalRoiError::InvalidInput {
            field: "months".into(),
            reason: format!("Loan has only {n} payments, requested balance after {months}"),
        });
    }
    if months == n {
        return Ok(Decimal::ZERO);
    }

    let paid = principal_paid_over_months(
        terms.principal,
        terms.annual_rate_percent,
        terms.term_years,
        months,
    )?;
    let balance = terms
        .principal
        .checked_sub(paid)
        .ok_or_else(|| loan_out_of_range("principal"))?;
    Ok(balance.max(Decimal::ZERO))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn validate_terms(
    principal: Money,
    annual_rate_percent: Percent,
    term_years: u32,
) -> RentalRoiResult<()> {
    if principal <= Decimal::ZERO {
        return Err(RentalRoiError::InvalidLoanTerms {
            field: "principal".into(),
            reason: "Loan principal must be positive".into(),
        });
    }
    if term_years == 0 {
        return Err(RentalRoiError::InvalidLoanTerms {
            field: "term_years".into(),
            reason: "Loan term must be at least 1 year".into(),
        });
    }
    if term_years > MAX_TERM_YEARS {
        return Err(RentalRoiError::InvalidLoanTerms {
            field: "term_years".into(),
            reason: format!("Loan term cannot exceed {MAX_TERM_YEARS} years"),
        });
    }
    if annual_rate_percent < Decimal::ZERO {
        return Err(RentalRoiError::InvalidLoanTerms {
            field: "annual_rate_percent".into(),
            reason: "Interest rate cannot be negative".into(),
        });
    }
    Ok(())
}

/// One month of amortisation at a fixed payment.
struct AmortizationStep {
    interest_portion: Money,
    principal_portion: Money,
    balance: Money,
}

fn amortize_step(
    balance: Money,
    payment: Money,
    monthly_rate: Decimal,
) -> RentalRoiResult<AmortizationStep> {
    let interest_portion = balance
        .checked_mul(monthly_rate)
        .ok_or_else(|| loan_out_of_range("principal"))?;
    let principal_portion = payment
        .checked_sub(interest_portion)
        .ok_or_else(|| loan_out_of_range("principal"))?;
    let balance = balance
        .checked_sub(principal_portion)
        .ok_or_else(|| loan_out_of_range("principal"))?;
    Ok(AmortizationStep {
        interest_portion,
        principal_portion,
        balance,
    })
}

fn loan_out_of_range(field: &str) -> RentalRoiError {
    RentalRoiError::InvalidLoanTerms {
        field: field.into(),
        reason: "Loan amount or rate is too large to amortise".into(),
    }
}

fn total_months(term_years: u32) -> RentalRoiResult<u32> {
    term_years
        .checked_mul(MONTHS_PER_YEAR)
        .ok_or_else(|| RentalRoiError::InvalidLoanTerms {
            field: "term_years".into(),
            reason: format!("Loan term of {term_years} years is out of range"),
        })
}

fn payment_date_for(first: NaiveDate, index: u32) -> RentalRoiResult<NaiveDate> {
    first
        .checked_add_months(Months::new(index - 1))
        .ok_or_else(|| RentalRoiError::InvalidInput {
            field: "first_payment_date".into(),
            reason: format!("Payment {index} falls outside the supported date range"),
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_monthly_payment_30_year_fixed() {
        // $200k at 6% over 30 years, expected ~$1,199.10/mo
        let payment = monthly_payment(dec!(200000), dec!(6), 30).unwrap();
        assert!(
            (payment - dec!(1199.10)).abs() < dec!(0.01),
            "Monthly payment {payment} outside expected range"
        );
    }

    #[test]
    fn test_zero_rate_mortgage() {
        let payment = monthly_payment(dec!(360000), Decimal::ZERO, 30).unwrap();
        // $360k / 360 months = $1000/mo
        assert_eq!(payment, dec!(1000));
    }

    #[test]
    fn test_zero_principal_rejected() {
        let err = monthly_payment(Decimal::ZERO, dec!(5), 30).unwrap_err();
        match err {
            RentalRoiError::InvalidLoanTerms { field, .. } => assert_eq!(field, "principal"),
            other => panic!("Expected InvalidLoanTerms, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_term_rejected() {
        assert!(matches!(
            monthly_payment(dec!(100000), dec!(5), 0),
            Err(RentalRoiError::InvalidLoanTerms { .. })
        ));
    }

    #[test]
    fn test_negative_rate_rejected() {
        assert!(matches!(
            monthly_payment(dec!(100000), dec!(-0.5), 30),
            Err(RentalRoiError::InvalidLoanTerms { .. })
        ));
    }

    #[test]
    fn test_term_above_cap_rejected() {
        match LoanTerms::new(dec!(100000), dec!(5), MAX_TERM_YEARS + 1) {
            Err(RentalRoiError::InvalidLoanTerms { field, .. }) => assert_eq!(field, "term_years"),
            other => panic!("Expected InvalidLoanTerms, got {other:?}"),
        }
        assert!(monthly_payment(dec!(100000), dec!(5), u32::MAX).is_err());
        assert!(monthly_payment(dec!(100000), dec!(5), MAX_TERM_YEARS).is_ok());
    }

    #[test]
    fn test_huge_rate_is_an_error_not_a_panic() {
        let rate = Decimal::MAX;
        assert!(matches!(
            monthly_payment(dec!(240000), rate, 30),
            Err(RentalRoiError::InvalidLoanTerms { .. })
        ));
        assert!(principal_paid_over_months(dec!(240000), rate, 30, 12).is_err());
    }

    #[test]
    fn test_huge_principal_amortises_without_panicking() {
        let terms = LoanTerms::new(Decimal::MAX, dec!(6), 1).unwrap();
        let schedule = amortization_schedule(&terms, None).unwrap();
        assert_eq!(schedule.len(), 12);
        assert!(matches!(
            monthly_payment(Decimal::MAX, dec!(1200000), 1),
            Err(RentalRoiError::InvalidLoanTerms { .. })
        ));
    }

    #[test]
    fn test_principal_paid_first_year() {
        // $240k at 6%: month 1 principal = 1438.92 - 1200 = 238.92,
        // twelve months of geometric growth at 0.5% ≈ 2947.23
        let paid = principal_paid_over_months(dec!(240000), dec!(6), 30, 12).unwrap();
        assert!((paid - dec!(2947.23)).abs() < dec!(0.01), "got {paid}");
    }

    #[test]
    fn test_principal_paid_zero_months() {
        let paid = principal_paid_over_months(dec!(240000), dec!(6), 30, 0).unwrap();
        assert_eq!(paid, Decimal::ZERO);
    }

    #[test]
    fn test_schedule_constant_payment() {
        let terms = LoanTerms::new(dec!(150000), dec!(4.5), 15).unwrap();
        let payment = terms.monthly_payment().unwrap();
        let schedule = amortization_schedule(&terms, None).unwrap();

        assert_eq!(schedule.len(), 180);
        for row in &schedule {
            let split = row.interest_portion + row.principal_portion;
            assert!((split - payment).abs() < dec!(0.0000000001));
        }
    }

    #[test]
    fn test_schedule_balance_reaches_zero() {
        let terms = LoanTerms::new(dec!(150000), dec!(4.5), 15).unwrap();
        let schedule = amortization_schedule(&terms, None).unwrap();

        for pair in schedule.windows(2) {
            assert!(pair[1].remaining_balance <= pair[0].remaining_balance);
        }
        assert_eq!(schedule.last().unwrap().remaining_balance, Decimal::ZERO);
    }

    #[test]
    fn test_schedule_payment_dates() {
        let terms = LoanTerms::new(dec!(10000), dec!(3), 1).unwrap();
        let first = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let schedule = amortization_schedule(&terms, Some(first)).unwrap();

        assert_eq!(schedule[0].payment_date, Some(first));
        // Month-end clamps to the last day of February
        assert_eq!(
            schedule[1].payment_date,
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
        assert_eq!(
            schedule[11].payment_date,
            NaiveDate::from_ymd_opt(2024, 12, 31)
        );
    }

    #[test]
    fn test_remaining_balance_after() {
        let terms = LoanTerms::new(dec!(240000), dec!(6), 30).unwrap();
        let balance = remaining_balance_after(&terms, 12).unwrap();
        assert!((balance - dec!(237052.77)).abs() < dec!(0.01), "got {balance}");
        assert_eq!(remaining_balance_after(&terms, 360).unwrap(), Decimal::ZERO);
        assert!(remaining_balance_after(&terms, 361).is_err());
    }

    #[test]
    fn test_financing_terms_for_principal() {
        let financing = FinancingTerms {
            annual_rate_percent: dec!(6),
            term_years: 30,
        };
        let terms = financing.for_principal(dec!(240000)).unwrap();
        assert_eq!(terms.principal, dec!(240000));
        assert!(financing.for_principal(Decimal::ZERO).is_err());
    }
}
