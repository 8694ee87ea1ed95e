//! Property-based tests for the amortisation math.
//!
//! Invariants verified:
//! - payments over the life of the loan recover at least the principal
//! - cumulative principal over the full term equals the principal
//! - a zero-rate loan pays exactly principal / months
//! - principal paid is strictly increasing in months and bounded by principal
//! - every schedule row splits the same fixed payment

use proptest::prelude::*;
use rental_roi_core::financing::amortization::{
    amortization_schedule, monthly_payment, principal_paid_over_months, LoanTerms,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Whole-dollar principals [1 000, 2 000 000].
fn principal_strat() -> impl Strategy<Value = Decimal> {
    (1_000u64..=2_000_000u64).prop_map(Decimal::from)
}

/// Rates in basis points [0, 15%], as percent.
fn rate_strat() -> impl Strategy<Value = Decimal> {
    (0u32..=1_500u32).prop_map(|bp| Decimal::from(bp) / dec!(100))
}

fn term_strat() -> impl Strategy<Value = u32> {
    1u32..=40u32
}

#[test]
fn test_standard_payment() {
    let payment = monthly_payment(dec!(200000), dec!(6), 30).unwrap();
    assert!((payment - dec!(1199.10)).abs() < dec!(0.01), "got {payment}");
}

#[test]
fn test_zero_rate_is_straight_line() {
    let payment = monthly_payment(dec!(250000), Decimal::ZERO, 25).unwrap();
    assert_eq!(payment, dec!(250000) / dec!(300));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn payments_recover_principal(
        principal in principal_strat(),
        rate in rate_strat(),
        years in term_strat(),
    ) {
        let payment = monthly_payment(principal, rate, years).unwrap();
        let total = payment * Decimal::from(years * 12);
        prop_assert!(total >= principal - dec!(0.000001), "{total} < {principal}");
    }

    #[test]
    fn full_term_repays_principal(
        principal in principal_strat(),
        rate in rate_strat(),
        years in term_strat(),
    ) {
        let paid = principal_paid_over_months(principal, rate, years, years * 12).unwrap();
        prop_assert!((paid - principal).abs() < dec!(0.01), "paid {paid} of {principal}");
    }

    #[test]
    fn zero_rate_payment_is_exact(principal in principal_strat(), years in term_strat()) {
        let payment = monthly_payment(principal, Decimal::ZERO, years).unwrap();
        prop_assert_eq!(payment, principal / Decimal::from(years * 12));
    }

    #[test]
    fn principal_paid_increases_and_is_bounded(
        principal in principal_strat(),
        rate in rate_strat(),
        years in term_strat(),
        frac in 1u32..100u32,
    ) {
        let n = years * 12;
        let months = (n * frac / 100).clamp(1, n - 1);
        let earlier = principal_paid_over_months(principal, rate, years, months - 1).unwrap();
        let later = principal_paid_over_months(principal, rate, years, months).unwrap();
        prop_assert!(later > earlier);
        prop_assert!(later <= principal);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn schedule_rows_split_fixed_payment(
        principal in principal_strat(),
        rate in rate_strat(),
        years in 1u32..=10u32,
    ) {
        let terms = LoanTerms::new(principal, rate, years).unwrap();
        let payment = terms.monthly_payment().unwrap();
        let schedule = amortization_schedule(&terms, None).unwrap();

        prop_assert_eq!(schedule.len() as u32, years * 12);
        prop_assert_eq!(schedule[0].index, 1);
        for row in &schedule {
            let split = row.interest_portion + row.principal_portion;
            prop_assert!((split - payment).abs() < dec!(0.0000000001));
        }
        prop_assert_eq!(schedule.last().unwrap().remaining_balance, Decimal::ZERO);
    }
}
