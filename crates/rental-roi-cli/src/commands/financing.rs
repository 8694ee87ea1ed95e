use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

use rental_roi_core::financing::amortization::{
    self, amortization_schedule, principal_paid_over_months, LoanTerms,
};
use rental_roi_core::types::{with_metadata, Money};

use crate::input;

/// Loan description shared by `payment` and `schedule`.
#[derive(Args)]
pub struct LoanArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Amount borrowed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent (e.g. 6.5)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Loan term in years
    #[arg(long)]
    pub term_years: Option<u32>,
}

/// Arguments for the monthly payment calculation
#[derive(Args)]
pub struct PaymentArgs {
    #[command(flatten)]
    pub loan: LoanArgs,
}

/// Arguments for the amortisation schedule
#[derive(Args)]
pub struct ScheduleArgs {
    #[command(flatten)]
    pub loan: LoanArgs,

    /// Date of the first payment (YYYY-MM-DD); later rows advance monthly
    #[arg(long)]
    pub first_payment_date: Option<NaiveDate>,
}

#[derive(Serialize, Deserialize)]
struct PaymentSummary {
    monthly_payment: Money,
    number_of_payments: u32,
    first_year_principal_paid: Money,
}

fn resolve_loan(args: &LoanArgs) -> Result<LoanTerms, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.input {
        return Ok(input::file::read_input(path)?);
    }
    if let Some(data) = input::stdin::read_stdin()? {
        return Ok(serde_json::from_value(data)?);
    }

    let principal = args
        .principal
        .ok_or("--principal is required (or provide --input)")?;
    let rate = args.rate.ok_or("--rate is required (or provide --input)")?;
    let term_years = args
        .term_years
        .ok_or("--term-years is required (or provide --input)")?;

    Ok(LoanTerms::new(principal, rate, term_years)?)
}

pub fn run_payment(args: PaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let terms = resolve_loan(&args.loan)?;
    tracing::debug!(
        principal = %terms.principal,
        rate = %terms.annual_rate_percent,
        term_years = terms.term_years,
        "computing monthly payment"
    );

    let monthly_payment = amortization::monthly_payment(
        terms.principal,
        terms.annual_rate_percent,
        terms.term_years,
    )?;
    let first_year_principal_paid = principal_paid_over_months(
        terms.principal,
        terms.annual_rate_percent,
        terms.term_years,
        12,
    )?;

    let summary = PaymentSummary {
        monthly_payment,
        number_of_payments: terms.total_months()?,
        first_year_principal_paid,
    };

    let output = with_metadata(
        "Fixed-Rate Mortgage Payment",
        &terms,
        Vec::new(),
        start.elapsed().as_micros() as u64,
        summary,
    )?;
    Ok(serde_json::to_value(output)?)
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let terms = resolve_loan(&args.loan)?;
    tracing::debug!(
        months = terms.term_years.saturating_mul(12),
        "building amortisation schedule"
    );

    let schedule = amortization_schedule(&terms, args.first_payment_date)?;
    Ok(serde_json::to_value(schedule)?)
}
