use clap::Args;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

use rental_roi_core::analysis::cash_flow::{self, InvestmentInputs, PropertyExpenses};
use rental_roi_core::analysis::property::{self, PropertyAnalysisInput};
use rental_roi_core::financing::amortization::FinancingTerms;
use rental_roi_core::parse::AnalysisForm;
use rental_roi_core::types::with_metadata;

use crate::input;

/// Arguments for the monthly cash flow calculation
#[derive(Args)]
pub struct CashFlowArgs {
    /// Path to JSON/YAML input file with `inputs`, `financing` and `expenses`
    #[arg(long)]
    pub input: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct CashFlowRequest {
    inputs: InvestmentInputs,
    financing: FinancingTerms,
    #[serde(default)]
    expenses: PropertyExpenses,
}

pub fn run_cash_flow(args: CashFlowArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let request: CashFlowRequest = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file> or stdin required for cash flow".into());
    };

    let result = cash_flow::analyze(&request.inputs, &request.financing, &request.expenses)?;
    let output = with_metadata(
        "Monthly Rental Cash Flow",
        &request,
        Vec::new(),
        start.elapsed().as_micros() as u64,
        result,
    )?;
    Ok(serde_json::to_value(output)?)
}

/// Arguments for the full property analysis.
///
/// Numeric flags are taken as text and parsed by the same rules a form
/// would use, so malformed values are reported per field.
#[derive(Args)]
pub struct AnalyzeArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Label for the property, e.g. its street address
    #[arg(long)]
    pub property_name: Option<String>,

    #[arg(long)]
    pub purchase_price: Option<String>,

    #[arg(long)]
    pub down_payment: Option<String>,

    #[arg(long)]
    pub closing_costs: Option<String>,

    /// Annual interest rate in percent
    #[arg(long)]
    pub rate: Option<String>,

    #[arg(long)]
    pub term_years: Option<String>,

    /// Expected first-year appreciation in percent
    #[arg(long, allow_hyphen_values = true)]
    pub appreciation: Option<String>,

    #[arg(long)]
    pub annual_taxes: Option<String>,

    #[arg(long)]
    pub annual_insurance: Option<String>,

    #[arg(long)]
    pub management: Option<String>,

    #[arg(long)]
    pub maintenance: Option<String>,

    #[arg(long)]
    pub landscaping: Option<String>,

    #[arg(long)]
    pub utilities: Option<String>,

    /// Gross monthly rent (ignored when a rent roll is given in --input)
    #[arg(long)]
    pub rent: Option<String>,
}

impl AnalyzeArgs {
    fn into_form(self) -> AnalysisForm {
        AnalysisForm {
            property_name: self.property_name,
            purchase_price: self.purchase_price,
            down_payment: self.down_payment,
            closing_costs: self.closing_costs,
            annual_rate_percent: self.rate,
            term_years: self.term_years,
            estimated_annual_appreciation_percent: self.appreciation,
            annual_property_taxes: self.annual_taxes,
            annual_insurance: self.annual_insurance,
            monthly_management: self.management,
            monthly_maintenance_repair: self.maintenance,
            monthly_landscaping: self.landscaping,
            monthly_utilities: self.utilities,
            monthly_rental_income: self.rent,
            rent_roll: Vec::new(),
        }
    }
}

pub fn run_analyze(args: AnalyzeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let input_path = args.input.clone();
    let analysis_input: PropertyAnalysisInput = if let Some(path) = input_path.as_deref() {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        args.into_form().parse()?
    };

    tracing::debug!(
        property = analysis_input.property_name.as_deref().unwrap_or("(unnamed)"),
        purchase_price = %analysis_input.purchase_price,
        "running property analysis"
    );

    let result = property::analyze_property(&analysis_input)?;
    Ok(serde_json::to_value(result)?)
}
