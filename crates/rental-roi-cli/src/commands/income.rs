use clap::Args;
use serde_json::Value;
use std::time::Instant;

use rental_roi_core::income::rent_roll::{self, RentRollEntry};
use rental_roi_core::parse::RentRollFormRow;
use rental_roi_core::types::with_metadata;

use crate::input;

/// Arguments for rent roll aggregation
#[derive(Args)]
pub struct RentRollArgs {
    /// Path to JSON/YAML file holding an array of rent roll entries
    #[arg(long)]
    pub input: Option<String>,

    /// Unit line as TYPE:RENT:COUNT (e.g. "one_bedroom:950:2"); repeatable
    #[arg(long = "unit", value_name = "TYPE:RENT:COUNT")]
    pub units: Vec<String>,
}

fn parse_unit_spec(spec: &str) -> Result<RentRollEntry, Box<dyn std::error::Error>> {
    let mut parts = spec.splitn(3, ':');
    let (unit_type, rent) = match (parts.next(), parts.next()) {
        (Some(t), Some(r)) => (t, r),
        _ => return Err(format!("--unit '{spec}' must look like TYPE:RENT:COUNT").into()),
    };
    let row = RentRollFormRow {
        unit_type: unit_type.to_string(),
        monthly_rent_per_unit: rent.to_string(),
        unit_count: parts.next().unwrap_or_default().to_string(),
    };
    Ok(row.parse()?)
}

pub fn run_rent_roll(args: RentRollArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let entries: Vec<RentRollEntry> = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if !args.units.is_empty() {
        args.units
            .iter()
            .map(|s| parse_unit_spec(s))
            .collect::<Result<Vec<_>, _>>()?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file>, --unit TYPE:RENT:COUNT or stdin required for rent roll".into());
    };

    let mut warnings = Vec::new();
    if let Err(e) = rent_roll::ensure_complete(&entries) {
        tracing::debug!(error = %e, "rent roll incomplete");
        warnings.push(e.to_string());
    }

    let summary = rent_roll::summarize(&entries)?;
    let output = with_metadata(
        "Rent Roll Aggregation",
        &entries,
        warnings,
        start.elapsed().as_micros() as u64,
        summary,
    )?;
    Ok(serde_json::to_value(output)?)
}
