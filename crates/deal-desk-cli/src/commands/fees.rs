use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use deal_desk_core::fees::{resolve_fees, FeeOverrides, RegionalFeeTable};

use crate::input;

/// Arguments for regional fee lookup
#[derive(Args)]
pub struct FeesArgs {
    /// Customer ZIP code (first two digits select the region)
    #[arg(long)]
    pub zip: String,

    /// Path to a custom fee table JSON; builtin table when omitted
    #[arg(long)]
    pub table: Option<String>,

    /// Override the looked-up tax rate (decimal fraction, 0.0825 = 8.25%)
    #[arg(long)]
    pub tax_rate: Option<Decimal>,

    /// Override the looked-up title fee
    #[arg(long)]
    pub title_fee: Option<Decimal>,
}

pub fn load_table(path: &Option<String>) -> Result<RegionalFeeTable, Box<dyn std::error::Error>> {
    match path {
        Some(p) => Ok(input::file::read_json(p)?),
        None => Ok(RegionalFeeTable::builtin()),
    }
}

pub fn run_fees(args: FeesArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let table = load_table(&args.table)?;
    let overrides = FeeOverrides {
        tax_rate: args.tax_rate,
        title_fee: args.title_fee,
    };
    let fees = resolve_fees(&args.zip, &table, &overrides)?;
    Ok(serde_json::to_value(fees)?)
}
