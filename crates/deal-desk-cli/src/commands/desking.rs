use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use deal_desk_core::desking::{compute_deal_totals, desk_deal, DealTotalsInput, DeskDealInput};
use deal_desk_core::fees::{resolve_fees, FeeOverrides};

use crate::commands::fees::load_table;
use crate::input;

/// Arguments for deal totals
#[derive(Args)]
pub struct TotalsArgs {
    #[arg(long)]
    pub vehicle_price: Option<Decimal>,

    #[arg(long, default_value = "0")]
    pub trade_value: Decimal,

    #[arg(long, default_value = "0")]
    pub down_payment: Decimal,

    /// Customer ZIP code for the fee lookup
    #[arg(long)]
    pub zip: Option<String>,

    /// Path to a custom fee table JSON; builtin table when omitted
    #[arg(long)]
    pub table: Option<String>,

    /// Path to JSON input file with a DealTotalsInput (still needs --zip)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for a one-shot desk quote
#[derive(Args)]
pub struct DeskArgs {
    #[arg(long)]
    pub vehicle_price: Option<Decimal>,

    #[arg(long, default_value = "0")]
    pub trade_value: Decimal,

    #[arg(long, default_value = "0")]
    pub down_payment: Decimal,

    /// Customer ZIP code for the fee lookup
    #[arg(long)]
    pub zip: Option<String>,

    /// APR as quoted, e.g. 5.50 for 5.50%
    #[arg(long, alias = "apr")]
    pub annual_rate_percent: Option<Decimal>,

    /// Term in months
    #[arg(long, alias = "term")]
    pub term_months: Option<u32>,

    /// Override the looked-up tax rate (decimal fraction)
    #[arg(long)]
    pub tax_rate: Option<Decimal>,

    /// Override the looked-up title fee
    #[arg(long)]
    pub title_fee: Option<Decimal>,

    /// Path to a custom fee table JSON; builtin table when omitted
    #[arg(long)]
    pub table: Option<String>,

    /// Path to JSON input file with a DeskDealInput (overrides flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_totals(args: TotalsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let pricing: DealTotalsInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        DealTotalsInput {
            vehicle_price: args.vehicle_price.ok_or("--vehicle-price is required")?,
            trade_value: args.trade_value,
            down_payment: args.down_payment,
        }
    };

    let zip = args.zip.ok_or("--zip is required for the fee lookup")?;
    let table = load_table(&args.table)?;
    let fees = resolve_fees(&zip, &table, &FeeOverrides::default())?;

    let result = compute_deal_totals(&pricing, &fees)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_desk(args: DeskArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let table = load_table(&args.table)?;

    let desk_input: DeskDealInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        DeskDealInput {
            vehicle_price: args.vehicle_price.ok_or("--vehicle-price is required")?,
            trade_value: args.trade_value,
            down_payment: args.down_payment,
            zip_code: args.zip.ok_or("--zip is required")?,
            annual_rate_percent: args.annual_rate_percent.ok_or("--apr is required")?,
            term_months: args.term_months.ok_or("--term is required")?,
            overrides: FeeOverrides {
                tax_rate: args.tax_rate,
                title_fee: args.title_fee,
            },
        }
    };

    let result = desk_deal(&desk_input, &table)?;
    Ok(serde_json::to_value(result)?)
}
