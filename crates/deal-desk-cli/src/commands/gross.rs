use clap::Args;
use serde::Deserialize;
use serde_json::Value;

use deal_desk_core::gross::{
    calculate_deal_gross, fi_product_catalog, generate_accounting_entries, generate_deal_number,
    trial_balance, validate_deal_structure, DealRecord, GrossInput,
};

use crate::input;

#[derive(Args)]
pub struct GrossArgs {
    /// Path to JSON input file with a GrossInput
    #[arg(long)]
    pub input: Option<String>,
}

#[derive(Args)]
pub struct AccountingArgs {
    /// Path to JSON input file with {"deal": DealRecord, "gross": GrossInput}
    #[arg(long)]
    pub input: Option<String>,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Path to JSON input file with a DealRecord
    #[arg(long)]
    pub input: Option<String>,
}

#[derive(Deserialize)]
struct AccountingInput {
    deal: DealRecord,
    gross: GrossInput,
}

pub fn run_gross(args: GrossArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let gross_input: GrossInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file.json> or stdin required for deal gross".into());
    };
    let result = calculate_deal_gross(&gross_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_accounting(args: AccountingArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let acct_input: AccountingInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file.json> or stdin required for accounting entries".into());
    };

    let gross = calculate_deal_gross(&acct_input.gross)?;
    let entries = generate_accounting_entries(&acct_input.deal, &gross.result);
    let (debits, credits) = trial_balance(&entries);

    Ok(serde_json::json!({
        "entries": entries,
        "total_debits": debits.to_string(),
        "total_credits": credits.to_string(),
        "gross": gross.result,
    }))
}

pub fn run_validate(args: ValidateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let deal: DealRecord = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file.json> or stdin required for deal validation".into());
    };

    let errors = validate_deal_structure(&deal);
    Ok(serde_json::json!({
        "valid": errors.is_empty(),
        "errors": errors,
    }))
}

pub fn run_deal_number() -> Result<Value, Box<dyn std::error::Error>> {
    Ok(serde_json::json!({ "deal_number": generate_deal_number() }))
}

pub fn run_products() -> Result<Value, Box<dyn std::error::Error>> {
    Ok(serde_json::to_value(fi_product_catalog())?)
}
