use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use deal_desk_core::credit::{builtin_lenders, quote_lenders, RateQuoteInput};

use crate::input;

/// Arguments for lender panel quotes
#[derive(Args)]
pub struct QuoteArgs {
    /// Buyer credit score (300-850)
    #[arg(long)]
    pub score: Option<u16>,

    /// Loan-to-value of the proposed structure, in percent
    #[arg(long)]
    pub ltv: Option<Decimal>,

    /// Path to JSON input file with a RateQuoteInput
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_quote(args: QuoteArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let quote_input: RateQuoteInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        RateQuoteInput {
            credit_score: args.score.ok_or("--score is required")?,
            ltv_percent: args.ltv,
        }
    };
    let result = quote_lenders(&quote_input, &builtin_lenders())?;
    Ok(serde_json::to_value(result)?)
}
