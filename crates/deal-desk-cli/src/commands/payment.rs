use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use deal_desk_core::payment::{
    amortization_schedule, compute_payment, payment_grid, LoanTerms, PaymentGridInput,
    ScheduleInput,
};

use crate::input;

/// Arguments for a single payment quote
#[derive(Args)]
pub struct PaymentArgs {
    /// Amount financed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// APR as quoted, e.g. 5.50 for 5.50%
    #[arg(long, alias = "apr")]
    pub annual_rate_percent: Option<Decimal>,

    /// Term in months
    #[arg(long, alias = "term")]
    pub term_months: Option<u32>,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for a multi-term quote grid
#[derive(Args)]
pub struct GridArgs {
    /// Amount financed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// APR as quoted, e.g. 12.75 for 12.75%
    #[arg(long, alias = "apr")]
    pub annual_rate_percent: Option<Decimal>,

    /// Candidate terms in months, comma separated
    #[arg(long, value_delimiter = ',', default_values_t = [36u32, 48, 60, 72])]
    pub terms: Vec<u32>,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for a full amortization schedule
#[derive(Args)]
pub struct ScheduleArgs {
    /// Amount financed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// APR as quoted, e.g. 5.50 for 5.50%
    #[arg(long, alias = "apr")]
    pub annual_rate_percent: Option<Decimal>,

    /// Term in months
    #[arg(long, alias = "term")]
    pub term_months: Option<u32>,

    /// Due date of the first payment, YYYY-MM-DD
    #[arg(long)]
    pub first_payment_date: Option<NaiveDate>,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

fn loan_terms_from_flags(
    principal: Option<Decimal>,
    annual_rate_percent: Option<Decimal>,
    term_months: Option<u32>,
) -> Result<LoanTerms, Box<dyn std::error::Error>> {
    Ok(LoanTerms {
        principal: principal.ok_or("--principal is required")?,
        annual_rate_percent: annual_rate_percent.ok_or("--apr is required")?,
        term_months: term_months.ok_or("--term is required")?,
    })
}

pub fn run_payment(args: PaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let terms: LoanTerms = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        loan_terms_from_flags(args.principal, args.annual_rate_percent, args.term_months)?
    };
    let result = compute_payment(&terms)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_grid(args: GridArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let grid_input: PaymentGridInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        PaymentGridInput {
            principal: args.principal.ok_or("--principal is required")?,
            annual_rate_percent: args.annual_rate_percent.ok_or("--apr is required")?,
            terms: args.terms,
        }
    };
    let result = payment_grid(&grid_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let schedule_input: ScheduleInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        ScheduleInput {
            terms: loan_terms_from_flags(
                args.principal,
                args.annual_rate_percent,
                args.term_months,
            )?,
            first_payment_date: args.first_payment_date,
        }
    };
    let result = amortization_schedule(&schedule_input)?;
    Ok(serde_json::to_value(result)?)
}
