mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::credit::QuoteArgs;
use commands::desking::{DeskArgs, TotalsArgs};
use commands::fees::FeesArgs;
use commands::gross::{AccountingArgs, GrossArgs, ValidateArgs};
use commands::payment::{GridArgs, PaymentArgs, ScheduleArgs};

/// Dealership deal-desk calculations
#[derive(Parser)]
#[command(
    name = "desk",
    version,
    about = "Dealership deal-desk calculations",
    long_about = "A CLI for dealership deal-desk math with decimal precision. \
                  Supports amortized payments, multi-term quote grids, regional \
                  tax and title fees, deal totals, lender rate quotes, and deal \
                  gross with accounting entries."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Fixed monthly payment with totals for one loan structure
    Payment(PaymentArgs),
    /// Payment quotes across several candidate terms
    Grid(GridArgs),
    /// Full amortization schedule with per-period breakdown
    Schedule(ScheduleArgs),
    /// Regional sales-tax rate and title fee for a ZIP code
    Fees(FeesArgs),
    /// Deal totals: sales tax, total due, amount financed
    Totals(TotalsArgs),
    /// One-shot desk quote: fees, totals and payment
    Desk(DeskArgs),
    /// Deal gross: front-end, reserve, F&I products, pack
    Gross(GrossArgs),
    /// Journal entries for a funded deal
    Accounting(AccountingArgs),
    /// Structural validation of a deal record
    ValidateDeal(ValidateArgs),
    /// Generate a deal number
    DealNumber,
    /// Standard F&I product menu
    Products,
    /// Lender panel rate quotes for a credit score
    Quote(QuoteArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Payment(args) => commands::payment::run_payment(args),
        Commands::Grid(args) => commands::payment::run_grid(args),
        Commands::Schedule(args) => commands::payment::run_schedule(args),
        Commands::Fees(args) => commands::fees::run_fees(args),
        Commands::Totals(args) => commands::desking::run_totals(args),
        Commands::Desk(args) => commands::desking::run_desk(args),
        Commands::Gross(args) => commands::gross::run_gross(args),
        Commands::Accounting(args) => commands::gross::run_accounting(args),
        Commands::ValidateDeal(args) => commands::gross::run_validate(args),
        Commands::DealNumber => commands::gross::run_deal_number(),
        Commands::Products => commands::gross::run_products(),
        Commands::Quote(args) => commands::credit::run_quote(args),
        Commands::Version => {
            println!("desk {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
