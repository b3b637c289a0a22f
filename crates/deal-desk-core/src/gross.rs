use chrono::Local;
use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::DealDeskError;
use crate::types::{round_currency, with_metadata, ComputationOutput, Money, Rate};
use crate::DealDeskResult;

/// Dealer reserve markup over the buy rate, in points
const FINANCE_RESERVE_POINTS: Decimal = dec!(2.0);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleCategory {
    New,
    Used,
    Certified,
}

impl VehicleCategory {
    /// Standard dealer overhead per vehicle
    pub fn pack_cost(&self) -> Money {
        match self {
            VehicleCategory::New => dec!(500),
            VehicleCategory::Used => dec!(300),
            VehicleCategory::Certified => dec!(400),
        }
    }
}

/// An F&I product sold on the deal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FiProduct {
    pub name: String,
    pub category: String,
    pub retail_price: Money,
    pub cost: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrossInput {
    pub sale_price: Money,
    pub vehicle_cost: Money,
    pub trade_allowance: Money,
    pub trade_payoff: Money,
    /// Balance the lender is financing; drives the reserve
    pub finance_balance: Money,
    pub term_months: u32,
    pub vehicle_category: VehicleCategory,
    #[serde(default)]
    pub products: Vec<FiProduct>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrossCalculation {
    pub front_end_gross: Money,
    pub finance_reserve: Money,
    pub product_gross: Money,
    pub pack_cost: Money,
    pub net_gross: Money,
}

/// The deal fields the journal needs; optional fields simply produce no entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DealRecord {
    pub deal_number: String,
    pub buyer_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trade_vin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sale_price: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trade_allowance: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trade_payoff: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cash_down: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sales_tax: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_fee: Option<Money>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountingEntry {
    pub account_code: String,
    pub account_name: String,
    pub debit: Money,
    pub credit: Money,
    pub memo: String,
}

// ---------------------------------------------------------------------------
// F&I product catalog
// ---------------------------------------------------------------------------

/// Standard F&I menu with typical retail prices and dealer costs
pub fn fi_product_catalog() -> Vec<FiProduct> {
    let menu: [(&str, &str, Decimal, Decimal); 5] = [
        ("Extended Warranty", "warranty", dec!(2495), dec!(1247)),
        ("GAP Coverage", "gap", dec!(795), dec!(199)),
        ("Tire & Wheel Protection", "tire_wheel", dec!(1295), dec!(295)),
        ("Maintenance Plan", "maintenance", dec!(1895), dec!(695)),
        ("Paint Protection", "protection", dec!(1495), dec!(295)),
    ];
    menu.into_iter()
        .map(|(name, category, retail_price, cost)| FiProduct {
            name: name.to_string(),
            category: category.to_string(),
            retail_price,
            cost,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Gross calculation
// ---------------------------------------------------------------------------

/// Front-end, reserve, product and net gross for one deal.
pub fn calculate_deal_gross(
    input: &GrossInput,
) -> DealDeskResult<ComputationOutput<GrossCalculation>> {
    let start = Instant::now();
    let mut warnings = Vec::new();

    if input.sale_price < Decimal::ZERO {
        return Err(DealDeskError::InvalidInput {
            field: "sale_price".into(),
            reason: "Sale price must be non-negative".into(),
        });
    }
    if input.term_months == 0 {
        return Err(DealDeskError::InvalidInput {
            field: "term_months".into(),
            reason: "Term must be at least 1 month".into(),
        });
    }

    // Over-allowance on the trade comes out of front-end gross; negative
    // equity (payoff above allowance) does not add to it
    let trade_adjustment = (input.trade_allowance - input.trade_payoff).max(Decimal::ZERO);
    let front_end_gross =
        round_currency(input.sale_price - input.vehicle_cost - trade_adjustment);

    let reserve_rate: Rate = FINANCE_RESERVE_POINTS / dec!(100);
    let finance_reserve = round_currency(
        input.finance_balance * reserve_rate * Decimal::from(input.term_months) / dec!(12),
    );

    let product_gross: Money = round_currency(
        input
            .products
            .iter()
            .map(|p| p.retail_price - p.cost)
            .sum::<Decimal>(),
    );
    if input.products.iter().any(|p| p.retail_price < p.cost) {
        warnings.push("At least one F&I product is priced below dealer cost".to_string());
    }

    let pack_cost = input.vehicle_category.pack_cost();
    let net_gross = round_currency(front_end_gross + finance_reserve + product_gross - pack_cost);

    if front_end_gross < Decimal::ZERO {
        warnings.push("Front-end gross is negative — selling below cost".to_string());
    }

    let result = GrossCalculation {
        front_end_gross,
        finance_reserve,
        product_gross,
        pack_cost,
        net_gross,
    };

    let assumptions = serde_json::json!({
        "reserve_points": FINANCE_RESERVE_POINTS.to_string(),
        "vehicle_category": input.vehicle_category,
        "num_products": input.products.len(),
    });

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Deal gross: front-end, finance reserve, F&I products, pack cost",
        &assumptions,
        warnings,
        elapsed,
        result,
    ))
}

// ---------------------------------------------------------------------------
// Accounting entries
// ---------------------------------------------------------------------------

/// Double-entry journal lines for a funded deal. Only the parts of the deal
/// that are present produce entries.
pub fn generate_accounting_entries(
    deal: &DealRecord,
    gross: &GrossCalculation,
) -> Vec<AccountingEntry> {
    let mut entries = Vec::new();

    let vin = deal.vin.as_deref().unwrap_or("(no VIN)");
    let trade_vin = deal.trade_vin.as_deref().unwrap_or("(no VIN)");

    if let Some(sale_price) = deal.sale_price {
        entries.push(AccountingEntry {
            account_code: "4010".into(),
            account_name: "Vehicle Sales Revenue".into(),
            debit: Decimal::ZERO,
            credit: sale_price,
            memo: format!("Sale of VIN {} to {}", vin, deal.buyer_name),
        });
        entries.push(AccountingEntry {
            account_code: "1210".into(),
            account_name: "Accounts Receivable".into(),
            debit: sale_price,
            credit: Decimal::ZERO,
            memo: format!("Receivable for deal #{}", deal.deal_number),
        });
    }

    if let Some(allowance) = deal.trade_allowance.filter(|a| *a > Decimal::ZERO) {
        entries.push(AccountingEntry {
            account_code: "1310".into(),
            account_name: "Trade Vehicle Inventory".into(),
            debit: allowance,
            credit: Decimal::ZERO,
            memo: format!("Trade-in VIN {} allowance", trade_vin),
        });
    }

    if let Some(payoff) = deal.trade_payoff.filter(|p| *p > Decimal::ZERO) {
        entries.push(AccountingEntry {
            account_code: "2110".into(),
            account_name: "Trade Payoffs Payable".into(),
            debit: Decimal::ZERO,
            credit: payoff,
            memo: format!("Payoff for trade VIN {}", trade_vin),
        });
    }

    if let Some(cash_down) = deal.cash_down.filter(|c| *c > Decimal::ZERO) {
        entries.push(AccountingEntry {
            account_code: "1010".into(),
            account_name: "Cash".into(),
            debit: cash_down,
            credit: Decimal::ZERO,
            memo: format!("Cash down payment for deal #{}", deal.deal_number),
        });
    }

    if gross.finance_reserve > Decimal::ZERO {
        entries.push(AccountingEntry {
            account_code: "4020".into(),
            account_name: "Finance Reserve Revenue".into(),
            debit: Decimal::ZERO,
            credit: gross.finance_reserve,
            memo: format!("Finance reserve for deal #{}", deal.deal_number),
        });
    }

    if let Some(sales_tax) = deal.sales_tax.filter(|t| *t > Decimal::ZERO) {
        entries.push(AccountingEntry {
            account_code: "2210".into(),
            account_name: "Sales Tax Payable".into(),
            debit: Decimal::ZERO,
            credit: sales_tax,
            memo: format!("Sales tax for deal #{}", deal.deal_number),
        });
    }

    if let Some(doc_fee) = deal.doc_fee.filter(|f| *f > Decimal::ZERO) {
        entries.push(AccountingEntry {
            account_code: "4030".into(),
            account_name: "Documentation Fee Revenue".into(),
            debit: Decimal::ZERO,
            credit: doc_fee,
            memo: format!("Doc fee for deal #{}", deal.deal_number),
        });
    }

    if !gross.net_gross.is_zero() {
        let (debit, credit) = if gross.net_gross > Decimal::ZERO {
            (Decimal::ZERO, gross.net_gross)
        } else {
            (gross.net_gross.abs(), Decimal::ZERO)
        };
        entries.push(AccountingEntry {
            account_code: "3000".into(),
            account_name: "Deal Gross Reserve".into(),
            debit,
            credit,
            memo: format!("Net gross for deal #{}", deal.deal_number),
        });
    }

    entries
}

/// Total debits and credits across a set of journal lines.
pub fn trial_balance(entries: &[AccountingEntry]) -> (Money, Money) {
    let debits = entries.iter().map(|e| e.debit).sum();
    let credits = entries.iter().map(|e| e.credit).sum();
    (debits, credits)
}

// ---------------------------------------------------------------------------
// Structural validation & deal numbers
// ---------------------------------------------------------------------------

/// Accumulated structural problems with a deal, empty when it is saleable.
pub fn validate_deal_structure(deal: &DealRecord) -> Vec<String> {
    let mut errors = Vec::new();

    if deal.buyer_name.trim().is_empty() {
        errors.push("Buyer name is required".to_string());
    }
    match deal.sale_price {
        None => errors.push("Sale price must be greater than zero".to_string()),
        Some(p) if p <= Decimal::ZERO => {
            errors.push("Sale price must be greater than zero".to_string())
        }
        Some(_) => {}
    }
    if matches!(deal.trade_allowance, Some(a) if a < Decimal::ZERO) {
        errors.push("Trade allowance cannot be negative".to_string());
    }
    if matches!(deal.trade_payoff, Some(p) if p < Decimal::ZERO) {
        errors.push("Trade payoff cannot be negative".to_string());
    }
    if matches!(deal.cash_down, Some(c) if c < Decimal::ZERO) {
        errors.push("Cash down cannot be negative".to_string());
    }

    errors
}

const BASE36: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Deal number in `YYMMDD-XXXX` form with a random base-36 suffix.
pub fn generate_deal_number() -> String {
    let today = Local::now().date_naive();
    let mut rng = rand::thread_rng();
    let suffix: String = (0..4)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("{}-{}", today.format("%y%m%d"), suffix)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
