use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::DealDeskError;
use crate::fees::{resolve_fees, FeeOverrides, RegionalFeeTable, RegionalFees};
use crate::payment::{compute_payment, LoanTerms};
use crate::types::{round_currency, with_metadata, ComputationOutput, Money, Rate};
use crate::DealDeskResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealTotalsInput {
    pub vehicle_price: Money,
    pub trade_value: Money,
    pub down_payment: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealTotals {
    pub sales_tax: Money,
    pub title_fee: Money,
    pub total_due: Money,
    pub amount_financed: Money,
}

/// Everything a desk screen needs to quote one structure: pricing, the
/// customer's ZIP for fee lookup, and the finance terms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeskDealInput {
    pub vehicle_price: Money,
    pub trade_value: Money,
    pub down_payment: Money,
    pub zip_code: String,
    /// APR as quoted, 5.50 means 5.50%
    pub annual_rate_percent: Rate,
    pub term_months: u32,
    #[serde(default)]
    pub overrides: FeeOverrides,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeskRecap {
    pub fees: RegionalFees,
    pub totals: DealTotals,
    pub monthly_payment: Money,
    pub total_of_payments: Money,
    pub finance_charge: Money,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_pricing(input: &DealTotalsInput) -> DealDeskResult<()> {
    let fields = [
        ("vehicle_price", input.vehicle_price),
        ("trade_value", input.trade_value),
        ("down_payment", input.down_payment),
    ];
    for (field, value) in fields {
        if value < Decimal::ZERO {
            return Err(DealDeskError::InvalidInput {
                field: field.into(),
                reason: "Amount must be non-negative".into(),
            });
        }
    }
    Ok(())
}

fn pricing_warnings(input: &DealTotalsInput, amount_financed: Money) -> Vec<String> {
    let mut warnings = Vec::new();
    if input.trade_value > input.vehicle_price {
        warnings.push(format!(
            "Trade value {} exceeds vehicle price {} — verify the appraisal",
            input.trade_value, input.vehicle_price
        ));
    }
    if amount_financed < Decimal::ZERO {
        warnings.push(
            "Down payment and trade cover more than the total due; nothing left to finance"
                .to_string(),
        );
    }
    warnings
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Combine pricing and regional fees into the amounts the desk screen shows.
///
/// Sales tax is charged on the full vehicle price; trade value is not
/// deducted from the tax base. That matches the jurisdictions the builtin
/// table covers but is not universal, so it is surfaced in the assumptions.
pub fn compute_deal_totals(
    input: &DealTotalsInput,
    fees: &RegionalFees,
) -> DealDeskResult<ComputationOutput<DealTotals>> {
    let start = Instant::now();
    validate_pricing(input)?;

    let sales_tax = round_currency(input.vehicle_price * fees.tax_rate);
    let total_due =
        round_currency(input.vehicle_price - input.trade_value + sales_tax + fees.title_fee);
    let amount_financed = round_currency(total_due - input.down_payment);

    let warnings = pricing_warnings(input, amount_financed);

    let result = DealTotals {
        sales_tax,
        title_fee: fees.title_fee,
        total_due,
        amount_financed,
    };

    let assumptions = serde_json::json!({
        "tax_rate": fees.tax_rate.to_string(),
        "tax_base": "full vehicle price, no trade-in credit",
        "title_fee": fees.title_fee.to_string(),
    });

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Deal totals from vehicle price, trade, down payment and regional fees",
        &assumptions,
        warnings,
        elapsed,
        result,
    ))
}

/// One-shot desk quote: fee lookup (with overrides), deal totals, and the
/// payment on the financed balance.
pub fn desk_deal(
    input: &DeskDealInput,
    table: &RegionalFeeTable,
) -> DealDeskResult<ComputationOutput<DeskRecap>> {
    let start = Instant::now();

    let fees = resolve_fees(&input.zip_code, table, &input.overrides)?;

    let pricing = DealTotalsInput {
        vehicle_price: input.vehicle_price,
        trade_value: input.trade_value,
        down_payment: input.down_payment,
    };
    let totals_output = compute_deal_totals(&pricing, &fees)?;
    let mut warnings = totals_output.warnings;
    let totals = totals_output.result;

    // A fully covered deal still quotes: finance zero rather than erroring
    let principal = totals.amount_financed.max(Decimal::ZERO);
    let payment_output = compute_payment(&LoanTerms {
        principal,
        annual_rate_percent: input.annual_rate_percent,
        term_months: input.term_months,
    })?;
    warnings.extend(payment_output.warnings);
    let payment = payment_output.result;

    let result = DeskRecap {
        fees,
        totals,
        monthly_payment: payment.monthly_payment,
        total_of_payments: payment.total_of_payments,
        finance_charge: payment.finance_charge,
    };

    let assumptions = serde_json::json!({
        "zip_code": input.zip_code,
        "tax_base": "full vehicle price, no trade-in credit",
        "tax_rate_overridden": input.overrides.tax_rate.is_some(),
        "title_fee_overridden": input.overrides.title_fee.is_some(),
        "annual_rate_percent": input.annual_rate_percent.to_string(),
        "term_months": input.term_months,
    });

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Desk quote: regional fee resolution, deal totals, amortized payment",
        &assumptions,
        warnings,
        elapsed,
        result,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
