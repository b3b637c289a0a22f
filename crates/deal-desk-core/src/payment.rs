use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::DealDeskError;
use crate::types::{round_currency, with_metadata, ComputationOutput, Money, Rate};
use crate::DealDeskResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);
const PERCENT: Decimal = dec!(100);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: Money,
    /// APR as quoted on a buyer's order: 5.50 means 5.50%
    pub annual_rate_percent: Rate,
    pub term_months: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentResult {
    pub monthly_payment: Money,
    pub total_of_payments: Money,
    pub finance_charge: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentGridInput {
    pub principal: Money,
    pub annual_rate_percent: Rate,
    /// Candidate terms to quote side by side, e.g. [36, 48, 60, 72]
    pub terms: Vec<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentGridRow {
    pub term_months: u32,
    pub monthly_payment: Money,
    pub total_of_payments: Money,
    pub finance_charge: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleInput {
    #[serde(flatten)]
    pub terms: LoanTerms,
    /// Due date of the first payment; subsequent rows step one month
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_payment_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationRow {
    pub period: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    pub payment: Money,
    pub interest: Money,
    pub principal: Money,
    pub balance: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub rows: Vec<AmortizationRow>,
    pub total_interest: Money,
    pub total_paid: Money,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_terms(principal: Money, annual_rate_percent: Rate, term_months: u32) -> DealDeskResult<()> {
    if principal < Decimal::ZERO {
        return Err(DealDeskError::InvalidInput {
            field: "principal".into(),
            reason: "Principal must be non-negative".into(),
        });
    }
    if annual_rate_percent < Decimal::ZERO {
        return Err(DealDeskError::InvalidInput {
            field: "annual_rate_percent".into(),
            reason: "APR must be non-negative".into(),
        });
    }
    if term_months == 0 {
        return Err(DealDeskError::InvalidInput {
            field: "term_months".into(),
            reason: "Term must be at least 1 month".into(),
        });
    }
    Ok(())
}

fn monthly_rate(annual_rate_percent: Rate) -> Rate {
    annual_rate_percent / PERCENT / MONTHS_PER_YEAR
}

// ---------------------------------------------------------------------------
// Core amortization math
// ---------------------------------------------------------------------------

/// Fixed monthly payment for a fully amortizing loan, rounded to the cent.
///
/// Zero-rate loans fall back to straight-line `principal / term`.
pub fn monthly_payment(
    principal: Money,
    annual_rate_percent: Rate,
    term_months: u32,
) -> DealDeskResult<Money> {
    validate_terms(principal, annual_rate_percent, term_months)?;

    let term = Decimal::from(term_months);
    let r = monthly_rate(annual_rate_percent);

    if r.is_zero() {
        return Ok(round_currency(principal / term));
    }

    let overflow = || DealDeskError::InvalidInput {
        field: "annual_rate_percent".into(),
        reason: "Rate and term overflow decimal precision".into(),
    };

    let factor = (Decimal::ONE + r).checked_powd(term).ok_or_else(overflow)?;
    let annuity = factor - Decimal::ONE;
    if annuity.is_zero() {
        return Err(DealDeskError::DivisionByZero {
            context: "payment annuity factor".into(),
        });
    }

    // The r * factor product can overflow even when the final ratio is small
    let rate_factor = r.checked_mul(factor).ok_or_else(overflow)?;
    Ok(round_currency(principal * (rate_factor / annuity)))
}

/// Payment plus the derived totals a buyer's order shows.
pub fn compute_payment(terms: &LoanTerms) -> DealDeskResult<ComputationOutput<PaymentResult>> {
    let start = Instant::now();

    let payment = monthly_payment(terms.principal, terms.annual_rate_percent, terms.term_months)?;
    let total_of_payments = round_currency(payment * Decimal::from(terms.term_months));
    let finance_charge = round_currency(total_of_payments - terms.principal);

    let result = PaymentResult {
        monthly_payment: payment,
        total_of_payments,
        finance_charge,
    };

    let assumptions = serde_json::json!({
        "principal": terms.principal.to_string(),
        "annual_rate_percent": terms.annual_rate_percent.to_string(),
        "term_months": terms.term_months,
        "compounding": "monthly",
    });

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Fixed-payment amortization, totals derived from the rounded payment",
        &assumptions,
        Vec::new(),
        elapsed,
        result,
    ))
}

/// Quote the same principal and rate across several candidate terms.
pub fn payment_grid(
    input: &PaymentGridInput,
) -> DealDeskResult<ComputationOutput<Vec<PaymentGridRow>>> {
    let start = Instant::now();

    if input.terms.is_empty() {
        return Err(DealDeskError::InvalidInput {
            field: "terms".into(),
            reason: "At least one candidate term is required".into(),
        });
    }

    let mut rows = Vec::with_capacity(input.terms.len());
    for &term in &input.terms {
        let payment = monthly_payment(input.principal, input.annual_rate_percent, term)?;
        let total = round_currency(payment * Decimal::from(term));
        rows.push(PaymentGridRow {
            term_months: term,
            monthly_payment: payment,
            total_of_payments: total,
            finance_charge: round_currency(total - input.principal),
        });
    }

    let assumptions = serde_json::json!({
        "principal": input.principal.to_string(),
        "annual_rate_percent": input.annual_rate_percent.to_string(),
        "terms": input.terms,
    });

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Fixed-payment amortization quoted across candidate terms",
        &assumptions,
        Vec::new(),
        elapsed,
        rows,
    ))
}

/// Full per-period breakdown of interest, principal and declining balance.
///
/// Every period pays the level rounded payment except the last, which absorbs
/// the accumulated rounding residue so the balance lands on exactly zero.
pub fn amortization_schedule(
    input: &ScheduleInput,
) -> DealDeskResult<ComputationOutput<AmortizationSchedule>> {
    let start = Instant::now();
    let terms = &input.terms;

    let payment = monthly_payment(terms.principal, terms.annual_rate_percent, terms.term_months)?;
    let r = monthly_rate(terms.annual_rate_percent);

    let mut rows = Vec::with_capacity(terms.term_months as usize);
    let mut balance = round_currency(terms.principal);
    let mut total_interest = Decimal::ZERO;
    let mut total_paid = Decimal::ZERO;
    let mut due_date = input.first_payment_date;

    for period in 1..=terms.term_months {
        let interest = round_currency(balance * r);
        let is_final = period == terms.term_months;

        let principal_part = if is_final {
            balance
        } else {
            // Clamp so a rounding-heavy early payoff cannot push the balance negative
            (payment - interest).min(balance)
        };
        let paid = if is_final { balance + interest } else { payment };

        balance = round_currency(balance - principal_part);
        total_interest += interest;
        total_paid += paid;

        rows.push(AmortizationRow {
            period,
            due_date,
            payment: paid,
            interest,
            principal: principal_part,
            balance,
        });

        due_date = due_date.and_then(|d| d.checked_add_months(Months::new(1)));
    }

    let result = AmortizationSchedule {
        rows,
        total_interest: round_currency(total_interest),
        total_paid: round_currency(total_paid),
    };

    let assumptions = serde_json::json!({
        "principal": terms.principal.to_string(),
        "annual_rate_percent": terms.annual_rate_percent.to_string(),
        "term_months": terms.term_months,
        "final_payment": "absorbs rounding residue",
    });

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Level-payment amortization schedule with per-period rounding",
        &assumptions,
        Vec::new(),
        elapsed,
        result,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn test_zero_rate_straight_line() {
        let payment = monthly_payment(dec!(10472.58), dec!(0), 48).unwrap();
        assert_eq!(payment, dec!(218.18));
    }

    #[test]
    fn test_single_period_zero_rate_pays_principal() {
        let payment = monthly_payment(dec!(5000), dec!(0), 1).unwrap();
        assert_eq!(payment, dec!(5000));
    }

    #[test]
    fn test_zero_principal() {
        let payment = monthly_payment(dec!(0), dec!(7.5), 60).unwrap();
        assert_eq!(payment, dec!(0));
    }

    #[test]
    fn test_known_payment_30k_6pct_60mo() {
        // Textbook case: $30,000 at 6% for 60 months => $579.98
        let payment = monthly_payment(dec!(30000), dec!(6.0), 60).unwrap();
        assert!((payment - dec!(579.98)).abs() <= dec!(0.01));
    }

    #[test]
    fn test_desk_sample_financed_balance() {
        // $10,472.58 at 5.50% for 48 months
        let payment = monthly_payment(dec!(10472.58), dec!(5.50), 48).unwrap();
        assert!((payment - dec!(243.56)).abs() <= dec!(0.01));
    }

    #[test]
    fn test_larger_principal_scales_payment() {
        let payment = monthly_payment(dec!(24233.08), dec!(5.50), 48).unwrap();
        assert!((payment - dec!(563.58)).abs() <= dec!(0.01));
    }

    #[test]
    fn test_deterministic() {
        let a = monthly_payment(dec!(19999.99), dec!(9.25), 72).unwrap();
        let b = monthly_payment(dec!(19999.99), dec!(9.25), 72).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_zero_term_rejected() {
        let err = monthly_payment(dec!(1000), dec!(5), 0).unwrap_err();
        match err {
            DealDeskError::InvalidInput { field, .. } => assert_eq!(field, "term_months"),
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_principal_rejected() {
        let err = monthly_payment(dec!(-1), dec!(5), 48).unwrap_err();
        match err {
            DealDeskError::InvalidInput { field, .. } => assert_eq!(field, "principal"),
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_extreme_rate_errors_instead_of_overflowing() {
        // A rate this size blows past Decimal's range inside the power term;
        // it must come back as an error, not a panic
        let err = monthly_payment(dec!(1000), dec!(15000), 480).unwrap_err();
        match err {
            DealDeskError::InvalidInput { field, .. } => {
                assert_eq!(field, "annual_rate_percent")
            }
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_extreme_rate_schedule_errors_cleanly() {
        let input = ScheduleInput {
            terms: LoanTerms {
                principal: dec!(1000),
                annual_rate_percent: dec!(15000),
                term_months: 480,
            },
            first_payment_date: None,
        };
        assert!(amortization_schedule(&input).is_err());
    }

    #[test]
    fn test_negative_rate_rejected() {
        let err = monthly_payment(dec!(1000), dec!(-0.01), 48).unwrap_err();
        match err {
            DealDeskError::InvalidInput { field, .. } => {
                assert_eq!(field, "annual_rate_percent")
            }
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_compute_payment_totals() {
        let terms = LoanTerms {
            principal: dec!(10472.58),
            annual_rate_percent: dec!(0),
            term_months: 48,
        };
        let output = compute_payment(&terms).unwrap();
        let r = &output.result;

        assert_eq!(r.monthly_payment, dec!(218.18));
        assert_eq!(r.total_of_payments, dec!(10472.64));
        // Per-payment rounding leaves a 6-cent residue over the principal
        assert_eq!(r.finance_charge, dec!(0.06));
    }

    #[test]
    fn test_finance_charge_non_negative_at_positive_rate() {
        let terms = LoanTerms {
            principal: dec!(15000),
            annual_rate_percent: dec!(4.25),
            term_months: 36,
        };
        let output = compute_payment(&terms).unwrap();
        assert!(output.result.finance_charge > dec!(0));
        assert!(output.result.total_of_payments > terms.principal);
    }

    #[test]
    fn test_payment_grid_longer_term_lower_payment() {
        let input = PaymentGridInput {
            principal: dec!(28990),
            annual_rate_percent: dec!(12.75),
            terms: vec![36, 48, 60, 72],
        };
        let output = payment_grid(&input).unwrap();
        let rows = &output.result;

        assert_eq!(rows.len(), 4);
        for pair in rows.windows(2) {
            assert!(pair[0].monthly_payment > pair[1].monthly_payment);
            assert!(pair[0].finance_charge < pair[1].finance_charge);
        }
    }

    #[test]
    fn test_payment_grid_empty_terms_rejected() {
        let input = PaymentGridInput {
            principal: dec!(10000),
            annual_rate_percent: dec!(5),
            terms: vec![],
        };
        assert!(payment_grid(&input).is_err());
    }

    #[test]
    fn test_schedule_zero_rate() {
        let input = ScheduleInput {
            terms: LoanTerms {
                principal: dec!(1200),
                annual_rate_percent: dec!(0),
                term_months: 12,
            },
            first_payment_date: None,
        };
        let output = amortization_schedule(&input).unwrap();
        let s = &output.result;

        assert_eq!(s.rows.len(), 12);
        assert!(s.rows.iter().all(|row| row.payment == dec!(100)));
        assert_eq!(s.rows.last().unwrap().balance, dec!(0));
        assert_eq!(s.total_interest, dec!(0));
        assert_eq!(s.total_paid, dec!(1200));
    }

    #[test]
    fn test_schedule_retires_principal_exactly() {
        let input = ScheduleInput {
            terms: LoanTerms {
                principal: dec!(10000),
                annual_rate_percent: dec!(6.0),
                term_months: 12,
            },
            first_payment_date: None,
        };
        let output = amortization_schedule(&input).unwrap();
        let s = &output.result;

        // First period interest on the full balance at 0.5%/month
        assert_eq!(s.rows[0].interest, dec!(50.00));
        assert_eq!(s.rows.last().unwrap().balance, dec!(0));

        let principal_sum: Decimal = s.rows.iter().map(|row| row.principal).sum();
        assert_eq!(principal_sum, dec!(10000));
        assert_eq!(s.total_paid, dec!(10000) + s.total_interest);
    }

    #[test]
    fn test_schedule_due_dates_step_monthly() {
        let input = ScheduleInput {
            terms: LoanTerms {
                principal: dec!(2400),
                annual_rate_percent: dec!(0),
                term_months: 3,
            },
            first_payment_date: NaiveDate::from_ymd_opt(2025, 8, 30),
        };
        let output = amortization_schedule(&input).unwrap();
        let s = &output.result;

        assert_eq!(s.rows[0].due_date, NaiveDate::from_ymd_opt(2025, 8, 30));
        assert_eq!(s.rows[1].due_date, NaiveDate::from_ymd_opt(2025, 9, 30));
        assert_eq!(s.rows[2].due_date, NaiveDate::from_ymd_opt(2025, 10, 30));
    }
}
