use deal_desk_core::payment::{
    amortization_schedule, compute_payment, monthly_payment, payment_grid, LoanTerms,
    PaymentGridInput, ScheduleInput,
};
use deal_desk_core::DealDeskError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Payment tests — amortization formula and totals
// ===========================================================================

#[test]
fn test_straight_line_when_rate_is_zero() {
    for (principal, term, expected) in [
        (dec!(10472.58), 48u32, dec!(218.18)),
        (dec!(1200), 12, dec!(100)),
        (dec!(5000), 1, dec!(5000)),
    ] {
        let payment = monthly_payment(principal, dec!(0), term).unwrap();
        assert_eq!(payment, expected, "{principal} over {term} months");
    }
}

#[test]
fn test_payment_against_published_amortization_values() {
    // Values any loan calculator agrees on to the cent
    let cases = [
        (dec!(30000), dec!(6.0), 60u32, dec!(579.98)),
        (dec!(20000), dec!(7.5), 36, dec!(622.12)),
        (dec!(10472.58), dec!(5.50), 48, dec!(243.56)),
    ];
    for (principal, apr, term, expected) in cases {
        let payment = monthly_payment(principal, apr, term).unwrap();
        assert!(
            (payment - expected).abs() <= dec!(0.01),
            "{principal} at {apr}% x {term}: got {payment}, expected ~{expected}"
        );
    }
}

#[test]
fn test_totals_derive_from_rounded_payment() {
    let terms = LoanTerms {
        principal: dec!(24233.08),
        annual_rate_percent: dec!(5.50),
        term_months: 48,
    };
    let output = compute_payment(&terms).unwrap();
    let r = &output.result;

    assert_eq!(
        r.total_of_payments,
        r.monthly_payment * Decimal::from(48u32)
    );
    assert_eq!(r.finance_charge, r.total_of_payments - terms.principal);
    assert!(r.finance_charge > dec!(0));
}

#[test]
fn test_higher_rate_higher_payment() {
    let low = monthly_payment(dec!(18000), dec!(4.0), 60).unwrap();
    let high = monthly_payment(dec!(18000), dec!(12.0), 60).unwrap();
    assert!(high > low);
}

#[test]
fn test_invalid_terms_surface_as_invalid_input() {
    for (principal, apr, term) in [
        (dec!(-1), dec!(5.0), 48u32),
        (dec!(1000), dec!(-5.0), 48),
        (dec!(1000), dec!(5.0), 0),
    ] {
        match monthly_payment(principal, apr, term) {
            Err(DealDeskError::InvalidInput { .. }) => {}
            other => panic!("Expected InvalidInput for ({principal}, {apr}, {term}), got {other:?}"),
        }
    }
}

// ===========================================================================
// Payment grid tests — multi-term quoting
// ===========================================================================

#[test]
fn test_grid_totals_consistent_with_single_quotes() {
    let input = PaymentGridInput {
        principal: dec!(28990),
        annual_rate_percent: dec!(12.75),
        terms: vec![36, 48, 60, 66],
    };
    let output = payment_grid(&input).unwrap();

    for row in &output.result {
        let single = monthly_payment(input.principal, input.annual_rate_percent, row.term_months)
            .unwrap();
        assert_eq!(row.monthly_payment, single);
        assert_eq!(
            row.total_of_payments,
            row.monthly_payment * Decimal::from(row.term_months)
        );
    }
}

// ===========================================================================
// Schedule tests — per-period breakdown
// ===========================================================================

#[test]
fn test_schedule_interest_declines_monotonically() {
    let input = ScheduleInput {
        terms: LoanTerms {
            principal: dec!(14404.68),
            annual_rate_percent: dec!(5.50),
            term_months: 48,
        },
        first_payment_date: None,
    };
    let output = amortization_schedule(&input).unwrap();
    let rows = &output.result.rows;

    assert_eq!(rows.len(), 48);
    for pair in rows.windows(2) {
        assert!(pair[0].interest >= pair[1].interest);
        assert!(pair[0].balance > pair[1].balance);
    }
    assert_eq!(rows.last().unwrap().balance, dec!(0));
}

#[test]
fn test_schedule_totals_tie_out() {
    let input = ScheduleInput {
        terms: LoanTerms {
            principal: dec!(10000),
            annual_rate_percent: dec!(9.0),
            term_months: 24,
        },
        first_payment_date: None,
    };
    let output = amortization_schedule(&input).unwrap();
    let s = &output.result;

    let interest_sum: Decimal = s.rows.iter().map(|r| r.interest).sum();
    let paid_sum: Decimal = s.rows.iter().map(|r| r.payment).sum();
    assert_eq!(s.total_interest, interest_sum);
    assert_eq!(s.total_paid, paid_sum);
    assert_eq!(s.total_paid, dec!(10000) + s.total_interest);
}
