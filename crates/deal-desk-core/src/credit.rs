use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::DealDeskError;
use crate::types::{with_metadata, ComputationOutput, Rate};
use crate::DealDeskResult;

const MIN_SCORE: u16 = 300;
const MAX_SCORE: u16 = 850;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreditTier {
    Excellent,
    Good,
    Fair,
    Poor,
}

/// Tier APRs as quoted, 4.99 means 4.99%
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TierRates {
    pub excellent: Rate,
    pub good: Rate,
    pub fair: Rate,
    pub poor: Rate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lender {
    pub id: String,
    pub name: String,
    pub min_credit_score: u16,
    /// Maximum loan-to-value the lender will advance, in percent
    pub max_ltv_percent: Decimal,
    pub rates: TierRates,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateQuoteInput {
    pub credit_score: u16,
    /// Loan-to-value of the proposed structure, in percent; when present,
    /// lenders whose advance cap it exceeds are filtered out
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ltv_percent: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LenderQuote {
    pub lender_id: String,
    pub lender_name: String,
    pub tier: CreditTier,
    pub annual_rate_percent: Rate,
}

// ---------------------------------------------------------------------------
// Tier classification
// ---------------------------------------------------------------------------

/// Bucket a FICO-range score into the pricing tier the desk uses.
pub fn credit_tier(score: u16) -> DealDeskResult<CreditTier> {
    if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
        return Err(DealDeskError::InvalidInput {
            field: "credit_score".into(),
            reason: format!("Score must be between {MIN_SCORE} and {MAX_SCORE}"),
        });
    }
    Ok(match score {
        740..=850 => CreditTier::Excellent,
        680..=739 => CreditTier::Good,
        620..=679 => CreditTier::Fair,
        _ => CreditTier::Poor,
    })
}

impl Lender {
    pub fn rate_for(&self, tier: CreditTier) -> Rate {
        match tier {
            CreditTier::Excellent => self.rates.excellent,
            CreditTier::Good => self.rates.good,
            CreditTier::Fair => self.rates.fair,
            CreditTier::Poor => self.rates.poor,
        }
    }
}

// ---------------------------------------------------------------------------
// Lender panel
// ---------------------------------------------------------------------------

/// The preselected lender panel the desk quotes against.
pub fn builtin_lenders() -> Vec<Lender> {
    let panel: [(&str, &str, u16, Decimal, [Decimal; 4]); 6] = [
        (
            "chase",
            "Chase Auto Finance",
            620,
            dec!(120),
            [dec!(4.99), dec!(6.49), dec!(9.99), dec!(14.99)],
        ),
        (
            "wells_fargo",
            "Wells Fargo Auto",
            640,
            dec!(110),
            [dec!(5.29), dec!(6.79), dec!(10.49), dec!(15.49)],
        ),
        (
            "capital_one",
            "Capital One Auto Finance",
            580,
            dec!(130),
            [dec!(5.49), dec!(7.99), dec!(12.99), dec!(18.99)],
        ),
        (
            "santander",
            "Santander Consumer USA",
            550,
            dec!(140),
            [dec!(6.99), dec!(9.99), dec!(15.99), dec!(21.99)],
        ),
        (
            "ally",
            "Ally Financial",
            660,
            dec!(115),
            [dec!(4.79), dec!(6.29), dec!(9.79), dec!(14.49)],
        ),
        (
            "td_auto",
            "TD Auto Finance",
            650,
            dec!(120),
            [dec!(5.19), dec!(6.69), dec!(10.19), dec!(15.19)],
        ),
    ];

    panel
        .into_iter()
        .map(|(id, name, min_score, max_ltv, [excellent, good, fair, poor])| Lender {
            id: id.to_string(),
            name: name.to_string(),
            min_credit_score: min_score,
            max_ltv_percent: max_ltv,
            rates: TierRates {
                excellent,
                good,
                fair,
                poor,
            },
        })
        .collect()
}

/// Quote every eligible lender for a buyer, cheapest APR first.
pub fn quote_lenders(
    input: &RateQuoteInput,
    lenders: &[Lender],
) -> DealDeskResult<ComputationOutput<Vec<LenderQuote>>> {
    let start = Instant::now();
    let mut warnings = Vec::new();

    let tier = credit_tier(input.credit_score)?;
    if matches!(input.ltv_percent, Some(ltv) if ltv < Decimal::ZERO) {
        return Err(DealDeskError::InvalidInput {
            field: "ltv_percent".into(),
            reason: "LTV must be non-negative".into(),
        });
    }

    let mut quotes: Vec<LenderQuote> = lenders
        .iter()
        .filter(|lender| input.credit_score >= lender.min_credit_score)
        .filter(|lender| match input.ltv_percent {
            Some(ltv) => ltv <= lender.max_ltv_percent,
            None => true,
        })
        .map(|lender| LenderQuote {
            lender_id: lender.id.clone(),
            lender_name: lender.name.clone(),
            tier,
            annual_rate_percent: lender.rate_for(tier),
        })
        .collect();
    quotes.sort_by(|a, b| a.annual_rate_percent.cmp(&b.annual_rate_percent));

    if quotes.is_empty() {
        warnings.push(format!(
            "No lender on the panel accepts score {} at the requested LTV",
            input.credit_score
        ));
    }

    let assumptions = serde_json::json!({
        "credit_score": input.credit_score,
        "tier": tier,
        "ltv_percent": input.ltv_percent.map(|l| l.to_string()),
        "panel_size": lenders.len(),
    });

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Lender panel quotes by credit tier, filtered on score and LTV caps",
        &assumptions,
        warnings,
        elapsed,
        quotes,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
