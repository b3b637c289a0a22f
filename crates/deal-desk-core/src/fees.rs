use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::DealDeskError;
use crate::types::{Money, Rate};
use crate::DealDeskResult;

/// Fallback key every table must define
pub const DEFAULT_KEY: &str = "default";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Sales-tax rate and title fee for one ZIP prefix region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionalFees {
    /// Decimal fraction, 0.0825 = 8.25%
    pub tax_rate: Rate,
    pub title_fee: Money,
}

/// Tax and title-fee table keyed by two-digit ZIP prefix.
///
/// The fallback row lives in its own field, so once a table is constructed
/// `lookup` is total for any ZIP of at least two characters by shape, not by
/// assertion. Construction validates that the `default` entry exists and that
/// no rate or fee is negative; deserializing re-runs the same validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, RegionalFees>",
    into = "BTreeMap<String, RegionalFees>"
)]
pub struct RegionalFeeTable {
    entries: BTreeMap<String, RegionalFees>,
    default: RegionalFees,
}

/// Desk-screen override toggles: when set, the user-entered value wins over
/// the table lookup.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FeeOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_rate: Option<Rate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_fee: Option<Money>,
}

// ---------------------------------------------------------------------------
// Table construction & lookup
// ---------------------------------------------------------------------------

impl RegionalFeeTable {
    pub fn new(mut entries: BTreeMap<String, RegionalFees>) -> DealDeskResult<Self> {
        let default = entries.remove(DEFAULT_KEY).ok_or_else(|| {
            DealDeskError::TableError(format!("Fee table must define a '{DEFAULT_KEY}' entry"))
        })?;
        validate_row(DEFAULT_KEY, &default)?;
        for (key, fees) in &entries {
            if key.chars().count() != 2 {
                return Err(DealDeskError::TableError(format!(
                    "Region key '{key}' must be a two-character ZIP prefix"
                )));
            }
            validate_row(key, fees)?;
        }
        Ok(Self { entries, default })
    }

    /// The hand-curated table shipped with the product: CA, TX, FL, NY and IL
    /// prefixes, everything else falls through to the default row.
    pub fn builtin() -> Self {
        let mut entries = BTreeMap::new();

        let regions: [(&[&str], Rate, Money); 5] = [
            // California
            (
                &["90", "91", "92", "93", "94", "95"],
                dec!(0.0825),
                dec!(23),
            ),
            // Texas
            (&["75", "76", "77", "78", "79"], dec!(0.0825), dec!(33)),
            // Florida
            (&["32", "33", "34"], dec!(0.06), dec!(77.25)),
            // New York
            (&["10", "11", "12", "13", "14"], dec!(0.08), dec!(50)),
            // Illinois
            (&["60", "61", "62"], dec!(0.0625), dec!(155)),
        ];

        for (prefixes, tax_rate, title_fee) in regions {
            for prefix in prefixes {
                entries.insert(
                    prefix.to_string(),
                    RegionalFees {
                        tax_rate,
                        title_fee,
                    },
                );
            }
        }

        // The literal table above satisfies the construction invariants
        Self {
            entries,
            default: RegionalFees {
                tax_rate: dec!(0.07),
                title_fee: dec!(75),
            },
        }
    }

    /// Fees for a ZIP code, keyed by its first two characters.
    ///
    /// Never fails for a ZIP of length >= 2; an unknown prefix returns the
    /// default row.
    pub fn lookup(&self, zip_code: &str) -> DealDeskResult<RegionalFees> {
        let prefix = zip_code.get(0..2).ok_or_else(|| DealDeskError::InvalidInput {
            field: "zip_code".into(),
            reason: "ZIP code must be at least 2 characters".into(),
        })?;

        Ok(*self.entries.get(prefix).unwrap_or(&self.default))
    }

    /// The fallback row applied to unknown prefixes
    pub fn default_fees(&self) -> RegionalFees {
        self.default
    }
}

fn validate_row(key: &str, fees: &RegionalFees) -> DealDeskResult<()> {
    if fees.tax_rate < Decimal::ZERO {
        return Err(DealDeskError::TableError(format!(
            "Negative tax rate for region '{key}'"
        )));
    }
    if fees.title_fee < Decimal::ZERO {
        return Err(DealDeskError::TableError(format!(
            "Negative title fee for region '{key}'"
        )));
    }
    Ok(())
}

impl TryFrom<BTreeMap<String, RegionalFees>> for RegionalFeeTable {
    type Error = DealDeskError;

    fn try_from(entries: BTreeMap<String, RegionalFees>) -> Result<Self, Self::Error> {
        Self::new(entries)
    }
}

impl From<RegionalFeeTable> for BTreeMap<String, RegionalFees> {
    fn from(table: RegionalFeeTable) -> Self {
        let mut entries = table.entries;
        entries.insert(DEFAULT_KEY.to_string(), table.default);
        entries
    }
}

impl Default for RegionalFeeTable {
    fn default() -> Self {
        Self::builtin()
    }
}

// ---------------------------------------------------------------------------
// Override resolution
// ---------------------------------------------------------------------------

impl FeeOverrides {
    fn validate(&self) -> DealDeskResult<()> {
        if matches!(self.tax_rate, Some(r) if r < Decimal::ZERO) {
            return Err(DealDeskError::InvalidInput {
                field: "tax_rate".into(),
                reason: "Tax rate override must be non-negative".into(),
            });
        }
        if matches!(self.title_fee, Some(f) if f < Decimal::ZERO) {
            return Err(DealDeskError::InvalidInput {
                field: "title_fee".into(),
                reason: "Title fee override must be non-negative".into(),
            });
        }
        Ok(())
    }
}

/// Look up regional fees and apply any desk overrides on top.
pub fn resolve_fees(
    zip_code: &str,
    table: &RegionalFeeTable,
    overrides: &FeeOverrides,
) -> DealDeskResult<RegionalFees> {
    overrides.validate()?;
    let looked_up = table.lookup(zip_code)?;

    Ok(RegionalFees {
        tax_rate: overrides.tax_rate.unwrap_or(looked_up.tax_rate),
        title_fee: overrides.title_fee.unwrap_or(looked_up.title_fee),
    })
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
    fn test_california_prefix() {
        let table = RegionalFeeTable::builtin();
        let fees = table.lookup("90210").unwrap();
        assert_eq!(fees.tax_rate, dec!(0.0825));
        assert_eq!(fees.title_fee, dec!(23));
    }

    #[test]
    fn test_unknown_prefix_falls_back_to_default() {
        let table = RegionalFeeTable::builtin();
        let fees = table.lookup("00000").unwrap();
        assert_eq!(fees.tax_rate, dec!(0.07));
        assert_eq!(fees.title_fee, dec!(75));
    }

    #[test]
    fn test_florida_title_fee_has_cents() {
        let table = RegionalFeeTable::builtin();
        let fees = table.lookup("33101").unwrap();
        assert_eq!(fees.tax_rate, dec!(0.06));
        assert_eq!(fees.title_fee, dec!(77.25));
    }

    #[test]
    fn test_exactly_two_characters_is_enough() {
        let table = RegionalFeeTable::builtin();
        let fees = table.lookup("60").unwrap();
        assert_eq!(fees.tax_rate, dec!(0.0625));
    }

    #[test]
    fn test_short_zip_rejected() {
        let table = RegionalFeeTable::builtin();
        let err = table.lookup("9").unwrap_err();
        match err {
            DealDeskError::InvalidInput { field, .. } => assert_eq!(field, "zip_code"),
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_default_rejected_at_construction() {
        let mut entries = BTreeMap::new();
        entries.insert(
            "90".to_string(),
            RegionalFees {
                tax_rate: dec!(0.0825),
                title_fee: dec!(23),
            },
        );
        assert!(RegionalFeeTable::new(entries).is_err());
    }

    #[test]
    fn test_negative_rate_rejected_at_construction() {
        let mut entries = BTreeMap::new();
        entries.insert(
            DEFAULT_KEY.to_string(),
            RegionalFees {
                tax_rate: dec!(-0.01),
                title_fee: dec!(75),
            },
        );
        assert!(RegionalFeeTable::new(entries).is_err());
    }

    #[test]
    fn test_bad_prefix_key_rejected() {
        let mut entries = BTreeMap::new();
        entries.insert(
            DEFAULT_KEY.to_string(),
            RegionalFees {
                tax_rate: dec!(0.07),
                title_fee: dec!(75),
            },
        );
        entries.insert(
            "902".to_string(),
            RegionalFees {
                tax_rate: dec!(0.0825),
                title_fee: dec!(23),
            },
        );
        assert!(RegionalFeeTable::new(entries).is_err());
    }

    #[test]
    fn test_deserialization_enforces_default() {
        let json = r#"{ "90": { "tax_rate": "0.0825", "title_fee": "23" } }"#;
        let parsed: Result<RegionalFeeTable, _> = serde_json::from_str(json);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_roundtrip_keeps_entries() {
        let table = RegionalFeeTable::builtin();
        let json = serde_json::to_string(&table).unwrap();
        let back: RegionalFeeTable = serde_json::from_str(&json).unwrap();
        assert_eq!(serde_json::to_string(&back).unwrap(), json);
        assert_eq!(back.lookup("75001").unwrap(), table.lookup("75001").unwrap());
        assert_eq!(back.default_fees(), table.default_fees());
    }

    #[test]
    fn test_lookup_is_total_for_any_two_char_prefix() {
        let table = RegionalFeeTable::builtin();
        for a in 0..10u32 {
            for b in 0..10u32 {
                let zip = format!("{a}{b}000");
                assert!(table.lookup(&zip).is_ok(), "lookup failed for {zip}");
            }
        }
    }

    #[test]
    fn test_overrides_win_over_lookup() {
        let table = RegionalFeeTable::builtin();
        let overrides = FeeOverrides {
            tax_rate: Some(dec!(0.05)),
            title_fee: None,
        };
        let fees = resolve_fees("90210", &table, &overrides).unwrap();
        assert_eq!(fees.tax_rate, dec!(0.05));
        // Unoverridden field still comes from the table
        assert_eq!(fees.title_fee, dec!(23));
    }

    #[test]
    fn test_no_overrides_is_plain_lookup() {
        let table = RegionalFeeTable::builtin();
        let fees = resolve_fees("11201", &table, &FeeOverrides::default()).unwrap();
        assert_eq!(fees, table.lookup("11201").unwrap());
    }

    #[test]
    fn test_negative_override_rejected() {
        let table = RegionalFeeTable::builtin();
        let overrides = FeeOverrides {
            tax_rate: None,
            title_fee: Some(dec!(-1)),
        };
        assert!(resolve_fees("90210", &table, &overrides).is_err());
    }
}
