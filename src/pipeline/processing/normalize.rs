use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::debug;

use crate::domain::{ListingRecord, RawListing};
use crate::observability::metrics;

/// Canonicalizes raw listings into `ListingRecord`s.
///
/// String fields are trimmed, money fields coerced to `f64` (unparsable values
/// become absent, never zero, never an error), and every record is stamped
/// with the same batch-wide fetch timestamp. Input order is preserved.
pub struct Normalizer;

impl Normalizer {
    pub fn new() -> Self {
        Self
    }

    pub fn normalize_batch(&self, raws: Vec<RawListing>) -> Vec<ListingRecord> {
        self.normalize_batch_at(raws, Utc::now())
    }

    /// Same as [`normalize_batch`](Self::normalize_batch) with an explicit
    /// timestamp, so repeated passes over the same input are byte-identical.
    pub fn normalize_batch_at(
        &self,
        raws: Vec<RawListing>,
        fetched_at: DateTime<Utc>,
    ) -> Vec<ListingRecord> {
        let count = raws.len();
        let out: Vec<ListingRecord> = raws
            .into_iter()
            .map(|raw| self.normalize_one(raw, fetched_at))
            .collect();
        metrics::normalize::records_processed(count);
        out
    }

    fn normalize_one(&self, raw: RawListing, fetched_at: DateTime<Utc>) -> ListingRecord {
        let price = coerce_money(raw.price.as_ref());
        let cash_flow = coerce_money(raw.cash_flow.as_ref());
        let mut earnings_multiple = coerce_money(raw.earnings_multiple.as_ref());
        let mut partial_match_explanation = raw
            .partial_match_explanation
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        // Backfill the multiple from price / cash flow when the source did not
        // disclose it directly. Division requires a positive denominator.
        if earnings_multiple.is_none() {
            earnings_multiple = derive_earnings_multiple(price, cash_flow);
        }
        if earnings_multiple.is_none() && partial_match_explanation.is_none() {
            partial_match_explanation = Some("multiple not disclosed".to_string());
        }

        let record = ListingRecord {
            name: raw.name.trim().to_string(),
            address: raw.address.trim().to_string(),
            source_site: raw.source_site,
            source_method: raw.source_method,
            source_url: raw.source_url.trim().to_string(),
            final_url: None,
            price,
            earnings_multiple,
            cash_flow,
            category: raw.category.trim().to_string(),
            reason_for_sale: raw.reason_for_sale.trim().to_string(),
            ownership_structure: trim_opt(raw.ownership_structure),
            visit_frequency: trim_opt(raw.visit_frequency),
            fetched_at,
            partial_match_explanation,
            extensions: raw
                .extensions
                .into_iter()
                .map(|(k, v)| (k, v.trim().to_string()))
                .collect(),
        };
        debug!(
            name = %record.name,
            site = %record.source_site,
            price = ?record.price,
            "normalized listing"
        );
        record
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

fn trim_opt(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Coerce a loosely-typed money value to a non-negative `f64`.
///
/// Accepts JSON numbers and strings with `$`, thousands separators, and
/// surrounding whitespace. Anything unparsable or negative is absent, never
/// zero.
pub fn coerce_money(value: Option<&Value>) -> Option<f64> {
    let value = value?;
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned: String = s
                .trim()
                .trim_start_matches('$')
                .chars()
                .filter(|c| *c != ',' && !c.is_whitespace())
                .collect();
            if cleaned.is_empty() {
                None
            } else {
                cleaned.parse::<f64>().ok()
            }
        }
        _ => None,
    };
    match parsed {
        Some(v) if v.is_finite() && v >= 0.0 => Some(v),
        Some(_) | None => {
            if !value.is_null() {
                metrics::normalize::coercion_failure();
            }
            None
        }
    }
}

/// `price / cash_flow` rounded to two decimals, only when the denominator is
/// positive.
pub fn derive_earnings_multiple(price: Option<f64>, cash_flow: Option<f64>) -> Option<f64> {
    match (price, cash_flow) {
        (Some(price), Some(cash_flow)) if cash_flow > 0.0 => {
            Some((price / cash_flow * 100.0).round() / 100.0)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SourceMethod, SourceSite};
    use serde_json::json;

    fn raw(name: &str) -> RawListing {
        RawListing {
            name: name.to_string(),
            source_site: SourceSite::BizBuySell,
            source_method: SourceMethod::EmailParse,
            source_url: " https://example.com/listing/1 ".to_string(),
            ..RawListing::default()
        }
    }

    #[test]
    fn trims_strings_and_stamps_timestamp() {
        let now = Utc::now();
        let mut input = raw("  Joe's Deli  ");
        input.address = " 123 Main St ".to_string();
        let records = Normalizer::new().normalize_batch_at(vec![input], now);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Joe's Deli");
        assert_eq!(records[0].address, "123 Main St");
        assert_eq!(records[0].source_url, "https://example.com/listing/1");
        assert_eq!(records[0].fetched_at, now);
    }

    #[test]
    fn coerces_dirty_money_strings() {
        assert_eq!(coerce_money(Some(&json!("$1,250,000"))), Some(1_250_000.0));
        assert_eq!(coerce_money(Some(&json!(" 310000.50 "))), Some(310_000.5));
        assert_eq!(coerce_money(Some(&json!(425000))), Some(425_000.0));
    }

    #[test]
    fn unparsable_money_becomes_absent_not_zero() {
        assert_eq!(coerce_money(Some(&json!("call for price"))), None);
        assert_eq!(coerce_money(Some(&json!(""))), None);
        assert_eq!(coerce_money(Some(&json!(-5.0))), None);
        assert_eq!(coerce_money(Some(&json!(null))), None);
        assert_eq!(coerce_money(None), None);
    }

    #[test]
    fn derives_multiple_at_two_decimals() {
        assert_eq!(
            derive_earnings_multiple(Some(1_250_000.0), Some(310_000.0)),
            Some(4.03)
        );
        assert_eq!(derive_earnings_multiple(Some(1_000_000.0), Some(0.0)), None);
        assert_eq!(derive_earnings_multiple(Some(1_000_000.0), None), None);
    }

    #[test]
    fn missing_multiple_gets_partial_match_note() {
        let mut input = raw("Shop");
        input.price = Some(json!(500_000));
        let records = Normalizer::new().normalize_batch(vec![input]);
        assert_eq!(records[0].earnings_multiple, None);
        assert_eq!(
            records[0].partial_match_explanation.as_deref(),
            Some("multiple not disclosed")
        );
    }

    #[test]
    fn disclosed_multiple_is_kept_without_note() {
        let mut input = raw("Shop");
        input.price = Some(json!(500_000));
        input.earnings_multiple = Some(json!("3.2"));
        let records = Normalizer::new().normalize_batch(vec![input]);
        assert_eq!(records[0].earnings_multiple, Some(3.2));
        assert_eq!(records[0].partial_match_explanation, None);
    }

    #[test]
    fn normalization_is_idempotent() {
        let now = Utc::now();
        let mut input = raw("Joe's Deli");
        input.price = Some(json!("$500,000"));
        input.cash_flow = Some(json!(125_000));

        let normalizer = Normalizer::new();
        let first = normalizer.normalize_batch_at(vec![input], now);

        // Feed the normalized output back through as raw listings.
        let second_input: Vec<RawListing> = first
            .iter()
            .map(|r| RawListing {
                name: r.name.clone(),
                address: r.address.clone(),
                source_site: r.source_site,
                source_method: r.source_method,
                source_url: r.source_url.clone(),
                price: r.price.map(|v| json!(v)),
                cash_flow: r.cash_flow.map(|v| json!(v)),
                earnings_multiple: r.earnings_multiple.map(|v| json!(v)),
                category: r.category.clone(),
                reason_for_sale: r.reason_for_sale.clone(),
                ownership_structure: r.ownership_structure.clone(),
                visit_frequency: r.visit_frequency.clone(),
                partial_match_explanation: r.partial_match_explanation.clone(),
                extensions: r.extensions.clone(),
            })
            .collect();
        let second = normalizer.normalize_batch_at(second_input, now);
        assert_eq!(first, second);
    }

    #[test]
    fn empty_batch_yields_empty_batch() {
        assert!(Normalizer::new().normalize_batch(vec![]).is_empty());
    }
}
