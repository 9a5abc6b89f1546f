use std::cmp::Ordering;

use crate::domain::ListingRecord;

/// Stable ascending sort by price; records without a price sort after every
/// priced record, preserving their relative input order.
pub fn sort_by_price(mut records: Vec<ListingRecord>) -> Vec<ListingRecord> {
    records.sort_by(|a, b| compare_prices(a.price, b.price));
    records
}

fn compare_prices(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SourceMethod, SourceSite};
    use chrono::Utc;

    fn listing(name: &str, price: Option<f64>) -> ListingRecord {
        ListingRecord {
            name: name.to_string(),
            address: String::new(),
            source_site: SourceSite::Unknown,
            source_method: SourceMethod::ManualEntry,
            source_url: format!("https://example.com/{}", name),
            final_url: None,
            price,
            earnings_multiple: None,
            cash_flow: None,
            category: String::new(),
            reason_for_sale: String::new(),
            ownership_structure: None,
            visit_frequency: None,
            fetched_at: Utc::now(),
            partial_match_explanation: None,
            extensions: Default::default(),
        }
    }

    #[test]
    fn sorts_ascending_with_missing_prices_last() {
        let sorted = sort_by_price(vec![
            listing("a", None),
            listing("b", Some(500_000.0)),
            listing("c", None),
            listing("d", Some(100_000.0)),
        ]);
        let prices: Vec<Option<f64>> = sorted.iter().map(|r| r.price).collect();
        assert_eq!(
            prices,
            vec![Some(100_000.0), Some(500_000.0), None, None]
        );
        // Stability: the two unpriced records keep their relative order.
        assert_eq!(sorted[2].name, "a");
        assert_eq!(sorted[3].name, "c");
    }

    #[test]
    fn equal_prices_preserve_input_order() {
        let sorted = sort_by_price(vec![
            listing("first", Some(250_000.0)),
            listing("second", Some(250_000.0)),
        ]);
        assert_eq!(sorted[0].name, "first");
        assert_eq!(sorted[1].name, "second");
    }
}
