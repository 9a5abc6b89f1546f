use std::collections::HashSet;

use serde_json::json;

use dealscout::config::{DedupeConfig, PolicyConfig};
use dealscout::domain::{RawListing, SourceMethod, SourceSite};
use dealscout::pipeline::processing::dedupe::Deduper;
use dealscout::pipeline::processing::normalize::Normalizer;
use dealscout::pipeline::processing::policy::{PolicyDecision, PolicyFilter, PolicyReject};
use dealscout::pipeline::processing::rank::sort_by_price;

fn policy() -> PolicyConfig {
    PolicyConfig {
        price_usd_max: 1_500_000.0,
        earnings_multiple_max: 4.5,
        exclude_categories: vec![],
    }
}

/// Two alert records for the same deli, from slightly different sources:
/// dedupe must merge them keeping the richer one, and the policy filter must
/// then reject the merged record for its category regardless of financials.
#[test]
fn near_duplicate_listings_merge_then_fail_the_category_gate() {
    let record_a = RawListing {
        name: "Joe's Deli Inc".to_string(),
        address: "123 Main St".to_string(),
        source_site: SourceSite::BizBuySell,
        source_method: SourceMethod::EmailParse,
        source_url: "https://example.com/a".to_string(),
        price: Some(json!(500_000)),
        reason_for_sale: "retirement".to_string(),
        category: "Restaurants".to_string(),
        ..RawListing::default()
    };
    let record_b = RawListing {
        name: "Joe's Deli".to_string(),
        address: "123 Main Street".to_string(),
        source_site: SourceSite::DealStream,
        source_method: SourceMethod::EmailParse,
        source_url: "https://example.com/b".to_string(),
        price: Some(json!(500_000)),
        earnings_multiple: Some(json!(3.2)),
        reason_for_sale: "retirement".to_string(),
        category: "Restaurants".to_string(),
        ..RawListing::default()
    };

    let records = Normalizer::new().normalize_batch(vec![record_a, record_b]);
    let records = Deduper::new(DedupeConfig::default()).dedupe(records);

    // The fuzzy match clears the default threshold and the disclosed multiple
    // makes record B the richer survivor.
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "Joe's Deli");
    assert_eq!(records[0].earnings_multiple, Some(3.2));

    let filter = PolicyFilter::new(policy());
    assert_eq!(
        filter.evaluate(&records[0]),
        PolicyDecision::Reject(PolicyReject::ExcludedCategory)
    );
}

#[test]
fn accepted_records_come_out_sorted_and_classified() {
    let raws = vec![
        RawListing {
            name: "Evergreen Machining".to_string(),
            source_site: SourceSite::Manual,
            source_method: SourceMethod::ManualEntry,
            source_url: "https://example.com/machining".to_string(),
            price: Some(json!("$1,100,000")),
            cash_flow: Some(json!("$400,000")),
            reason_for_sale: "owner retiring after 30 years".to_string(),
            category: "Manufacturing".to_string(),
            ..RawListing::default()
        },
        RawListing {
            name: "Harbor Freight Logistics".to_string(),
            source_site: SourceSite::Manual,
            source_method: SourceMethod::ManualEntry,
            source_url: "https://example.com/logistics".to_string(),
            price: Some(json!(650_000)),
            reason_for_sale: "succession plan in motion".to_string(),
            category: "Transportation".to_string(),
            ..RawListing::default()
        },
    ];

    let records = Normalizer::new().normalize_batch(raws);
    assert_eq!(records[0].earnings_multiple, Some(2.75));

    let (kept, rejects) = PolicyFilter::new(policy()).apply(records);
    assert!(rejects.is_empty());

    let kept = sort_by_price(kept);
    assert_eq!(kept.len(), 2);
    assert_eq!(kept[0].name, "Harbor Freight Logistics");
    assert_eq!(kept[1].name, "Evergreen Machining");
    // Free-text reasons were rewritten to the closed set on accept.
    assert!(kept.iter().all(|r| r.reason_for_sale == "retirement"));
}

#[test]
fn rescreening_exported_records_is_stable() {
    let raw = RawListing {
        name: "Cascade HVAC Services".to_string(),
        source_site: SourceSite::BizQuest,
        source_method: SourceMethod::WebScrape,
        source_url: "https://example.com/hvac".to_string(),
        price: Some(json!(900_000)),
        cash_flow: Some(json!(300_000)),
        reason_for_sale: "retirement".to_string(),
        category: "HVAC".to_string(),
        ..RawListing::default()
    };

    let deduper = Deduper::new(DedupeConfig::default());
    let filter = PolicyFilter::new(policy());

    let records = Normalizer::new().normalize_batch(vec![raw]);
    let (first_pass, _) = filter.apply(deduper.dedupe(records));

    // A second screening of already-screened records changes nothing: dedupe
    // is a fixed point and the classified reason still reads as retirement.
    let (second_pass, rejects) = filter.apply(deduper.dedupe(first_pass.clone()));
    assert!(rejects.is_empty());
    assert_eq!(first_pass, second_pass);

    let urls: HashSet<&str> = second_pass.iter().map(|r| r.source_url.as_str()).collect();
    assert!(urls.contains("https://example.com/hvac"));
}
