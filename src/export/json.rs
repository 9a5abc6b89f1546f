use std::collections::HashSet;
use std::fs;
use std::path::Path;

use tracing::info;

use crate::domain::ListingRecord;
use crate::error::Result;
use crate::export::ensure_parent_dir;
use crate::observability::metrics;

/// Write the accepted, sorted listing set as pretty-printed JSON.
pub fn write_json(records: &[ListingRecord], path: &Path) -> Result<()> {
    ensure_parent_dir(path)?;
    let body = serde_json::to_string_pretty(records)?;
    fs::write(path, body)?;
    metrics::export::write_success();
    info!(count = records.len(), path = %path.display(), "wrote listings JSON");
    Ok(())
}

/// Source URLs of the previous run's accepted set, for "new since last run"
/// diffing. A missing or corrupt previous file means no prior knowledge, so
/// every current record counts as new.
pub fn load_previous_urls(path: &Path) -> HashSet<String> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(_) => return HashSet::new(),
    };
    match serde_json::from_str::<Vec<ListingRecord>>(&content) {
        Ok(previous) => previous
            .into_iter()
            .map(|record| record.source_url)
            .filter(|url| !url.is_empty())
            .collect(),
        Err(_) => HashSet::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SourceMethod, SourceSite};
    use chrono::Utc;

    fn listing(url: &str) -> ListingRecord {
        ListingRecord {
            name: "Cascade HVAC Services".to_string(),
            address: String::new(),
            source_site: SourceSite::BizBuySell,
            source_method: SourceMethod::WebScrape,
            source_url: url.to_string(),
            final_url: None,
            price: Some(900_000.0),
            earnings_multiple: None,
            cash_flow: None,
            category: String::new(),
            reason_for_sale: "retirement".to_string(),
            ownership_structure: None,
            visit_frequency: None,
            fetched_at: Utc::now(),
            partial_match_explanation: None,
            extensions: Default::default(),
        }
    }

    #[test]
    fn json_round_trips_and_previous_urls_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("listings.json");

        let records = vec![listing("https://example.com/a"), listing("https://example.com/b")];
        write_json(&records, &path).unwrap();

        let urls = load_previous_urls(&path);
        assert_eq!(urls.len(), 2);
        assert!(urls.contains("https://example.com/a"));
    }

    #[test]
    fn missing_previous_file_means_no_prior_urls() {
        assert!(load_previous_urls(Path::new("/nonexistent/listings.json")).is_empty());
    }
}
