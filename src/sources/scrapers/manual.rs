use std::path::PathBuf;

use async_trait::async_trait;
use tracing::info;

use crate::domain::{RawListing, SourceMethod, SourceSite};
use crate::error::Result;
use crate::observability::metrics;
use crate::sources::ListingSource;

/// Operator-curated listings from a JSON file.
///
/// Lets a listing heard about offline (broker call, word of mouth) enter the
/// same screening pipeline as scraped and emailed ones.
pub struct ManualSource {
    path: PathBuf,
}

impl ManualSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ListingSource for ManualSource {
    fn site(&self) -> SourceSite {
        SourceSite::Manual
    }

    async fn fetch_listings(&self) -> Result<Vec<RawListing>> {
        let content = std::fs::read_to_string(&self.path)?;
        let mut listings: Vec<RawListing> = serde_json::from_str(&content)?;

        for listing in &mut listings {
            if listing.source_site == SourceSite::Unknown {
                listing.source_site = SourceSite::Manual;
            }
            listing.source_method = SourceMethod::ManualEntry;
        }

        metrics::sources::listings_fetched(listings.len());
        info!(
            count = listings.len(),
            path = %self.path.display(),
            "loaded manual listings"
        );
        Ok(listings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn loads_and_tags_manual_listings() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"name": "Riverside Storage", "source_url": "https://example.com/storage", "price": "$820,000"}}]"#
        )
        .unwrap();

        let source = ManualSource::new(file.path());
        let listings = source.fetch_listings().await.unwrap();
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].source_site, SourceSite::Manual);
        assert_eq!(listings[0].source_method, SourceMethod::ManualEntry);
    }

    #[tokio::test]
    async fn missing_file_is_a_fatal_error() {
        let source = ManualSource::new("/nonexistent/manual.json");
        assert!(source.fetch_listings().await.is_err());
    }
}
