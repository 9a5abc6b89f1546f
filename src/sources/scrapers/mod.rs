mod bizbuysell;
mod bizquest;
mod manual;

pub use bizbuysell::BizBuySellScraper;
pub use bizquest::BizQuestScraper;
pub use manual::ManualSource;

use once_cell::sync::Lazy;
use regex::Regex;

// Listing-card field patterns shared by the result-page scrapers.
pub(crate) static CARD_PRICE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:Asking\s*Price[:\s]*)?\$\s?([\d,]+(?:\.\d{2})?)").unwrap()
});
pub(crate) static CARD_CASH_FLOW_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:EBITDA|Cash\s*Flow|SDE)[:\s]*\$\s?([\d,]+(?:\.\d{2})?)").unwrap()
});

/// Browser-looking user agent; listing sites reject the default client UA.
pub(crate) const SCRAPE_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Resolve a possibly site-relative href against the site base URL.
pub(crate) fn absolutize(base: &str, href: &str) -> String {
    if href.starts_with('/') {
        format!("{}{}", base.trim_end_matches('/'), href)
    } else {
        href.to_string()
    }
}

/// Append the page number to a search URL, preserving existing params.
pub(crate) fn paged_url(search_url: &str, page: u32) -> String {
    if search_url.contains('?') {
        format!("{}&page={}", search_url, page)
    } else {
        format!("{}?page={}", search_url, page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolutize_only_touches_relative_hrefs() {
        assert_eq!(
            absolutize("https://www.bizquest.com/", "/business/123"),
            "https://www.bizquest.com/business/123"
        );
        assert_eq!(
            absolutize("https://www.bizquest.com/", "https://elsewhere.com/x"),
            "https://elsewhere.com/x"
        );
    }

    #[test]
    fn paged_url_respects_existing_query() {
        assert_eq!(
            paged_url("https://example.com/search?q=hvac", 2),
            "https://example.com/search?q=hvac&page=2"
        );
        assert_eq!(
            paged_url("https://example.com/search", 3),
            "https://example.com/search?page=3"
        );
    }
}
