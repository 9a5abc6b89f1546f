pub mod parsers;
pub mod scrapers;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

use crate::domain::{RawListing, SourceSite};
use crate::error::Result;

/// One already-fetched alert email, as spooled by the external mail fetcher.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlertEmail {
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub from_addrs: Vec<String>,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub text_plain: String,
    #[serde(default)]
    pub text_html: String,
}

impl AlertEmail {
    /// True when any sender address contains the given fragment.
    pub fn from_contains(&self, fragment: &str) -> bool {
        self.from_addrs
            .iter()
            .any(|addr| addr.to_lowercase().contains(fragment))
    }
}

/// Outcome of offering an email to one parser.
///
/// `matched` replaces exception-based "no parser matched" control flow: a
/// parser that does not recognize the email, or recognizes it but cannot
/// extract a listing, reports `matched = false` and the registry moves on.
#[derive(Debug, Default)]
pub struct ParseOutcome {
    pub records: Vec<RawListing>,
    pub matched: bool,
}

impl ParseOutcome {
    pub fn unmatched() -> Self {
        Self::default()
    }

    pub fn matched(records: Vec<RawListing>) -> Self {
        Self {
            matched: !records.is_empty(),
            records,
        }
    }
}

/// A site-specific email parser.
pub trait EmailParser: Send + Sync {
    fn name(&self) -> &'static str;
    fn parse(&self, email: &AlertEmail) -> ParseOutcome;
}

/// A data source that fetches raw listings itself (web scrapers, the manual
/// listing file). Mirrors the one-trait-per-source seam the email parsers use,
/// but async because these sources do their own I/O.
#[async_trait]
pub trait ListingSource: Send + Sync {
    fn site(&self) -> SourceSite;
    async fn fetch_listings(&self) -> Result<Vec<RawListing>>;
}

/// Best-effort plain text for an email: prefer the HTML part (tag-stripped,
/// one text node per line so line-anchored patterns work), fall back to the
/// plain part.
pub fn email_text(email: &AlertEmail) -> String {
    if !email.text_html.trim().is_empty() {
        html_to_text(&email.text_html)
    } else {
        email.text_plain.clone()
    }
}

/// Collect `(anchor text, href)` pairs from an HTML fragment, in document
/// order.
pub fn html_links(html: &str) -> Vec<(String, String)> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("a[href]").unwrap();
    document
        .select(&selector)
        .filter_map(|anchor| {
            let href = anchor.value().attr("href")?.trim().to_string();
            if href.is_empty() {
                return None;
            }
            let text = anchor.text().collect::<String>().trim().to_string();
            Some((text, href))
        })
        .collect()
}

/// Flatten an HTML fragment to newline-separated text node contents.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut lines: Vec<String> = Vec::new();
    for node in document.root_element().text() {
        let trimmed = node.trim();
        if !trimmed.is_empty() {
            lines.push(trimmed.to_string());
        }
    }
    lines.join("\n")
}
