use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Site a listing was discovered on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SourceSite {
    BizBuySell,
    BizQuest,
    DealStream,
    Axial,
    LoopNet,
    BusinessBroker,
    Manual,
    Unknown,
}

impl Default for SourceSite {
    fn default() -> Self {
        SourceSite::Unknown
    }
}

impl fmt::Display for SourceSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceSite::BizBuySell => "bizbuysell",
            SourceSite::BizQuest => "bizquest",
            SourceSite::DealStream => "dealstream",
            SourceSite::Axial => "axial",
            SourceSite::LoopNet => "loopnet",
            SourceSite::BusinessBroker => "businessbroker",
            SourceSite::Manual => "manual",
            SourceSite::Unknown => "unknown",
        };
        write!(f, "{}", name)
    }
}

impl SourceSite {
    /// Parse a user-facing site tag (CLI `--sources` values, config keys).
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_lowercase().as_str() {
            "bizbuysell" => Some(SourceSite::BizBuySell),
            "bizquest" => Some(SourceSite::BizQuest),
            "dealstream" => Some(SourceSite::DealStream),
            "axial" => Some(SourceSite::Axial),
            "loopnet" => Some(SourceSite::LoopNet),
            "businessbroker" => Some(SourceSite::BusinessBroker),
            "manual" => Some(SourceSite::Manual),
            _ => None,
        }
    }
}

/// How a listing entered the system.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SourceMethod {
    EmailParse,
    WebScrape,
    ManualEntry,
}

impl Default for SourceMethod {
    fn default() -> Self {
        SourceMethod::ManualEntry
    }
}

impl fmt::Display for SourceMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceMethod::EmailParse => "email_parse",
            SourceMethod::WebScrape => "web_scrape",
            SourceMethod::ManualEntry => "manual_entry",
        };
        write!(f, "{}", name)
    }
}

/// Closed set of seller motivations after classification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SaleReason {
    Retirement,
    OwnerRelocation,
    Other,
}

impl fmt::Display for SaleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SaleReason::Retirement => "retirement",
            SaleReason::OwnerRelocation => "owner relocation",
            SaleReason::Other => "other",
        };
        write!(f, "{}", name)
    }
}

/// Raw listing data as emitted by source adapters, before normalization.
///
/// Money fields are carried as `serde_json::Value` because sources disagree on
/// representation: scrapers emit strings like `"$1,250,000"`, manual files may
/// carry plain numbers, and email parsers emit whatever the regex captured.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawListing {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub source_site: SourceSite,
    #[serde(default)]
    pub source_method: SourceMethod,
    #[serde(default)]
    pub source_url: String,
    #[serde(default)]
    pub price: Option<serde_json::Value>,
    #[serde(default)]
    pub cash_flow: Option<serde_json::Value>,
    #[serde(default)]
    pub earnings_multiple: Option<serde_json::Value>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub reason_for_sale: String,
    #[serde(default)]
    pub ownership_structure: Option<String>,
    #[serde(default)]
    pub visit_frequency: Option<String>,
    #[serde(default)]
    pub partial_match_explanation: Option<String>,
    /// Parser-specific extras that have no slot in the canonical schema.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extensions: BTreeMap<String, String>,
}

/// One business-for-sale opportunity in canonical form.
///
/// Produced by the normalizer and treated as an immutable value from there on;
/// every pipeline stage returns a fresh list rather than mutating its input.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListingRecord {
    pub name: String,
    pub address: String,
    pub source_site: SourceSite,
    pub source_method: SourceMethod,
    pub source_url: String,
    /// Redirect-resolved URL, populated by link validation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_url: Option<String>,
    pub price: Option<f64>,
    pub earnings_multiple: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cash_flow: Option<f64>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub reason_for_sale: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ownership_structure: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visit_frequency: Option<String>,
    pub fetched_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partial_match_explanation: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extensions: BTreeMap<String, String>,
}

/// One dropped record and the reason it was dropped.
///
/// The shape is shared by all three reject producers (source parsing, link
/// validation, policy filtering) so the ledger can aggregate them untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RejectRecord {
    pub source_site: SourceSite,
    pub source_url: String,
    pub reason: String,
}

impl RejectRecord {
    pub fn new(
        source_site: SourceSite,
        source_url: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            source_site,
            source_url: source_url.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_site_round_trips_through_serde() {
        let json = serde_json::to_string(&SourceSite::BizBuySell).unwrap();
        assert_eq!(json, "\"bizbuysell\"");
        let back: SourceSite = serde_json::from_str(&json).unwrap();
        assert_eq!(back, SourceSite::BizBuySell);
    }

    #[test]
    fn sale_reason_display_matches_closed_set() {
        assert_eq!(SaleReason::Retirement.to_string(), "retirement");
        assert_eq!(SaleReason::OwnerRelocation.to_string(), "owner relocation");
        assert_eq!(SaleReason::Other.to_string(), "other");
    }

    #[test]
    fn from_tag_accepts_known_sites_only() {
        assert_eq!(
            SourceSite::from_tag(" BizBuySell "),
            Some(SourceSite::BizBuySell)
        );
        assert_eq!(SourceSite::from_tag("craigslist"), None);
    }
}
