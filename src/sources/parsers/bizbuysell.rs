use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;

use crate::domain::{RawListing, SourceMethod, SourceSite};
use crate::sources::parsers::{first_capture, CASH_FLOW_RE, PRICE_RE, REASON_RE, URL_RE};
use crate::sources::{email_text, html_links, AlertEmail, EmailParser, ParseOutcome};

static LISTING_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://(?:www\.)?bizbuysell\.com/\S+").unwrap());
static ASKING_PRICE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Asking\s*Price[:\s]*\$\s?([\d,]+(?:\.\d{2})?)").unwrap());
static LOCATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Location[:\s]*(.+)").unwrap());
static CATEGORY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:Category|Industry)[:\s]*(.+)").unwrap());
static SUBJECT_NOISE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:new\s+listing(?:\s+alert)?|saved\s+search\s+alert)[:\s-]*").unwrap());

/// Parser for BizBuySell saved-search alert emails.
pub struct BizBuySellParser;

impl EmailParser for BizBuySellParser {
    fn name(&self) -> &'static str {
        "bizbuysell"
    }

    fn parse(&self, email: &AlertEmail) -> ParseOutcome {
        let subject = email.subject.to_lowercase();
        if !subject.contains("bizbuysell") && !email.from_contains("bizbuysell") {
            return ParseOutcome::unmatched();
        }

        let text = email_text(email);
        if text.trim().is_empty() {
            return ParseOutcome::unmatched();
        }

        // Prefer the listing deep link; alert footers carry unsubscribe URLs.
        let url = html_links(&email.text_html)
            .into_iter()
            .map(|(_, href)| href)
            .find(|href| LISTING_URL_RE.is_match(href))
            .or_else(|| LISTING_URL_RE.find(&text).map(|m| m.as_str().to_string()))
            .or_else(|| URL_RE.find(&text).map(|m| m.as_str().to_string()));
        let price = first_capture(&ASKING_PRICE_RE, &text)
            .or_else(|| first_capture(&PRICE_RE, &text));
        let (url, price) = match (url, price) {
            (Some(url), Some(price)) => (url, price),
            _ => return ParseOutcome::unmatched(),
        };

        let name = SUBJECT_NOISE_RE.replace(email.subject.trim(), "").to_string();
        let record = RawListing {
            name: if name.is_empty() {
                "Listing".to_string()
            } else {
                name
            },
            address: first_capture(&LOCATION_RE, &text).unwrap_or_default(),
            source_site: SourceSite::BizBuySell,
            source_method: SourceMethod::EmailParse,
            source_url: url,
            price: Some(json!(price)),
            cash_flow: first_capture(&CASH_FLOW_RE, &text).map(|v| json!(v)),
            category: first_capture(&CATEGORY_RE, &text).unwrap_or_default(),
            reason_for_sale: first_capture(&REASON_RE, &text).unwrap_or_default(),
            ..RawListing::default()
        };
        ParseOutcome::matched(vec![record])
    }
}
