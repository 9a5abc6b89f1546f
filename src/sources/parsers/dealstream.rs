use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;

use crate::domain::{RawListing, SourceMethod, SourceSite};
use crate::sources::parsers::first_capture;
use crate::sources::{email_text, html_links, AlertEmail, EmailParser, ParseOutcome};

static PRICE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Price[:\s]*\$\s?([\d,]+)").unwrap());
static CASH_FLOW_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:EBITDA|Cash\s*Flow|SDE)[:\s]*\$\s?([\d,]+)").unwrap());
static REASON_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Reason\s*for\s*Sale[:\s]*(.+)").unwrap());
static VIEW_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:View|See)\s+(?:Listing|Details)").unwrap());

/// Parser for DealStream (formerly MergerNetwork) alert emails.
pub struct DealStreamParser;

impl EmailParser for DealStreamParser {
    fn name(&self) -> &'static str {
        "dealstream"
    }

    fn parse(&self, email: &AlertEmail) -> ParseOutcome {
        let subject = email.subject.to_lowercase();
        let claimed = subject.contains("dealstream")
            || subject.contains("mergernetwork")
            || email.from_contains("dealstream")
            || email.from_contains("mergernetwork");
        if !claimed {
            return ParseOutcome::unmatched();
        }

        let text = email_text(email);
        if text.trim().is_empty() {
            return ParseOutcome::unmatched();
        }

        // The listing deep link is the "View Listing" call-to-action anchor.
        let url = html_links(&email.text_html)
            .into_iter()
            .find(|(anchor_text, _)| VIEW_LINK_RE.is_match(anchor_text))
            .map(|(_, href)| href);
        let price = first_capture(&PRICE_RE, &text);
        let (url, price) = match (url, price) {
            (Some(url), Some(price)) => (url, price),
            _ => return ParseOutcome::unmatched(),
        };

        let subject = email.subject.trim();
        let record = RawListing {
            name: if subject.is_empty() {
                "Listing".to_string()
            } else {
                subject.to_string()
            },
            source_site: SourceSite::DealStream,
            source_method: SourceMethod::EmailParse,
            source_url: url,
            price: Some(json!(price)),
            cash_flow: first_capture(&CASH_FLOW_RE, &text).map(|v| json!(v)),
            reason_for_sale: first_capture(&REASON_RE, &text).unwrap_or_default(),
            ..RawListing::default()
        };
        ParseOutcome::matched(vec![record])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alert_email() -> AlertEmail {
        AlertEmail {
            subject: "DealStream: Established HVAC Contractor".to_string(),
            from_addrs: vec!["alerts@dealstream.com".to_string()],
            text_html: concat!(
                "<html><body>",
                "<p>Price: $900,000</p>",
                "<p>Cash Flow: $300,000</p>",
                "<p>Reason for Sale: owner retiring</p>",
                "<a href=\"https://dealstream.com/listing/42\">View Listing</a>",
                "<a href=\"https://dealstream.com/unsubscribe\">Unsubscribe</a>",
                "</body></html>"
            )
            .to_string(),
            ..AlertEmail::default()
        }
    }

    #[test]
    fn pulls_url_from_the_view_listing_anchor() {
        let outcome = DealStreamParser.parse(&alert_email());
        assert!(outcome.matched);
        let record = &outcome.records[0];
        assert_eq!(record.source_url, "https://dealstream.com/listing/42");
        assert_eq!(record.price.as_ref().unwrap(), &json!("900,000"));
        assert_eq!(record.reason_for_sale, "owner retiring");
    }

    #[test]
    fn unmatched_without_a_listing_anchor() {
        let mut email = alert_email();
        email.text_html = "<p>Price: $900,000</p>".to_string();
        assert!(!DealStreamParser.parse(&email).matched);
    }
}
