use serde_json::json;

use crate::domain::{RawListing, SourceMethod, SourceSite};
use crate::sources::parsers::{first_capture, ADDRESS_RE, CASH_FLOW_RE, PRICE_RE, REASON_RE, URL_RE};
use crate::sources::{email_text, AlertEmail, EmailParser, ParseOutcome};

/// Conservative fallback parser using simple patterns; won't fabricate fields.
///
/// Claims an email only when it can find both a URL and a dollar amount;
/// everything else stays absent for the normalizer to annotate.
pub struct GenericParser;

impl EmailParser for GenericParser {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn parse(&self, email: &AlertEmail) -> ParseOutcome {
        let text = email_text(email);
        if text.trim().is_empty() {
            return ParseOutcome::unmatched();
        }

        let url = URL_RE.find(&text).map(|m| m.as_str().to_string());
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
            address: first_capture(&ADDRESS_RE, &text).unwrap_or_default(),
            source_site: SourceSite::Unknown,
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
