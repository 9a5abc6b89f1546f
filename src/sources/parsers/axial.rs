use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;

use crate::domain::{RawListing, SourceMethod, SourceSite};
use crate::sources::parsers::{first_capture, URL_RE};
use crate::sources::{email_text, AlertEmail, EmailParser, ParseOutcome};

const AXIAL_KEYWORDS: [&str; 5] = [
    "deal alert",
    "deal opportunity",
    "new opportunity",
    "investment opportunity",
    "axial",
];

// Axial valuations come in several spellings and units ($4.2M, $4,200,000).
static PRICE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?i)(?:Asking\s*Price|Price|Valuation)[:\s]*\$\s?([\d,]+(?:\.\d{1,2})?)\s*(?:M\b|Million)").unwrap(),
        Regex::new(r"(?i)(?:Asking\s*Price|Price|Valuation)[:\s]*\$\s?([\d,]+(?:\.\d{2})?)").unwrap(),
        Regex::new(r"(?i)(?:Enterprise\s*Value|EV)[:\s]*\$\s?([\d,]+(?:\.\d{1,2})?)\s*(?:M\b|Million)").unwrap(),
        Regex::new(r"(?i)(?:Enterprise\s*Value|EV)[:\s]*\$\s?([\d,]+(?:\.\d{2})?)").unwrap(),
    ]
});

static CASH_FLOW_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?i)(?:TTM\s*EBITDA|EBITDA|Cash\s*Flow|SDE)[:\s]*\$\s?([\d,]+(?:\.\d{1,2})?)\s*K\b").unwrap(),
        Regex::new(r"(?i)(?:TTM\s*EBITDA|EBITDA|Cash\s*Flow|SDE)[:\s]*\$\s?([\d,]+(?:\.\d{1,2})?)\s*(?:M\b|Million)").unwrap(),
        Regex::new(r"(?i)(?:TTM\s*EBITDA|EBITDA|Cash\s*Flow|SDE|Earnings)[:\s]*\$\s?([\d,]+(?:\.\d{2})?)").unwrap(),
    ]
});

static REASON_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:Reason\s*for\s*Sale|Seller\s*Motivation|Why\s*Selling|Sale\s*Rationale)[:\s]*(.+)").unwrap()
});
static LOCATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:Location|Geography|Headquarters|Based\s*in|Located\s*in)[:\s]*(.+)").unwrap()
});
static INDUSTRY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:Industry|Sector|Business\s*Type|Vertical)[:\s]*(.+)").unwrap()
});
static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:Company|Business|Target|Name)[:\s]*(.+)").unwrap());
static DEAL_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"https?://(?:www\.)?axial\.net/\S+|https?://\S*deal\S*|https?://\S*opportunity\S*")
        .unwrap()
});

/// Scan patterns in priority order; the first hit wins, with K/M suffixes of
/// the whole match scaling the captured figure.
fn scan_money(patterns: &[Regex], text: &str) -> Option<f64> {
    for pattern in patterns {
        if let Some(captures) = pattern.captures(text) {
            let whole = captures.get(0)?.as_str();
            let figure = captures.get(1)?.as_str().replace(',', "");
            if let Ok(mut value) = figure.parse::<f64>() {
                let lowered = whole.to_lowercase();
                if lowered.ends_with('k') {
                    value *= 1_000.0;
                } else if lowered.ends_with('m') || lowered.contains("million") {
                    value *= 1_000_000.0;
                }
                return Some(value);
            }
        }
    }
    None
}

/// Parser for Axial deal-flow notification emails.
pub struct AxialParser;

impl EmailParser for AxialParser {
    fn name(&self) -> &'static str {
        "axial"
    }

    fn parse(&self, email: &AlertEmail) -> ParseOutcome {
        let subject = email.subject.to_lowercase();
        let claimed = email.from_contains("axial")
            || AXIAL_KEYWORDS.iter().any(|kw| subject.contains(kw));
        if !claimed {
            return ParseOutcome::unmatched();
        }

        let text = email_text(email);
        if text.trim().is_empty() {
            return ParseOutcome::unmatched();
        }

        // A price is the minimum signal worth a record.
        let price = match scan_money(&PRICE_PATTERNS, &text) {
            Some(price) => price,
            None => return ParseOutcome::unmatched(),
        };
        let cash_flow = scan_money(&CASH_FLOW_PATTERNS, &text);

        let industry = first_capture(&INDUSTRY_RE, &text).unwrap_or_default();
        let url = DEAL_URL_RE
            .find(&text)
            .or_else(|| URL_RE.find(&text))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();

        let record = RawListing {
            name: self.business_name(email, &text, &industry),
            address: first_capture(&LOCATION_RE, &text).unwrap_or_default(),
            source_site: SourceSite::Axial,
            source_method: SourceMethod::EmailParse,
            source_url: url,
            price: Some(json!(price)),
            cash_flow: cash_flow.map(|v| json!(v)),
            category: industry,
            reason_for_sale: first_capture(&REASON_RE, &text).unwrap_or_default(),
            ..RawListing::default()
        };
        ParseOutcome::matched(vec![record])
    }
}

impl AxialParser {
    /// Deal alerts carry a generic subject; prefer an explicit company line
    /// from the body when the subject is not a usable name.
    fn business_name(&self, email: &AlertEmail, text: &str, industry: &str) -> String {
        let subject = email.subject.trim();
        let generic = subject.is_empty()
            || matches!(
                subject.to_lowercase().as_str(),
                "listing" | "deal alert" | "new opportunity"
            )
            || subject.to_lowercase().contains("deal alert");

        if !generic {
            return subject.to_string();
        }
        if let Some(name) = first_capture(&NAME_RE, text) {
            if name.len() > 3 && name.len() < 100 {
                return name;
            }
        }
        if industry.is_empty() {
            "Axial Deal".to_string()
        } else {
            format!("Axial Deal - {}", industry)
        }
    }
}
