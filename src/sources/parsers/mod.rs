mod axial;
mod bizbuysell;
mod dealstream;
mod generic;

pub use axial::AxialParser;
pub use bizbuysell::BizBuySellParser;
pub use dealstream::DealStreamParser;
pub use generic::GenericParser;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

use crate::domain::{RawListing, RejectRecord, SourceSite};
use crate::observability::metrics;
use crate::sources::{AlertEmail, EmailParser};

// Field patterns shared by several alert formats.
pub(crate) static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://\S+").unwrap());
pub(crate) static PRICE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\s?([\d,]+(?:\.\d{2})?)").unwrap());
pub(crate) static CASH_FLOW_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:EBITDA|Cash\s*Flow|SDE)[:\s]*\$\s?([\d,]+(?:\.\d{2})?)").unwrap()
});
pub(crate) static REASON_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:Reason\s*for\s*Sale|Owner\s*Reason)[:\s]*(.+)").unwrap());
pub(crate) static ADDRESS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:Address|Location)[:\s]*(.+)").unwrap());

pub(crate) fn first_capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// The parser chain, site-specific first, conservative fallback last.
pub fn default_parsers() -> Vec<Box<dyn EmailParser>> {
    vec![
        Box::new(BizBuySellParser),
        Box::new(AxialParser),
        Box::new(DealStreamParser),
        Box::new(GenericParser),
    ]
}

/// Offer each email to the parser chain; the first parser that extracts
/// records claims the email. Emails no parser could handle become ledger
/// entries instead of errors.
pub fn parse_alert_emails(
    parsers: &[Box<dyn EmailParser>],
    emails: &[AlertEmail],
) -> (Vec<RawListing>, Vec<RejectRecord>) {
    let mut records = Vec::new();
    let mut rejects = Vec::new();

    for email in emails {
        let mut claimed = false;
        for parser in parsers {
            let outcome = parser.parse(email);
            if outcome.matched {
                debug!(
                    parser = parser.name(),
                    subject = %email.subject,
                    count = outcome.records.len(),
                    "parser claimed email"
                );
                records.extend(outcome.records);
                claimed = true;
                break;
            }
        }
        if claimed {
            metrics::sources::emails_parsed(1);
        } else {
            metrics::sources::email_unmatched();
            rejects.push(RejectRecord::new(
                SourceSite::Unknown,
                "",
                "no parser matched",
            ));
        }
    }

    info!(
        emails = emails.len(),
        records = records.len(),
        unmatched = rejects.len(),
        "alert email parsing complete"
    );
    (records, rejects)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmatched_email_becomes_a_reject() {
        let parsers = default_parsers();
        let email = AlertEmail {
            subject: "Weekly newsletter".to_string(),
            text_plain: "Nothing to see here.".to_string(),
            ..AlertEmail::default()
        };
        let (records, rejects) = parse_alert_emails(&parsers, &[email]);
        assert!(records.is_empty());
        assert_eq!(rejects.len(), 1);
        assert_eq!(rejects[0].reason, "no parser matched");
        assert_eq!(rejects[0].source_site, SourceSite::Unknown);
        assert_eq!(rejects[0].source_url, "");
    }

    #[test]
    fn site_parser_wins_over_generic_fallback() {
        let parsers = default_parsers();
        let email = AlertEmail {
            subject: "DealStream: Established HVAC Contractor".to_string(),
            text_html: concat!(
                "<html><body>",
                "<p>Price: $900,000</p>",
                "<p>Cash Flow: $300,000</p>",
                "<p>Reason for Sale: owner retiring</p>",
                "<a href=\"https://dealstream.com/listing/42\">View Listing</a>",
                "</body></html>"
            )
            .to_string(),
            ..AlertEmail::default()
        };
        let (records, rejects) = parse_alert_emails(&parsers, &[email]);
        assert!(rejects.is_empty());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].source_site, SourceSite::DealStream);
    }
}
