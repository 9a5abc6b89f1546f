use std::fmt;

use tracing::debug;

use crate::config::PolicyConfig;
use crate::domain::{ListingRecord, RejectRecord, SaleReason};
use crate::observability::metrics;

/// Retirement-flavored phrases in a seller's stated reason.
const RETIREMENT_HINTS: [&str; 6] = [
    "retire",
    "succession",
    "aging",
    "after",
    "long tenure",
    "transition",
];

/// Categories never worth pursuing regardless of configuration.
const EXCLUDED_HINTS: [&str; 7] = [
    "restaurant",
    "bar",
    "cleaning",
    "retail",
    "salon",
    "spa",
    "gym",
];

/// Why the policy filter dropped a record. `Display` forms are the exact
/// strings surfaced in the reject ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyReject {
    MissingPrice,
    PriceAboveMax,
    ReasonNotRetirement,
    MultipleAboveMax,
    ExcludedCategory,
}

impl fmt::Display for PolicyReject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            PolicyReject::MissingPrice => "missing price",
            PolicyReject::PriceAboveMax => "price > max",
            PolicyReject::ReasonNotRetirement => "reason not retirement",
            PolicyReject::MultipleAboveMax => "multiple > max",
            PolicyReject::ExcludedCategory => "excluded category",
        };
        write!(f, "{}", reason)
    }
}

/// Per-record accept/reject decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyDecision {
    Accept,
    Reject(PolicyReject),
}

/// Classify a free-text reason for sale into the closed set.
///
/// A conservative keyword classifier: unusual phrasings of a genuine
/// retirement sale will land in `Other`, which the filter then rejects.
pub fn classify_reason(text: &str) -> SaleReason {
    let lowered = text.to_lowercase();
    if RETIREMENT_HINTS.iter().any(|hint| lowered.contains(hint)) {
        return SaleReason::Retirement;
    }
    if lowered.contains("relocat") {
        return SaleReason::OwnerRelocation;
    }
    SaleReason::Other
}

/// The accept/reject gate applying price, reason, multiple, and category
/// rules against a caller-supplied acquisition policy.
pub struct PolicyFilter {
    config: PolicyConfig,
}

impl PolicyFilter {
    pub fn new(config: PolicyConfig) -> Self {
        Self { config }
    }

    /// Checks run in a fixed order and the first failure wins, so the
    /// reported reason is deterministic for a given record and config.
    pub fn evaluate(&self, record: &ListingRecord) -> PolicyDecision {
        let price = match record.price {
            Some(price) => price,
            None => return PolicyDecision::Reject(PolicyReject::MissingPrice),
        };
        if price > self.config.price_usd_max {
            return PolicyDecision::Reject(PolicyReject::PriceAboveMax);
        }

        if classify_reason(&record.reason_for_sale) != SaleReason::Retirement {
            return PolicyDecision::Reject(PolicyReject::ReasonNotRetirement);
        }

        if let Some(multiple) = record.earnings_multiple {
            if multiple > self.config.earnings_multiple_max {
                return PolicyDecision::Reject(PolicyReject::MultipleAboveMax);
            }
        }

        let category = record.category.to_lowercase();
        let name_and_category = format!("{} {}", record.name.to_lowercase(), category);
        let configured_hit = self
            .config
            .exclude_categories
            .iter()
            .any(|excluded| category.contains(&excluded.to_lowercase()));
        let builtin_hit = EXCLUDED_HINTS
            .iter()
            .any(|hint| name_and_category.contains(hint));
        if configured_hit || builtin_hit {
            return PolicyDecision::Reject(PolicyReject::ExcludedCategory);
        }

        PolicyDecision::Accept
    }

    /// Apply the policy to a whole batch. Accepted records come back with
    /// `reason_for_sale` rewritten to its classified closed-set value; every
    /// rejection becomes a ledger entry.
    pub fn apply(&self, records: Vec<ListingRecord>) -> (Vec<ListingRecord>, Vec<RejectRecord>) {
        let mut kept = Vec::new();
        let mut rejects = Vec::new();

        for mut record in records {
            match self.evaluate(&record) {
                PolicyDecision::Accept => {
                    metrics::filter::accepted();
                    record.reason_for_sale =
                        classify_reason(&record.reason_for_sale).to_string();
                    kept.push(record);
                }
                PolicyDecision::Reject(reason) => {
                    metrics::filter::rejected();
                    debug!(name = %record.name, %reason, "listing rejected by policy");
                    rejects.push(RejectRecord::new(
                        record.source_site,
                        record.source_url.clone(),
                        reason.to_string(),
                    ));
                }
            }
        }

        (kept, rejects)
    }
}
