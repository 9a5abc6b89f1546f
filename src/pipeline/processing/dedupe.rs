use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::config::DedupeConfig;
use crate::domain::ListingRecord;
use crate::observability::metrics;

/// Corporate-suffix noise stripped from identity keys before matching.
const STOP_TOKENS: [&str; 5] = ["inc", "llc", "corp", "co", "ltd"];

/// Collapses records referring to the same real-world listing, keeping the
/// most information-rich version of each.
pub struct Deduper {
    config: DedupeConfig,
}

impl Deduper {
    pub fn new(config: DedupeConfig) -> Self {
        Self { config }
    }

    /// Process records in input order against a growing list of kept
    /// representatives. The first representative that fuzzy-matches an
    /// incoming record is replaced in place by the preferred one of the pair,
    /// so each surviving listing keeps the slot of its first appearance.
    pub fn dedupe(&self, records: Vec<ListingRecord>) -> Vec<ListingRecord> {
        metrics::dedupe::records_processed(records.len());
        let mut kept: Vec<ListingRecord> = Vec::new();
        let mut keys: Vec<String> = Vec::new();

        for record in records {
            let key = identity_key(&record.name, &record.address);
            let matched = keys
                .iter()
                .position(|existing| {
                    token_set_ratio(existing, &key) >= self.config.similarity_threshold
                });

            match matched {
                Some(index) => {
                    metrics::dedupe::merge();
                    debug!(
                        signature = %identity_signature(&key),
                        kept = %kept[index].name,
                        incoming = %record.name,
                        "merging duplicate listing"
                    );
                    if self.richness_score(&record) > self.richness_score(&kept[index]) {
                        keys[index] = key;
                        kept[index] = record;
                    }
                }
                None => {
                    keys.push(key);
                    kept.push(record);
                }
            }
        }

        metrics::dedupe::survivors(kept.len());
        info!(survivors = kept.len(), "dedupe pass complete");
        kept
    }

    /// Count of populated high-value fields, used to pick which of two
    /// duplicates to keep. Ties keep the first-seen record.
    fn richness_score(&self, record: &ListingRecord) -> u32 {
        let mut score = 0;
        if record.earnings_multiple.is_some() {
            score += 1;
        }
        if !record.reason_for_sale.is_empty() {
            score += 1;
        }
        if record.ownership_structure.is_some() {
            score += 1;
        }
        if record.visit_frequency.is_some() {
            score += 1;
        }
        if record.final_url.is_some() {
            score += self.config.final_url_weight;
        }
        score
    }
}

/// Normalized name+address string used for fuzzy duplicate matching.
///
/// Lowercased, tokens trimmed of surrounding punctuation, corporate-suffix
/// stop tokens removed, remaining tokens joined by single spaces in their
/// original order.
pub fn identity_key(name: &str, address: &str) -> String {
    let combined = format!("{} {}", name, address);
    let mut parts: Vec<String> = Vec::new();
    for token in combined.split_whitespace() {
        let cleaned: String = token
            .to_lowercase()
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_string();
        if cleaned.is_empty() || STOP_TOKENS.contains(&cleaned.as_str()) {
            continue;
        }
        parts.push(cleaned);
    }
    parts.join(" ")
}

/// Short stable digest of an identity key, for audit logs.
pub fn identity_signature(key: &str) -> String {
    let digest = Sha256::digest(key.as_bytes());
    hex::encode(&digest[..8])
}

/// Word-order-insensitive similarity between two strings, scaled 0-100.
///
/// Tokenizes both sides into sorted word sets, forms the intersection and the
/// two set differences, and returns the best normalized edit-distance ratio
/// among the three pairwise comparisons of (intersection, intersection +
/// difference-a, intersection + difference-b). Shared tokens therefore never
/// count against the score, which makes the measure robust to reordering and
/// one-sided extra words.
pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    let tokens_a: std::collections::BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: std::collections::BTreeSet<&str> = b.split_whitespace().collect();

    if tokens_a.is_empty() && tokens_b.is_empty() {
        return 100.0;
    }
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    let intersection: Vec<&str> = tokens_a.intersection(&tokens_b).copied().collect();
    let only_a: Vec<&str> = tokens_a.difference(&tokens_b).copied().collect();
    let only_b: Vec<&str> = tokens_b.difference(&tokens_a).copied().collect();

    let sect = intersection.join(" ");
    let combined_a = join_runs(&intersection, &only_a);
    let combined_b = join_runs(&intersection, &only_b);

    let ratios = [
        indel_ratio(&sect, &combined_a),
        indel_ratio(&sect, &combined_b),
        indel_ratio(&combined_a, &combined_b),
    ];
    ratios.into_iter().fold(0.0, f64::max) * 100.0
}

fn join_runs(head: &[&str], tail: &[&str]) -> String {
    head.iter()
        .chain(tail.iter())
        .copied()
        .collect::<Vec<&str>>()
        .join(" ")
}

/// Normalized insert/delete edit similarity in 0.0-1.0.
///
/// Substitutions are not allowed, so the distance is `len1 + len2 - 2 * lcs`
/// and the ratio degrades smoothly as the strings diverge.
fn indel_ratio(s1: &str, s2: &str) -> f64 {
    let chars1: Vec<char> = s1.chars().collect();
    let chars2: Vec<char> = s2.chars().collect();
    let total = chars1.len() + chars2.len();
    if total == 0 {
        return 1.0;
    }

    let lcs = longest_common_subsequence(&chars1, &chars2);
    let distance = total - 2 * lcs;
    1.0 - (distance as f64 / total as f64)
}

fn longest_common_subsequence(chars1: &[char], chars2: &[char]) -> usize {
    let len2 = chars2.len();
    let mut previous = vec![0usize; len2 + 1];
    let mut current = vec![0usize; len2 + 1];

    for c1 in chars1 {
        for (j, c2) in chars2.iter().enumerate() {
            current[j + 1] = if c1 == c2 {
                previous[j] + 1
            } else {
                previous[j + 1].max(current[j])
            };
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[len2]
}
