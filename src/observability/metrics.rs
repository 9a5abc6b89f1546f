//! Simple metrics module for the dealscout pipeline
//!
//! This module provides a straightforward API for recording metrics using
//! the standard Prometheus naming conventions.

use std::fmt;

/// Enum representing all metric names used in the system
/// This eliminates magic strings and provides compile-time safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Source metrics
    SourcesEmailsParsed,
    SourcesEmailsUnmatched,
    SourcesListingsFetched,
    SourcesFetchErrors,

    // Normalize metrics
    NormalizeRecordsProcessed,
    NormalizeCoercionFailures,

    // Link check metrics
    LinkCheckPassed,
    LinkCheckRejected,

    // Dedupe metrics
    DedupeRecordsProcessed,
    DedupeMerges,
    DedupeSurvivors,

    // Policy filter metrics
    FilterRecordsAccepted,
    FilterRecordsRejected,

    // Export metrics
    ExportWritesSuccess,
    ExportWritesError,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::SourcesEmailsParsed => "dealscout_sources_emails_parsed_total",
            MetricName::SourcesEmailsUnmatched => "dealscout_sources_emails_unmatched_total",
            MetricName::SourcesListingsFetched => "dealscout_sources_listings_fetched_total",
            MetricName::SourcesFetchErrors => "dealscout_sources_fetch_errors_total",
            MetricName::NormalizeRecordsProcessed => "dealscout_normalize_records_processed_total",
            MetricName::NormalizeCoercionFailures => "dealscout_normalize_coercion_failures_total",
            MetricName::LinkCheckPassed => "dealscout_link_check_passed_total",
            MetricName::LinkCheckRejected => "dealscout_link_check_rejected_total",
            MetricName::DedupeRecordsProcessed => "dealscout_dedupe_records_processed_total",
            MetricName::DedupeMerges => "dealscout_dedupe_merges_total",
            MetricName::DedupeSurvivors => "dealscout_dedupe_survivors",
            MetricName::FilterRecordsAccepted => "dealscout_filter_records_accepted_total",
            MetricName::FilterRecordsRejected => "dealscout_filter_records_rejected_total",
            MetricName::ExportWritesSuccess => "dealscout_export_writes_success_total",
            MetricName::ExportWritesError => "dealscout_export_writes_error_total",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Increment a counter by the given amount
pub fn emit_counter(name: MetricName, value: u64) {
    ::metrics::counter!(name.as_str()).increment(value);
}

/// Record a gauge observation
pub fn emit_gauge(name: MetricName, value: f64) {
    ::metrics::gauge!(name.as_str()).set(value);
}

pub mod sources {
    use super::{emit_counter, MetricName};

    pub fn emails_parsed(count: usize) {
        emit_counter(MetricName::SourcesEmailsParsed, count as u64);
    }

    pub fn email_unmatched() {
        emit_counter(MetricName::SourcesEmailsUnmatched, 1);
    }

    pub fn listings_fetched(count: usize) {
        emit_counter(MetricName::SourcesListingsFetched, count as u64);
    }

    pub fn fetch_error() {
        emit_counter(MetricName::SourcesFetchErrors, 1);
    }
}

pub mod normalize {
    use super::{emit_counter, MetricName};

    pub fn records_processed(count: usize) {
        emit_counter(MetricName::NormalizeRecordsProcessed, count as u64);
    }

    pub fn coercion_failure() {
        emit_counter(MetricName::NormalizeCoercionFailures, 1);
    }
}

pub mod link_check {
    use super::{emit_counter, MetricName};

    pub fn passed() {
        emit_counter(MetricName::LinkCheckPassed, 1);
    }

    pub fn rejected() {
        emit_counter(MetricName::LinkCheckRejected, 1);
    }
}

pub mod dedupe {
    use super::{emit_counter, emit_gauge, MetricName};

    pub fn records_processed(count: usize) {
        emit_counter(MetricName::DedupeRecordsProcessed, count as u64);
    }

    pub fn merge() {
        emit_counter(MetricName::DedupeMerges, 1);
    }

    pub fn survivors(count: usize) {
        emit_gauge(MetricName::DedupeSurvivors, count as f64);
    }
}

pub mod filter {
    use super::{emit_counter, MetricName};

    pub fn accepted() {
        emit_counter(MetricName::FilterRecordsAccepted, 1);
    }

    pub fn rejected() {
        emit_counter(MetricName::FilterRecordsRejected, 1);
    }
}

pub mod export {
    use super::{emit_counter, MetricName};

    pub fn write_success() {
        emit_counter(MetricName::ExportWritesSuccess, 1);
    }

    pub fn write_error() {
        emit_counter(MetricName::ExportWritesError, 1);
    }
}
