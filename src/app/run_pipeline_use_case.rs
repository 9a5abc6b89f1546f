use std::path::Path;

use anyhow::Result;
use tracing::info;

use crate::app::ports::{LinkCheckPort, MailboxPort};
use crate::config::AgentConfig;
use crate::domain::{ListingRecord, RawListing, RejectRecord};
use crate::export::json::{load_previous_urls, write_json};
use crate::export::markdown::write_markdown;
use crate::export::rejects_csv::write_rejects;
use crate::observability::metrics;
use crate::pipeline::processing::dedupe::Deduper;
use crate::pipeline::processing::normalize::Normalizer;
use crate::pipeline::processing::policy::PolicyFilter;
use crate::pipeline::processing::rank::sort_by_price;
use crate::pipeline::processing::rejects::RejectLedger;
use crate::sources::parsers::{default_parsers, parse_alert_emails};
use crate::sources::ListingSource;

/// Counts reported at the end of every completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Records parsed out of all sources, before any gate.
    pub parsed: usize,
    /// Records that survived every gate and were exported.
    pub kept: usize,
    /// Combined parse + link + filter rejects.
    pub rejects: usize,
}

/// Use case for one full aggregation run: fetch, parse, normalize, link
/// check, dedupe, filter, sort, export.
///
/// Sources are optional; whatever is wired in contributes raw listings, and a
/// run with no sources at all is a valid (empty) run. A source that fails
/// outright aborts the run, there is nothing to process downstream of a dead
/// fetch.
pub struct RunPipelineUseCase {
    config: AgentConfig,
    mailbox: Option<Box<dyn MailboxPort>>,
    sources: Vec<Box<dyn ListingSource>>,
    link_checker: Option<Box<dyn LinkCheckPort>>,
    seed_listings: Vec<RawListing>,
}

impl RunPipelineUseCase {
    pub fn new(config: AgentConfig) -> Self {
        Self {
            config,
            mailbox: None,
            sources: Vec::new(),
            link_checker: None,
            seed_listings: Vec::new(),
        }
    }

    pub fn with_mailbox(mut self, mailbox: Box<dyn MailboxPort>) -> Self {
        self.mailbox = Some(mailbox);
        self
    }

    pub fn with_source(mut self, source: Box<dyn ListingSource>) -> Self {
        self.sources.push(source);
        self
    }

    pub fn with_link_checker(mut self, link_checker: Box<dyn LinkCheckPort>) -> Self {
        self.link_checker = Some(link_checker);
        self
    }

    /// Pre-fetched raw listings, bypassing any source adapter. Used to
    /// re-screen an existing capture without touching the network.
    pub fn with_seed_listings(mut self, listings: Vec<RawListing>) -> Self {
        self.seed_listings.extend(listings);
        self
    }

    pub async fn execute(&self) -> Result<RunSummary> {
        let mut ledger = RejectLedger::new();
        let mut raw: Vec<RawListing> = self.seed_listings.clone();

        if let Some(mailbox) = &self.mailbox {
            let emails = mailbox.fetch_alert_emails().await?;
            let parsers = default_parsers();
            let (records, parse_rejects) = parse_alert_emails(&parsers, &emails);
            raw.extend(records);
            ledger.record_parse_rejects(parse_rejects);
        }

        for source in &self.sources {
            let listings = source.fetch_listings().await?;
            raw.extend(listings);
        }

        let records = Normalizer::new().normalize_batch(raw);
        let parsed = records.len();

        let records = match &self.link_checker {
            Some(checker) => {
                let (kept, link_rejects) = annotate_links(records, checker.as_ref()).await;
                ledger.record_link_rejects(link_rejects);
                kept
            }
            None => records,
        };

        let records = Deduper::new(self.config.dedupe.clone()).dedupe(records);

        let (kept, filter_rejects) = PolicyFilter::new(self.config.policy.clone()).apply(records);
        ledger.record_filter_rejects(filter_rejects);

        let kept = sort_by_price(kept);

        // The previous accepted set must be read before the JSON export
        // overwrites it, or nothing would ever count as new.
        let json_path = Path::new(&self.config.outputs.json_path);
        let previous_urls = load_previous_urls(json_path);
        write_json(&kept, json_path)?;
        write_markdown(&kept, Path::new(&self.config.outputs.markdown_path), &previous_urls)?;

        let rejects = ledger.len();
        write_rejects(&ledger.into_entries(), Path::new(&self.config.outputs.rejects_path))?;

        let summary = RunSummary {
            parsed,
            kept: kept.len(),
            rejects,
        };
        info!(
            parsed = summary.parsed,
            kept = summary.kept,
            rejects = summary.rejects,
            "pipeline run complete"
        );
        Ok(summary)
    }
}

/// Apply the link validator's verdict to each record: annotate survivors with
/// the redirect-resolved URL, turn failures into ledger entries.
pub async fn annotate_links(
    records: Vec<ListingRecord>,
    checker: &dyn LinkCheckPort,
) -> (Vec<ListingRecord>, Vec<RejectRecord>) {
    let mut kept = Vec::new();
    let mut rejects = Vec::new();

    for mut record in records {
        if record.source_url.is_empty() {
            metrics::link_check::rejected();
            rejects.push(RejectRecord::new(record.source_site, "", "missing url"));
            continue;
        }
        match checker.resolve(&record.source_url).await {
            Ok(final_url) => {
                metrics::link_check::passed();
                record.final_url = Some(final_url);
                kept.push(record);
            }
            Err(reason) => {
                metrics::link_check::rejected();
                rejects.push(RejectRecord::new(
                    record.source_site,
                    record.source_url.clone(),
                    reason,
                ));
            }
        }
    }

    (kept, rejects)
}
