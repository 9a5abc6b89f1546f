use crate::domain::RejectRecord;

/// Audit trail of every record dropped anywhere in a run.
///
/// Rejects are grouped by producing stage and flattened in stage order
/// (parse, then link check, then policy filter), insertion order within a
/// stage, so the exported ledger reads in pipeline order regardless of when
/// each stage contributed its entries.
#[derive(Debug, Default)]
pub struct RejectLedger {
    parse: Vec<RejectRecord>,
    link: Vec<RejectRecord>,
    filter: Vec<RejectRecord>,
}

impl RejectLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_parse_rejects(&mut self, rejects: Vec<RejectRecord>) {
        self.parse.extend(rejects);
    }

    pub fn record_link_rejects(&mut self, rejects: Vec<RejectRecord>) {
        self.link.extend(rejects);
    }

    pub fn record_filter_rejects(&mut self, rejects: Vec<RejectRecord>) {
        self.filter.extend(rejects);
    }

    pub fn len(&self) -> usize {
        self.parse.len() + self.link.len() + self.filter.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_entries(self) -> Vec<RejectRecord> {
        let mut entries = self.parse;
        entries.extend(self.link);
        entries.extend(self.filter);
        entries
    }
}
