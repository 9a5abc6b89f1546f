use async_trait::async_trait;

use crate::sources::AlertEmail;

/// Boundary to the external mail fetcher. Retrieval itself (IMAP, OAuth,
/// label search) happens outside this process; we only consume what it
/// spooled.
#[async_trait]
pub trait MailboxPort: Send + Sync {
    async fn fetch_alert_emails(&self) -> crate::error::Result<Vec<AlertEmail>>;
}

/// Boundary to the link validator.
///
/// `Ok` carries the redirect-resolved URL; `Err` carries the rejection reason
/// exactly as it should appear in the ledger ("http 404", "link check
/// failed"). A failed check is per-record data, never a run-fatal error.
#[async_trait]
pub trait LinkCheckPort: Send + Sync {
    async fn resolve(&self, url: &str) -> Result<String, String>;
}
