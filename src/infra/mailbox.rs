use std::path::PathBuf;

use async_trait::async_trait;
use tracing::info;

use crate::app::ports::MailboxPort;
use crate::error::Result;
use crate::sources::AlertEmail;

/// Reads alert emails from the NDJSON spool the external mail fetcher writes.
///
/// One JSON-encoded `AlertEmail` per line; blank lines are tolerated. A
/// missing or unreadable spool is a fatal fetch failure, there is nothing to
/// process downstream of it.
pub struct FileMailbox {
    spool_path: PathBuf,
}

impl FileMailbox {
    pub fn new(spool_path: impl Into<PathBuf>) -> Self {
        Self {
            spool_path: spool_path.into(),
        }
    }
}

#[async_trait]
impl MailboxPort for FileMailbox {
    async fn fetch_alert_emails(&self) -> Result<Vec<AlertEmail>> {
        let content = std::fs::read_to_string(&self.spool_path)?;

        let mut emails = Vec::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            emails.push(serde_json::from_str::<AlertEmail>(line)?);
        }

        info!(
            count = emails.len(),
            spool = %self.spool_path.display(),
            "loaded alert emails from spool"
        );
        Ok(emails)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn reads_one_email_per_line() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"subject": "Listing A", "text_plain": "a"}}"#).unwrap();
        writeln!(file).unwrap();
        writeln!(file, r#"{{"subject": "Listing B", "text_plain": "b"}}"#).unwrap();

        let mailbox = FileMailbox::new(file.path());
        let emails = mailbox.fetch_alert_emails().await.unwrap();
        assert_eq!(emails.len(), 2);
        assert_eq!(emails[0].subject, "Listing A");
        assert_eq!(emails[1].subject, "Listing B");
    }

    #[tokio::test]
    async fn missing_spool_is_fatal() {
        let mailbox = FileMailbox::new("/nonexistent/spool.ndjson");
        assert!(mailbox.fetch_alert_emails().await.is_err());
    }
}
