use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::app::ports::LinkCheckPort;
use crate::config::LinkCheckConfig;

/// HTTP implementation of the link validator.
///
/// HEAD first, with redirects followed; some listing sites answer HEAD with an
/// error while serving GET fine, so an error status falls back to a GET before
/// the verdict. Any transport failure is a per-record rejection, never a
/// run-fatal error.
pub struct HttpLinkChecker {
    client: reqwest::Client,
}

impl HttpLinkChecker {
    pub fn new(config: &LinkCheckConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client }
    }
}

#[async_trait]
impl LinkCheckPort for HttpLinkChecker {
    async fn resolve(&self, url: &str) -> Result<String, String> {
        let head = self.client.head(url).send().await;

        let response = match head {
            Ok(resp) if resp.status().is_client_error() || resp.status().is_server_error() => {
                debug!(%url, status = %resp.status(), "HEAD failed, retrying with GET");
                self.client.get(url).send().await
            }
            other => other,
        };

        match response {
            Ok(resp) => {
                let status = resp.status();
                if status.is_client_error() || status.is_server_error() {
                    Err(format!("http {}", status.as_u16()))
                } else {
                    Ok(resp.url().to_string())
                }
            }
            Err(_) => Err("link check failed".to_string()),
        }
    }
}
