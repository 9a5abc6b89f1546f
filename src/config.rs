use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{AgentError, Result};

/// Top-level configuration loaded from a TOML file.
///
/// Acquisition thresholds are required: a config file without them is a fatal
/// startup error, never a silently skipped filter stage. Credentials for the
/// external mail fetcher live with that process, not here; the pipeline reads
/// no environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    pub policy: PolicyConfig,
    #[serde(default)]
    pub dedupe: DedupeConfig,
    #[serde(default)]
    pub mailbox: MailboxConfig,
    #[serde(default)]
    pub scrape: ScrapeConfig,
    #[serde(default)]
    pub link_check: LinkCheckConfig,
    pub outputs: OutputConfig,
}

/// Acquisition policy thresholds consumed by the policy filter.
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyConfig {
    pub price_usd_max: f64,
    pub earnings_multiple_max: f64,
    #[serde(default)]
    pub exclude_categories: Vec<String>,
}

/// Tunables for the fuzzy deduplicator.
///
/// Both values are empirical; the defaults reproduce the behavior the rest of
/// the screening flow was calibrated against.
#[derive(Debug, Clone, Deserialize)]
pub struct DedupeConfig {
    /// Token-set similarity (0-100) at or above which two records merge.
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,
    /// Richness-score bonus for a record that survived link validation.
    #[serde(default = "default_final_url_weight")]
    pub final_url_weight: u32,
}

fn default_similarity_threshold() -> f64 {
    92.0
}

fn default_final_url_weight() -> u32 {
    1
}

impl Default for DedupeConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: default_similarity_threshold(),
            final_url_weight: default_final_url_weight(),
        }
    }
}

/// Where the external mail fetcher spools alert emails for us to parse.
#[derive(Debug, Clone, Deserialize)]
pub struct MailboxConfig {
    /// NDJSON spool of fetched alert emails; empty disables the email source.
    #[serde(default)]
    pub spool_path: String,
}

impl Default for MailboxConfig {
    fn default() -> Self {
        Self {
            spool_path: String::new(),
        }
    }
}

/// Web scraping sources. Disabled unless a search URL is configured.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScrapeConfig {
    #[serde(default)]
    pub bizbuysell: Option<SiteScrapeConfig>,
    #[serde(default)]
    pub bizquest: Option<SiteScrapeConfig>,
    /// JSON file of operator-entered raw listings.
    #[serde(default)]
    pub manual_path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SiteScrapeConfig {
    pub search_url: String,
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
    #[serde(default = "default_delay_seconds")]
    pub delay_seconds: u64,
}

fn default_max_pages() -> u32 {
    5
}

fn default_delay_seconds() -> u64 {
    2
}

#[derive(Debug, Clone, Deserialize)]
pub struct LinkCheckConfig {
    #[serde(default = "default_link_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_link_timeout_seconds() -> u64 {
    12
}

impl Default for LinkCheckConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_link_timeout_seconds(),
        }
    }
}

/// Output paths for the export stage.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub json_path: String,
    pub markdown_path: String,
    pub rejects_path: String,
}

impl AgentConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            AgentError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;

        let config: AgentConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Fail fast on nonsensical thresholds, before any record is processed.
    pub fn validate(&self) -> Result<()> {
        if !self.policy.price_usd_max.is_finite() || self.policy.price_usd_max <= 0.0 {
            return Err(AgentError::Config(
                "policy.price_usd_max must be a positive number".to_string(),
            ));
        }
        if !self.policy.earnings_multiple_max.is_finite() || self.policy.earnings_multiple_max <= 0.0
        {
            return Err(AgentError::Config(
                "policy.earnings_multiple_max must be a positive number".to_string(),
            ));
        }
        if !(0.0..=100.0).contains(&self.dedupe.similarity_threshold) {
            return Err(AgentError::Config(
                "dedupe.similarity_threshold must be within 0-100".to_string(),
            ));
        }
        if self.outputs.json_path.trim().is_empty()
            || self.outputs.markdown_path.trim().is_empty()
            || self.outputs.rejects_path.trim().is_empty()
        {
            return Err(AgentError::Config(
                "outputs.json_path, outputs.markdown_path and outputs.rejects_path are required"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_toml() -> &'static str {
        r#"
            [policy]
            price_usd_max = 1500000.0
            earnings_multiple_max = 4.5
            exclude_categories = ["franchise"]

            [outputs]
            json_path = "output/listings.json"
            markdown_path = "output/listings.md"
            rejects_path = "output/rejects.csv"
        "#
    }

    #[test]
    fn minimal_config_parses_with_defaults() {
        let config: AgentConfig = toml::from_str(minimal_toml()).unwrap();
        config.validate().unwrap();
        assert_eq!(config.dedupe.similarity_threshold, 92.0);
        assert_eq!(config.dedupe.final_url_weight, 1);
        assert_eq!(config.link_check.timeout_seconds, 12);
        assert!(config.scrape.bizbuysell.is_none());
    }

    #[test]
    fn missing_policy_section_is_an_error() {
        let result: std::result::Result<AgentConfig, _> = toml::from_str(
            r#"
                [outputs]
                json_path = "a.json"
                markdown_path = "a.md"
                rejects_path = "a.csv"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn non_positive_threshold_fails_validation() {
        let mut config: AgentConfig = toml::from_str(minimal_toml()).unwrap();
        config.policy.price_usd_max = 0.0;
        assert!(config.validate().is_err());
    }
}
