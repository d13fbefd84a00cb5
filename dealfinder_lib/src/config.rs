//! Crawl configuration: endpoint, politeness delays, classifier thresholds
//! and the CSS selectors used to read marketplace markup.
//!
//! Every field has a default, so a TOML file only needs the keys it wants
//! to override:
//!
//! ```toml
//! listing_delay_ms = 1000
//!
//! [thresholds]
//! good_ratio = 0.75
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::deals::DealThresholds;
use crate::error::DealFinderError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Marketplace root. Detail links are resolved against it.
    pub base_url: String,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    /// Pause after each detail page.
    pub listing_delay_ms: u64,
    /// Pause before requesting the next results page.
    pub page_delay_ms: u64,
    pub thresholds: DealThresholds,
    pub selectors: SelectorConfig,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            base_url: kleinanzeigen_api::DEFAULT_BASE_URL.to_string(),
            user_agent: kleinanzeigen_api::DEFAULT_USER_AGENT.to_string(),
            request_timeout_secs: kleinanzeigen_api::DEFAULT_TIMEOUT.as_secs(),
            listing_delay_ms: 500,
            page_delay_ms: 2000,
            thresholds: DealThresholds::default(),
            selectors: SelectorConfig::default(),
        }
    }
}

/// CSS selectors for results cards and detail pages.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// One element per listing card on a results page.
    pub card: String,
    /// Title anchor inside a card; its `href` is used when the card has no
    /// `data-href`.
    pub card_link: String,
    pub title: String,
    pub price: String,
    pub description: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            card: "article.aditem".to_string(),
            card_link: "a.ellipsis".to_string(),
            title: "#viewad-title".to_string(),
            price: "#viewad-price".to_string(),
            description: "#viewad-description-text".to_string(),
        }
    }
}

impl CrawlConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, DealFinderError> {
        let config: CrawlConfig =
            toml::from_str(content).map_err(|e| DealFinderError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self, DealFinderError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DealFinderError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), DealFinderError> {
        Url::parse(&self.base_url).map_err(|e| {
            DealFinderError::Config(format!("invalid base_url '{}': {}", self.base_url, e))
        })?;
        if self.request_timeout_secs == 0 {
            return Err(DealFinderError::Config(
                "request_timeout_secs must be > 0".to_string(),
            ));
        }
        self.thresholds.validate()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn listing_delay(&self) -> Duration {
        Duration::from_millis(self.listing_delay_ms)
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    /// Same config with both politeness delays set to zero.
    pub fn without_delays(mut self) -> Self {
        self.listing_delay_ms = 0;
        self.page_delay_ms = 0;
        self
    }
}
