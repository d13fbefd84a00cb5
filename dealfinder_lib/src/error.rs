//! Error types for the library layer.

use std::fmt;

use crate::scrape::ScrapeError;

/// Errors that cross the library boundary. Network and parse failures that
/// happen once crawling has started are contained by the crawler and never
/// show up here.
#[derive(Debug)]
pub enum DealFinderError {
    /// The HTTP client could not be constructed.
    Api(kleinanzeigen_api::Error),
    /// A configured CSS selector failed to compile.
    Scrape(ScrapeError),
    /// Crawl configuration is invalid or could not be read.
    Config(String),
    /// User-provided input failed validation.
    InvalidInput(String),
}

impl fmt::Display for DealFinderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api(e) => write!(f, "API error: {}", e),
            Self::Scrape(e) => write!(f, "Scrape error: {}", e),
            Self::Config(msg) => write!(f, "Config error: {}", msg),
            Self::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
        }
    }
}

impl std::error::Error for DealFinderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Api(e) => Some(e),
            Self::Scrape(e) => Some(e),
            _ => None,
        }
    }
}

impl From<kleinanzeigen_api::Error> for DealFinderError {
    fn from(e: kleinanzeigen_api::Error) -> Self {
        Self::Api(e)
    }
}

impl From<ScrapeError> for DealFinderError {
    fn from(e: ScrapeError) -> Self {
        Self::Scrape(e)
    }
}
