//! Library layer for the deal finder: listing acquisition, price
//! normalization, and median-relative deal classification.
//!
//! Wraps the `kleinanzeigen_api` transport with HTML extraction, a
//! sequential pagination crawler with politeness delays and cancellation,
//! and the classifier that rates every listing against its peers.

pub mod config;
pub mod crawl;
pub mod deals;
pub mod error;
pub mod pipeline;
pub mod pricing;
pub mod scrape;
pub mod types;
pub mod validation;

pub use kleinanzeigen_api;

pub use config::{CrawlConfig, SelectorConfig};
pub use crawl::{CrawlEvent, CrawlOutcome, Crawler, StopReason};
pub use deals::{classify, classify_with, summarize, DealSummary, DealThresholds};
pub use error::DealFinderError;
pub use pipeline::{DealFinder, DealReport, SearchRequest};
pub use pricing::{format_price, normalize_price};
pub use scrape::{DetailFetcher, ListingParser, ScrapeError};
pub use types::{Evaluation, Listing, ListingStub, RatedListing, NOT_AVAILABLE};
pub use tokio_util::sync::CancellationToken;
