//! End-to-end search: validate input, crawl, classify.
//!
//! This is the boundary a presentation layer calls. It owns no view state
//! and can run on any task; the caller keeps the [`CancellationToken`] to
//! stop a long crawl early.

use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

use crate::config::CrawlConfig;
use crate::crawl::{CrawlEvent, Crawler, StopReason};
use crate::deals::{classify_with, summarize, DealSummary, DealThresholds};
use crate::error::DealFinderError;
use crate::types::RatedListing;
use crate::validation;

/// Validated search input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchRequest {
    term: String,
    min_price: Option<u32>,
    max_price: Option<u32>,
    max_pages: u32,
}

impl SearchRequest {
    pub const DEFAULT_MAX_PAGES: u32 = 5;

    /// Validate raw input. Price bounds are optional numeric strings; blank
    /// strings count as absent.
    pub fn new(
        term: &str,
        min_price: Option<&str>,
        max_price: Option<&str>,
        max_pages: Option<u32>,
    ) -> Result<Self, DealFinderError> {
        let term = validation::validate_search(term)?;
        let min_price = min_price.map(validation::validate_price).transpose()?.flatten();
        let max_price = max_price.map(validation::validate_price).transpose()?.flatten();
        validation::validate_price_range(min_price, max_price)?;
        let max_pages =
            validation::validate_max_pages(max_pages.unwrap_or(Self::DEFAULT_MAX_PAGES))?;
        Ok(Self {
            term,
            min_price,
            max_price,
            max_pages,
        })
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn min_price(&self) -> Option<u32> {
        self.min_price
    }

    pub fn max_price(&self) -> Option<u32> {
        self.max_price
    }

    pub fn max_pages(&self) -> u32 {
        self.max_pages
    }
}

/// Result of one search. An empty `listings` is a valid "no results".
#[derive(Debug)]
pub struct DealReport {
    pub term: String,
    pub listings: Vec<RatedListing>,
    /// `None` when no listing had a usable price.
    pub summary: Option<DealSummary>,
    pub stop: StopReason,
    pub pages_fetched: u32,
}

impl DealReport {
    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }
}

pub struct DealFinder {
    crawler: Crawler,
    thresholds: DealThresholds,
}

impl DealFinder {
    /// Validate `config` and build the client, selectors and crawler.
    pub fn new(config: &CrawlConfig) -> Result<Self, DealFinderError> {
        config.validate()?;
        Ok(Self {
            crawler: Crawler::from_config(config)?,
            thresholds: config.thresholds,
        })
    }

    pub fn with_events(mut self, events: UnboundedSender<CrawlEvent>) -> Self {
        self.crawler = self.crawler.with_events(events);
        self
    }

    /// Crawl and classify. Never fails once input is validated; network
    /// trouble only shortens the result.
    pub async fn search(&self, request: &SearchRequest, cancel: CancellationToken) -> DealReport {
        let outcome = self
            .crawler
            .crawl(
                request.term(),
                request.min_price(),
                request.max_price(),
                request.max_pages(),
                &cancel,
            )
            .await;

        let listings = classify_with(outcome.listings, &self.thresholds);
        let summary = summarize(&listings, &self.thresholds);
        DealReport {
            term: request.term().to_string(),
            listings,
            summary,
            stop: outcome.stop,
            pages_fetched: outcome.pages_fetched,
        }
    }

    /// Validate raw input, then [`search`](Self::search). Invalid input is
    /// reported before any request is made.
    pub async fn find_deals(
        &self,
        term: &str,
        min_price: Option<&str>,
        max_price: Option<&str>,
        max_pages: Option<u32>,
        cancel: CancellationToken,
    ) -> Result<DealReport, DealFinderError> {
        let request = SearchRequest::new(term, min_price, max_price, max_pages)?;
        Ok(self.search(&request, cancel).await)
    }
}
