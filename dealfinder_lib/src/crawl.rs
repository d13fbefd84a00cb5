//! Sequential pagination crawler.
//!
//! Pages are fetched one at a time, and within a page listings are fetched
//! one at a time, with a short pause after each listing and a longer pause
//! between pages. The crawl ends when `max_pages` is exhausted, a page has
//! no cards, a page cannot be fetched, or the cancellation token fires.
//! None of these is an error: the listings gathered so far are returned.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

use kleinanzeigen_api::{Client, SearchQuery};

use crate::config::CrawlConfig;
use crate::error::DealFinderError;
use crate::scrape::{DetailFetcher, ListingParser};
use crate::types::Listing;

/// Why a crawl stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    MaxPages,
    EmptyPage,
    PageFailed,
    Cancelled,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            StopReason::MaxPages => "page limit reached",
            StopReason::EmptyPage => "no more results",
            StopReason::PageFailed => "results page unavailable",
            StopReason::Cancelled => "cancelled",
        };
        f.write_str(text)
    }
}

/// Progress notifications for an observer outside the crawl task.
#[derive(Clone, Debug, PartialEq)]
pub enum CrawlEvent {
    PageFetched { page: u32, listings: usize },
    ListingFetched { page: u32, index: usize, total: usize, title: String },
    PageFailed { page: u32, reason: String },
    Finished { listings: usize, stop: StopReason },
}

#[derive(Debug)]
pub struct CrawlOutcome {
    /// Listings in page order.
    pub listings: Vec<Listing>,
    /// Results pages successfully retrieved, including a final empty one.
    pub pages_fetched: u32,
    pub stop: StopReason,
}

pub struct Crawler {
    fetcher: DetailFetcher,
    listing_delay: Duration,
    page_delay: Duration,
    events: Option<UnboundedSender<CrawlEvent>>,
}

impl Crawler {
    pub fn new(fetcher: DetailFetcher, listing_delay: Duration, page_delay: Duration) -> Self {
        Self {
            fetcher,
            listing_delay,
            page_delay,
            events: None,
        }
    }

    /// Build the HTTP client and parser described by `config`.
    pub fn from_config(config: &CrawlConfig) -> Result<Self, DealFinderError> {
        let client = Client::with_options(
            &config.base_url,
            &config.user_agent,
            config.request_timeout(),
        )?;
        let parser = ListingParser::new(client.base_url().as_str(), &config.selectors)?;
        Ok(Self::new(
            DetailFetcher::new(client, parser),
            config.listing_delay(),
            config.page_delay(),
        ))
    }

    /// Send progress events to `events`. A closed receiver is ignored.
    pub fn with_events(mut self, events: UnboundedSender<CrawlEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn fetcher(&self) -> &DetailFetcher {
        &self.fetcher
    }

    pub async fn crawl(
        &self,
        term: &str,
        min_price: Option<u32>,
        max_price: Option<u32>,
        max_pages: u32,
        cancel: &CancellationToken,
    ) -> CrawlOutcome {
        let mut listings = Vec::new();
        let mut pages_fetched = 0;
        let mut stop = StopReason::MaxPages;

        'pages: for page in 1..=max_pages {
            if cancel.is_cancelled() {
                stop = StopReason::Cancelled;
                break;
            }

            let query = SearchQuery::new(term)
                .with_price_range(min_price, max_price)
                .with_page(page);
            let html = match self.client().get_search_page(&query).await {
                Ok(html) => html,
                Err(e) => {
                    tracing::warn!(
                        "Results page {} ({}) unavailable, stopping: {}",
                        page,
                        self.client().search_url(&query),
                        e
                    );
                    self.emit(CrawlEvent::PageFailed {
                        page,
                        reason: e.to_string(),
                    });
                    stop = StopReason::PageFailed;
                    break;
                }
            };
            pages_fetched += 1;

            let stubs = self.fetcher.parser().extract_listings(&html);
            tracing::info!(
                "Results page {} ({}): {} listings",
                page,
                self.client().search_url(&query),
                stubs.len()
            );
            self.emit(CrawlEvent::PageFetched {
                page,
                listings: stubs.len(),
            });
            if stubs.is_empty() {
                stop = StopReason::EmptyPage;
                break;
            }

            let total = stubs.len();
            let last_page = page == max_pages;
            for (index, stub) in stubs.iter().enumerate() {
                if cancel.is_cancelled() {
                    stop = StopReason::Cancelled;
                    break 'pages;
                }
                let listing = self.fetcher.fetch_stub(stub).await;
                self.emit(CrawlEvent::ListingFetched {
                    page,
                    index,
                    total,
                    title: listing.title.clone(),
                });
                listings.push(listing);

                if last_page && index + 1 == total {
                    break;
                }
                if !pause(self.listing_delay, cancel).await {
                    stop = StopReason::Cancelled;
                    break 'pages;
                }
            }

            if page < max_pages && !pause(self.page_delay, cancel).await {
                stop = StopReason::Cancelled;
                break;
            }
        }

        tracing::info!(
            "Crawl for '{}' finished after {} pages with {} listings ({})",
            term,
            pages_fetched,
            listings.len(),
            stop
        );
        self.emit(CrawlEvent::Finished {
            listings: listings.len(),
            stop,
        });

        CrawlOutcome {
            listings,
            pages_fetched,
            stop,
        }
    }

    fn client(&self) -> &Client {
        self.fetcher.client()
    }

    fn emit(&self, event: CrawlEvent) {
        if let Some(events) = &self.events {
            let _ = events.send(event);
        }
    }
}

/// Sleep for `delay` unless cancelled first. Returns `false` on cancellation.
async fn pause(delay: Duration, cancel: &CancellationToken) -> bool {
    if delay.is_zero() {
        return !cancel.is_cancelled();
    }
    tokio::select! {
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(delay) => true,
    }
}
