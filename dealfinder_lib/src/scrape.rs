//! HTML scraping for results and detail pages.
//!
//! [`ListingParser`] is pure: it turns page HTML into stubs or listings and
//! never touches the network. [`DetailFetcher`] pairs it with the HTTP client
//! and absorbs every failure into sentinel fields.

use chrono::Utc;
use scraper::{ElementRef, Html, Node, Selector};
use url::Url;

use kleinanzeigen_api::Client;

use crate::config::SelectorConfig;
use crate::pricing::normalize_price;
use crate::types::{Listing, ListingStub, NOT_AVAILABLE};

#[derive(thiserror::Error, Debug)]
pub enum ScrapeError {
    #[error("invalid selector '{selector}': {reason}")]
    Selector { selector: String, reason: String },
    #[error("invalid base url: {0}")]
    BaseUrl(#[from] url::ParseError),
}

fn compile(selector: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(selector).map_err(|e| ScrapeError::Selector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// Compiled selectors plus the base URL used to resolve relative links.
pub struct ListingParser {
    base_url: Url,
    card: Selector,
    card_link: Selector,
    title: Selector,
    price: Selector,
    description: Selector,
}

impl ListingParser {
    pub fn new(base_url: &str, selectors: &SelectorConfig) -> Result<Self, ScrapeError> {
        Ok(Self {
            base_url: Url::parse(base_url)?,
            card: compile(&selectors.card)?,
            card_link: compile(&selectors.card_link)?,
            title: compile(&selectors.title)?,
            price: compile(&selectors.price)?,
            description: compile(&selectors.description)?,
        })
    }

    /// Listing stubs from a results page, in document order.
    ///
    /// Cards without a resolvable detail link are skipped. A page without
    /// cards yields an empty vector.
    pub fn extract_listings(&self, html: &str) -> Vec<ListingStub> {
        let document = Html::parse_document(html);
        let mut stubs = Vec::new();
        let mut skipped = 0usize;

        for card in document.select(&self.card) {
            let href = card.value().attr("data-href").or_else(|| {
                card.select(&self.card_link)
                    .next()
                    .and_then(|a| a.value().attr("href"))
            });
            let Some(detail_url) = href.and_then(|h| self.resolve(h)) else {
                skipped += 1;
                continue;
            };
            let ad_id = card
                .value()
                .attr("data-adid")
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string);
            stubs.push(ListingStub { detail_url, ad_id });
        }

        if skipped > 0 {
            tracing::debug!("Skipped {} cards without a detail link", skipped);
        }
        stubs
    }

    /// Read title, price and description from a detail page. Missing elements
    /// fall back to the sentinel individually.
    pub fn parse_detail(&self, html: &str, stub: &ListingStub) -> Listing {
        let document = Html::parse_document(html);

        let title = first(&document, &self.title)
            .map(inline_text)
            .and_then(non_empty)
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());
        let price_text = first(&document, &self.price)
            .map(inline_text)
            .and_then(non_empty)
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());
        let description = first(&document, &self.description)
            .map(block_text)
            .and_then(non_empty)
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());

        Listing {
            price_value: normalize_price(&price_text),
            title,
            price_text,
            description,
            detail_url: stub.detail_url.clone(),
            ad_id: stub.ad_id.clone(),
            fetched_at: Utc::now(),
        }
    }

    fn resolve(&self, href: &str) -> Option<String> {
        let href = href.trim();
        if href.is_empty() || href.starts_with('#') {
            return None;
        }
        let url = self.base_url.join(href).ok()?;
        matches!(url.scheme(), "http" | "https").then(|| url.to_string())
    }
}

fn first<'a>(document: &'a Html, selector: &Selector) -> Option<ElementRef<'a>> {
    document.select(selector).next()
}

/// Text of an element with all whitespace runs collapsed to single spaces.
fn inline_text(element: ElementRef<'_>) -> String {
    let joined = element.text().collect::<Vec<_>>().join(" ");
    joined.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text of a block element keeping its line structure: `<br>` and source
/// newlines split lines, each line is trimmed, blank lines are dropped.
fn block_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    for node in element.descendants() {
        match node.value() {
            Node::Text(text) => raw.push_str(text),
            Node::Element(el) if el.name() == "br" => raw.push('\n'),
            _ => {}
        }
    }
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Fetches and parses one detail page per call. Never fails: transport
/// errors produce a listing full of sentinels.
pub struct DetailFetcher {
    client: Client,
    parser: ListingParser,
}

impl DetailFetcher {
    pub fn new(client: Client, parser: ListingParser) -> Self {
        Self { client, parser }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn parser(&self) -> &ListingParser {
        &self.parser
    }

    /// Fetch a listing by its absolute detail URL.
    pub async fn fetch_detail(&self, url: &str) -> Listing {
        let stub = ListingStub {
            detail_url: url.to_string(),
            ad_id: None,
        };
        self.fetch_stub(&stub).await
    }

    /// Fetch the detail page behind a results-page stub.
    pub async fn fetch_stub(&self, stub: &ListingStub) -> Listing {
        tracing::debug!("Fetching detail page {}", stub.detail_url);
        match self.client.get_page(&stub.detail_url).await {
            Ok(html) => self.parser.parse_detail(&html, stub),
            Err(e) => {
                tracing::warn!("Detail page {} unavailable: {}", stub.detail_url, e);
                Listing::unavailable(stub)
            }
        }
    }
}
