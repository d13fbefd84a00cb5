//! Search-results URL builder.
//!
//! The marketplace encodes filters as path segments rather than query
//! parameters:
//!
//! - `s-seite:<page>/<term>/k0` without a price filter
//! - `s-preis:<min>:<max>/seite:<page>/<term>/k0` when either bound is set,
//!   with the absent bound left blank

use url::{form_urlencoded, Url};

/// A single search-results page request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchQuery {
    /// Free-text search term. Whitespace runs become `+` in the URL.
    pub term: String,
    /// Lower price bound in whole euros.
    pub min_price: Option<u32>,
    /// Upper price bound in whole euros.
    pub max_price: Option<u32>,
    /// Page number (1-indexed). Defaults to 1.
    pub page: u32,
}

impl SearchQuery {
    pub fn new(term: &str) -> Self {
        Self {
            term: term.to_string(),
            min_price: None,
            max_price: None,
            page: 1,
        }
    }

    /// Sets the page number (1-indexed).
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn with_min_price(mut self, min_price: u32) -> Self {
        self.min_price = Some(min_price);
        self
    }

    pub fn with_max_price(mut self, max_price: u32) -> Self {
        self.max_price = Some(max_price);
        self
    }

    /// Sets both bounds at once; `None` clears a bound.
    pub fn with_price_range(mut self, min_price: Option<u32>, max_price: Option<u32>) -> Self {
        self.min_price = min_price;
        self.max_price = max_price;
        self
    }

    pub fn has_price_filter(&self) -> bool {
        self.min_price.is_some() || self.max_price.is_some()
    }

    /// The search term as it appears in the path: whitespace collapsed to
    /// `+`, everything else form-urlencoded.
    pub fn encoded_term(&self) -> String {
        let joined = self.term.split_whitespace().collect::<Vec<_>>().join(" ");
        form_urlencoded::byte_serialize(joined.as_bytes()).collect()
    }

    /// Path relative to the marketplace root, without a leading slash.
    pub fn path(&self) -> String {
        let term = self.encoded_term();
        if self.has_price_filter() {
            let min = self.min_price.map(|p| p.to_string()).unwrap_or_default();
            let max = self.max_price.map(|p| p.to_string()).unwrap_or_default();
            format!("s-preis:{}:{}/seite:{}/{}/k0", min, max, self.page, term)
        } else {
            format!("s-seite:{}/{}/k0", self.page, term)
        }
    }

    /// Appends this query's path to the given base URL, returning the full URL.
    pub fn add_to_url(&self, url: &Url) -> Url {
        let mut url = url.clone();
        let base_path = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{}/{}", base_path, self.path()));
        url.set_query(None);
        url
    }
}
