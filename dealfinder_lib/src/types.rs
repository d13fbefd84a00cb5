//! Listing types for each pipeline stage.
//!
//! A listing moves through three shapes: a [`ListingStub`] from the results
//! page, a [`Listing`] once its detail page has been read, and a
//! [`RatedListing`] once the whole collection has been classified. Only the
//! classifier can build a `RatedListing`, so a listing cannot be rated twice
//! or rated before every price is known.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fallback for any text field that could not be extracted.
pub const NOT_AVAILABLE: &str = "N/A";

/// A listing card from a search-results page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingStub {
    /// Absolute URL of the detail page.
    pub detail_url: String,
    /// Marketplace ad id from the card's `data-adid` attribute.
    pub ad_id: Option<String>,
}

/// A listing enriched with detail-page data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub title: String,
    /// Price exactly as shown, e.g. `"1.234 € VB"`.
    pub price_text: String,
    /// Numeric price derived from `price_text`; `None` for giveaways and
    /// unparseable prices.
    pub price_value: Option<f64>,
    pub description: String,
    pub detail_url: String,
    pub ad_id: Option<String>,
    pub fetched_at: DateTime<Utc>,
}

impl Listing {
    /// A listing whose detail page could not be read: every text field holds
    /// the sentinel.
    pub fn unavailable(stub: &ListingStub) -> Self {
        Self {
            title: NOT_AVAILABLE.to_string(),
            price_text: NOT_AVAILABLE.to_string(),
            price_value: None,
            description: NOT_AVAILABLE.to_string(),
            detail_url: stub.detail_url.clone(),
            ad_id: stub.ad_id.clone(),
            fetched_at: Utc::now(),
        }
    }
}

/// Deal rating relative to the median price of the collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Evaluation {
    GoodDeal,
    Average,
    Expensive,
    /// This listing has no usable price.
    NoPrice,
    /// No listing in the collection has a usable price.
    Unknown,
}

impl Evaluation {
    pub const ALL: [Evaluation; 5] = [
        Evaluation::GoodDeal,
        Evaluation::Average,
        Evaluation::Expensive,
        Evaluation::NoPrice,
        Evaluation::Unknown,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            Evaluation::GoodDeal => "🟢",
            Evaluation::Average => "🟡",
            Evaluation::Expensive => "🔴",
            Evaluation::NoPrice => "⚪",
            Evaluation::Unknown => "❔",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Evaluation::GoodDeal => "Good deal",
            Evaluation::Average => "Average",
            Evaluation::Expensive => "Expensive",
            Evaluation::NoPrice => "No price",
            Evaluation::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for Evaluation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A classified listing. Serializes flat: the listing fields followed by
/// `evaluation` and `evaluation_symbol`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RatedListing {
    #[serde(flatten)]
    listing: Listing,
    evaluation: Evaluation,
    evaluation_symbol: &'static str,
}

impl RatedListing {
    pub(crate) fn new(listing: Listing, evaluation: Evaluation) -> Self {
        Self {
            listing,
            evaluation,
            evaluation_symbol: evaluation.symbol(),
        }
    }

    pub fn listing(&self) -> &Listing {
        &self.listing
    }

    pub fn evaluation(&self) -> Evaluation {
        self.evaluation
    }

    pub fn evaluation_symbol(&self) -> &'static str {
        self.evaluation_symbol
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stub() -> ListingStub {
        ListingStub {
            detail_url: "https://www.kleinanzeigen.de/s-anzeige/rad/1".to_string(),
            ad_id: Some("1".to_string()),
        }
    }

    #[test]
    fn test_unavailable_uses_sentinels() {
        let listing = Listing::unavailable(&stub());
        assert_eq!(listing.title, NOT_AVAILABLE);
        assert_eq!(listing.price_text, NOT_AVAILABLE);
        assert_eq!(listing.description, NOT_AVAILABLE);
        assert_eq!(listing.price_value, None);
        assert_eq!(listing.detail_url, stub().detail_url);
    }

    #[test]
    fn test_symbols_are_distinct() {
        let mut symbols: Vec<&str> = Evaluation::ALL.iter().map(|e| e.symbol()).collect();
        symbols.sort();
        symbols.dedup();
        assert_eq!(symbols.len(), Evaluation::ALL.len());
    }

    #[test]
    fn test_rated_listing_serializes_flat() {
        let rated = RatedListing::new(Listing::unavailable(&stub()), Evaluation::NoPrice);
        let value = serde_json::to_value(&rated).unwrap();
        assert_eq!(value["title"], "N/A");
        assert_eq!(value["evaluation"], "no_price");
        assert_eq!(value["evaluation_symbol"], "⚪");
        assert!(value["price_value"].is_null());
        assert!(value.get("listing").is_none());
    }

    #[test]
    fn test_serialization_preserves_umlauts() {
        let mut listing = Listing::unavailable(&stub());
        listing.title = "Damenrad für Größe M".to_string();
        let json = serde_json::to_string(&RatedListing::new(listing, Evaluation::Unknown)).unwrap();
        assert!(json.contains("Damenrad für Größe M"));
    }
}
