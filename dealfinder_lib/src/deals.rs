//! Median-relative deal classification.
//!
//! Classification needs the complete collection: the median is computed
//! over every parseable price first, then each listing is rated against
//! thresholds derived from it. Listings without a price are rated but do not
//! contribute to the median.

use serde::{Deserialize, Serialize};

use crate::error::DealFinderError;
use crate::types::{Evaluation, Listing, RatedListing};

/// Multipliers applied to the median to get the rating thresholds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DealThresholds {
    /// At or below `median * good_ratio` is a good deal.
    pub good_ratio: f64,
    /// At or above `median * expensive_ratio` is expensive.
    pub expensive_ratio: f64,
}

impl Default for DealThresholds {
    fn default() -> Self {
        Self {
            good_ratio: 0.8,
            expensive_ratio: 1.5,
        }
    }
}

impl DealThresholds {
    pub fn validate(&self) -> Result<(), DealFinderError> {
        let ordered = self.good_ratio > 0.0 && self.good_ratio < self.expensive_ratio;
        if !ordered || !self.expensive_ratio.is_finite() {
            return Err(DealFinderError::Config(format!(
                "thresholds must satisfy 0 < good_ratio < expensive_ratio (got {} and {})",
                self.good_ratio, self.expensive_ratio
            )));
        }
        Ok(())
    }

    pub fn good_threshold(&self, median: f64) -> f64 {
        median * self.good_ratio
    }

    pub fn expensive_threshold(&self, median: f64) -> f64 {
        median * self.expensive_ratio
    }

    /// Rate one price against thresholds derived from `median`.
    pub fn evaluate(&self, price: Option<f64>, median: f64) -> Evaluation {
        match price {
            None => Evaluation::NoPrice,
            Some(p) if p <= self.good_threshold(median) => Evaluation::GoodDeal,
            Some(p) if p >= self.expensive_threshold(median) => Evaluation::Expensive,
            Some(_) => Evaluation::Average,
        }
    }
}

/// Aggregate view of a classified collection, for display.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DealSummary {
    pub median: f64,
    pub good_threshold: f64,
    pub expensive_threshold: f64,
    pub good_deals: usize,
    pub average: usize,
    pub expensive: usize,
    pub no_price: usize,
}

/// Standard median; the mean of the two middle values for an even count.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Classify with the default 0.8 / 1.5 thresholds.
pub fn classify(listings: Vec<Listing>) -> Vec<RatedListing> {
    classify_with(listings, &DealThresholds::default())
}

/// Rate every listing against the median of all parseable prices.
///
/// If no listing has a price, every listing is `Unknown`.
pub fn classify_with(listings: Vec<Listing>, thresholds: &DealThresholds) -> Vec<RatedListing> {
    let prices: Vec<f64> = listings.iter().filter_map(|l| l.price_value).collect();
    let Some(median) = median(&prices) else {
        return listings
            .into_iter()
            .map(|l| RatedListing::new(l, Evaluation::Unknown))
            .collect();
    };

    tracing::debug!(
        "Classifying {} listings against median {:.2} ({} priced)",
        listings.len(),
        median,
        prices.len()
    );

    listings
        .into_iter()
        .map(|l| {
            let evaluation = thresholds.evaluate(l.price_value, median);
            RatedListing::new(l, evaluation)
        })
        .collect()
}

/// Summary statistics for a classified collection. `None` when no listing
/// has a price.
pub fn summarize(rated: &[RatedListing], thresholds: &DealThresholds) -> Option<DealSummary> {
    let prices: Vec<f64> = rated.iter().filter_map(|r| r.listing().price_value).collect();
    let median = median(&prices)?;
    let count = |e: Evaluation| rated.iter().filter(|r| r.evaluation() == e).count();
    Some(DealSummary {
        median,
        good_threshold: thresholds.good_threshold(median),
        expensive_threshold: thresholds.expensive_threshold(median),
        good_deals: count(Evaluation::GoodDeal),
        average: count(Evaluation::Average),
        expensive: count(Evaluation::Expensive),
        no_price: count(Evaluation::NoPrice),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::normalize_price;
    use crate::types::ListingStub;

    fn listing(price_text: &str) -> Listing {
        let stub = ListingStub {
            detail_url: format!("https://www.kleinanzeigen.de/s-anzeige/{}", price_text.len()),
            ad_id: None,
        };
        let mut l = Listing::unavailable(&stub);
        l.title = format!("Item for {}", price_text);
        l.price_text = price_text.to_string();
        l.price_value = normalize_price(price_text);
        l
    }

    fn evaluations(rated: &[RatedListing]) -> Vec<Evaluation> {
        rated.iter().map(|r| r.evaluation()).collect()
    }

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[100.0, 100.0, 400.0, 1000.0]), Some(250.0));
        assert_eq!(median(&[7.0]), Some(7.0));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn test_classify_empty() {
        assert!(classify(vec![]).is_empty());
    }

    #[test]
    fn test_all_unparseable_is_unknown() {
        let rated = classify(vec![
            listing("zu verschenken"),
            listing("N/A"),
            listing("VB"),
        ]);
        assert_eq!(rated.len(), 3);
        assert!(rated.iter().all(|r| r.evaluation() == Evaluation::Unknown));
        assert!(rated.iter().all(|r| r.evaluation_symbol() == "❔"));
    }

    #[test]
    fn test_median_example() {
        // median 250 -> good <= 200, expensive >= 375
        let rated = classify(vec![
            listing("100 €"),
            listing("100 € VB"),
            listing("400 €"),
            listing("1.000 €"),
        ]);
        assert_eq!(
            evaluations(&rated),
            vec![
                Evaluation::GoodDeal,
                Evaluation::GoodDeal,
                Evaluation::Expensive,
                Evaluation::Expensive,
            ]
        );
    }

    #[test]
    fn test_average_band_and_no_price() {
        // median of [80, 100, 120] is 100 -> good <= 80, expensive >= 150
        let rated = classify(vec![
            listing("80 €"),
            listing("100 €"),
            listing("120 €"),
            listing("Zu verschenken"),
        ]);
        assert_eq!(
            evaluations(&rated),
            vec![
                Evaluation::GoodDeal,
                Evaluation::Average,
                Evaluation::Average,
                Evaluation::NoPrice,
            ]
        );
    }

    #[test]
    fn test_thresholds_are_inclusive() {
        let t = DealThresholds::default();
        assert_eq!(t.evaluate(Some(80.0), 100.0), Evaluation::GoodDeal);
        assert_eq!(t.evaluate(Some(150.0), 100.0), Evaluation::Expensive);
        assert_eq!(t.evaluate(Some(80.01), 100.0), Evaluation::Average);
        assert_eq!(t.evaluate(Some(149.99), 100.0), Evaluation::Average);
        assert_eq!(t.evaluate(None, 100.0), Evaluation::NoPrice);
    }

    #[test]
    fn test_zero_median_prefers_good_deal() {
        // every threshold is 0, so `<=` wins before `>=`
        let rated = classify(vec![listing("0 €"), listing("0 €"), listing("0 €")]);
        assert!(rated.iter().all(|r| r.evaluation() == Evaluation::GoodDeal));
    }

    #[test]
    fn test_threshold_property_over_many_collections() {
        let t = DealThresholds::default();
        for seed in 1u64..40 {
            let prices: Vec<f64> = (0..(seed % 9 + 1))
                .map(|i| ((seed * 37 + i * 113) % 1500) as f64 + 1.0)
                .collect();
            let listings: Vec<Listing> = prices
                .iter()
                .map(|p| {
                    let mut l = listing("x");
                    l.price_value = Some(*p);
                    l
                })
                .collect();
            let m = median(&prices).unwrap();
            for rated in classify(listings) {
                let p = rated.listing().price_value.unwrap();
                let e = rated.evaluation();
                if p <= t.good_threshold(m) || p >= t.expensive_threshold(m) {
                    assert_ne!(e, Evaluation::Average, "price {} median {}", p, m);
                } else {
                    assert_eq!(e, Evaluation::Average, "price {} median {}", p, m);
                }
            }
        }
    }

    #[test]
    fn test_custom_thresholds() {
        let t = DealThresholds {
            good_ratio: 0.5,
            expensive_ratio: 2.0,
        };
        let rated = classify_with(vec![listing("50 €"), listing("100 €"), listing("200 €")], &t);
        assert_eq!(
            evaluations(&rated),
            vec![Evaluation::GoodDeal, Evaluation::Average, Evaluation::Expensive]
        );
    }

    #[test]
    fn test_summary() {
        let t = DealThresholds::default();
        let rated = classify(vec![
            listing("80 €"),
            listing("100 €"),
            listing("120 €"),
            listing("N/A"),
        ]);
        let summary = summarize(&rated, &t).unwrap();
        assert_eq!(summary.median, 100.0);
        assert_eq!(summary.good_threshold, 80.0);
        assert_eq!(summary.expensive_threshold, 150.0);
        assert_eq!(summary.good_deals, 1);
        assert_eq!(summary.average, 2);
        assert_eq!(summary.expensive, 0);
        assert_eq!(summary.no_price, 1);
    }

    #[test]
    fn test_summary_without_prices() {
        let rated = classify(vec![listing("N/A")]);
        assert!(summarize(&rated, &DealThresholds::default()).is_none());
    }

    #[test]
    fn test_validate_thresholds() {
        assert!(DealThresholds::default().validate().is_ok());
        let inverted = DealThresholds {
            good_ratio: 2.0,
            expensive_ratio: 1.0,
        };
        assert!(inverted.validate().is_err());
        let zero = DealThresholds {
            good_ratio: 0.0,
            expensive_ratio: 1.0,
        };
        assert!(zero.validate().is_err());
    }
}
