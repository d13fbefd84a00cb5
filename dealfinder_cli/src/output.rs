use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dealfinder_lib::{format_price, DealSummary, RatedListing};
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
    Markdown,
}

#[derive(Tabled, Serialize)]
struct ListingRow {
    #[tabled(rename = "Symbol")]
    #[serde(rename = "Symbol")]
    symbol: String,
    #[tabled(rename = "Title")]
    #[serde(rename = "Title")]
    title: String,
    #[tabled(rename = "Price")]
    #[serde(rename = "Price")]
    price: String,
    #[tabled(rename = "Rating")]
    #[serde(rename = "Rating")]
    rating: String,
    #[tabled(rename = "URL")]
    #[serde(rename = "URL")]
    url: String,
}

fn build_listing_rows(listings: &[RatedListing]) -> Vec<ListingRow> {
    listings
        .iter()
        .map(|rated| {
            let listing = rated.listing();
            ListingRow {
                symbol: rated.evaluation_symbol().to_string(),
                title: truncate(&listing.title, 60),
                price: listing.price_text.clone(),
                rating: rated.evaluation().label().to_string(),
                url: listing.detail_url.clone(),
            }
        })
        .collect()
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}

pub fn print_listings_table(listings: &[RatedListing]) {
    let rows = build_listing_rows(listings);
    let table = Table::new(rows).to_string();
    println!("{}", table);
}

pub fn print_listings_markdown(listings: &[RatedListing]) {
    let rows = build_listing_rows(listings);
    let mut table = Table::new(rows);
    table.with(Style::markdown());
    println!("{}", table);
}

pub fn print_listings_csv(listings: &[RatedListing]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(std::io::stdout());
    for row in build_listing_rows(listings) {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn print_json<T: serde::Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}

/// One-line recap for stderr: count, median and the two thresholds.
pub fn format_summary(count: usize, summary: Option<&DealSummary>) -> String {
    match summary {
        Some(s) => format!(
            "{} listings | median {} | good <= {} | expensive >= {} | {} good, {} average, {} expensive, {} without price",
            count,
            format_price(s.median),
            format_price(s.good_threshold),
            format_price(s.expensive_threshold),
            s.good_deals,
            s.average,
            s.expensive,
            s.no_price,
        ),
        None => format!("{} listings | no usable prices", count),
    }
}

/// File name for a term's results: lowercased, non-alphanumerics as `_`.
pub fn results_file_name(term: &str) -> String {
    let slug: String = term
        .trim()
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    format!("{}.json", slug)
}

/// Write the rated listings as pretty JSON into `dir`, returning the path.
pub fn save_results(dir: &Path, term: &str, listings: &[RatedListing]) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;
    let path = dir.join(results_file_name(term));
    let json = serde_json::to_string_pretty(listings)?;
    std::fs::write(&path, json)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dealfinder_lib::{classify, Evaluation, Listing, ListingStub};

    fn listing(title: &str, price_text: &str, price_value: Option<f64>) -> Listing {
        let stub = ListingStub {
            detail_url: format!("https://www.kleinanzeigen.de/s-anzeige/{}", title.to_lowercase()),
            ad_id: None,
        };
        let mut listing = Listing::unavailable(&stub);
        listing.title = title.to_string();
        listing.price_text = price_text.to_string();
        listing.price_value = price_value;
        listing
    }

    fn sample() -> Vec<RatedListing> {
        classify(vec![
            listing("Stadtrad", "100 €", Some(100.0)),
            listing("Rennrad", "250 € VB", Some(250.0)),
            listing("Lastenrad", "1.000 €", Some(1000.0)),
            listing("Kinderrad", "Zu verschenken", None),
        ])
    }

    #[test]
    fn test_build_listing_rows_mapping() {
        let rows = build_listing_rows(&sample());
        assert_eq!(rows.len(), 4);

        let row = &rows[0];
        assert_eq!(row.symbol, Evaluation::GoodDeal.symbol());
        assert_eq!(row.title, "Stadtrad");
        assert_eq!(row.price, "100 €");
        assert_eq!(row.rating, Evaluation::GoodDeal.label());
        assert_eq!(row.url, "https://www.kleinanzeigen.de/s-anzeige/stadtrad");

        assert_eq!(rows[2].rating, Evaluation::Expensive.label());
        assert_eq!(rows[3].rating, Evaluation::NoPrice.label());
    }

    #[test]
    fn test_build_listing_rows_empty() {
        assert!(build_listing_rows(&[]).is_empty());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("kurz", 10), "kurz");
        assert_eq!(truncate("Trekkingrad 28 Zoll", 10), "Trekkin...");
        assert_eq!(truncate("Größe ÄÖÜ äöü", 8), "Größe...");
    }

    #[test]
    fn test_markdown_table_has_pipes() {
        let mut table = Table::new(build_listing_rows(&sample()));
        table.with(Style::markdown());
        let rendered = table.to_string();
        assert!(rendered.starts_with("| Symbol"));
        assert!(rendered.contains("| Rennrad"));
    }

    #[test]
    fn test_csv_headers() {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        for row in build_listing_rows(&sample()) {
            wtr.serialize(row).unwrap();
        }
        let data = String::from_utf8(wtr.into_inner().unwrap()).unwrap();
        let first = data.lines().next().unwrap();
        assert_eq!(first, "Symbol,Title,Price,Rating,URL");
        assert_eq!(data.lines().count(), 5);
    }

    #[test]
    fn test_format_summary() {
        let listings = sample();
        let summary = dealfinder_lib::summarize(&listings, &Default::default()).unwrap();
        let line = format_summary(listings.len(), Some(&summary));
        assert!(line.starts_with("4 listings | median 250 €"));
        assert!(line.contains("good <= 200 €"));
        assert!(line.contains("expensive >= 375 €"));
        assert!(line.ends_with("1 good, 1 average, 1 expensive, 1 without price"));
    }

    #[test]
    fn test_format_summary_without_prices() {
        assert_eq!(format_summary(2, None), "2 listings | no usable prices");
    }

    #[test]
    fn test_results_file_name() {
        assert_eq!(results_file_name("fahrrad"), "fahrrad.json");
        assert_eq!(results_file_name("E-Bike 28\""), "e_bike_28_.json");
        assert_eq!(results_file_name("Kühlschrank"), "kühlschrank.json");
    }

    #[test]
    fn test_save_results_writes_pretty_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = save_results(dir.path(), "Kühlschrank", &sample()).unwrap();
        assert_eq!(path.file_name().unwrap(), "kühlschrank.json");

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\n  {"));
        assert!(text.contains("Zu verschenken"));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 4);
        assert_eq!(value[0]["evaluation"], "good_deal");
    }
}
