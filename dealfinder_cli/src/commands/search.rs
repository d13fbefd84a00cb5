//! The `search` subcommand: crawls listings for a term and rates each one
//! against the median price of the result set.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Args;
use dealfinder_lib::{
    CancellationToken, CrawlConfig, CrawlEvent, DealFinder, SearchRequest, StopReason,
};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;

use crate::output::{
    format_summary, print_json, print_listings_csv, print_listings_markdown,
    print_listings_table, save_results, OutputFormat,
};

/// Environment variable that replaces the marketplace base URL.
const BASE_URL_ENV: &str = "DEALFINDER_BASE_URL";

#[derive(Args)]
pub struct SearchArgs {
    /// Search term, e.g. "fahrrad"
    pub term: String,

    /// Lower price bound in whole euros
    #[arg(long)]
    pub min_price: Option<String>,

    /// Upper price bound in whole euros
    #[arg(long)]
    pub max_price: Option<String>,

    /// Maximum number of results pages to crawl (1-50)
    #[arg(long, default_value_t = SearchRequest::DEFAULT_MAX_PAGES)]
    pub max_pages: u32,

    /// Directory for the per-term JSON results file
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Skip writing the results file
    #[arg(long)]
    pub no_save: bool,

    /// TOML file with crawl settings
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Marketplace base URL (overrides DEALFINDER_BASE_URL and the config file)
    #[arg(long)]
    pub base_url: Option<String>,
}

pub async fn run(args: &SearchArgs, format: &OutputFormat) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => CrawlConfig::load(path)?,
        None => CrawlConfig::default(),
    };
    if let Some(base_url) = args
        .base_url
        .clone()
        .or_else(|| std::env::var(BASE_URL_ENV).ok())
    {
        config.base_url = base_url;
    }

    let request = SearchRequest::new(
        &args.term,
        args.min_price.as_deref(),
        args.max_price.as_deref(),
        Some(args.max_pages),
    )?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let finder = DealFinder::new(&config)?.with_events(tx);
    let cancel = CancellationToken::new();

    let task = tokio::spawn({
        let cancel = cancel.clone();
        async move { finder.search(&request, cancel).await }
    });

    let spinner = create_spinner(&format!("Searching '{}'...", args.term.trim()))?;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    // The channel closes once the search task drops the finder.
    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Some(event) => update_spinner(&spinner, &event),
                None => break,
            },
            _ = &mut ctrl_c, if !cancel.is_cancelled() => {
                spinner.set_message("Cancelling, finishing current request...");
                cancel.cancel();
            }
        }
    }

    let report = task.await?;
    spinner.finish_and_clear();

    match report.stop {
        StopReason::Cancelled => eprintln!("Search cancelled, showing partial results"),
        StopReason::PageFailed => {
            eprintln!("A results page could not be loaded, showing partial results")
        }
        StopReason::MaxPages | StopReason::EmptyPage => {}
    }

    if report.is_empty() {
        println!("No results for '{}'", report.term);
        return Ok(());
    }

    eprintln!(
        "{}",
        format_summary(report.listings.len(), report.summary.as_ref())
    );

    match format {
        OutputFormat::Table => print_listings_table(&report.listings),
        OutputFormat::Markdown => print_listings_markdown(&report.listings),
        OutputFormat::Csv => print_listings_csv(&report.listings)?,
        OutputFormat::Json => print_json(&report.listings),
    }

    if !args.no_save {
        let path = save_results(&args.out_dir, &report.term, &report.listings)?;
        eprintln!("Saved {} listings to {}", report.listings.len(), path.display());
    }

    Ok(())
}

fn create_spinner(message: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.cyan} {msg}")?,
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

fn update_spinner(pb: &ProgressBar, event: &CrawlEvent) {
    match event {
        CrawlEvent::PageFetched { page, listings } => {
            pb.set_message(format!("Page {}: {} listings found", page, listings));
        }
        CrawlEvent::ListingFetched {
            page,
            index,
            total,
            title,
        } => {
            pb.set_message(format!(
                "Page {}: listing {}/{} {}",
                page,
                index + 1,
                total,
                title
            ));
        }
        CrawlEvent::PageFailed { page, reason } => {
            pb.println(format!("Page {} failed: {}", page, reason));
        }
        CrawlEvent::Finished { listings, stop } => {
            pb.set_message(format!("Done: {} listings ({})", listings, stop));
        }
    }
}
