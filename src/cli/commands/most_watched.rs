//! Most-watched command implementation.

use super::search::print_candidates;
use crate::core::cache::JsonCache;
use crate::core::most_watched::{ListingSource, MostWatchedService};
use crate::models::config::{Config, MostWatchedCategory};
use crate::services::prehrajto::PrehrajtoClient;
use anyhow::Result;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

/// Execute most-watched command.
pub async fn most_watched(
    config: &Config,
    category: Option<&str>,
    pages: Option<u32>,
    refresh: bool,
    format: &str,
) -> Result<()> {
    let mut mw_config = config.most_watched.clone();
    if let Some(category) = category {
        mw_config.category = category.parse::<MostWatchedCategory>()?;
    }
    if let Some(pages) = pages {
        mw_config.max_pages = pages;
    }
    let max_pages = mw_config.max_pages.max(1);

    let client = PrehrajtoClient::new(&config.site)?;
    let cache = JsonCache::new(config.paths.cache_dir());
    let service = MostWatchedService::new(&client, cache, mw_config);

    let pb = if format == "json" {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(max_pages as u64)
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░"),
    );
    let listing = service
        .load(refresh, |page| {
            pb.set_position(page.saturating_sub(1) as u64);
            pb.set_message(format!("page {}", page));
        })
        .await;
    pb.finish_and_clear();

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&listing.items)?);
        return Ok(());
    }

    let source = match listing.source {
        ListingSource::Cache => "cached",
        ListingSource::Site => "live",
    };
    println!(
        "{} {} ({})",
        "📺 Most watched:".bold().cyan(),
        listing.category.as_str(),
        source
    );
    println!();

    if listing.interrupted {
        println!("{}", "Listing is incomplete: a page failed to load.".red());
    }
    print_candidates(&listing.items, &config.search);

    Ok(())
}
