//! Series command implementation.

use crate::core::series::{self, SeriesStore};
use crate::models::config::Config;
use crate::services::listing::PrehrajtoListing;
use crate::services::prehrajto::PrehrajtoClient;
use anyhow::Result;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

fn store(config: &Config) -> SeriesStore {
    SeriesStore::new(config.paths.series_dir(), config.paths.watched_dir())
}

/// Scan the video site for a series and store what was found.
pub async fn scan(config: &Config, name: &str) -> Result<()> {
    let client = PrehrajtoClient::new(&config.site)?;
    client.ensure_premium(&config.site).await;

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(format!("Scanning for {}...", name));
    pb.enable_steady_tick(Duration::from_millis(120));

    let result = series::scan_series(&client, &PrehrajtoListing, &store(config), name).await;
    pb.finish_and_clear();
    let data = result?;

    if data.seasons.is_empty() {
        println!("{} No episodes of '{}' found", "!".yellow(), name);
        return Ok(());
    }
    println!(
        "{} {}: {} episode(s) in {} season(s)",
        "✓".green(),
        data.name.bold(),
        data.episode_count(),
        data.seasons.len()
    );
    println!("Show them with: playto series show \"{}\"", name);
    Ok(())
}

/// List stored series.
pub fn list(config: &Config) -> Result<()> {
    println!("{}", "📺 Series".bold().cyan());
    println!();

    let store = store(config);
    let entries = store.list()?;
    if entries.is_empty() {
        println!("No series yet. Scan one with: playto series scan <NAME>");
        return Ok(());
    }
    for entry in &entries {
        match store.load(&entry.name)? {
            Some(data) => println!(
                "  {}  ({} season(s), {} episode(s), updated {})",
                entry.name.bold(),
                data.seasons.len(),
                data.episode_count(),
                data.last_updated
            ),
            None => println!("  {}  {}", entry.name.bold(), "(unreadable)".red()),
        }
    }
    Ok(())
}

/// Show stored episodes with watched marks.
pub fn show(config: &Config, name: &str, format: &str) -> Result<()> {
    let store = store(config);
    let Some(data) = store.load(name)? else {
        anyhow::bail!("Series '{}' is not stored, run `playto series scan` first", name);
    };

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    println!(
        "{} {} (updated {})",
        "📺".cyan(),
        data.name.bold(),
        data.last_updated
    );
    for (season, episodes) in &data.seasons {
        println!();
        println!("{}", format!("Season {}", season).as_str().bold());
        for (episode, ep) in episodes {
            let mark = if store.is_watched(name, *season, *episode)? {
                "[x]".green()
            } else {
                "[ ]".normal()
            };
            println!(
                "  {} S{:02}E{:02}  {:<7}  {:<8}  {}",
                mark,
                season,
                episode,
                ep.quality.as_str(),
                ep.size,
                ep.name
            );
            println!("                {}", ep.ident.dimmed());
        }
    }
    Ok(())
}

/// Set or clear an episode's watched mark.
pub fn set_watched(config: &Config, name: &str, season: u32, episode: u32, watched: bool) -> Result<()> {
    let store = store(config);
    if watched {
        store.mark_watched(name, season, episode)?;
        println!("{} {} S{:02}E{:02} watched", "✓".green(), name, season, episode);
    } else {
        store.mark_unwatched(name, season, episode)?;
        println!("{} {} S{:02}E{:02} unwatched", "✓".green(), name, season, episode);
    }
    Ok(())
}

/// Remove a series, a season or an episode.
pub fn remove(config: &Config, name: &str, season: Option<u32>, episode: Option<u32>) -> Result<()> {
    let store = store(config);
    let (removed, what) = match (season, episode) {
        (Some(s), Some(e)) => (store.delete_episode(name, s, e)?, format!("{} S{:02}E{:02}", name, s, e)),
        (Some(s), None) => (store.delete_season(name, s)?, format!("{} season {}", name, s)),
        _ => (store.delete_series(name)?, name.to_string()),
    };

    if removed {
        println!("{} Removed {}", "✓".green(), what);
    } else {
        println!("{} {} is not stored", "!".yellow(), what);
    }
    Ok(())
}
