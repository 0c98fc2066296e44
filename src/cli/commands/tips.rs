//! Daily tips command implementation.

use super::search::execute_search;
use crate::core::cache::JsonCache;
use crate::core::tips::TipsService;
use crate::models::config::Config;
use crate::services::csfd::CsfdClient;
use crate::services::tmdb::TmdbClient;
use anyhow::Result;
use colored::Colorize;

fn service(config: &Config) -> Result<TipsService> {
    let tmdb = TmdbClient::from_config(&config.tmdb).ok();
    if tmdb.is_none() {
        tracing::debug!("No TMDB key, tips will have no artwork");
    }
    Ok(TipsService::new(
        CsfdClient::new()?,
        tmdb,
        JsonCache::new(config.paths.cache_dir()),
    ))
}

/// List today's tips.
pub async fn list(config: &Config, refresh: bool, format: &str) -> Result<()> {
    let tips = service(config)?.daily_tips(refresh).await?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&tips)?);
        return Ok(());
    }

    println!("{}", "📺 TV tips".bold().cyan());
    println!();

    if tips.is_empty() {
        println!("No tips found.");
        return Ok(());
    }

    for tip in &tips {
        let detail = &tip.detail;
        println!(
            "{:<8} {:<6} {} ({})  {}",
            tip.id.dimmed(),
            tip.time.as_deref().unwrap_or("--:--"),
            detail.title.as_deref().unwrap_or("?").bold(),
            detail.year.as_deref().unwrap_or("?"),
            tip.channel.as_deref().unwrap_or("").cyan()
        );
        let mut info = Vec::new();
        if let Some(rating) = &detail.rating {
            info.push(rating.clone());
        }
        if !detail.genres.is_empty() {
            info.push(detail.genres.join(" / "));
        }
        if !info.is_empty() {
            println!("{:<15} {}", "", info.join("  ·  "));
        }
    }

    println!();
    println!("Search one with: playto tips select <ID>");
    Ok(())
}

/// Search the video site for one tip.
pub async fn select(config: Config, id: &str, format: &str) -> Result<()> {
    let query = service(&config)?.select(id).await?;
    tracing::info!("Tip {} -> '{}'", id, query);
    execute_search(config, &query, None, false, false, format).await
}
