//! Resolve, library and download commands.

use crate::core::history::PlaybackHistory;
use crate::core::library;
use crate::models::config::Config;
use crate::models::meta::MediaMeta;
use crate::services::listing::absolute_url;
use crate::services::prehrajto::PrehrajtoClient;
use anyhow::Result;
use colored::Colorize;
use std::path::Path;

/// Resolve a video page and print its stream URL.
pub async fn resolve(config: &Config, link: &str, title: Option<&str>, format: &str) -> Result<()> {
    let client = PrehrajtoClient::new(&config.site)?;
    client.ensure_premium(&config.site).await;

    let resolved = client.resolve(link).await?;

    if let Some(title) = title {
        let history = PlaybackHistory::new(
            config.paths.playback_file(),
            config.history.playback_limit,
        );
        let page_url = absolute_url(client.base_url(), link);
        history.record(MediaMeta::bare(title), &page_url)?;
    }

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&resolved)?);
        return Ok(());
    }

    println!("{} {}", "Stream:".bold(), resolved.stream_url);
    if let Some(subtitle) = &resolved.subtitle_url {
        println!("{} {}", "Subtitles:".bold(), subtitle);
    }
    if client.is_premium() {
        println!("{}", "(premium link)".green());
    }
    Ok(())
}

/// Save a `.strm` entry for a video page.
pub fn add_to_library(config: &Config, link: &str, name: Option<&str>) -> Result<()> {
    let link = absolute_url(&config.site.base_url, link);
    let name = match name {
        Some(name) => name.to_string(),
        None => library::suggested_name(&link),
    };

    let path = library::write_strm(&config.paths.library_dir(), &name, &link)?;
    println!("{} Saved {}", "✓".green(), path.display());
    Ok(())
}

/// Download a video into the download directory.
pub async fn download(config: &Config, link: &str, output: Option<&Path>) -> Result<()> {
    let client = PrehrajtoClient::new(&config.site)?;
    if client.ensure_premium(&config.site).await {
        tracing::info!("Using premium download");
    }

    let out_dir = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.paths.download_dir());
    let downloaded = library::download(&client, link, &out_dir, true).await?;

    println!(
        "{} Downloaded {} ({})",
        "✓".green(),
        downloaded.file.display(),
        crate::utils::text::format_size(downloaded.bytes)
    );
    if let Some(subtitle) = downloaded.subtitle {
        println!("{} Subtitles {}", "✓".green(), subtitle.display());
    }
    Ok(())
}
