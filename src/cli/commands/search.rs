//! Search, sources and normalize commands.

use crate::core::normalizer;
use crate::core::search::{SearchOptions, SearchService};
use crate::models::candidate::{CandidateResult, Quality};
use crate::models::config::{Config, SearchConfig};
use crate::models::meta::{MediaKind, MediaMeta};
use anyhow::Result;
use colored::Colorize;

/// Execute search command.
pub async fn execute_search(
    config: Config,
    query: &str,
    pick: Option<usize>,
    no_meta: bool,
    no_history: bool,
    format: &str,
) -> Result<()> {
    let display_limit = config.search.display_limit;
    let search_config = config.search.clone();
    let service = SearchService::new(config)?;

    let options = SearchOptions {
        pick,
        lookup_metadata: !no_meta,
        record_history: !no_history,
    };
    let mut outcome = service.search(query, options).await?;
    outcome.candidates.truncate(display_limit);

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    println!("{} {}", "🔍 Search:".bold().cyan(), outcome.site_query);
    println!();

    match &outcome.metadata {
        Some(meta) => print_meta(meta),
        None if !outcome.choices.is_empty() => {
            println!("{}", "Several TMDB matches, pick one with --pick N:".yellow());
            for (i, choice) in outcome.choices.iter().enumerate() {
                println!("  {}. {}", i, choice);
            }
            println!();
        }
        None if !no_meta => {
            println!("{}", "Metadata not found: direct play".yellow());
            println!();
        }
        None => {}
    }

    if outcome.interrupted {
        println!("{}", "Search was cut short by a network error.".red());
    }
    print_candidates(&outcome.candidates, &search_config);

    Ok(())
}

/// Execute sources command.
pub async fn find_sources(
    config: Config,
    title: &str,
    year: Option<String>,
    show: Option<String>,
    season: Option<u32>,
    episode: Option<u32>,
    format: &str,
) -> Result<()> {
    let display_limit = config.search.display_limit;
    let search_config = config.search.clone();
    let service = SearchService::new(config)?;

    let meta = match show {
        Some(show) => MediaMeta {
            title: title.to_string(),
            year,
            media_type: MediaKind::Episode,
            tv_show_title: Some(show),
            season,
            episode,
            ..Default::default()
        },
        None => MediaMeta {
            year,
            ..MediaMeta::bare(title)
        },
    };

    let (site_query, mut candidates) = service.find_sources(&meta).await;
    candidates.truncate(display_limit);

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&candidates)?);
        return Ok(());
    }

    println!("{} {}", "🔍 Sources:".bold().cyan(), site_query);
    println!();
    print_candidates(&candidates, &search_config);
    Ok(())
}

/// Execute normalize command.
pub fn normalize(query: &str) -> Result<()> {
    let token = normalizer::normalize(query);
    println!("{}", serde_json::to_string_pretty(&token)?);
    Ok(())
}

fn print_meta(meta: &MediaMeta) {
    let heading = match (meta.media_type, meta.tv_show_title.as_deref()) {
        (MediaKind::Episode, Some(show)) => format!(
            "{} S{:02}E{:02} - {}",
            show,
            meta.season.unwrap_or(0),
            meta.episode.unwrap_or(0),
            meta.title
        ),
        _ => format!("{} ({})", meta.title, meta.year.as_deref().unwrap_or("?")),
    };
    println!("{} {}", "Metadata:".bold(), heading.green());
    if let Some(id) = meta.tmdb_id {
        println!("  {} {} ({})", "TMDB:".bold(), id, meta.media_type);
    }
    if let Some(rating) = meta.rating {
        println!("  {} {:.1}", "Rating:".bold(), rating);
    }
    if !meta.plot.is_empty() {
        println!("  {} {}", "Plot:".bold(), meta.plot);
    }
    println!();
}

/// Print ranked candidates, one per line.
pub fn print_candidates(candidates: &[CandidateResult], config: &SearchConfig) {
    if candidates.is_empty() {
        println!("No results found.");
        return;
    }

    for (i, candidate) in candidates.iter().enumerate() {
        let quality = match candidate.quality {
            Quality::Unknown => String::new(),
            q => format!("[{}] ", q),
        };
        let dub = if candidate.is_dubbed { " CZ".green().to_string() } else { String::new() };
        println!(
            "{:>3}. {}{}{}",
            i + 1,
            quality.cyan(),
            candidate.label(config.show_size, config.show_duration),
            dub
        );
        println!("     {}", candidate.link.dimmed());
    }

    println!();
    println!("{} result(s)", candidates.len());
}
