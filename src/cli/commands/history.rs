//! History command implementation.

use crate::core::history::{PlaybackHistory, PlaybackTarget, SearchHistory};
use crate::models::config::Config;
use crate::models::meta::{MediaKind, MediaMeta};
use crate::Result;
use colored::Colorize;

fn search_history(config: &Config) -> SearchHistory {
    SearchHistory::new(config.paths.search_history_file(), config.history.search_limit)
}

fn playback_history(config: &Config) -> PlaybackHistory {
    PlaybackHistory::new(config.paths.playback_file(), config.history.playback_limit)
}

/// List recent search queries.
pub fn list_searches(config: &Config) -> Result<()> {
    println!("{}", "🕘 Search history".bold().cyan());
    println!();

    let queries = search_history(config).list()?;
    if queries.is_empty() {
        println!("No searches yet.");
        return Ok(());
    }
    for (i, query) in queries.iter().enumerate() {
        println!("{:>3}. {}", i + 1, query);
    }
    Ok(())
}

/// Remove one search query.
pub fn remove_search(config: &Config, query: &str) -> Result<()> {
    if search_history(config).remove(query)? {
        println!("{} Removed '{}'", "✓".green(), query);
    } else {
        println!("{} '{}' is not in search history", "!".yellow(), query);
    }
    Ok(())
}

/// Clear search history.
pub fn clear_searches(config: &Config) -> Result<()> {
    search_history(config).clear()?;
    println!("{} Search history cleared", "✓".green());
    Ok(())
}

/// List played shows and movies.
pub fn list_playback(config: &Config) -> Result<()> {
    println!("{}", "▶ Playback history".bold().cyan());
    println!();

    let listing = playback_history(config).listing()?;
    if listing.shows.is_empty() && listing.movies.is_empty() {
        println!("Nothing played yet.");
        return Ok(());
    }

    if !listing.shows.is_empty() {
        println!("{}", "Shows:".bold());
        for (show, episodes) in &listing.shows {
            println!("  {} ({} episode(s))", show, episodes.len());
        }
        println!();
    }
    if !listing.movies.is_empty() {
        println!("{}", "Movies:".bold());
        for movie in &listing.movies {
            println!("  {}", movie.label());
            println!("    {}", movie.link.dimmed());
        }
    }
    Ok(())
}

/// List played episodes of one show.
pub fn show_playback(config: &Config, show: &str) -> Result<()> {
    println!("{} {}", "▶ Episodes of".bold().cyan(), show.bold());
    println!();

    let episodes = playback_history(config).show_episodes(show)?;
    if episodes.is_empty() {
        println!("No episodes of '{}' played.", show);
        return Ok(());
    }
    for entry in &episodes {
        println!("  {}", entry.label());
        println!("    {}", entry.link.dimmed());
    }
    Ok(())
}

/// Record a played item.
#[allow(clippy::too_many_arguments)]
pub fn add_playback(
    config: &Config,
    link: &str,
    title: &str,
    year: Option<String>,
    tmdb_id: Option<u64>,
    show: Option<String>,
    season: Option<u32>,
    episode: Option<u32>,
) -> Result<()> {
    let media_type = if show.is_some() {
        MediaKind::Episode
    } else {
        MediaKind::Movie
    };
    let meta = MediaMeta {
        tmdb_id,
        title: title.to_string(),
        year,
        media_type,
        tv_show_title: show,
        season,
        episode,
        ..Default::default()
    };
    playback_history(config).record(meta, link)?;
    println!("{} Recorded '{}'", "✓".green(), title);
    Ok(())
}

/// Remove a show, an episode or a movie.
pub fn remove_playback(
    config: &Config,
    show: Option<String>,
    season: Option<u32>,
    episode: Option<u32>,
    movie: Option<String>,
) -> Result<()> {
    let target = match (show, season, episode, movie) {
        (Some(show), Some(season), Some(episode), _) => PlaybackTarget::Episode {
            show,
            season,
            episode,
        },
        (Some(show), _, _, _) => PlaybackTarget::Show(show),
        (None, _, _, Some(movie)) => PlaybackTarget::Movie(movie),
        _ => {
            return Err(crate::Error::InvalidConfig(
                "give --show (with optional --season/--episode) or --movie".to_string(),
            ))
        }
    };

    let removed = playback_history(config).remove(&target)?;
    println!("{} Removed {} entr{}", "✓".green(), removed, if removed == 1 { "y" } else { "ies" });
    Ok(())
}

/// Clear playback history.
pub fn clear_playback(config: &Config) -> Result<()> {
    playback_history(config).clear()?;
    println!("{} Playback history cleared", "✓".green());
    Ok(())
}
