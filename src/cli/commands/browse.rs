//! Browse and show commands.

use crate::cli::args::BrowseKind;
use crate::core::browse::{browse_years, BrowseService};
use crate::core::cache::JsonCache;
use crate::models::config::Config;
use crate::services::tmdb::{BrowseList, BrowseMedia, TmdbClient};
use anyhow::Result;
use colored::Colorize;

fn service(config: &Config) -> Result<BrowseService> {
    let tmdb = TmdbClient::from_config(&config.tmdb)?;
    Ok(BrowseService::new(
        tmdb,
        JsonCache::new(config.paths.cache_dir()),
        config.tmdb.cache_ttl_hours,
    ))
}

fn heading(kind: BrowseKind) -> &'static str {
    match kind {
        BrowseKind::Trending => "Trending",
        BrowseKind::Discover => "Popular",
        BrowseKind::TopRated => "Top rated",
        BrowseKind::NowPlaying => "Now playing",
        BrowseKind::Upcoming => "Upcoming",
        BrowseKind::AiringToday => "Airing today",
        BrowseKind::OnTheAir => "On the air",
        BrowseKind::Genre => "Genre",
        BrowseKind::Year => "Year",
    }
}

/// Execute browse command.
#[allow(clippy::too_many_arguments)]
pub async fn browse(
    config: &Config,
    kind: BrowseKind,
    media: BrowseMedia,
    genre: Option<u32>,
    year: Option<u32>,
    page: u32,
    refresh: bool,
    format: &str,
) -> Result<()> {
    let service = service(config)?;

    let list = match kind {
        BrowseKind::Trending => BrowseList::Trending,
        BrowseKind::Discover => BrowseList::Discover,
        BrowseKind::TopRated => BrowseList::TopRated,
        BrowseKind::NowPlaying => BrowseList::NowPlaying,
        BrowseKind::Upcoming => BrowseList::Upcoming,
        BrowseKind::AiringToday => BrowseList::AiringToday,
        BrowseKind::OnTheAir => BrowseList::OnTheAir,
        BrowseKind::Genre => match genre {
            Some(id) => BrowseList::Genre(id),
            None => return list_genres(&service, media, format).await,
        },
        BrowseKind::Year => match year {
            Some(year) => BrowseList::Year(year),
            None => return list_years(media, format),
        },
    };

    let listing = service.list(list, media, page, refresh).await?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    println!(
        "{} ({}), page {}/{}",
        format!("🎬 {}", heading(kind)).as_str().bold().cyan(),
        media.as_str(),
        listing.page,
        listing.total_pages.max(listing.page)
    );
    println!();

    if listing.results.is_empty() {
        println!("Nothing found.");
        return Ok(());
    }
    for item in &listing.results {
        let rating = item
            .vote_average
            .map(|r| format!("★ {:.1}", r))
            .unwrap_or_default();
        println!("{:>8}  {}  {}", item.id.to_string().dimmed(), item.label(), rating.yellow());
    }

    println!();
    match media {
        BrowseMedia::Movie => println!("Find sources with: playto sources -t <TITLE> -y <YEAR>"),
        BrowseMedia::Tv => println!("List seasons with: playto show <TMDB_ID>"),
    }
    Ok(())
}

async fn list_genres(service: &BrowseService, media: BrowseMedia, format: &str) -> Result<()> {
    let genres = service.genres(media).await?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&genres)?);
        return Ok(());
    }

    println!("{} ({})", "🎭 Genres".bold().cyan(), media.as_str());
    println!();
    for genre in &genres {
        println!("{:>6}  {}", genre.id.to_string().dimmed(), genre.name);
    }
    println!();
    println!(
        "Browse one with: playto browse genre --type {} --genre <ID>",
        media.as_str()
    );
    Ok(())
}

fn list_years(media: BrowseMedia, format: &str) -> Result<()> {
    let years = browse_years();

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&years)?);
        return Ok(());
    }

    println!("{} ({})", "📅 Years".bold().cyan(), media.as_str());
    println!();
    for row in years.chunks(10) {
        let row: Vec<String> = row.iter().map(|y| y.to_string()).collect();
        println!("  {}", row.join("  "));
    }
    println!();
    println!(
        "Browse one with: playto browse year --type {} --year <YEAR>",
        media.as_str()
    );
    Ok(())
}

/// Execute show command: seasons of a show, or episodes of one season.
pub async fn show(config: &Config, tmdb_id: u64, season: Option<u32>, format: &str) -> Result<()> {
    let service = service(config)?;

    let Some(season) = season else {
        let details = service.show(tmdb_id).await?;
        let seasons: Vec<_> = details.regular_seasons().collect();

        if format == "json" {
            println!("{}", serde_json::to_string_pretty(&seasons)?);
            return Ok(());
        }

        println!("{} {}", "📺".cyan(), details.name.bold());
        println!();
        for s in &seasons {
            let year = s.air_date.as_deref().and_then(|d| d.get(..4)).unwrap_or("?");
            let name = s
                .name
                .clone()
                .unwrap_or_else(|| format!("Season {}", s.season_number));
            println!(
                "{:>4}  {}  ({} episodes, {})",
                s.season_number,
                name,
                s.episode_count,
                year
            );
        }
        println!();
        println!("List episodes with: playto show {} --season <N>", tmdb_id);
        return Ok(());
    };

    let episodes = service.season(tmdb_id, season).await?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&episodes)?);
        return Ok(());
    }

    let show = episodes
        .first()
        .and_then(|e| e.tv_show_title.clone())
        .unwrap_or_else(|| tmdb_id.to_string());
    println!("{} {} season {}", "📺".cyan(), show.bold(), season);
    println!();

    if episodes.is_empty() {
        println!("No episodes listed.");
        return Ok(());
    }
    for ep in &episodes {
        println!("  E{:02}  {}", ep.episode.unwrap_or(0), ep.title);
        println!("       {}", ep.source_query().dimmed());
    }
    println!();
    println!(
        "Find sources with: playto sources -t <TITLE> --show \"{}\" --season {} --episode <E>",
        show, season
    );
    Ok(())
}
