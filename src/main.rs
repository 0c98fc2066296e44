//! playto CLI
//!
//! Searches prehraj.to for playable sources, enriched with TMDB metadata.

use clap::Parser;
use playto::cli::{
    args::{
        CacheAction, Cli, Commands, HistoryKind, PlaybackAction, SearchHistoryAction, SeriesAction,
        TipsAction, TraktAction,
    },
    commands::{browse, cache, history, most_watched, play, search, series, tips, trakt},
};
use playto::models::config::{load_config, load_config_from, Config};
use playto::preflight;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config_from(path)?.apply_env(),
        None => load_config(),
    };

    // Initialize logging
    init_logging(cli.verbose, config.log_level.as_deref());

    // Run the appropriate command
    match cli.command {
        Commands::Search {
            query,
            pick,
            no_meta,
            no_history,
            format,
        } => {
            search::execute_search(config, &query, pick, no_meta, no_history, &format).await?;
        }

        Commands::Sources {
            title,
            year,
            show,
            season,
            episode,
            format,
        } => {
            search::find_sources(config, &title, year, show, season, episode, &format).await?;
        }

        Commands::MostWatched {
            category,
            pages,
            refresh,
            format,
        } => {
            most_watched::most_watched(&config, category.as_deref(), pages, refresh, &format)
                .await?;
        }

        Commands::Tips {
            refresh,
            format,
            action,
        } => match action {
            Some(TipsAction::Select { id }) => tips::select(config, &id, &format).await?,
            None => tips::list(&config, refresh, &format).await?,
        },

        Commands::Browse {
            list,
            media,
            genre,
            year,
            page,
            refresh,
            format,
        } => {
            browse::browse(&config, list, media, genre, year, page, refresh, &format).await?;
        }

        Commands::Show {
            tmdb_id,
            season,
            format,
        } => {
            browse::show(&config, tmdb_id, season, &format).await?;
        }

        Commands::Series { action } => match action {
            SeriesAction::Scan { name } => series::scan(&config, &name).await?,
            SeriesAction::List => series::list(&config)?,
            SeriesAction::Show { name, format } => series::show(&config, &name, &format)?,
            SeriesAction::Watched {
                name,
                season,
                episode,
            } => series::set_watched(&config, &name, season, episode, true)?,
            SeriesAction::Unwatched {
                name,
                season,
                episode,
            } => series::set_watched(&config, &name, season, episode, false)?,
            SeriesAction::Remove {
                name,
                season,
                episode,
            } => series::remove(&config, &name, season, episode)?,
        },

        Commands::Resolve {
            link,
            title,
            format,
        } => {
            play::resolve(&config, &link, title.as_deref(), &format).await?;
        }

        Commands::Library { link, name } => {
            play::add_to_library(&config, &link, name.as_deref())?;
        }

        Commands::Download { link, output } => {
            play::download(&config, &link, output.as_deref()).await?;
        }

        Commands::History { kind } => match kind {
            HistoryKind::Search { action } => match action {
                SearchHistoryAction::List => history::list_searches(&config)?,
                SearchHistoryAction::Remove { query } => history::remove_search(&config, &query)?,
                SearchHistoryAction::Clear => history::clear_searches(&config)?,
            },
            HistoryKind::Playback { action } => match action {
                PlaybackAction::List => history::list_playback(&config)?,
                PlaybackAction::Show { show } => history::show_playback(&config, &show)?,
                PlaybackAction::Add {
                    link,
                    title,
                    year,
                    tmdb_id,
                    show,
                    season,
                    episode,
                } => {
                    history::add_playback(&config, &link, &title, year, tmdb_id, show, season, episode)?
                }
                PlaybackAction::Remove {
                    show,
                    season,
                    episode,
                    movie,
                } => history::remove_playback(&config, show, season, episode, movie)?,
                PlaybackAction::Clear => history::clear_playback(&config)?,
            },
        },

        Commands::Trakt { action } => match action {
            TraktAction::Auth => trakt::auth(&config).await?,
            TraktAction::Refresh => trakt::refresh(&config).await?,
            TraktAction::Logout => trakt::logout(&config)?,
            TraktAction::Scrobble {
                action,
                tmdb_id,
                season,
                episode,
                progress,
            } => trakt::scrobble(&config, action, tmdb_id, season, episode, progress).await?,
        },

        Commands::Normalize { query } => {
            search::normalize(&query)?;
        }

        Commands::Cache { action } => match action {
            CacheAction::Clear { most_watched } => cache::clear(&config, most_watched)?,
        },

        Commands::Check => {
            run_preflight_checks(&config).await?;
        }
    }

    Ok(())
}

/// Initialize the logging system.
fn init_logging(verbose: bool, log_level: Option<&str>) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let level = if verbose {
        "debug"
    } else {
        match log_level.map(|l| l.trim().to_lowercase()).as_deref() {
            Some("debug") => "debug",
            Some("warn") => "warn",
            Some("error") => "error",
            _ => "info",
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(EnvFilter::new(format!("playto={}", level)))
        .init();
}

/// Run preflight checks and exit if any fail.
async fn run_preflight_checks(config: &Config) -> anyhow::Result<()> {
    use colored::Colorize;

    println!("{}", "Running preflight checks...".bold());
    println!();

    let results = preflight::run_preflight_checks(config).await?;
    preflight::print_results(&results);

    println!();

    if !preflight::all_passed(&results) {
        anyhow::bail!("Preflight checks failed. Fix the issues above and try again.");
    }

    Ok(())
}
