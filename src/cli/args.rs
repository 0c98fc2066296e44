//! Command line argument definitions.

use crate::services::tmdb::BrowseMedia;
use crate::services::trakt::ScrobbleAction;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// playto - find playable video sources on prehraj.to
#[derive(Parser, Debug)]
#[command(name = "playto")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (default: <config_dir>/playto/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search the video site, with TMDB metadata lookup
    Search {
        /// Free-text query, e.g. "Dark S01E02 CZ dabing"
        #[arg(value_name = "QUERY")]
        query: String,

        /// Use the Nth TMDB match (0-based) when several were found
        #[arg(long, value_name = "N")]
        pick: Option<usize>,

        /// Skip the TMDB metadata lookup
        #[arg(long)]
        no_meta: bool,

        /// Do not record the query in search history
        #[arg(long)]
        no_history: bool,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Find sources for a known movie or episode
    Sources {
        /// Movie title, or episode title with --show
        #[arg(short = 't', long)]
        title: String,

        /// Release year
        #[arg(short = 'y', long)]
        year: Option<String>,

        /// Show title (episodes)
        #[arg(long)]
        show: Option<String>,

        /// Season number (episodes)
        #[arg(long, requires = "show")]
        season: Option<u32>,

        /// Episode number (episodes)
        #[arg(long, requires = "show")]
        episode: Option<u32>,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// List the most watched videos
    MostWatched {
        /// Window: 12h, 7d or 14d (default from config)
        #[arg(short, long)]
        category: Option<String>,

        /// Pages to fetch (default from config)
        #[arg(short, long)]
        pages: Option<u32>,

        /// Ignore the cached listing
        #[arg(long)]
        refresh: bool,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Daily TV tips from CSFD
    Tips {
        /// Ignore the cached tips
        #[arg(long)]
        refresh: bool,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,

        #[command(subcommand)]
        action: Option<TipsAction>,
    },

    /// Browse TMDB listings
    Browse {
        /// Listing to show
        #[arg(value_enum)]
        list: BrowseKind,

        /// Media type
        #[arg(long = "type", value_enum, default_value = "movie")]
        media: BrowseMedia,

        /// Genre ID for the genre listing (omit to list genres)
        #[arg(long)]
        genre: Option<u32>,

        /// Year for the year listing (omit to list years)
        #[arg(long)]
        year: Option<u32>,

        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Ignore the cached listing
        #[arg(long)]
        refresh: bool,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// List a TMDB show's seasons, or the episodes of one season
    Show {
        /// TMDB ID of the show
        #[arg(value_name = "TMDB_ID")]
        tmdb_id: u64,

        #[arg(short, long)]
        season: Option<u32>,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Scan the video site for a series' episodes and manage them
    Series {
        #[command(subcommand)]
        action: SeriesAction,
    },

    /// Resolve a video page to its stream URL
    Resolve {
        /// Video page link
        #[arg(value_name = "LINK")]
        link: String,

        /// Record the item in playback history under this title
        #[arg(long)]
        title: Option<String>,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Save a .strm library entry for a video page
    Library {
        /// Video page link
        #[arg(value_name = "LINK")]
        link: String,

        /// Entry name, e.g. "Pelisky 1999" (default: from the link)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Download a video (and its subtitles)
    Download {
        /// Video page link
        #[arg(value_name = "LINK")]
        link: String,

        /// Output directory (default: paths.download_dir)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },

    /// Search and playback history
    History {
        #[command(subcommand)]
        kind: HistoryKind,
    },

    /// Trakt authentication and scrobbling
    Trakt {
        #[command(subcommand)]
        action: TraktAction,
    },

    /// Show how a query is normalized
    Normalize {
        /// Free-text query
        #[arg(value_name = "QUERY")]
        query: String,
    },

    /// Manage the JSON cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Run preflight checks
    Check,
}

/// TMDB browse listing.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowseKind {
    Trending,
    Discover,
    TopRated,
    /// Movies only
    NowPlaying,
    /// Movies only
    Upcoming,
    /// Shows only
    AiringToday,
    /// Shows only
    OnTheAir,
    Genre,
    Year,
}

#[derive(Subcommand, Debug)]
pub enum SeriesAction {
    /// Search the video site for episodes and store them
    Scan {
        #[arg(value_name = "NAME")]
        name: String,
    },

    /// List stored series
    List,

    /// Show the stored episodes of a series
    Show {
        #[arg(value_name = "NAME")]
        name: String,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Mark an episode as watched
    Watched {
        #[arg(value_name = "NAME")]
        name: String,
        season: u32,
        episode: u32,
    },

    /// Clear an episode's watched mark
    Unwatched {
        #[arg(value_name = "NAME")]
        name: String,
        season: u32,
        episode: u32,
    },

    /// Remove a series, one season, or one episode
    Remove {
        #[arg(value_name = "NAME")]
        name: String,

        #[arg(long)]
        season: Option<u32>,

        #[arg(long, requires = "season")]
        episode: Option<u32>,
    },
}

#[derive(Subcommand, Debug)]
pub enum TipsAction {
    /// Search the video site for a tip
    Select {
        /// CSFD film ID
        #[arg(value_name = "ID")]
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum HistoryKind {
    /// Search history
    Search {
        #[command(subcommand)]
        action: SearchHistoryAction,
    },

    /// Playback history
    Playback {
        #[command(subcommand)]
        action: PlaybackAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum SearchHistoryAction {
    /// List recent queries
    List,

    /// Remove a query
    Remove {
        #[arg(value_name = "QUERY")]
        query: String,
    },

    /// Remove all queries
    Clear,
}

#[derive(Subcommand, Debug)]
pub enum PlaybackAction {
    /// List played shows and movies
    List,

    /// List played episodes of a show
    Show {
        #[arg(value_name = "SHOW")]
        show: String,
    },

    /// Record a played item
    Add {
        /// Video page link
        #[arg(value_name = "LINK")]
        link: String,

        /// Title (episode title with --show)
        #[arg(short = 't', long)]
        title: String,

        #[arg(short = 'y', long)]
        year: Option<String>,

        #[arg(long)]
        tmdb_id: Option<u64>,

        #[arg(long)]
        show: Option<String>,

        #[arg(long, requires = "show")]
        season: Option<u32>,

        #[arg(long, requires = "show")]
        episode: Option<u32>,
    },

    /// Remove a show, an episode or a movie
    Remove {
        /// Remove all episodes of this show (or one with --season/--episode)
        #[arg(long, conflicts_with = "movie")]
        show: Option<String>,

        #[arg(long, requires_all = ["show", "episode"])]
        season: Option<u32>,

        #[arg(long, requires_all = ["show", "season"])]
        episode: Option<u32>,

        /// Remove a movie by title
        #[arg(long)]
        movie: Option<String>,
    },

    /// Remove all entries
    Clear,
}

#[derive(Subcommand, Debug)]
pub enum TraktAction {
    /// Authorize this device
    Auth,

    /// Refresh the access token
    Refresh,

    /// Forget stored tokens
    Logout,

    /// Send a scrobble
    Scrobble {
        /// start, pause or stop
        #[arg(value_enum)]
        action: ScrobbleAction,

        /// TMDB ID of the movie or show
        #[arg(long)]
        tmdb_id: u64,

        /// Season (episodes)
        #[arg(long, requires = "episode")]
        season: Option<u32>,

        /// Episode (episodes)
        #[arg(long, requires = "season")]
        episode: Option<u32>,

        /// Watched percentage
        #[arg(long, default_value_t = 0.0)]
        progress: f32,
    },
}

#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// Remove cached entries
    Clear {
        /// Only the most-watched listings
        #[arg(long)]
        most_watched: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_search() {
        let cli = Cli::try_parse_from(["playto", "search", "Dark S01E02", "--pick", "1"]).unwrap();
        match cli.command {
            Commands::Search {
                query, pick, no_meta, ..
            } => {
                assert_eq!(query, "Dark S01E02");
                assert_eq!(pick, Some(1));
                assert!(!no_meta);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_browse() {
        let cli = Cli::try_parse_from([
            "playto", "browse", "top-rated", "--type", "tv", "--page", "3",
        ])
        .unwrap();
        match cli.command {
            Commands::Browse {
                list, media, page, genre, ..
            } => {
                assert_eq!(list, BrowseKind::TopRated);
                assert_eq!(media, BrowseMedia::Tv);
                assert_eq!(page, 3);
                assert_eq!(genre, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_series_remove_episode_requires_season() {
        assert!(Cli::try_parse_from(["playto", "series", "remove", "Dark", "--episode", "2"]).is_err());
        let cli = Cli::try_parse_from([
            "playto", "series", "remove", "Dark", "--season", "1", "--episode", "2",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Series {
                action: SeriesAction::Remove {
                    season: Some(1),
                    episode: Some(2),
                    ..
                }
            }
        ));
    }

    #[test]
    fn test_parse_scrobble() {
        let cli = Cli::try_parse_from([
            "playto", "trakt", "scrobble", "stop", "--tmdb-id", "603", "--progress", "95",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Trakt {
                action: TraktAction::Scrobble {
                    action: ScrobbleAction::Stop,
                    tmdb_id: 603,
                    ..
                }
            }
        ));
    }
}
