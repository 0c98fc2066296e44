//! Trakt command implementation.

use crate::models::config::Config;
use crate::services::trakt::{ScrobbleAction, ScrobbleItem, TraktClient};
use anyhow::{Context, Result};
use colored::Colorize;

fn client(config: &Config) -> Result<TraktClient> {
    Ok(TraktClient::from_config(
        &config.trakt,
        config.paths.trakt_tokens_file(),
    )?)
}

/// Authorize this device with the device-code flow.
pub async fn auth(config: &Config) -> Result<()> {
    let trakt = client(config)?;
    let code = trakt.request_device_code().await?;

    println!("{}", "🔑 Trakt authorization".bold().cyan());
    println!();
    println!("  Open     {}", code.verification_url.bold());
    println!("  Enter    {}", code.user_code.bold().yellow());
    println!();
    println!("Waiting for confirmation (expires in {} s)...", code.expires_in);

    trakt.poll_device_token(&code).await?;
    println!("{} Trakt authorized", "✓".green());
    Ok(())
}

/// Refresh the access token.
pub async fn refresh(config: &Config) -> Result<()> {
    client(config)?.refresh().await?;
    println!("{} Trakt token refreshed", "✓".green());
    Ok(())
}

/// Forget stored tokens.
pub fn logout(config: &Config) -> Result<()> {
    client(config)?.clear_tokens()?;
    println!("{} Trakt tokens removed", "✓".green());
    Ok(())
}

/// Scrobble a movie or an episode by TMDB ID.
pub async fn scrobble(
    config: &Config,
    action: ScrobbleAction,
    tmdb_id: u64,
    season: Option<u32>,
    episode: Option<u32>,
    progress: f32,
) -> Result<()> {
    if !config.trakt.scrobble {
        println!("{} Scrobbling is off, set trakt.scrobble = true", "!".yellow());
        return Ok(());
    }
    let trakt = client(config)?;

    let item = match (season, episode) {
        (Some(season), Some(episode)) => {
            let show_id = trakt
                .trakt_id(tmdb_id, "show")
                .await?
                .with_context(|| format!("no Trakt show for TMDB ID {}", tmdb_id))?;
            let episode_id = trakt
                .episode_trakt_id(show_id, season, episode)
                .await?
                .with_context(|| format!("no Trakt episode S{:02}E{:02}", season, episode))?;
            ScrobbleItem::Episode(episode_id)
        }
        _ => {
            let movie_id = trakt
                .trakt_id(tmdb_id, "movie")
                .await?
                .with_context(|| format!("no Trakt movie for TMDB ID {}", tmdb_id))?;
            ScrobbleItem::Movie(movie_id)
        }
    };

    trakt.scrobble(action, item, progress).await?;
    println!(
        "{} Scrobbled {} at {:.1}%",
        "✓".green(),
        action.as_str(),
        progress
    );
    Ok(())
}
