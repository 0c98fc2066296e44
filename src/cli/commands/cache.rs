//! Cache command implementation.

use crate::core::cache::JsonCache;
use crate::core::most_watched::MostWatchedService;
use crate::models::config::Config;
use crate::services::prehrajto::PrehrajtoClient;
use crate::Result;
use colored::Colorize;

/// Remove cached entries.
pub fn clear(config: &Config, most_watched_only: bool) -> Result<()> {
    let cache = JsonCache::new(config.paths.cache_dir());

    let removed = if most_watched_only {
        let client = PrehrajtoClient::new(&config.site)?;
        MostWatchedService::new(&client, cache.clone(), config.most_watched.clone()).clear()?
    } else {
        cache.clear()?
    };

    println!(
        "{} {} cache entr{} removed from {}",
        "✓".green(),
        removed,
        if removed == 1 { "y" } else { "ies" },
        cache.dir().display()
    );
    Ok(())
}
