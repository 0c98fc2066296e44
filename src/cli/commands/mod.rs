//! CLI command implementations.

pub mod browse;
pub mod cache;
pub mod history;
pub mod most_watched;
pub mod play;
pub mod search;
pub mod series;
pub mod tips;
pub mod trakt;
