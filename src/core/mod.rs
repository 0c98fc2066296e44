//! Core business logic modules.

pub mod browse;
pub mod cache;
pub mod classifier;
pub mod history;
pub mod library;
pub mod most_watched;
pub mod normalizer;
pub mod scraper;
pub mod search;
pub mod series;
pub mod tables;
pub mod tips;
