//! playto library
//!
//! Finds playable video sources on prehraj.to, ranks them by quality, dub and
//! size, and enriches queries with TMDB metadata.

pub mod cli;
pub mod core;
pub mod error;
pub mod models;
pub mod preflight;
pub mod services;
pub mod utils;

pub use error::{Error, Result};
