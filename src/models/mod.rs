//! Data models.

pub mod candidate;
pub mod config;
pub mod meta;
pub mod tip;
pub mod token;
