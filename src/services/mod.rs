//! External services: the video site, TMDB, CSFD and Trakt.

pub mod csfd;
pub mod listing;
pub mod prehrajto;
pub mod tmdb;
pub mod trakt;
