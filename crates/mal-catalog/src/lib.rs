//! Catalog client library for the MyAnimeList API.
//!
//! This library provides a validated, typed client for the MyAnimeList v2
//! API (search, rankings, seasonal listings, user lists) plus the small
//! helpers the command front-end needs (cover download, broadcast dates).

pub mod api;
pub mod image;
pub mod schedule;

pub use api::{
    CatalogClient, CatalogError, Credentials, ListSort, RankingKind, Season, SeasonSort,
    WatchStatus,
};
pub use api::{AnimeRecord, ListedAnime, RankedAnime};
pub use image::FetchedImage;
