//! MyAnimeList v2 API request and response types.
//!
//! Request-side enums are closed whitelists: anything the API accepts is a
//! variant, anything else fails at `FromStr` before a request is built.
//! Response-side types mirror the JSON shape of the service; fields every
//! record carries (`id`, `title`) are required so a malformed 200 fails the
//! decode instead of producing half-empty records.

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

// ========== Request enums ==========

/// Ranking board selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RankingKind {
    All,
    Airing,
    Upcoming,
    Tv,
    Ova,
    Movie,
    Special,
    #[value(name = "bypopularity")]
    ByPopularity,
    Favorite,
}

impl RankingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RankingKind::All => "all",
            RankingKind::Airing => "airing",
            RankingKind::Upcoming => "upcoming",
            RankingKind::Tv => "tv",
            RankingKind::Ova => "ova",
            RankingKind::Movie => "movie",
            RankingKind::Special => "special",
            RankingKind::ByPopularity => "bypopularity",
            RankingKind::Favorite => "favorite",
        }
    }
}

impl std::fmt::Display for RankingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RankingKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(RankingKind::All),
            "airing" => Ok(RankingKind::Airing),
            "upcoming" => Ok(RankingKind::Upcoming),
            "tv" => Ok(RankingKind::Tv),
            "ova" => Ok(RankingKind::Ova),
            "movie" => Ok(RankingKind::Movie),
            "special" => Ok(RankingKind::Special),
            "bypopularity" => Ok(RankingKind::ByPopularity),
            "favorite" => Ok(RankingKind::Favorite),
            _ => Err(anyhow::anyhow!("Invalid ranking type: {}", s)),
        }
    }
}

/// Airing season
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl Season {
    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Winter => "winter",
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Fall => "fall",
        }
    }
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Season {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "winter" => Ok(Season::Winter),
            "spring" => Ok(Season::Spring),
            "summer" => Ok(Season::Summer),
            "fall" => Ok(Season::Fall),
            _ => Err(anyhow::anyhow!("Invalid season: {}", s)),
        }
    }
}

/// Sort order for seasonal listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum SeasonSort {
    /// Sort by mean score
    #[value(name = "score")]
    Score,
    /// Sort by number of list users
    #[value(name = "popularity")]
    NumListUsers,
}

impl SeasonSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeasonSort::Score => "anime_score",
            SeasonSort::NumListUsers => "anime_num_list_users",
        }
    }
}

impl std::fmt::Display for SeasonSort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SeasonSort {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "anime_score" => Ok(SeasonSort::Score),
            "anime_num_list_users" => Ok(SeasonSort::NumListUsers),
            _ => Err(anyhow::anyhow!("Invalid seasonal sort: {}", s)),
        }
    }
}

/// Watch status on a user's list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum WatchStatus {
    Watching,
    Completed,
    OnHold,
    Dropped,
    PlanToWatch,
}

impl WatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WatchStatus::Watching => "watching",
            WatchStatus::Completed => "completed",
            WatchStatus::OnHold => "on_hold",
            WatchStatus::Dropped => "dropped",
            WatchStatus::PlanToWatch => "plan_to_watch",
        }
    }
}

impl std::fmt::Display for WatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for WatchStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "watching" => Ok(WatchStatus::Watching),
            "completed" => Ok(WatchStatus::Completed),
            "on_hold" => Ok(WatchStatus::OnHold),
            "dropped" => Ok(WatchStatus::Dropped),
            "plan_to_watch" => Ok(WatchStatus::PlanToWatch),
            _ => Err(anyhow::anyhow!("Invalid watch status: {}", s)),
        }
    }
}

/// Sort order for user anime lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum ListSort {
    #[value(name = "score")]
    ListScore,
    #[value(name = "updated")]
    ListUpdatedAt,
    #[value(name = "title")]
    AnimeTitle,
    #[value(name = "start-date")]
    AnimeStartDate,
    #[value(name = "id")]
    AnimeId,
}

impl ListSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListSort::ListScore => "list_score",
            ListSort::ListUpdatedAt => "list_updated_at",
            ListSort::AnimeTitle => "anime_title",
            ListSort::AnimeStartDate => "anime_start_date",
            ListSort::AnimeId => "anime_id",
        }
    }
}

impl std::fmt::Display for ListSort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ListSort {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "list_score" => Ok(ListSort::ListScore),
            "list_updated_at" => Ok(ListSort::ListUpdatedAt),
            "anime_title" => Ok(ListSort::AnimeTitle),
            "anime_start_date" => Ok(ListSort::AnimeStartDate),
            "anime_id" => Ok(ListSort::AnimeId),
            _ => Err(anyhow::anyhow!("Invalid list sort: {}", s)),
        }
    }
}

// ========== Response records ==========

/// A single catalog entry, as returned inside every endpoint's `node`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimeRecord {
    pub id: u32,
    pub title: String,

    #[serde(default)]
    pub main_picture: Option<MainPicture>,

    // Dates come back with varying precision ("2004", "2004-10",
    // "2004-10-05"), so they stay strings
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,

    #[serde(default)]
    pub mean: Option<f64>,
    #[serde(default)]
    pub num_episodes: Option<u32>,
    #[serde(default)]
    pub start_season: Option<StartSeason>,

    #[serde(default)]
    pub status: Option<AiringStatus>,
    #[serde(default)]
    pub broadcast: Option<BroadcastInfo>,
}

/// Cover picture URLs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MainPicture {
    pub medium: String,
    #[serde(default)]
    pub large: Option<String>,
}

/// Premiere season of a show
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StartSeason {
    pub year: u32,
    pub season: Season,
}

/// Airing status of a show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiringStatus {
    FinishedAiring,
    CurrentlyAiring,
    NotYetAired,
}

/// Weekly broadcast slot (JST)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastInfo {
    pub day_of_the_week: String,
    #[serde(default)]
    pub start_time: Option<String>,
}

/// A ranking entry: the catalog record with its rank folded in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedAnime {
    pub rank: u32,
    #[serde(flatten)]
    pub anime: AnimeRecord,
}

/// A user-list entry: the catalog record with the list status folded in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListedAnime {
    #[serde(flatten)]
    pub anime: AnimeRecord,
    pub score: u8,
    pub status: WatchStatus,
    pub updated_at: DateTime<Utc>,
}

// ========== Wire envelopes ==========

/// List endpoints nest their entries under `data`
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Page<T> {
    pub data: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SearchEntry {
    pub node: AnimeRecord,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RankingEntry {
    pub node: AnimeRecord,
    pub ranking: RankingInfo,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RankingInfo {
    pub rank: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ListEntry {
    pub node: AnimeRecord,
    pub list_status: ListStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ListStatus {
    pub score: u8,
    pub status: WatchStatus,
    pub updated_at: DateTime<Utc>,
}

/// Error body returned by the service on non-200 responses
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_ranking_kind_round_trip() {
        let kinds = [
            "all",
            "airing",
            "upcoming",
            "tv",
            "ova",
            "movie",
            "special",
            "bypopularity",
            "favorite",
        ];
        for wire in kinds {
            let kind = <RankingKind as FromStr>::from_str(wire).unwrap();
            assert_eq!(kind.as_str(), wire);
        }
        assert!(<RankingKind as FromStr>::from_str("manga").is_err());
        assert!(<RankingKind as FromStr>::from_str("").is_err());
    }

    #[test]
    fn test_season_round_trip() {
        for wire in ["winter", "spring", "summer", "fall"] {
            assert_eq!(<Season as FromStr>::from_str(wire).unwrap().as_str(), wire);
        }
        assert!(<Season as FromStr>::from_str("autumn").is_err());
    }

    #[test]
    fn test_season_sort_round_trip() {
        for wire in ["anime_score", "anime_num_list_users"] {
            assert_eq!(<SeasonSort as FromStr>::from_str(wire).unwrap().as_str(), wire);
        }
        assert!(<SeasonSort as FromStr>::from_str("anime_title").is_err());
    }

    #[test]
    fn test_watch_status_round_trip() {
        let statuses = [
            "watching",
            "completed",
            "on_hold",
            "dropped",
            "plan_to_watch",
        ];
        for wire in statuses {
            assert_eq!(<WatchStatus as FromStr>::from_str(wire).unwrap().as_str(), wire);
        }
        assert!(<WatchStatus as FromStr>::from_str("rewatching").is_err());
    }

    #[test]
    fn test_list_sort_round_trip() {
        let sorts = [
            "list_score",
            "list_updated_at",
            "anime_title",
            "anime_start_date",
            "anime_id",
        ];
        for wire in sorts {
            assert_eq!(<ListSort as FromStr>::from_str(wire).unwrap().as_str(), wire);
        }
        assert!(<ListSort as FromStr>::from_str("score").is_err());
    }

    #[test]
    fn test_anime_record_minimal() {
        let record: AnimeRecord =
            serde_json::from_str(r#"{"id": 1, "title": "Cowboy Bebop"}"#).unwrap();
        assert_eq!(record.id, 1);
        assert_eq!(record.title, "Cowboy Bebop");
        assert!(record.main_picture.is_none());
        assert!(record.start_season.is_none());
    }

    #[test]
    fn test_anime_record_requires_id_and_title() {
        assert!(serde_json::from_str::<AnimeRecord>(r#"{"title": "No Id"}"#).is_err());
        assert!(serde_json::from_str::<AnimeRecord>(r#"{"id": 5}"#).is_err());
    }

    #[test]
    fn test_anime_record_nested_fields() {
        let json = r#"{
            "id": 30230,
            "title": "Diamond no Ace: Second Season",
            "main_picture": {
                "medium": "https://cdn.example/images/anime/9/74398.jpg",
                "large": "https://cdn.example/images/anime/9/74398l.jpg"
            },
            "start_date": "2015-04-06",
            "mean": 8.3,
            "num_episodes": 51,
            "start_season": {"year": 2015, "season": "spring"},
            "status": "finished_airing",
            "broadcast": {"day_of_the_week": "monday", "start_time": "18:00"}
        }"#;
        let record: AnimeRecord = serde_json::from_str(json).unwrap();
        assert_eq!(
            record.main_picture.unwrap().medium,
            "https://cdn.example/images/anime/9/74398.jpg"
        );
        let season = record.start_season.unwrap();
        assert_eq!(season.year, 2015);
        assert_eq!(season.season, Season::Spring);
        assert_eq!(record.status, Some(AiringStatus::FinishedAiring));
        assert_eq!(record.broadcast.unwrap().day_of_the_week, "monday");
    }

    #[test]
    fn test_ranked_anime_serializes_flat() {
        let ranked = RankedAnime {
            rank: 3,
            anime: serde_json::from_str(r#"{"id": 1, "title": "A"}"#).unwrap(),
        };
        let value = serde_json::to_value(&ranked).unwrap();
        assert_eq!(value["rank"], 3);
        assert_eq!(value["id"], 1);
        assert_eq!(value["title"], "A");
    }
}
