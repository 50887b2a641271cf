//! MyAnimeList v2 API client.
//!
//! Every public operation validates its arguments locally, issues exactly
//! one authenticated GET, and reshapes the nested response into flat
//! records. Expected failures (bad input, non-200, transport) are logged
//! once and returned as `CatalogError`; nothing in here panics on remote
//! misbehavior.

use super::error::CatalogError;
use super::params::{cap_limit, require_numeric, DEFAULT_ANIME_FIELDS};
use super::types::*;
use anyhow::{Context, Result};
use reqwest::{header, Client, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

/// Request header carrying the client identifier
const CLIENT_ID_HEADER: &str = "X-MAL-CLIENT-ID";

/// API credentials, read once at startup and held for the process lifetime.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Client identifier, sent with every request
    pub client_id: String,
    /// Client secret, held but not sent on the query paths
    pub client_secret: String,
}

impl Credentials {
    /// Read `CLIENT_ID` / `CLIENT_SECRET` from the environment.
    ///
    /// Missing variables become empty strings; the service rejects such
    /// requests itself, so absence is not an error here.
    pub fn from_env() -> Self {
        Self {
            client_id: std::env::var("CLIENT_ID").unwrap_or_default(),
            client_secret: std::env::var("CLIENT_SECRET").unwrap_or_default(),
        }
    }
}

/// MyAnimeList v2 catalog client
pub struct CatalogClient {
    /// HTTP client, carries the auth header on every request
    http: Client,
    /// Base URL for the catalog API
    base_url: String,
    /// Credentials this client was constructed with
    credentials: Credentials,
}

impl CatalogClient {
    /// Create a new catalog client.
    pub fn new(
        base_url: impl Into<String>,
        credentials: Credentials,
        timeout: Duration,
    ) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            CLIENT_ID_HEADER,
            header::HeaderValue::from_str(&credentials.client_id)
                .context("Client identifier is not a valid header value")?,
        );

        let http = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            credentials,
        })
    }

    /// The credentials this client holds.
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Search the catalog by name.
    ///
    /// Returns the matching records in the order the service ranks them.
    pub async fn search(
        &self,
        query: &str,
        limit: &str,
        offset: &str,
    ) -> Result<Vec<AnimeRecord>, CatalogError> {
        require_numeric("limit", limit)?;
        require_numeric("offset", offset)?;

        let url = format!("{}/anime", self.base_url);
        let params = vec![
            ("q", query.to_string()),
            ("limit", cap_limit(limit)),
            ("offset", offset.to_string()),
        ];

        debug!(query, "searching catalog");
        let body = self.send_request(&url, &params).await?;
        let page: Page<SearchEntry> = serde_json::from_str(&body).map_err(CatalogError::Decode)?;
        Ok(page.data.into_iter().map(|entry| entry.node).collect())
    }

    /// Fetch a single catalog entry by id.
    ///
    /// With `fields` unset (or empty) the lookup asks for the default
    /// field set.
    pub async fn anime_by_id(
        &self,
        id: &str,
        fields: Option<&str>,
    ) -> Result<AnimeRecord, CatalogError> {
        require_numeric("anime_id", id)?;

        let fields = match fields {
            Some(f) if !f.is_empty() => f,
            _ => DEFAULT_ANIME_FIELDS,
        };

        let url = format!("{}/anime/{}", self.base_url, id);
        let params = vec![("fields", fields.to_string())];

        debug!(id, "fetching catalog entry");
        let body = self.send_request(&url, &params).await?;
        serde_json::from_str(&body).map_err(CatalogError::Decode)
    }

    /// Fetch a ranking board, with each record's rank folded in.
    pub async fn ranking(
        &self,
        kind: RankingKind,
        limit: &str,
        offset: &str,
    ) -> Result<Vec<RankedAnime>, CatalogError> {
        require_numeric("limit", limit)?;
        require_numeric("offset", offset)?;

        let url = format!("{}/anime/ranking", self.base_url);
        let params = vec![
            ("ranking_type", kind.as_str().to_string()),
            ("limit", cap_limit(limit)),
            ("offset", offset.to_string()),
        ];

        debug!(kind = %kind, "fetching ranking");
        let body = self.send_request(&url, &params).await?;
        let page: Page<RankingEntry> = serde_json::from_str(&body).map_err(CatalogError::Decode)?;
        Ok(page
            .data
            .into_iter()
            .map(|entry| RankedAnime {
                rank: entry.ranking.rank,
                anime: entry.node,
            })
            .collect())
    }

    /// Fetch one season's shows.
    pub async fn seasonal(
        &self,
        year: &str,
        season: Season,
        sort: SeasonSort,
        limit: &str,
        offset: &str,
    ) -> Result<Vec<AnimeRecord>, CatalogError> {
        require_numeric("year", year)?;
        require_numeric("limit", limit)?;
        require_numeric("offset", offset)?;

        let url = format!("{}/anime/season/{}/{}", self.base_url, year, season.as_str());
        let params = vec![
            ("sort", sort.as_str().to_string()),
            ("limit", cap_limit(limit)),
            ("offset", offset.to_string()),
        ];

        debug!(year, season = %season, "fetching seasonal listing");
        let body = self.send_request(&url, &params).await?;
        let page: Page<SearchEntry> = serde_json::from_str(&body).map_err(CatalogError::Decode)?;
        Ok(page.data.into_iter().map(|entry| entry.node).collect())
    }

    /// Fetch a user's anime list, with each record's list status folded in.
    ///
    /// `status: None` leaves the list unfiltered.
    pub async fn user_list(
        &self,
        user: &str,
        status: Option<WatchStatus>,
        sort: ListSort,
        limit: &str,
        offset: &str,
    ) -> Result<Vec<ListedAnime>, CatalogError> {
        require_numeric("limit", limit)?;
        require_numeric("offset", offset)?;

        let url = format!("{}/users/{}/animelist", self.base_url, user);
        let params = vec![
            ("fields", "list_status".to_string()),
            (
                "status",
                status.map(|s| s.as_str().to_string()).unwrap_or_default(),
            ),
            ("sort", sort.as_str().to_string()),
            ("limit", cap_limit(limit)),
            ("offset", offset.to_string()),
        ];

        debug!(user, "fetching user list");
        let body = self.send_request(&url, &params).await?;
        let page: Page<ListEntry> = serde_json::from_str(&body).map_err(CatalogError::Decode)?;
        Ok(page
            .data
            .into_iter()
            .map(|entry| ListedAnime {
                anime: entry.node,
                score: entry.list_status.score,
                status: entry.list_status.status,
                updated_at: entry.list_status.updated_at,
            })
            .collect())
    }

    /// Issue one GET and fold every expected failure into `CatalogError`.
    ///
    /// Returns the raw body on a 200 so each operation can decode its own
    /// envelope shape.
    async fn send_request(
        &self,
        url: &str,
        params: &[(&'static str, String)],
    ) -> Result<String, CatalogError> {
        let response = match self.http.get(url).query(params).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(url, error = %e, params = ?params, "catalog request could not be sent");
                return Err(CatalogError::Transport(e));
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!(url, error = %e, "catalog response body could not be read");
                return Err(CatalogError::Transport(e));
            }
        };

        if status != StatusCode::OK {
            // The error body is usually {"error": ..., "message": ...} but
            // nothing guarantees it, so fall back to the raw text
            let parsed: ApiErrorBody = serde_json::from_str(&body).unwrap_or_default();
            let message = parsed.error.or(parsed.message).unwrap_or(body);

            warn!(
                status = status.as_u16(),
                message = %message,
                url,
                params = ?params,
                "catalog request rejected"
            );
            return Err(CatalogError::Rejected {
                status: status.as_u16(),
                message,
                url: url.to_string(),
            });
        }

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn test_client(base_url: String) -> CatalogClient {
        CatalogClient::new(
            base_url,
            Credentials {
                client_id: "test-client".to_string(),
                client_secret: String::new(),
            },
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_search_flattens_envelopes_in_order() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/anime")
                .header("X-MAL-CLIENT-ID", "test-client")
                .query_param("q", "cowboy")
                .query_param("limit", "3")
                .query_param("offset", "0");
            then.status(200).json_body(json!({
                "data": [
                    {"node": {"id": 1, "title": "Cowboy Bebop"}},
                    {"node": {"id": 5, "title": "Cowboy Bebop: The Movie"}},
                    {"node": {"id": 2, "title": "Space Cowboys"}}
                ]
            }));
        });

        let client = test_client(server.base_url());
        let results = client.search("cowboy", "3", "0").await.unwrap();

        mock.assert();
        let ids: Vec<u32> = results.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 5, 2]);
        assert_eq!(results[0].title, "Cowboy Bebop");
    }

    #[tokio::test]
    async fn test_limit_above_cap_is_capped() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/anime").query_param("limit", "20");
            then.status(200).json_body(json!({"data": []}));
        });

        let client = test_client(server.base_url());
        client.search("x", "100", "0").await.unwrap();

        mock.assert();
    }

    #[tokio::test]
    async fn test_limit_zero_passes_through() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/anime").query_param("limit", "0");
            then.status(200).json_body(json!({"data": []}));
        });

        let client = test_client(server.base_url());
        let results = client.search("x", "0", "0").await.unwrap();

        mock.assert();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_numeric_argument_sends_nothing() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET);
            then.status(200).json_body(json!({"data": []}));
        });

        let client = test_client(server.base_url());

        let err = client.search("x", "1o0", "0").await.unwrap_err();
        assert!(matches!(err, CatalogError::InvalidNumber { field: "limit", .. }));

        let err = client.search("x", "10", "-1").await.unwrap_err();
        assert!(matches!(err, CatalogError::InvalidNumber { field: "offset", .. }));

        let err = client.anime_by_id("12.5", None).await.unwrap_err();
        assert!(matches!(err, CatalogError::InvalidNumber { field: "anime_id", .. }));

        let err = client
            .seasonal("'22", Season::Fall, SeasonSort::Score, "10", "0")
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidNumber { field: "year", .. }));

        assert_eq!(mock.hits(), 0);
    }

    #[tokio::test]
    async fn test_anime_by_id_substitutes_default_fields() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/anime/30230").query_param(
                "fields",
                "id,title,main_picture,start_date,end_date,mean,num_episodes,start_season",
            );
            then.status(200)
                .json_body(json!({"id": 30230, "title": "Diamond no Ace: Second Season"}));
        });

        let client = test_client(server.base_url());
        let record = client.anime_by_id("30230", None).await.unwrap();

        mock.assert();
        assert_eq!(record.id, 30230);
    }

    #[tokio::test]
    async fn test_anime_by_id_passes_custom_fields() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/anime/21")
                .query_param("fields", "id,title,start_date,status,broadcast");
            then.status(200).json_body(json!({
                "id": 21,
                "title": "One Piece",
                "status": "currently_airing",
                "broadcast": {"day_of_the_week": "sunday", "start_time": "09:30"}
            }));
        });

        let client = test_client(server.base_url());
        let record = client
            .anime_by_id("21", Some("id,title,start_date,status,broadcast"))
            .await
            .unwrap();

        mock.assert();
        assert_eq!(record.status, Some(AiringStatus::CurrentlyAiring));
    }

    #[tokio::test]
    async fn test_ranking_injects_rank() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/anime/ranking")
                .query_param("ranking_type", "bypopularity")
                .query_param("limit", "2");
            then.status(200).json_body(json!({
                "data": [
                    {"node": {"id": 1, "title": "A"}, "ranking": {"rank": 3}},
                    {"node": {"id": 8, "title": "B"}, "ranking": {"rank": 4}}
                ]
            }));
        });

        let client = test_client(server.base_url());
        let results = client
            .ranking(RankingKind::ByPopularity, "2", "0")
            .await
            .unwrap();

        mock.assert();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].rank, 3);
        assert_eq!(results[0].anime.id, 1);
        assert_eq!(results[0].anime.title, "A");
        assert_eq!(results[1].rank, 4);
        assert_eq!(results[1].anime.id, 8);
    }

    #[tokio::test]
    async fn test_seasonal_uses_year_and_season_path() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/anime/season/2024/fall")
                .query_param("sort", "anime_num_list_users")
                .query_param("limit", "10")
                .query_param("offset", "0");
            then.status(200).json_body(json!({
                "data": [
                    {"node": {"id": 52991, "title": "Sousou no Frieren"}},
                    {"node": {"id": 55791, "title": "Dandadan"}}
                ]
            }));
        });

        let client = test_client(server.base_url());
        let results = client
            .seasonal("2024", Season::Fall, SeasonSort::NumListUsers, "10", "0")
            .await
            .unwrap();

        mock.assert();
        let ids: Vec<u32> = results.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![52991, 55791]);
    }

    #[tokio::test]
    async fn test_user_list_merges_list_status() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/users/somebody/animelist")
                .query_param("fields", "list_status")
                .query_param("status", "watching")
                .query_param("sort", "anime_title");
            then.status(200).json_body(json!({
                "data": [{
                    "node": {"id": 2, "title": "B"},
                    "list_status": {
                        "score": 7,
                        "status": "watching",
                        "updated_at": "2024-05-01T12:00:00+00:00"
                    }
                }]
            }));
        });

        let client = test_client(server.base_url());
        let results = client
            .user_list(
                "somebody",
                Some(WatchStatus::Watching),
                ListSort::AnimeTitle,
                "10",
                "0",
            )
            .await
            .unwrap();

        mock.assert();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].anime.id, 2);
        assert_eq!(results[0].anime.title, "B");
        assert_eq!(results[0].score, 7);
        assert_eq!(results[0].status, WatchStatus::Watching);
        assert_eq!(results[0].updated_at.to_rfc3339(), "2024-05-01T12:00:00+00:00");
    }

    #[tokio::test]
    async fn test_user_list_unfiltered_sends_empty_status() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/users/somebody/animelist")
                .query_param("status", "");
            then.status(200).json_body(json!({"data": []}));
        });

        let client = test_client(server.base_url());
        client
            .user_list("somebody", None, ListSort::AnimeTitle, "10", "0")
            .await
            .unwrap();

        mock.assert();
    }

    #[tokio::test]
    async fn test_non_200_is_rejected_with_details() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/anime/404404");
            then.status(404)
                .json_body(json!({"error": "not_found", "message": ""}));
        });

        let client = test_client(server.base_url());
        let err = client.anime_by_id("404404", None).await.unwrap_err();

        mock.assert_hits(1);
        match err {
            CatalogError::Rejected {
                status,
                message,
                url,
            } => {
                assert_eq!(status, 404);
                assert_eq!(message, "not_found");
                assert!(url.ends_with("/anime/404404"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_json_error_body_is_tolerated() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/anime");
            then.status(502).body("Bad Gateway");
        });

        let client = test_client(server.base_url());
        let err = client.search("x", "10", "0").await.unwrap_err();

        match err {
            CatalogError::Rejected { status, message, .. } => {
                assert_eq!(status, 502);
                assert_eq!(message, "Bad Gateway");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_transport_failure_is_an_error_not_a_panic() {
        // Nothing listens on the tcpmux port
        let client = test_client("http://127.0.0.1:1".to_string());
        let err = client.search("x", "10", "0").await.unwrap_err();
        assert!(matches!(err, CatalogError::Transport(_)));
        assert!(err.is_expected());
    }

    #[tokio::test]
    async fn test_malformed_200_fails_the_decode() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/anime");
            then.status(200).json_body(json!({"data": "not-a-list"}));
        });

        let client = test_client(server.base_url());
        let err = client.search("x", "10", "0").await.unwrap_err();
        assert!(matches!(err, CatalogError::Decode(_)));
        assert!(!err.is_expected());
    }
}
