// src/integrations/moaplay/client.rs
//
// Moaplay REST API client
//
// ARCHITECTURE:
// - Thin HTTP layer over the backend's favorites and schedules endpoints
// - Session-cookie authentication, one shared reqwest::Client
// - Maps non-2xx responses to AppError::Api using the backend's
//   `{ error_code, message }` body
//
// RULES:
// - This is INFRASTRUCTURE: no caching, no retries, no state
// - Returns domain DTOs; callers decide what to do with them

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::{header, Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use crate::config::ClientConfig;
use crate::domain::{FavoritePage, FavoriteRecord, ScheduleItem, ScheduleQuery};
use crate::error::{AppError, AppResult};
use crate::repositories::{FavoriteRepository, ScheduleRepository};

/// Flask's default session cookie name
const SESSION_COOKIE_NAME: &str = "session";

/// Error body returned by the backend on failure
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error_code: Option<String>,
    message: Option<String>,
}

/// `GET /api/favorites/event/{id}` response
#[derive(Debug, Deserialize)]
struct FavoriteStatusBody {
    is_favorited: bool,
    #[serde(default)]
    favorite: Option<FavoriteRecord>,
}

/// `GET /api/schedules/` response
#[derive(Debug, Deserialize)]
struct ScheduleListBody {
    schedules: Vec<ScheduleItem>,
    #[allow(dead_code)] // Part of the response schema
    total: u32,
}

/// Moaplay API Client
pub struct MoaplayClient {
    base_url: String,
    http_client: Client,
    session_cookie: Option<String>,
}

impl MoaplayClient {
    /// Create a client from validated configuration
    pub fn new(config: &ClientConfig) -> AppResult<Self> {
        config.validate()?;

        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            base_url: config.api_base_url.trim().trim_end_matches('/').to_string(),
            http_client,
            session_cookie: config.session_cookie.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_session(&self) -> bool {
        self.session_cookie.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ========================================================================
    // INTERNAL: Request Execution
    // ========================================================================

    /// Attach common headers, send, and turn error statuses into AppError
    async fn send(&self, request: RequestBuilder) -> AppResult<Response> {
        let mut request = request.header(header::ACCEPT, "application/json");

        if let Some(session) = &self.session_cookie {
            request = request.header(
                header::COOKIE,
                format!("{}={}", SESSION_COOKIE_NAME, session),
            );
        }

        let response = request.send().await?;
        let status = response.status();
        debug!("{} {}", status.as_u16(), response.url());

        if status.is_success() {
            return Ok(response);
        }

        // The body may be empty or non-JSON (proxy errors); fall back to the
        // status text
        let text = response.text().await.unwrap_or_default();
        let body: Option<ApiErrorBody> = serde_json::from_str(&text).ok();
        let (code, message) = match body {
            Some(body) => (body.error_code, body.message),
            None => (None, None),
        };

        Err(AppError::Api {
            status: status.as_u16(),
            code,
            message: message.unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Unexpected response")
                    .to_string()
            }),
        })
    }

    async fn get_json<T>(&self, path: &str, query: &[(&str, String)]) -> AppResult<T>
    where
        T: DeserializeOwned,
    {
        let request = self.http_client.get(self.url(path)).query(query);
        let response = self.send(request).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl FavoriteRepository for MoaplayClient {
    async fn list(&self, page: u32, per_page: u32) -> AppResult<FavoritePage> {
        self.get_json(
            "/api/favorites/",
            &[("page", page.to_string()), ("per_page", per_page.to_string())],
        )
        .await
    }

    async fn find_by_event(&self, event_id: i64) -> AppResult<Option<FavoriteRecord>> {
        let body: FavoriteStatusBody = self
            .get_json(&format!("/api/favorites/event/{}", event_id), &[])
            .await?;

        Ok(if body.is_favorited { body.favorite } else { None })
    }

    async fn add(&self, event_id: i64) -> AppResult<FavoriteRecord> {
        let request = self
            .http_client
            .post(self.url("/api/favorites/"))
            .json(&json!({ "event_id": event_id }));

        let response = self.send(request).await?;
        Ok(response.json::<FavoriteRecord>().await?)
    }

    async fn remove(&self, favorite_id: i64) -> AppResult<()> {
        let request = self
            .http_client
            .delete(self.url(&format!("/api/favorites/{}", favorite_id)));

        self.send(request).await?;
        Ok(())
    }
}

#[async_trait]
impl ScheduleRepository for MoaplayClient {
    async fn list(&self, query: ScheduleQuery) -> AppResult<Vec<ScheduleItem>> {
        let body: ScheduleListBody = self
            .get_json("/api/schedules/", &query.to_query_pairs())
            .await?;
        Ok(body.schedules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MonthRange;
    use httpmock::Method::{DELETE, GET, POST};
    use httpmock::MockServer;
    use serde_json::Value;

    fn event_json(id: i64) -> Value {
        json!({
            "id": id,
            "title": "Lantern Festival",
            "summary": null,
            "start_date": "2025-05-10",
            "end_date": "2025-05-12",
            "location": "Seoul",
            "image_urls": [],
            "status": "approved",
            "average_rating": 4.5
        })
    }

    fn record_json(id: i64, event_id: i64) -> Value {
        json!({
            "id": id,
            "user": {"id": 1, "nickname": "mina", "profile_image": null},
            "event": event_json(event_id),
            "created_at": "2025-05-01T10:00:00"
        })
    }

    fn client_for(server: &MockServer, session: Option<&str>) -> MoaplayClient {
        let config = ClientConfig {
            api_base_url: server.base_url(),
            session_cookie: session.map(str::to_string),
            ..ClientConfig::default()
        };
        MoaplayClient::new(&config).unwrap()
    }

    #[test]
    fn test_client_creation_trims_trailing_slash() {
        let config = ClientConfig {
            api_base_url: "https://api.moaplay.kr/".to_string(),
            ..ClientConfig::default()
        };
        let client = MoaplayClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "https://api.moaplay.kr");
        assert!(!client.has_session());
    }

    #[test]
    fn test_client_rejects_invalid_config() {
        let config = ClientConfig {
            api_base_url: "localhost".to_string(),
            ..ClientConfig::default()
        };
        assert!(matches!(MoaplayClient::new(&config), Err(AppError::Config(_))));
    }

    #[tokio::test]
    async fn test_add_favorite_posts_event_id_with_session() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/favorites/")
                    .header("cookie", "session=s3cr3t")
                    .json_body(json!({ "event_id": 42 }));
                then.status(201).json_body(record_json(7, 42));
            })
            .await;

        let client = client_for(&server, Some("s3cr3t"));
        let record = FavoriteRepository::add(&client, 42).await.unwrap();

        mock.assert_async().await;
        assert_eq!(record.id, 7);
        assert_eq!(record.event.id, 42);
    }

    #[tokio::test]
    async fn test_error_body_maps_to_api_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/favorites/");
                then.status(409).json_body(json!({
                    "error_code": "DUPLICATE_FAVORITE",
                    "message": "already favorited"
                }));
            })
            .await;

        let client = client_for(&server, None);
        let err = FavoriteRepository::add(&client, 42).await.unwrap_err();

        assert_eq!(err.status(), Some(409));
        assert_eq!(err.code(), Some("DUPLICATE_FAVORITE"));
    }

    #[tokio::test]
    async fn test_non_json_error_falls_back_to_status_text() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(DELETE).path("/api/favorites/7");
                then.status(500).body("boom");
            })
            .await;

        let client = client_for(&server, None);
        let err = FavoriteRepository::remove(&client, 7).await.unwrap_err();

        match err {
            AppError::Api { status, code, message } => {
                assert_eq!(status, 500);
                assert!(code.is_none());
                assert_eq!(message, "Internal Server Error");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_remove_favorite() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(DELETE).path("/api/favorites/7");
                then.status(200).json_body(json!({ "message": "deleted" }));
            })
            .await;

        let client = client_for(&server, None);
        FavoriteRepository::remove(&client, 7).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_list_favorites_sends_paging() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/favorites/")
                    .query_param("page", "2")
                    .query_param("per_page", "10");
                then.status(200).json_body(json!({
                    "favorites": [record_json(7, 42)],
                    "pagination": {"page": 2, "per_page": 10, "total": 11, "pages": 2}
                }));
            })
            .await;

        let client = client_for(&server, None);
        let page = FavoriteRepository::list(&client, 2, 10).await.unwrap();

        assert_eq!(page.favorites.len(), 1);
        assert_eq!(page.pagination.total, 11);
    }

    #[tokio::test]
    async fn test_find_by_event() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/favorites/event/42");
                then.status(200).json_body(json!({
                    "is_favorited": true,
                    "favorite": record_json(7, 42)
                }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/favorites/event/43");
                then.status(200).json_body(json!({
                    "is_favorited": false,
                    "message": "not in favorites"
                }));
            })
            .await;

        let client = client_for(&server, None);
        let found = client.find_by_event(42).await.unwrap();
        let missing = client.find_by_event(43).await.unwrap();

        assert_eq!(found.map(|r| r.id), Some(7));
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_list_schedules_for_month() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/schedules/")
                    .query_param("year", "2025")
                    .query_param("month", "5");
                then.status(200).json_body(json!({
                    "schedules": [record_json(3, 42)],
                    "total": 1
                }));
            })
            .await;

        let client = client_for(&server, None);
        let range = MonthRange::new(2025, 5).unwrap();
        let items = ScheduleRepository::list(&client, ScheduleQuery::Month(range))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].event.id, 42);
    }
}
