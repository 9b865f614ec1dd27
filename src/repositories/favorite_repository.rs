// src/repositories/favorite_repository.rs
//
// Access to the remote favorites service.
// The service owns FavoriteRecords; the client only caches them.

use async_trait::async_trait;

use crate::domain::{FavoritePage, FavoriteRecord};
use crate::error::AppResult;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FavoriteRepository: Send + Sync {
    /// `GET /api/favorites/` (newest first)
    async fn list(&self, page: u32, per_page: u32) -> AppResult<FavoritePage>;

    /// `GET /api/favorites/event/{event_id}`; None if not favorited
    async fn find_by_event(&self, event_id: i64) -> AppResult<Option<FavoriteRecord>>;

    /// `POST /api/favorites/`
    async fn add(&self, event_id: i64) -> AppResult<FavoriteRecord>;

    /// `DELETE /api/favorites/{favorite_id}`
    async fn remove(&self, favorite_id: i64) -> AppResult<()>;
}
