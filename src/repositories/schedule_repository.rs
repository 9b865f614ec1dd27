// src/repositories/schedule_repository.rs

use async_trait::async_trait;

use crate::domain::{ScheduleItem, ScheduleQuery};
use crate::error::AppResult;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    /// `GET /api/schedules/`, ordered by event start date
    async fn list(&self, query: ScheduleQuery) -> AppResult<Vec<ScheduleItem>>;
}
