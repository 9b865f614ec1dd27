// src/application/dto/mod.rs
//
// Data Transfer Objects
//
// CRITICAL PRINCIPLES:
// - DTOs are UI-friendly representations
// - DTOs NEVER leak domain invariants
// - DTOs are simple, serializable structs
// - Conversion FROM domain entities only (never TO)

use serde::{Deserialize, Serialize};

use crate::domain::{FavoritePage, FavoriteRecord, ScheduleItem, ToggleOutcome};
use crate::services::RefreshReport;

// ============================================================================
// FAVORITE DTOs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoriteDto {
    pub id: i64,
    pub event_id: i64,
    pub event_title: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    pub thumbnail: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoriteListDto {
    pub favorites: Vec<FavoriteDto>,
    pub page: u32,
    pub per_page: u32,
    pub total: u32,
    pub pages: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteStatusDto {
    pub event_id: i64,
    pub is_favorite: bool,
    pub favorite_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleFavoriteDto {
    pub event_id: i64,
    pub is_favorite: bool,
    pub favorite_id: Option<i64>,
    /// False when the click was ignored because a toggle was in flight
    pub changed: bool,
    /// Calendar views refreshed after the change
    pub calendars_refreshed: usize,
    pub calendars_failed: usize,
}

// ============================================================================
// CALENDAR DTOs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleEntryDto {
    pub schedule_id: i64,
    pub event_id: i64,
    pub title: String,
    pub start_date: String,
    pub end_date: String,
    pub location: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshReportDto {
    pub attempted: usize,
    pub failed: usize,
}

// ============================================================================
// CONVERSIONS
// ============================================================================

impl From<FavoriteRecord> for FavoriteDto {
    fn from(record: FavoriteRecord) -> Self {
        Self {
            id: record.id,
            event_id: record.event.id,
            event_title: record.event.title,
            location: record.event.location,
            start_date: record.event.start_date.to_string(),
            end_date: record.event.end_date.to_string(),
            thumbnail: record.event.image_urls.into_iter().next(),
            created_at: record.created_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
        }
    }
}

impl From<FavoritePage> for FavoriteListDto {
    fn from(page: FavoritePage) -> Self {
        Self {
            favorites: page.favorites.into_iter().map(FavoriteDto::from).collect(),
            page: page.pagination.page,
            per_page: page.pagination.per_page,
            total: page.pagination.total,
            pages: page.pagination.pages,
        }
    }
}

impl From<ToggleOutcome> for FavoriteStatusDto {
    fn from(outcome: ToggleOutcome) -> Self {
        Self {
            event_id: outcome.event_id,
            is_favorite: outcome.is_favorite,
            favorite_id: outcome.favorite_id,
        }
    }
}

impl ToggleFavoriteDto {
    pub fn new(outcome: ToggleOutcome, report: RefreshReport) -> Self {
        Self {
            event_id: outcome.event_id,
            is_favorite: outcome.is_favorite,
            favorite_id: outcome.favorite_id,
            changed: outcome.changed,
            calendars_refreshed: report.attempted,
            calendars_failed: report.failed,
        }
    }
}

impl From<ScheduleItem> for ScheduleEntryDto {
    fn from(item: ScheduleItem) -> Self {
        Self {
            schedule_id: item.id,
            event_id: item.event.id,
            title: item.event.title,
            start_date: item.event.start_date.to_string(),
            end_date: item.event.end_date.to_string(),
            location: item.event.location,
        }
    }
}

impl From<RefreshReport> for RefreshReportDto {
    fn from(report: RefreshReport) -> Self {
        Self {
            attempted: report.attempted,
            failed: report.failed,
        }
    }
}
