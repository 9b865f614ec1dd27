use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Review state of an event on the platform.
/// Only approved events can be favorited or scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Pending,
    Approved,
    Modified,
    Rejected,
}

/// Event as embedded in favorite and schedule payloads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSummary {
    /// Platform identifier (positive)
    pub id: i64,

    pub title: String,

    #[serde(default)]
    pub summary: Option<String>,

    pub start_date: NaiveDate,

    pub end_date: NaiveDate,

    #[serde(default)]
    pub location: String,

    #[serde(default)]
    pub image_urls: Vec<String>,

    pub status: EventStatus,

    #[serde(default)]
    pub average_rating: f64,
}

impl EventSummary {
    /// True if the event is running on `date` (both ends inclusive)
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// True if any day of the event falls within `[first, last]`
    pub fn overlaps(&self, first: NaiveDate, last: NaiveDate) -> bool {
        self.start_date <= last && self.end_date >= first
    }
}

/// Owner of a favorite or schedule entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: i64,
    pub nickname: String,
    #[serde(default)]
    pub profile_image: Option<String>,
}
