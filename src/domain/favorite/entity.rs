use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::event::{EventSummary, UserSummary};

/// A user's bookmark of an event, as stored by the favorites service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteRecord {
    /// Server-assigned record identifier (used for deletion)
    pub id: i64,

    #[serde(default)]
    pub user: Option<UserSummary>,

    pub event: EventSummary,

    pub created_at: NaiveDateTime,
}

/// Page metadata returned by `GET /api/favorites/`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
    pub total: u32,
    pub pages: u32,
}

impl Pagination {
    /// True when this page contains every favorite the user has
    pub fn is_complete(&self) -> bool {
        self.page <= 1 && self.pages <= 1
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoritePage {
    pub favorites: Vec<FavoriteRecord>,
    pub pagination: Pagination,
}

impl FavoritePage {
    pub fn empty(per_page: u32) -> Self {
        Self {
            favorites: Vec::new(),
            pagination: Pagination {
                page: 1,
                per_page,
                total: 0,
                pages: 1,
            },
        }
    }
}

/// A confirmed favorite state for one event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteState {
    pub is_favorite: bool,
    pub favorite_id: Option<i64>,
}

impl FavoriteState {
    pub fn favorited(favorite_id: i64) -> Self {
        Self {
            is_favorite: true,
            favorite_id: Some(favorite_id),
        }
    }

    pub fn not_favorited() -> Self {
        Self {
            is_favorite: false,
            favorite_id: None,
        }
    }
}

/// Per-event toggle state machine.
///
/// ```text
/// Settled(old) --begin--> Pending { previous: old, optimistic: !old }
/// Pending      --commit-> Settled(new)
/// Pending      --rollback-> Settled(old)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleState {
    Settled(FavoriteState),
    Pending {
        previous: FavoriteState,
        optimistic: bool,
    },
}

impl ToggleState {
    /// Start a toggle from a confirmed state
    pub fn begin(previous: FavoriteState) -> Self {
        ToggleState::Pending {
            previous,
            optimistic: !previous.is_favorite,
        }
    }

    /// Settle on the state the server confirmed
    pub fn commit(confirmed: FavoriteState) -> Self {
        ToggleState::Settled(confirmed)
    }

    /// Return to the state held before the toggle began
    pub fn rollback(self) -> Self {
        ToggleState::Settled(self.confirmed())
    }

    /// Value shown to the user right now (optimistic while pending)
    pub fn displayed(&self) -> bool {
        match self {
            ToggleState::Settled(state) => state.is_favorite,
            ToggleState::Pending { optimistic, .. } => *optimistic,
        }
    }

    /// Last state confirmed by the server
    pub fn confirmed(&self) -> FavoriteState {
        match self {
            ToggleState::Settled(state) => *state,
            ToggleState::Pending { previous, .. } => *previous,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, ToggleState::Pending { .. })
    }
}

/// Result of a toggle request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleOutcome {
    pub event_id: i64,
    pub is_favorite: bool,
    pub favorite_id: Option<i64>,
    /// False when the request was not sent because another toggle for
    /// the event was still in flight
    pub changed: bool,
}

impl ToggleOutcome {
    /// A toggle the server confirmed
    pub fn new(event_id: i64, state: FavoriteState) -> Self {
        Self {
            event_id,
            is_favorite: state.is_favorite,
            favorite_id: state.favorite_id,
            changed: true,
        }
    }

    /// A toggle that was not sent; carries the last confirmed state
    pub fn ignored(event_id: i64, state: FavoriteState) -> Self {
        Self {
            changed: false,
            ..Self::new(event_id, state)
        }
    }
}
