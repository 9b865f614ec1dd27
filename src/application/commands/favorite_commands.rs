// src/application/commands/favorite_commands.rs
//
// Favorite Command Handlers
//
// RULES:
// - Gate on the session
// - Call services
// - Return DTOs
// - Never contain business logic

use crate::application::{dto::*, error_handling::ErrorResponse, state::AppState};
use crate::error::{AppError, AppResult};
use crate::handle_command;

/// Favorite button click.
///
/// Toggles the favorite and, once the server confirmed a change, waits
/// for every mounted calendar to refresh.
pub async fn toggle_favorite(
    state: &AppState,
    event_id: i64,
    current: bool,
    favorite_id: Option<i64>,
) -> Result<ToggleFavoriteDto, String> {
    handle_command!(run_toggle(state, event_id, current, favorite_id).await)
}

async fn run_toggle(
    state: &AppState,
    event_id: i64,
    current: bool,
    favorite_id: Option<i64>,
) -> AppResult<ToggleFavoriteDto> {
    if !state.auth.is_authenticated() {
        return Err(AppError::AuthRequired);
    }

    let outcome = state
        .favorite_service
        .toggle(event_id, current, favorite_id)
        .await?;

    // Nothing was sent when a toggle for this event was already in flight
    let report = if outcome.changed {
        state.calendar_coordinator.on_favorite_change(event_id).await
    } else {
        Default::default()
    };

    Ok(ToggleFavoriteDto::new(outcome, report))
}

/// One page of the user's favorites; empty when logged out
pub async fn load_favorites(
    state: &AppState,
    page: Option<u32>,
    per_page: Option<u32>,
) -> Result<FavoriteListDto, String> {
    let page = page.unwrap_or(1);
    let per_page = per_page.unwrap_or(state.config.favorites_page_size);

    if !state.auth.is_authenticated() {
        return Ok(FavoriteListDto::from(crate::domain::FavoritePage::empty(per_page)));
    }

    handle_command!(state
        .favorite_service
        .load_favorites(page, per_page)
        .await
        .map(FavoriteListDto::from))
}

/// Favorite state of one event. Uses the known state when settled and
/// asks the server otherwise; always false when logged out.
pub async fn favorite_status(state: &AppState, event_id: i64) -> Result<FavoriteStatusDto, String> {
    if event_id <= 0 {
        return Err(ErrorResponse::validation(format!("Invalid event id {}", event_id)).to_json());
    }

    if !state.auth.is_authenticated() {
        return Ok(FavoriteStatusDto {
            event_id,
            is_favorite: false,
            favorite_id: None,
        });
    }

    if let Some(known) = state.favorite_service.state_of(event_id) {
        if !known.is_pending() {
            let confirmed = known.confirmed();
            return Ok(FavoriteStatusDto {
                event_id,
                is_favorite: confirmed.is_favorite,
                favorite_id: confirmed.favorite_id,
            });
        }
    }

    let confirmed = handle_command!(state.favorite_service.resolve_status(event_id).await)?;

    Ok(FavoriteStatusDto {
        event_id,
        is_favorite: confirmed.is_favorite,
        favorite_id: confirmed.favorite_id,
    })
}

/// Refresh every mounted calendar
pub async fn refresh_calendars(state: &AppState) -> Result<RefreshReportDto, String> {
    let report = state.calendar_coordinator.refresh_all().await;
    Ok(RefreshReportDto::from(report))
}
