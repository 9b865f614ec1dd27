// src/application/commands/session_commands.rs
//
// Session Command Handlers
//
// Calendars follow the session: they reload on login and empty out on
// logout. Favorite state never survives a logout.

use crate::application::{dto::RefreshReportDto, state::AppState};
use crate::services::SessionUser;

pub async fn login(state: &AppState, user: SessionUser) -> Result<RefreshReportDto, String> {
    state.auth.login(user);
    let report = state.calendar_coordinator.refresh_all().await;
    Ok(RefreshReportDto::from(report))
}

pub async fn logout(state: &AppState) -> Result<RefreshReportDto, String> {
    state.auth.logout();
    state.favorite_service.clear();
    state.notifier.clear_statuses();
    let report = state.calendar_coordinator.refresh_all().await;
    Ok(RefreshReportDto::from(report))
}
