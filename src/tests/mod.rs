//! End-to-end tests against a mocked backend.
//!
//! Each test wires a full `AppState` to an httpmock server, so requests go
//! through the real REST client.

use serde_json::{json, Value};

use crate::application::AppState;
use crate::config::ClientConfig;
use crate::services::SessionUser;


pub fn event_json(id: i64, start: &str, end: &str) -> Value {
    json!({
        "id": id,
        "title": format!("Event {}", id),
        "summary": null,
        "start_date": start,
        "end_date": end,
        "location": "Daegu",
        "image_urls": [],
        "status": "approved",
        "average_rating": 0.0
    })
}

pub fn favorite_json(id: i64, event_id: i64) -> Value {
    json!({
        "id": id,
        "user": {"id": 1, "nickname": "mina", "profile_image": null},
        "event": event_json(event_id, "2025-05-10", "2025-05-12"),
        "created_at": "2025-05-01T10:00:00"
    })
}

pub fn schedule_json(id: i64, event_id: i64) -> Value {
    json!({
        "id": id,
        "user": {"id": 1, "nickname": "mina", "profile_image": null},
        "event": event_json(event_id, "2025-05-10", "2025-05-12"),
        "created_at": "2025-05-02T08:00:00"
    })
}

/// Logged-in state pointed at `base_url`
pub fn signed_in_state(base_url: String) -> AppState {
    let config = ClientConfig {
        api_base_url: base_url,
        session_cookie: Some("s3cr3t".to_string()),
        ..ClientConfig::default()
    };
    let state = AppState::new(config).expect("valid test config");
    state.auth.login(SessionUser {
        id: 1,
        nickname: "mina".to_string(),
    });
    state
}
