// src/services/auth_context.rs
//
// Session holder. Favorite toggles and calendar loads are gated on it.

use std::sync::{PoisonError, RwLock};

use log::info;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: i64,
    pub nickname: String,
}

#[derive(Default)]
pub struct AuthContext {
    user: RwLock<Option<SessionUser>>,
}

impl AuthContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn login(&self, user: SessionUser) {
        info!("User {} ({}) logged in", user.id, user.nickname);
        *self.user.write().unwrap_or_else(PoisonError::into_inner) = Some(user);
    }

    /// Returns the user that was logged in, if any
    pub fn logout(&self) -> Option<SessionUser> {
        let previous = self
            .user
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(user) = &previous {
            info!("User {} logged out", user.id);
        }
        previous
    }

    pub fn is_authenticated(&self) -> bool {
        self.user
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub fn current_user(&self) -> Option<SessionUser> {
        self.user
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
