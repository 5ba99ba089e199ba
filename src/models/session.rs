// src/models/session.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::quiz::Quiz;

/// Represents a logged-in session, keyed by its opaque token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Opaque session token (the `sub` of the bearer JWT).
    pub id: String,

    pub user_id: String,
    pub facebook_user_id: String,
    pub name: String,
    pub avatar: String,

    /// Lifetime score.
    pub score: i64,
    pub xp: i64,
    pub rank: u32,

    pub settings: SessionSettings,

    /// Features unlocked by the current rank.
    #[serde(default)]
    pub features: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiz: Option<Quiz>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    pub language: String,
    pub sound: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            sound: true,
        }
    }
}

/// DTO for updating session settings.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSettingsRequest {
    #[validate(length(min = 2, max = 8))]
    pub language: Option<String>,
    pub sound: Option<bool>,
}
