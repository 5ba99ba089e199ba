// src/models/user.rs

use serde::{Deserialize, Serialize};

/// Represents the persisted user profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub facebook_user_id: String,
    pub name: String,
    pub avatar: String,
    pub score: i64,
    pub xp: i64,
    pub rank: u32,

    /// User ids of the user's friends.
    #[serde(default)]
    pub friends: Vec<String>,
}

/// Fields written back to the profile when a quiz grants score or XP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProfileUpdate {
    pub score: i64,
    pub xp: i64,
    pub rank: u32,
}
