// src/models/leaderboard.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::contest::TeamId;

/// A leaderboard scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Board {
    /// Lifetime scores across all contests.
    General,
    Contest(String),
    Team(String, TeamId),
}

impl Board {
    pub fn key(&self) -> String {
        match self {
            Board::General => "general".to_string(),
            Board::Contest(contest_id) => format!("contest:{}", contest_id),
            Board::Team(contest_id, team) => format!("contest:{}:team:{}", contest_id, team.index()),
        }
    }
}

/// One row of a leaderboard.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub facebook_user_id: String,
    pub name: String,
    pub avatar: String,
    pub score: i64,
}

/// A friend's lifetime score, as captured at quiz start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct FriendScore {
    pub id: String,
    pub name: String,
    pub score: i64,
}

/// Score earned by a finished quiz, credited to every board it counts on.
#[derive(Debug, Clone)]
pub struct ScoreCredit {
    pub contest_id: String,
    pub team: TeamId,
    pub amount: i64,
    pub facebook_user_id: String,
    pub name: String,
    pub avatar: String,
}

impl ScoreCredit {
    pub fn boards(&self) -> [Board; 3] {
        [
            Board::General,
            Board::Contest(self.contest_id.clone()),
            Board::Team(self.contest_id.clone(), self.team),
        ]
    }
}

/// Query parameters for reading a contest leaderboard.
#[derive(Debug, Deserialize)]
pub struct LeaderboardParams {
    pub team: Option<u8>,
    pub limit: Option<i64>,
}
