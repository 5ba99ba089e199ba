// src/models/contest.rs

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::session::Session;

/// One of the two teams of a contest. Serialized as `0` or `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TeamId {
    First,
    Second,
}

impl TeamId {
    pub fn index(self) -> usize {
        match self {
            TeamId::First => 0,
            TeamId::Second => 1,
        }
    }

    pub fn other(self) -> TeamId {
        match self {
            TeamId::First => TeamId::Second,
            TeamId::Second => TeamId::First,
        }
    }
}

impl TryFrom<u8> for TeamId {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(TeamId::First),
            1 => Ok(TeamId::Second),
            other => Err(format!("team must be 0 or 1, got {}", other)),
        }
    }
}

impl From<TeamId> for u8 {
    fn from(team: TeamId) -> Self {
        team.index() as u8
    }
}

/// Public identity of a contest or team leader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Leader {
    pub user_id: String,
    pub name: String,
    pub avatar: String,
}

impl From<&Session> for Leader {
    fn from(session: &Session) -> Self {
        Self {
            user_id: session.user_id.clone(),
            name: session.name.clone(),
            avatar: session.avatar.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Team {
    pub score: i64,
    #[serde(default)]
    pub leader: Option<Leader>,
}

/// A participant's standing inside one contest.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContestUser {
    pub team: TeamId,

    /// Everything this user scored in the contest.
    pub score: i64,

    /// What this user contributed to each team, indexed by `TeamId::index`.
    #[serde(default)]
    pub team_scores: [i64; 2],

    #[serde(default)]
    pub last_played: Option<DateTime<Utc>>,
}

/// Represents a contest document.
///
/// Invariants kept by the scoring engine:
/// * `score == teams[0].score + teams[1].score`
/// * every leader references a user present in `users`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contest {
    pub id: String,

    #[serde(default)]
    pub name: String,

    pub score: i64,

    pub teams: [Team; 2],

    #[serde(default)]
    pub users: HashMap<String, ContestUser>,

    #[serde(default)]
    pub leader: Option<Leader>,

    /// Write version used for compare-and-swap updates.
    #[serde(default)]
    pub version: i64,
}

impl Contest {
    pub fn team(&self, team: TeamId) -> &Team {
        &self.teams[team.index()]
    }

    pub fn team_mut(&mut self, team: TeamId) -> &mut Team {
        &mut self.teams[team.index()]
    }

    /// How far `team` is ahead of the other team, as a percentage of the contest score.
    /// Negative when `team` trails. Zero for a contest nobody has scored in yet.
    pub fn team_distance_percent(&self, team: TeamId) -> f64 {
        if self.score <= 0 {
            return 0.0;
        }
        let distance = self.team(team).score - self.team(team.other()).score;
        distance as f64 * 100.0 / self.score as f64
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamView {
    pub score: i64,
    /// Share of the contest score, floored. 50/50 before anyone scored.
    pub percent: u32,
    pub leader: Option<Leader>,
}

/// Contest projection returned to a participant.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContestView {
    pub id: String,
    pub name: String,
    pub score: i64,
    pub teams: [TeamView; 2],
    pub leader: Option<Leader>,
    pub my_team: Option<TeamId>,
    pub my_score: i64,
    pub participants: usize,
}

impl ContestView {
    pub fn for_user(contest: &Contest, user_id: &str) -> Self {
        let percent = |team: &Team| -> u32 {
            if contest.score <= 0 {
                50
            } else {
                (team.score.max(0) * 100 / contest.score) as u32
            }
        };
        let me = contest.users.get(user_id);

        Self {
            id: contest.id.clone(),
            name: contest.name.clone(),
            score: contest.score,
            teams: [
                TeamView {
                    score: contest.teams[0].score,
                    percent: percent(&contest.teams[0]),
                    leader: contest.teams[0].leader.clone(),
                },
                TeamView {
                    score: contest.teams[1].score,
                    percent: percent(&contest.teams[1]),
                    leader: contest.teams[1].leader.clone(),
                },
            ],
            leader: contest.leader.clone(),
            my_team: me.map(|user| user.team),
            my_score: me.map_or(0, |user| user.score),
            participants: contest.users.len(),
        }
    }
}
