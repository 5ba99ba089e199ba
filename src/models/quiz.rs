// src/models/quiz.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{
    contest::TeamId,
    leaderboard::FriendScore,
    question::{ClientQuestion, Question},
};

/// A quiz in progress, stored inside the session between requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub client_data: QuizClientData,
    pub server_data: QuizServerData,
}

/// Quiz state the client is allowed to see.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizClientData {
    pub total_questions: usize,

    /// -1 until the first question has been served.
    pub current_question_index: i32,

    pub finished: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_question: Option<ClientQuestion>,
}

/// Quiz state that never leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizServerData {
    /// Ids served so far, in order. Used to exclude repeats.
    pub previous_questions: Vec<i64>,

    pub contest_id: String,

    pub score: i64,

    pub correct_answers: usize,

    /// Full copy of the current question, correct flags included.
    #[serde(default)]
    pub current_question: Option<Question>,

    #[serde(default)]
    pub share: Share,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Share {
    pub data: BackgroundFacts,
    #[serde(default)]
    pub stories: Vec<Story>,
}

/// Contest facts captured when the quiz starts, compared against the final state
/// to detect shareable milestones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundFacts {
    pub leading_team: Option<TeamId>,

    #[serde(default)]
    pub my_team_started_behind: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub friends_above_me: Option<Vec<FriendScore>>,
}

/// Narrative event emitted when a finished quiz crosses a shareable milestone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "id", rename_all = "camelCase")]
pub enum Story {
    BecameContestLeader,
    BecameTeamLeader,
    PerfectScore,
    MyTeamStartedLeading,
    MyTeamAlmostLeads,
    PassedFriends {
        #[serde(rename = "passedFriends")]
        passed_friends: Vec<FriendScore>,
    },
}

/// DTO for starting a quiz.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StartQuizRequest {
    #[validate(length(min = 1, max = 64))]
    pub contest_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    InProgress,
    Finished,
}
