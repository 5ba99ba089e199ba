// src/store/mod.rs

//! Storage collaborators of the quiz pipeline.
//!
//! `PgStore` backs a running server; `MemoryStore` backs the integration tests.

pub mod cache;
pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::{
    error::AppError,
    models::{
        contest::Contest,
        leaderboard::{Board, FriendScore, LeaderboardEntry, ScoreCredit},
        question::{Question, QuestionCriteria, Topic},
        session::Session,
        user::ProfileUpdate,
    },
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Sessions keyed by their opaque token.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Fails with `SessionExpired` when no session exists for `token`.
    async fn load_session(&self, token: &str) -> Result<Session, AppError>;

    async fn save_session(&self, session: &Session) -> Result<(), AppError>;
}

/// Contests, questions, topics and user profiles.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get_contest(&self, contest_id: &str) -> Result<Option<Contest>, AppError>;

    /// Writes `contest` only if the stored version still equals `expected_version`.
    ///
    /// Returns `false` when another writer got there first; the stored version is
    /// bumped on success.
    async fn update_contest(&self, contest: &Contest, expected_version: i64) -> Result<bool, AppError>;

    async fn count_questions(&self, criteria: &QuestionCriteria) -> Result<u64, AppError>;

    /// The `skip`-th matching question, ordered by id.
    async fn question_at(&self, criteria: &QuestionCriteria, skip: u64) -> Result<Option<Question>, AppError>;

    async fn get_topic(&self, topic_id: i64) -> Result<Option<Topic>, AppError>;

    /// Bumps the correct or wrong answer counter of a question.
    async fn record_answer(&self, question_id: i64, correct: bool) -> Result<(), AppError>;

    async fn set_user_profile(&self, user_id: &str, update: &ProfileUpdate) -> Result<(), AppError>;
}

/// Score boards and friend comparisons.
#[async_trait]
pub trait Leaderboard: Send + Sync {
    /// Friends of `user_id` whose lifetime score is above the user's, lowest first.
    async fn friends_above_me(&self, user_id: &str, limit: i64) -> Result<Vec<FriendScore>, AppError>;

    /// Those of `friends_above_me` the user has now passed.
    async fn passed_friends(
        &self,
        friends_above_me: &[FriendScore],
        user_id: &str,
    ) -> Result<Vec<FriendScore>, AppError>;

    async fn add_score(&self, credit: &ScoreCredit) -> Result<(), AppError>;

    async fn top(&self, board: &Board, limit: i64) -> Result<Vec<LeaderboardEntry>, AppError>;
}

/// Friends strictly above `my_score`, lowest first, capped at `limit`.
pub(crate) fn rank_friends_above(mut friends: Vec<FriendScore>, my_score: i64, limit: i64) -> Vec<FriendScore> {
    friends.retain(|friend| friend.score > my_score);
    friends.sort_by(|a, b| a.score.cmp(&b.score).then_with(|| a.id.cmp(&b.id)));
    friends.truncate(limit.max(0) as usize);
    friends
}

/// Friends captured at quiz start whose score `my_score` now exceeds.
pub(crate) fn friends_passed(friends_above_me: &[FriendScore], my_score: i64) -> Vec<FriendScore> {
    friends_above_me
        .iter()
        .filter(|friend| my_score > friend.score)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn friend(id: &str, score: i64) -> FriendScore {
        FriendScore {
            id: id.to_string(),
            name: id.to_uppercase(),
            score,
        }
    }

    #[test]
    fn friends_above_are_sorted_and_capped() {
        let friends = vec![friend("a", 500), friend("b", 90), friend("c", 120), friend("d", 100)];

        let above = rank_friends_above(friends, 100, 2);

        assert_eq!(above, vec![friend("c", 120), friend("a", 500)]);
    }

    #[test]
    fn equal_score_is_not_passed() {
        let captured = vec![friend("c", 120), friend("a", 500)];
        assert!(friends_passed(&captured, 120).is_empty());
        assert_eq!(friends_passed(&captured, 121), vec![friend("c", 120)]);
    }
}
