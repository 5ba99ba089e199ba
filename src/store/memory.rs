// src/store/memory.rs

use std::{
    collections::{BTreeMap, HashMap},
    sync::atomic::{AtomicU32, Ordering},
};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    error::{AppError, GameError},
    models::{
        contest::Contest,
        leaderboard::{Board, FriendScore, LeaderboardEntry, ScoreCredit},
        question::{Question, QuestionCriteria, Topic},
        session::Session,
        user::{ProfileUpdate, UserProfile},
    },
    store::{DocumentStore, Leaderboard, SessionStore, friends_passed, rank_friends_above},
};

/// In-process store implementing every collaborator. Used by tests and local demos.
///
/// The inherent methods are test seams for seeding and inspecting state. Only
/// `race_contest_writes` changes how the traits behave.
#[derive(Default)]
pub struct MemoryStore {
    sessions: RwLock<HashMap<String, Session>>,
    contests: RwLock<HashMap<String, Contest>>,
    questions: RwLock<BTreeMap<i64, Question>>,
    topics: RwLock<HashMap<i64, Topic>>,
    users: RwLock<HashMap<String, UserProfile>>,
    boards: RwLock<HashMap<String, HashMap<String, LeaderboardEntry>>>,
    /// Upcoming contest writes that lose to a simulated concurrent writer. Zero
    /// outside tests.
    contest_races: AtomicU32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Test seams.

    /// Makes the next `count` contest writes fail as if another writer had bumped
    /// the version first. Lets tests drive the compare-and-swap retry path.
    pub fn race_contest_writes(&self, count: u32) {
        self.contest_races.store(count, Ordering::SeqCst);
    }

    pub async fn insert_session(&self, session: Session) {
        self.sessions.write().await.insert(session.id.clone(), session);
    }

    pub async fn insert_contest(&self, contest: Contest) {
        self.contests.write().await.insert(contest.id.clone(), contest);
    }

    pub async fn insert_question(&self, question: Question) {
        self.questions.write().await.insert(question.id, question);
    }

    pub async fn insert_topic(&self, topic: Topic) {
        self.topics.write().await.insert(topic.id, topic);
    }

    pub async fn insert_user(&self, user: UserProfile) {
        self.users.write().await.insert(user.id.clone(), user);
    }

    pub async fn session(&self, token: &str) -> Option<Session> {
        self.sessions.read().await.get(token).cloned()
    }

    pub async fn contest(&self, contest_id: &str) -> Option<Contest> {
        self.contests.read().await.get(contest_id).cloned()
    }

    pub async fn question(&self, question_id: i64) -> Option<Question> {
        self.questions.read().await.get(&question_id).cloned()
    }

    pub async fn user(&self, user_id: &str) -> Option<UserProfile> {
        self.users.read().await.get(user_id).cloned()
    }

    fn take_race(&self) -> bool {
        self.contest_races
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok()
    }
}

fn matches(question: &Question, criteria: &QuestionCriteria) -> bool {
    question.topic_id == criteria.topic_id && !criteria.exclude.contains(&question.id)
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn load_session(&self, token: &str) -> Result<Session, AppError> {
        self.sessions
            .read()
            .await
            .get(token)
            .cloned()
            .ok_or(AppError::Game(GameError::SessionExpired))
    }

    async fn save_session(&self, session: &Session) -> Result<(), AppError> {
        self.sessions
            .write()
            .await
            .insert(session.id.clone(), session.clone());
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get_contest(&self, contest_id: &str) -> Result<Option<Contest>, AppError> {
        Ok(self.contests.read().await.get(contest_id).cloned())
    }

    async fn update_contest(&self, contest: &Contest, expected_version: i64) -> Result<bool, AppError> {
        let mut contests = self.contests.write().await;
        let Some(stored) = contests.get_mut(&contest.id) else {
            return Ok(false);
        };
        if self.take_race() {
            stored.version += 1;
            return Ok(false);
        }
        if stored.version != expected_version {
            return Ok(false);
        }
        *stored = Contest {
            version: expected_version + 1,
            ..contest.clone()
        };
        Ok(true)
    }

    async fn count_questions(&self, criteria: &QuestionCriteria) -> Result<u64, AppError> {
        let questions = self.questions.read().await;
        Ok(questions.values().filter(|q| matches(q, criteria)).count() as u64)
    }

    async fn question_at(&self, criteria: &QuestionCriteria, skip: u64) -> Result<Option<Question>, AppError> {
        let questions = self.questions.read().await;
        Ok(questions
            .values()
            .filter(|q| matches(q, criteria))
            .nth(skip as usize)
            .cloned())
    }

    async fn get_topic(&self, topic_id: i64) -> Result<Option<Topic>, AppError> {
        Ok(self.topics.read().await.get(&topic_id).cloned())
    }

    async fn record_answer(&self, question_id: i64, correct: bool) -> Result<(), AppError> {
        if let Some(question) = self.questions.write().await.get_mut(&question_id) {
            if correct {
                question.correct_count += 1;
            } else {
                question.wrong_count += 1;
            }
        }
        Ok(())
    }

    async fn set_user_profile(&self, user_id: &str, update: &ProfileUpdate) -> Result<(), AppError> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(user_id)
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;
        user.score = update.score;
        user.xp = update.xp;
        user.rank = update.rank;
        Ok(())
    }
}

#[async_trait]
impl Leaderboard for MemoryStore {
    async fn friends_above_me(&self, user_id: &str, limit: i64) -> Result<Vec<FriendScore>, AppError> {
        let users = self.users.read().await;
        let Some(me) = users.get(user_id) else {
            return Ok(Vec::new());
        };
        let friends = me
            .friends
            .iter()
            .filter_map(|id| users.get(id))
            .map(|friend| FriendScore {
                id: friend.id.clone(),
                name: friend.name.clone(),
                score: friend.score,
            })
            .collect();
        Ok(rank_friends_above(friends, me.score, limit))
    }

    async fn passed_friends(
        &self,
        friends_above_me: &[FriendScore],
        user_id: &str,
    ) -> Result<Vec<FriendScore>, AppError> {
        let my_score = self.users.read().await.get(user_id).map_or(0, |me| me.score);
        Ok(friends_passed(friends_above_me, my_score))
    }

    async fn add_score(&self, credit: &ScoreCredit) -> Result<(), AppError> {
        let mut boards = self.boards.write().await;
        for board in credit.boards() {
            boards
                .entry(board.key())
                .or_default()
                .entry(credit.facebook_user_id.clone())
                .and_modify(|entry| {
                    entry.score += credit.amount;
                    entry.name = credit.name.clone();
                    entry.avatar = credit.avatar.clone();
                })
                .or_insert_with(|| LeaderboardEntry {
                    facebook_user_id: credit.facebook_user_id.clone(),
                    name: credit.name.clone(),
                    avatar: credit.avatar.clone(),
                    score: credit.amount,
                });
        }
        Ok(())
    }

    async fn top(&self, board: &Board, limit: i64) -> Result<Vec<LeaderboardEntry>, AppError> {
        let boards = self.boards.read().await;
        let mut entries: Vec<LeaderboardEntry> = boards
            .get(&board.key())
            .map(|entries| entries.values().cloned().collect())
            .unwrap_or_default();
        entries.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.facebook_user_id.cmp(&b.facebook_user_id))
        });
        entries.truncate(limit.max(0) as usize);
        Ok(entries)
    }
}
