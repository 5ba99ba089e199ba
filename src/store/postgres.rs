// src/store/postgres.rs

use std::time::Duration;

use async_trait::async_trait;
use sqlx::{PgPool, types::Json};

use crate::{
    error::{AppError, GameError},
    models::{
        contest::Contest,
        leaderboard::{Board, FriendScore, LeaderboardEntry, ScoreCredit},
        question::{Direction, Question, QuestionCriteria, Topic},
        session::Session,
        user::ProfileUpdate,
    },
    store::{DocumentStore, Leaderboard, SessionStore, cache::TopicCache, friends_passed},
};

/// Postgres-backed implementation of every store collaborator.
///
/// Sessions, contests and questions are JSONB documents; leaderboards are rows keyed
/// by board.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    topics: TopicCache,
}

impl PgStore {
    pub fn new(pool: PgPool, topic_cache_ttl: Duration) -> Self {
        Self {
            pool,
            topics: TopicCache::with_ttl(topic_cache_ttl),
        }
    }

    async fn fetch_topic(&self, topic_id: i64) -> Result<Option<Topic>, AppError> {
        let row: Option<(i64, String, Option<String>)> =
            sqlx::query_as("SELECT id, name, force_direction FROM topics WHERE id = $1")
                .bind(topic_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to fetch topic {}: {:?}", topic_id, e);
                    AppError::InternalServerError(e.to_string())
                })?;

        Ok(row.map(|(id, name, force_direction)| Topic {
            id,
            name,
            force_direction: force_direction.as_deref().and_then(|d| match d {
                "rtl" => Some(Direction::Rtl),
                "ltr" => Some(Direction::Ltr),
                _ => None,
            }),
        }))
    }

    async fn user_score(&self, user_id: &str) -> Result<i64, AppError> {
        let score: Option<i64> = sqlx::query_scalar("SELECT score FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(score.unwrap_or(0))
    }
}

#[async_trait]
impl SessionStore for PgStore {
    async fn load_session(&self, token: &str) -> Result<Session, AppError> {
        let data: Option<Json<Session>> = sqlx::query_scalar("SELECT data FROM sessions WHERE token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load session: {:?}", e);
                AppError::InternalServerError(e.to_string())
            })?;

        data.map(|Json(session)| session)
            .ok_or(AppError::Game(GameError::SessionExpired))
    }

    async fn save_session(&self, session: &Session) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO sessions (token, user_id, data, updated_at)
            VALUES ($1, $2, $3, CURRENT_TIMESTAMP)
            ON CONFLICT (token) DO UPDATE SET
                data = EXCLUDED.data,
                updated_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(&session.id)
        .bind(&session.user_id)
        .bind(Json(session))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to save session: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn get_contest(&self, contest_id: &str) -> Result<Option<Contest>, AppError> {
        let row: Option<(i64, Json<Contest>)> =
            sqlx::query_as("SELECT version, data FROM contests WHERE id = $1")
                .bind(contest_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(version, Json(mut contest))| {
            contest.version = version;
            contest
        }))
    }

    async fn update_contest(&self, contest: &Contest, expected_version: i64) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE contests SET data = $1, version = version + 1 WHERE id = $2 AND version = $3",
        )
        .bind(Json(contest))
        .bind(&contest.id)
        .bind(expected_version)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update contest {}: {:?}", contest.id, e);
            AppError::InternalServerError(e.to_string())
        })?;

        Ok(result.rows_affected() == 1)
    }

    async fn count_questions(&self, criteria: &QuestionCriteria) -> Result<u64, AppError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM questions WHERE topic_id = $1 AND NOT (id = ANY($2))",
        )
        .bind(criteria.topic_id)
        .bind(&criteria.exclude)
        .fetch_one(&self.pool)
        .await?;
        Ok(count.max(0) as u64)
    }

    async fn question_at(&self, criteria: &QuestionCriteria, skip: u64) -> Result<Option<Question>, AppError> {
        let row: Option<(i64, i64, Json<Question>, i64, i64)> = sqlx::query_as(
            r#"
            SELECT id, topic_id, data, correct_count, wrong_count
            FROM questions
            WHERE topic_id = $1 AND NOT (id = ANY($2))
            ORDER BY id
            OFFSET $3
            LIMIT 1
            "#,
        )
        .bind(criteria.topic_id)
        .bind(&criteria.exclude)
        .bind(skip as i64)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch question: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

        Ok(row.map(|(id, topic_id, Json(mut question), correct_count, wrong_count)| {
            question.id = id;
            question.topic_id = topic_id;
            question.correct_count = correct_count;
            question.wrong_count = wrong_count;
            question
        }))
    }

    async fn get_topic(&self, topic_id: i64) -> Result<Option<Topic>, AppError> {
        self.topics
            .get_or_load(topic_id, self.fetch_topic(topic_id))
            .await
    }

    async fn record_answer(&self, question_id: i64, correct: bool) -> Result<(), AppError> {
        let query = if correct {
            "UPDATE questions SET correct_count = correct_count + 1 WHERE id = $1"
        } else {
            "UPDATE questions SET wrong_count = wrong_count + 1 WHERE id = $1"
        };
        sqlx::query(query).bind(question_id).execute(&self.pool).await?;
        Ok(())
    }

    async fn set_user_profile(&self, user_id: &str, update: &ProfileUpdate) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE users SET score = $1, xp = $2, rank = $3 WHERE id = $4")
            .bind(update.score)
            .bind(update.xp)
            .bind(update.rank as i32)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update profile of {}: {:?}", user_id, e);
                AppError::InternalServerError(e.to_string())
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User {} not found", user_id)));
        }
        Ok(())
    }
}

#[async_trait]
impl Leaderboard for PgStore {
    async fn friends_above_me(&self, user_id: &str, limit: i64) -> Result<Vec<FriendScore>, AppError> {
        let friends = sqlx::query_as::<_, FriendScore>(
            r#"
            SELECT f.id, f.name, f.score
            FROM user_friends uf
            JOIN users f ON f.id = uf.friend_id
            JOIN users me ON me.id = uf.user_id
            WHERE uf.user_id = $1 AND f.score > me.score
            ORDER BY f.score ASC, f.id ASC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit.max(0))
        .fetch_all(&self.pool)
        .await?;
        Ok(friends)
    }

    async fn passed_friends(
        &self,
        friends_above_me: &[FriendScore],
        user_id: &str,
    ) -> Result<Vec<FriendScore>, AppError> {
        if friends_above_me.is_empty() {
            return Ok(Vec::new());
        }
        let my_score = self.user_score(user_id).await?;
        Ok(friends_passed(friends_above_me, my_score))
    }

    async fn add_score(&self, credit: &ScoreCredit) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        for board in credit.boards() {
            sqlx::query(
                r#"
                INSERT INTO leaderboard_scores (board, facebook_user_id, name, avatar, score)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (board, facebook_user_id) DO UPDATE SET
                    score = leaderboard_scores.score + EXCLUDED.score,
                    name = EXCLUDED.name,
                    avatar = EXCLUDED.avatar
                "#,
            )
            .bind(board.key())
            .bind(&credit.facebook_user_id)
            .bind(&credit.name)
            .bind(&credit.avatar)
            .bind(credit.amount)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to add score to board {}: {:?}", board.key(), e);
                AppError::InternalServerError(e.to_string())
            })?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn top(&self, board: &Board, limit: i64) -> Result<Vec<LeaderboardEntry>, AppError> {
        let entries = sqlx::query_as::<_, LeaderboardEntry>(
            r#"
            SELECT facebook_user_id, name, avatar, score
            FROM leaderboard_scores
            WHERE board = $1
            ORDER BY score DESC, facebook_user_id ASC
            LIMIT $2
            "#,
        )
        .bind(board.key())
        .bind(limit.max(0))
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }
}
