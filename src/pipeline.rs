// src/pipeline.rs

//! Quiz session pipeline: each entry point loads the session, runs the game rules
//! and persists what changed. The first failing step aborts the rest.

use chrono::Utc;
use rand::Rng;
use serde::Serialize;

use crate::{
    error::{AppError, GameError},
    game::{
        quiz::{AnswerInput, AnsweredQuestion, evaluate_answer, new_quiz, topic_order},
        rank::XpProgress,
        results::{ResultData, result_data},
        scoring::apply_quiz_score,
        stories::derive_stories,
    },
    models::{
        contest::{ContestView, Leader},
        leaderboard::ScoreCredit,
        question::QuestionCriteria,
        quiz::{Quiz, QuizClientData, Story},
        session::Session,
        user::ProfileUpdate,
    },
    state::AppState,
};

/// Response to an answer.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerResponse {
    pub question: AnsweredQuestion,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xp_progress: Option<XpProgress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<QuizResults>,
}

/// End-of-quiz payload.
#[derive(Debug, Serialize)]
pub struct QuizResults {
    pub contest: ContestView,
    pub data: ResultData,
    pub stories: Vec<Story>,
}

/// Starts a quiz in `contest_id` and serves its first question.
pub async fn start(state: &AppState, token: &str, contest_id: &str) -> Result<QuizClientData, AppError> {
    let mut session = state.sessions.load_session(token).await?;
    let contest = state
        .documents
        .get_contest(contest_id)
        .await?
        .ok_or(GameError::ContestNotFound)?;

    let mut quiz = new_quiz(&contest, &session.user_id, &state.game.quiz)?;

    let friends = state
        .leaderboard
        .friends_above_me(&session.user_id, state.game.quiz.friends_above_me_limit)
        .await?;
    if !friends.is_empty() {
        quiz.server_data.share.data.friends_above_me = Some(friends);
    }

    serve_next_question(state, &session.settings.language, &mut quiz).await?;

    let client_data = quiz.client_data.clone();
    session.quiz = Some(quiz);
    state.sessions.save_session(&session).await?;

    tracing::info!(
        user_id = %session.user_id,
        contest_id,
        "Quiz started"
    );
    Ok(client_data)
}

/// Evaluates an answer to the current question; scores the contest when it was the last one.
pub async fn answer(state: &AppState, token: &str, input: AnswerInput) -> Result<AnswerResponse, AppError> {
    let mut session = state.sessions.load_session(token).await?;
    let outcome = evaluate_answer(&mut session, &input, &state.game)?;

    state
        .documents
        .record_answer(outcome.question.question_id, outcome.question.correct)
        .await?;

    // a finished quiz leaves the session; its state is only needed for scoring below
    let finished_quiz = if outcome.finished {
        session.quiz.take()
    } else {
        None
    };
    state.sessions.save_session(&session).await?;

    let xp_gained = outcome
        .xp_progress
        .is_some_and(|progress| progress.addition > 0);
    if outcome.finished || xp_gained {
        let update = ProfileUpdate {
            score: session.score,
            xp: session.xp,
            rank: session.rank,
        };
        state
            .documents
            .set_user_profile(&session.user_id, &update)
            .await?;
    }

    let results = match finished_quiz {
        Some(quiz) => Some(finish_quiz(state, &session, quiz, outcome.perfect).await?),
        None => None,
    };

    Ok(AnswerResponse {
        question: outcome.question,
        xp_progress: outcome.xp_progress,
        features: outcome.features,
        results,
    })
}

/// Serves the next question of the quiz in progress.
pub async fn next_question(state: &AppState, token: &str) -> Result<QuizClientData, AppError> {
    let mut session = state.sessions.load_session(token).await?;
    let language = session.settings.language.clone();
    let quiz = session
        .quiz
        .as_mut()
        .ok_or(GameError::SessionExpiredDuringQuiz)?;

    serve_next_question(state, &language, quiz).await?;
    let client_data = quiz.client_data.clone();

    state.sessions.save_session(&session).await?;
    Ok(client_data)
}

/// Picks an unseen question from the language's topics, trying topics in random order.
async fn serve_next_question(state: &AppState, language: &str, quiz: &mut Quiz) -> Result<(), AppError> {
    quiz.ensure_can_advance()?;

    for topic_id in topic_order(&state.game, language) {
        let criteria = QuestionCriteria {
            topic_id,
            exclude: quiz.server_data.previous_questions.clone(),
        };
        let count = state.documents.count_questions(&criteria).await?;
        if count == 0 {
            tracing::debug!(topic_id, "Topic has no unseen questions left");
            continue;
        }
        let skip = rand::thread_rng().gen_range(0..count);
        let Some(question) = state.documents.question_at(&criteria, skip).await? else {
            continue;
        };

        let direction = state
            .documents
            .get_topic(question.topic_id)
            .await?
            .and_then(|topic| topic.force_direction)
            .unwrap_or_else(|| state.game.direction_for(language));

        quiz.serve_question(question, direction);
        return Ok(());
    }

    Err(GameError::NoQuestionsAvailable.into())
}

/// Applies the finished quiz to its contest with compare-and-swap, then credits the boards.
async fn finish_quiz(
    state: &AppState,
    session: &Session,
    mut quiz: Quiz,
    perfect: bool,
) -> Result<QuizResults, AppError> {
    let player = Leader::from(session);
    let quiz_score = quiz.server_data.score;
    let contest_id = quiz.server_data.contest_id.as_str();
    let share_distance = state.game.quiz.team_percent_distance_for_share;

    let passed_friends = match &quiz.server_data.share.data.friends_above_me {
        Some(friends) => {
            state
                .leaderboard
                .passed_friends(friends, &session.user_id)
                .await?
        }
        None => Vec::new(),
    };

    for attempt in 1..=state.config.contest_update_attempts {
        let mut contest = state
            .documents
            .get_contest(contest_id)
            .await?
            .ok_or(GameError::ContestNotFound)?;
        let expected_version = contest.version;

        let outcome = apply_quiz_score(&mut contest, &player, quiz_score, Utc::now())?;

        if !state
            .documents
            .update_contest(&contest, expected_version)
            .await?
        {
            tracing::warn!(contest_id, attempt, "Contest changed while scoring, retrying");
            continue;
        }
        contest.version = expected_version + 1;

        let share = &mut quiz.server_data.share;
        share.stories = derive_stories(
            &share.data,
            &outcome,
            &contest,
            perfect,
            passed_friends,
            share_distance,
        );

        state
            .leaderboard
            .add_score(&ScoreCredit {
                contest_id: contest.id.clone(),
                team: outcome.team,
                amount: quiz_score,
                facebook_user_id: session.facebook_user_id.clone(),
                name: session.name.clone(),
                avatar: session.avatar.clone(),
            })
            .await?;

        tracing::info!(
            user_id = %session.user_id,
            contest_id,
            score = quiz_score,
            stories = share.stories.len(),
            "Quiz finished"
        );

        return Ok(QuizResults {
            contest: ContestView::for_user(&contest, &session.user_id),
            data: result_data(&share.stories, perfect, quiz_score, &state.game.sounds),
            stories: std::mem::take(&mut share.stories),
        });
    }

    tracing::error!(contest_id, "Gave up updating contest after repeated conflicts");
    Err(GameError::ContestBusy.into())
}
