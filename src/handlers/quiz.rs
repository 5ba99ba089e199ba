// src/handlers/quiz.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};
use validator::Validate;

use crate::{
    error::{AppError, GameError},
    game::quiz::AnswerInput,
    models::quiz::StartQuizRequest,
    pipeline,
    state::AppState,
    utils::jwt::Claims,
};

/// Starts a quiz in a contest the player has joined.
///
/// Returns the client half of the quiz with its first question.
pub async fn start_quiz(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<StartQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.validate().is_err() {
        return Err(GameError::ContestIdNotSupplied.into());
    }
    let contest_id = payload
        .contest_id
        .ok_or(GameError::ContestIdNotSupplied)?;

    let quiz = pipeline::start(&state, &claims.sub, &contest_id).await?;
    Ok(Json(quiz))
}

/// Submits an answer to the current question.
///
/// When it was the last question the response also carries the quiz results.
pub async fn answer(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(input): Json<AnswerInput>,
) -> Result<impl IntoResponse, AppError> {
    let response = pipeline::answer(&state, &claims.sub, input).await?;
    Ok(Json(response))
}

pub async fn next_question(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = pipeline::next_question(&state, &claims.sub).await?;
    Ok(Json(quiz))
}
