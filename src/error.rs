// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// Global Application Error Enum.
/// Centralizes error handling and mapping to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    // 500 Internal Server Error (store or leaderboard failure)
    InternalServerError(String),

    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized
    AuthError(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // Client input and domain precondition failures carrying a reason code
    Game(GameError),
}

/// Rejections raised by the quiz engine and the session pipeline.
///
/// Each variant maps to a stable machine-readable reason the client switches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameError {
    ContestIdNotSupplied,
    InvalidAnswerId,
    UnsupportedLanguage,
    NotJoinedToContest,
    SessionExpired,
    SessionExpiredDuringQuiz,
    QuizFinished,
    QuestionAlreadyAnswered,
    QuestionNotAnswered,
    NoMoreQuestions,
    NoQuestionsAvailable,
    ContestNotFound,
    ContestBusy,
}

impl GameError {
    pub fn code(&self) -> &'static str {
        match self {
            GameError::ContestIdNotSupplied => "SERVER_ERROR_CONTEST_ID_NOT_SUPPLIED",
            GameError::InvalidAnswerId => "SERVER_ERROR_INVALID_ANSWER_ID",
            GameError::UnsupportedLanguage => "SERVER_ERROR_UNSUPPORTED_LANGUAGE",
            GameError::NotJoinedToContest => "SERVER_ERROR_NOT_JOINED_TO_CONTEST",
            GameError::SessionExpired => "SERVER_ERROR_SESSION_EXPIRED",
            GameError::SessionExpiredDuringQuiz => "SERVER_ERROR_SESSION_EXPIRED_DURING_QUIZ",
            GameError::QuizFinished => "SERVER_ERROR_QUIZ_FINISHED",
            GameError::QuestionAlreadyAnswered => "SERVER_ERROR_QUESTION_ALREADY_ANSWERED",
            GameError::QuestionNotAnswered => "SERVER_ERROR_QUESTION_NOT_ANSWERED",
            GameError::NoMoreQuestions => "SERVER_ERROR_NO_MORE_QUESTIONS",
            GameError::NoQuestionsAvailable => "SERVER_ERROR_NO_QUESTIONS_AVAILABLE",
            GameError::ContestNotFound => "SERVER_ERROR_CONTEST_NOT_FOUND",
            GameError::ContestBusy => "SERVER_ERROR_CONTEST_BUSY",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            GameError::ContestIdNotSupplied
            | GameError::InvalidAnswerId
            | GameError::UnsupportedLanguage => StatusCode::BAD_REQUEST,
            GameError::SessionExpired => StatusCode::UNAUTHORIZED,
            GameError::NotJoinedToContest | GameError::SessionExpiredDuringQuiz => {
                StatusCode::FORBIDDEN
            }
            GameError::ContestNotFound | GameError::NoQuestionsAvailable => StatusCode::NOT_FOUND,
            GameError::QuizFinished
            | GameError::QuestionAlreadyAnswered
            | GameError::QuestionNotAnswered
            | GameError::NoMoreQuestions
            | GameError::ContestBusy => StatusCode::CONFLICT,
        }
    }
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            GameError::ContestIdNotSupplied => "contestId not supplied",
            GameError::InvalidAnswerId => "Invalid answer id",
            GameError::UnsupportedLanguage => "Language is not supported",
            GameError::NotJoinedToContest => "User has not joined this contest",
            GameError::SessionExpired => "Session expired",
            GameError::SessionExpiredDuringQuiz => "Session expired during quiz",
            GameError::QuizFinished => "Quiz already finished",
            GameError::QuestionAlreadyAnswered => "Question already answered",
            GameError::QuestionNotAnswered => "Current question has not been answered yet",
            GameError::NoMoreQuestions => "Quiz has no more questions",
            GameError::NoQuestionsAvailable => "No questions available",
            GameError::ContestNotFound => "Contest not found",
            GameError::ContestBusy => "Contest is being updated, please retry",
        };
        f.write_str(message)
    }
}

impl std::error::Error for GameError {}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Game(err) => write!(f, "{} ({})", err, err.code()),
            other => write!(f, "{:?}", other),
        }
    }
}

impl std::error::Error for AppError {}

/// Implements `IntoResponse` for `AppError`.
/// Converts the error into a JSON response with appropriate HTTP status code.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal Server Error" }),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::AuthError(msg) => (StatusCode::UNAUTHORIZED, json!({ "error": msg })),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, json!({ "error": msg })),
            AppError::Game(err) => {
                tracing::warn!(reason = err.code(), "Request rejected: {}", err);
                (
                    err.status(),
                    json!({ "error": err.to_string(), "reason": err.code() }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<GameError> for AppError {
    fn from(err: GameError) -> Self {
        AppError::Game(err)
    }
}

/// Converts `sqlx::Error` into `AppError::InternalServerError`.
/// Allows using `?` operator on database queries.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::BadRequest(err.to_string())
    }
}
