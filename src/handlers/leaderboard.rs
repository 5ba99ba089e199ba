// src/handlers/leaderboard.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};

use crate::{
    error::{AppError, GameError},
    models::{
        contest::TeamId,
        leaderboard::{Board, LeaderboardParams},
    },
    state::AppState,
};

/// Top players of a contest, or of one of its teams when `team` is given.
pub async fn contest_leaderboard(
    State(state): State<AppState>,
    Path(contest_id): Path<String>,
    Query(params): Query<LeaderboardParams>,
) -> Result<impl IntoResponse, AppError> {
    if state.documents.get_contest(&contest_id).await?.is_none() {
        return Err(GameError::ContestNotFound.into());
    }

    let board = match params.team {
        Some(team) => {
            let team = TeamId::try_from(team).map_err(AppError::BadRequest)?;
            Board::Team(contest_id, team)
        }
        None => Board::Contest(contest_id),
    };
    let limit = params.limit.unwrap_or(10).clamp(1, 100);

    let entries = state.leaderboard.top(&board, limit).await?;
    Ok(Json(entries))
}
