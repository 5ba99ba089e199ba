// src/handlers/user.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};
use validator::Validate;

use crate::{
    error::{AppError, GameError},
    models::session::UpdateSettingsRequest,
    state::AppState,
    utils::jwt::Claims,
};

/// Updates language and/or sound of the current session.
pub async fn update_settings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdateSettingsRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let mut session = state.sessions.load_session(&claims.sub).await?;

    if let Some(language) = payload.language {
        if !state.game.is_supported_language(&language) {
            return Err(GameError::UnsupportedLanguage.into());
        }
        session.settings.language = language;
    }
    if let Some(sound) = payload.sound {
        session.settings.sound = sound;
    }

    state.sessions.save_session(&session).await?;
    Ok(Json(session.settings))
}

pub async fn toggle_sound(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let mut session = state.sessions.load_session(&claims.sub).await?;
    session.settings.sound = !session.settings.sound;
    state.sessions.save_session(&session).await?;

    tracing::debug!(user_id = %session.user_id, sound = session.settings.sound, "Sound toggled");
    Ok(Json(session.settings))
}
