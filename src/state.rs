// src/state.rs

use std::sync::Arc;

use axum::extract::FromRef;

use crate::{
    config::{Config, GameSettings},
    store::{DocumentStore, Leaderboard, SessionStore},
};

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<dyn SessionStore>,
    pub documents: Arc<dyn DocumentStore>,
    pub leaderboard: Arc<dyn Leaderboard>,
    pub game: Arc<GameSettings>,
    pub config: Config,
}

impl AppState {
    /// Wires a single store that plays every collaborator role.
    pub fn new<S>(store: Arc<S>, config: Config, game: GameSettings) -> Self
    where
        S: SessionStore + DocumentStore + Leaderboard + 'static,
    {
        Self {
            sessions: store.clone(),
            documents: store.clone(),
            leaderboard: store,
            game: Arc::new(game),
            config,
        }
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
