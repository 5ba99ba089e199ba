// src/handlers/mod.rs

pub mod leaderboard;
pub mod quiz;
pub mod user;
