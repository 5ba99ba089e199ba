// src/game/mod.rs

//! Pure game rules: no I/O happens in here.

pub mod quiz;
pub mod rank;
pub mod results;
pub mod scoring;
pub mod stories;
