// src/game/results.rs

//! Title, message and sound shown when a quiz finishes.

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::models::quiz::Story;

pub const BECAME_CONTEST_LEADER_TITLE: &str = "BECAME_CONTEST_LEADER_TITLE";
pub const EXCELLENT_SCORE_TITLE: &str = "EXCELLENT_SCORE_TITLE";
pub const POSITIVE_SCORE_TITLE: &str = "POSITIVE_SCORE_TITLE";
pub const ZERO_SCORE_TITLE: &str = "ZERO_SCORE_TITLE";
pub const POSITIVE_SCORE_MESSAGE: &str = "POSITIVE_SCORE_MESSAGE";
pub const ZERO_SCORE_MESSAGE: &str = "ZERO_SCORE_MESSAGE";

/// Sound pools for the end-of-quiz screen.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SoundSettings {
    pub finish_zero: Vec<String>,
    pub finish_ok: Vec<String>,
    pub finish_great: Vec<String>,
}

impl Default for SoundSettings {
    fn default() -> Self {
        Self {
            finish_zero: vec![
                "audio/finish_zero_1".to_string(),
                "audio/finish_zero_2".to_string(),
            ],
            finish_ok: vec!["audio/finish_ok_1".to_string()],
            finish_great: vec!["audio/finish_great_1".to_string()],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCategory {
    Zero,
    Ok,
    Great,
}

impl SoundSettings {
    pub fn pool(&self, category: SoundCategory) -> &[String] {
        match category {
            SoundCategory::Zero => &self.finish_zero,
            SoundCategory::Ok => &self.finish_ok,
            SoundCategory::Great => &self.finish_great,
        }
    }

    pub fn pick(&self, category: SoundCategory) -> Option<String> {
        self.pool(category).choose(&mut rand::thread_rng()).cloned()
    }
}

/// Result screen contents for a finished quiz.
#[derive(Debug, Clone, Serialize)]
pub struct ResultData {
    pub score: i64,
    pub title: &'static str,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound: Option<String>,
    #[serde(skip)]
    pub category: SoundCategory,
}

/// Becoming contest leader beats a perfect score, which beats any positive score.
pub fn result_data(stories: &[Story], perfect: bool, score: i64, sounds: &SoundSettings) -> ResultData {
    let (category, title, message) = if stories.contains(&Story::BecameContestLeader) {
        (
            SoundCategory::Great,
            BECAME_CONTEST_LEADER_TITLE,
            POSITIVE_SCORE_MESSAGE,
        )
    } else if perfect {
        (
            SoundCategory::Great,
            EXCELLENT_SCORE_TITLE,
            POSITIVE_SCORE_MESSAGE,
        )
    } else if score > 0 {
        (SoundCategory::Ok, POSITIVE_SCORE_TITLE, POSITIVE_SCORE_MESSAGE)
    } else {
        (SoundCategory::Zero, ZERO_SCORE_TITLE, ZERO_SCORE_MESSAGE)
    };

    ResultData {
        score,
        title,
        message,
        sound: sounds.pick(category),
        category,
    }
}
