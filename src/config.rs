// src/config.rs

use std::{
    collections::BTreeMap,
    env, fmt,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::{
    game::{quiz::QuizSettings, rank::XpSettings, results::SoundSettings},
    models::question::Direction,
};

const DEFAULT_LANGUAGE: &str = "en";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub rust_log: String,
    pub game_settings_path: Option<PathBuf>,
    /// How many times a contest write is retried after losing a version race.
    pub contest_update_attempts: u32,
    pub topic_cache_ttl_secs: u64,
    pub port: u16,
}

#[derive(Debug)]
pub enum ConfigError {
    MissingVar(&'static str),
    InvalidVar { name: &'static str, value: String },
    Io { path: PathBuf, source: std::io::Error },
    Parse(toml::de::Error),
    InvalidSettings(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingVar(name) => write!(f, "{} must be set", name),
            ConfigError::InvalidVar { name, value } => {
                write!(f, "{} has an invalid value: {:?}", name, value)
            }
            ConfigError::Io { path, source } => {
                write!(f, "failed to read {}: {}", path.display(), source)
            }
            ConfigError::Parse(err) => write!(f, "failed to parse game settings: {}", err),
            ConfigError::InvalidSettings(msg) => write!(f, "invalid game settings: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingVar(name))
}

fn parsed_or<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidVar { name, value }),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = required("DATABASE_URL")?;
        let jwt_secret = required("JWT_SECRET")?;
        let jwt_expiration = parsed_or("JWT_EXPIRATION", 86_400)?;
        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let game_settings_path = env::var("GAME_SETTINGS_PATH").ok().map(PathBuf::from);
        let contest_update_attempts = parsed_or("CONTEST_UPDATE_ATTEMPTS", 5u32)?.max(1);
        let topic_cache_ttl_secs = parsed_or("TOPIC_CACHE_TTL_SECS", 600)?;
        let port = parsed_or("PORT", 3000)?;

        Ok(Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            rust_log,
            game_settings_path,
            contest_update_attempts,
            topic_cache_ttl_secs,
            port,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LanguageSettings {
    #[serde(default)]
    pub direction: Direction,
    pub trivia_topics: Vec<i64>,
}

/// Read-only game tables, loaded once at startup.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub quiz: QuizSettings,
    pub xp: XpSettings,
    pub languages: BTreeMap<String, LanguageSettings>,
    /// Rank required to unlock each feature.
    pub features: BTreeMap<String, u32>,
    pub sounds: SoundSettings,
}

impl Default for GameSettings {
    fn default() -> Self {
        let languages = BTreeMap::from([
            (
                "en".to_string(),
                LanguageSettings {
                    direction: Direction::Ltr,
                    trivia_topics: vec![10],
                },
            ),
            (
                "he".to_string(),
                LanguageSettings {
                    direction: Direction::Rtl,
                    trivia_topics: vec![5, 270],
                },
            ),
            (
                "es".to_string(),
                LanguageSettings {
                    direction: Direction::Ltr,
                    trivia_topics: vec![465],
                },
            ),
        ]);
        let features = BTreeMap::from([
            ("newContest".to_string(), 3),
            ("inviteFriendsToContest".to_string(), 2),
        ]);

        Self {
            quiz: QuizSettings::default(),
            xp: XpSettings::default(),
            languages,
            features,
            sounds: SoundSettings::default(),
        }
    }
}

impl GameSettings {
    /// Loads settings from a TOML file, or the built-in defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            tracing::info!("No GAME_SETTINGS_PATH set, using built-in game settings");
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_toml(&raw)?;
        tracing::info!(path = %path.display(), "Loaded game settings");
        Ok(settings)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        let settings: GameSettings = toml::from_str(raw).map_err(ConfigError::Parse)?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.quiz.levels.is_empty() {
            return Err(ConfigError::InvalidSettings(
                "quiz.levels must not be empty".to_string(),
            ));
        }
        if self.quiz.min_question_score < 0 {
            return Err(ConfigError::InvalidSettings(
                "quiz.min_question_score must not be negative".to_string(),
            ));
        }
        if !self.languages.contains_key(DEFAULT_LANGUAGE) {
            return Err(ConfigError::InvalidSettings(format!(
                "languages.{} is required",
                DEFAULT_LANGUAGE
            )));
        }
        if let Some((code, _)) = self
            .languages
            .iter()
            .find(|(_, language)| language.trivia_topics.is_empty())
        {
            return Err(ConfigError::InvalidSettings(format!(
                "languages.{} has no trivia topics",
                code
            )));
        }
        Ok(())
    }

    pub fn is_supported_language(&self, language: &str) -> bool {
        self.languages.contains_key(language)
    }

    fn language(&self, language: &str) -> Option<&LanguageSettings> {
        self.languages
            .get(language)
            .or_else(|| self.languages.get(DEFAULT_LANGUAGE))
    }

    /// Direction questions are shown in for `language`, unless their topic forces one.
    pub fn direction_for(&self, language: &str) -> Direction {
        self.language(language)
            .map_or(Direction::Ltr, |settings| settings.direction)
    }

    pub fn trivia_topics(&self, language: &str) -> &[i64] {
        self.language(language)
            .map_or(&[], |settings| settings.trivia_topics.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::rank::XpAction;

    #[test]
    fn partial_toml_keeps_defaults() {
        let settings = GameSettings::from_toml(
            r#"
            [quiz]
            levels = [5, 5, 5]

            [xp.credits]
            correctAnswer = 7
            "#,
        )
        .unwrap();

        assert_eq!(settings.quiz.total_questions(), 3);
        assert_eq!(settings.quiz.reveal_correct_answer_delay_ms, 3000);
        assert_eq!(settings.xp.credits.get(&XpAction::CorrectAnswer), Some(&7));
        assert_eq!(settings.xp.credits.get(&XpAction::Login), None);
        assert_eq!(settings.xp.ranks.top_rank(), 4);
        assert_eq!(settings.trivia_topics("he"), &[5, 270]);
    }

    #[test]
    fn rank_table_is_validated_on_load() {
        let err = GameSettings::from_toml(
            r#"
            [xp]
            ranks = [{ xp = 200, rank = 1 }, { xp = 100, rank = 2 }]
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("strictly increasing"), "{}", err);
    }

    #[test]
    fn empty_levels_are_rejected() {
        assert!(GameSettings::from_toml("[quiz]\nlevels = []").is_err());
    }

    #[test]
    fn unknown_language_falls_back_to_english() {
        let settings = GameSettings::default();
        assert_eq!(settings.direction_for("he"), Direction::Rtl);
        assert_eq!(settings.direction_for("fr"), Direction::Ltr);
        assert_eq!(settings.trivia_topics("fr"), &[10]);
        assert!(!settings.is_supported_language("fr"));
    }
}
