// src/game/rank.rs

//! Rank table lookup and XP progression.
//!
//! A rank table entry `{xp, rank}` is the XP ceiling of that rank: a player holds the
//! first rank whose threshold is at or above their XP. Players past the last threshold
//! stay on the top rank.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::models::{session::Session, user::UserProfile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankThreshold {
    pub xp: i64,
    pub rank: u32,
}

/// Ordered XP thresholds. Never empty, thresholds strictly increasing, ranks
/// consecutive from 1.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "Vec<RankThreshold>")]
pub struct RankTable {
    entries: Vec<RankThreshold>,
}

impl RankTable {
    pub fn new(entries: Vec<RankThreshold>) -> Result<Self, ConfigError> {
        if entries.is_empty() {
            return Err(ConfigError::InvalidSettings(
                "rank table must have at least one entry".to_string(),
            ));
        }
        for (index, entry) in entries.iter().enumerate() {
            if entry.rank as usize != index + 1 {
                return Err(ConfigError::InvalidSettings(format!(
                    "rank table entry {} has rank {}, expected {}",
                    index,
                    entry.rank,
                    index + 1
                )));
            }
        }
        if entries.windows(2).any(|pair| pair[0].xp >= pair[1].xp) {
            return Err(ConfigError::InvalidSettings(
                "rank thresholds must be strictly increasing".to_string(),
            ));
        }
        Ok(Self { entries })
    }

    pub fn top_rank(&self) -> u32 {
        self.entries.last().map_or(1, |entry| entry.rank)
    }

    /// XP ceiling of `rank`, if the rank exists.
    pub fn threshold(&self, rank: u32) -> Option<i64> {
        let index = (rank as usize).checked_sub(1)?;
        self.entries.get(index).map(|entry| entry.xp)
    }

    /// Rank held with `xp`. An exact threshold hit keeps that entry's rank.
    pub fn rank_for(&self, xp: i64) -> u32 {
        if let [only] = self.entries.as_slice() {
            return only.rank;
        }
        let index = self.entries.partition_point(|entry| entry.xp < xp);
        match self.entries.get(index) {
            Some(entry) => entry.rank,
            None => self.top_rank(),
        }
    }

    /// Progress of `xp` inside `rank`, for a progress bar.
    pub fn progress(&self, xp: i64, rank: u32) -> RankProgress {
        let rank = rank.clamp(1, self.top_rank());
        let floor = if rank >= 2 {
            self.threshold(rank - 1).unwrap_or(0)
        } else {
            0
        };
        let ceiling = self.threshold(rank).unwrap_or(floor);
        let value = xp - floor;
        // past the top threshold the bar stays full
        let max = (ceiling - floor).max(value);
        let percent = if max <= 0 {
            100
        } else {
            (value.max(0) * 100 / max) as u32
        };

        RankProgress {
            value,
            max,
            percent,
            xp_for_current_rank: floor,
            xp_for_next_rank: ceiling,
        }
    }
}

impl TryFrom<Vec<RankThreshold>> for RankTable {
    type Error = ConfigError;

    fn try_from(entries: Vec<RankThreshold>) -> Result<Self, Self::Error> {
        RankTable::new(entries)
    }
}

impl Default for RankTable {
    fn default() -> Self {
        Self {
            entries: vec![
                RankThreshold { xp: 100, rank: 1 },
                RankThreshold { xp: 500, rank: 2 },
                RankThreshold { xp: 1500, rank: 3 },
                RankThreshold { xp: 3000, rank: 4 },
            ],
        }
    }
}

/// XP achieved inside the current rank: `value` out of `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankProgress {
    pub value: i64,
    pub max: i64,
    pub percent: u32,
    #[serde(skip)]
    pub xp_for_current_rank: i64,
    #[serde(skip)]
    pub xp_for_next_rank: i64,
}

/// Named actions that may credit XP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum XpAction {
    Login,
    JoinContest,
    PlayContest,
    ShareContest,
    CorrectAnswer,
    QuizFullScore,
}

/// Anything carrying XP and a rank derived from it.
pub trait XpSubject {
    fn xp(&self) -> i64;
    fn rank(&self) -> u32;
    fn set_xp(&mut self, xp: i64, rank: u32);
}

impl XpSubject for Session {
    fn xp(&self) -> i64 {
        self.xp
    }

    fn rank(&self) -> u32 {
        self.rank
    }

    fn set_xp(&mut self, xp: i64, rank: u32) {
        self.xp = xp;
        self.rank = rank;
    }
}

impl XpSubject for UserProfile {
    fn xp(&self) -> i64 {
        self.xp
    }

    fn rank(&self) -> u32 {
        self.rank
    }

    fn set_xp(&mut self, xp: i64, rank: u32) {
        self.xp = xp;
        self.rank = rank;
    }
}

/// Result of one or more XP grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct XpProgress {
    pub addition: i64,
    pub rank_changed: bool,
    pub xp: i64,
    pub rank: u32,
    pub progress: RankProgress,
}

impl XpProgress {
    /// Folds a later grant into this one.
    pub fn merge(self, later: XpProgress) -> XpProgress {
        XpProgress {
            addition: self.addition + later.addition,
            rank_changed: self.rank_changed || later.rank_changed,
            ..later
        }
    }

    pub fn merge_into(acc: Option<XpProgress>, later: Option<XpProgress>) -> Option<XpProgress> {
        match (acc, later) {
            (Some(acc), Some(later)) => Some(acc.merge(later)),
            (acc, later) => acc.or(later),
        }
    }
}

/// XP configuration: the rank table and the credit of each action.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct XpSettings {
    pub ranks: RankTable,
    pub credits: HashMap<XpAction, i64>,
}

impl Default for XpSettings {
    fn default() -> Self {
        let credits = HashMap::from([
            (XpAction::Login, 5),
            (XpAction::JoinContest, 10),
            (XpAction::PlayContest, 50),
            (XpAction::ShareContest, 30),
            (XpAction::CorrectAnswer, 2),
            (XpAction::QuizFullScore, 20),
        ]);
        Self {
            ranks: RankTable::default(),
            credits,
        }
    }
}

impl XpSettings {
    /// Credits `action` to `subject` and recomputes its rank.
    ///
    /// Returns `None` when the action carries no XP; the subject is left untouched.
    pub fn add_xp<S: XpSubject + ?Sized>(&self, subject: &mut S, action: XpAction) -> Option<XpProgress> {
        let addition = *self.credits.get(&action)?;
        let old_rank = subject.rank();
        let xp = subject.xp() + addition;
        let rank = self.ranks.rank_for(xp).max(old_rank);
        subject.set_xp(xp, rank);

        Some(XpProgress {
            addition,
            rank_changed: rank > old_rank,
            xp,
            rank,
            progress: self.ranks.progress(xp, rank),
        })
    }
}

/// Features unlocked at `rank`, given each feature's required rank.
pub fn unlocked_features(requirements: &BTreeMap<String, u32>, rank: u32) -> Vec<String> {
    requirements
        .iter()
        .filter(|(_, required)| rank >= **required)
        .map(|(feature, _)| feature.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Player {
        xp: i64,
        rank: u32,
    }

    impl XpSubject for Player {
        fn xp(&self) -> i64 {
            self.xp
        }
        fn rank(&self) -> u32 {
            self.rank
        }
        fn set_xp(&mut self, xp: i64, rank: u32) {
            self.xp = xp;
            self.rank = rank;
        }
    }

    fn table() -> RankTable {
        RankTable::default()
    }

    #[test]
    fn rank_is_first_threshold_at_or_above_xp() {
        let t = table();
        assert_eq!(t.rank_for(0), 1);
        assert_eq!(t.rank_for(99), 1);
        assert_eq!(t.rank_for(100), 1);
        assert_eq!(t.rank_for(101), 2);
        assert_eq!(t.rank_for(1500), 3);
        assert_eq!(t.rank_for(2999), 4);
        assert_eq!(t.rank_for(50_000), 4);
    }

    #[test]
    fn single_entry_table_returns_that_rank() {
        let t = RankTable::new(vec![RankThreshold { xp: 10, rank: 1 }]).unwrap();
        assert_eq!(t.rank_for(0), 1);
        assert_eq!(t.rank_for(1_000), 1);
    }

    #[test]
    fn rejects_malformed_tables() {
        assert!(RankTable::new(vec![]).is_err());
        assert!(
            RankTable::new(vec![
                RankThreshold { xp: 100, rank: 1 },
                RankThreshold { xp: 100, rank: 2 },
            ])
            .is_err()
        );
        assert!(
            RankTable::new(vec![
                RankThreshold { xp: 100, rank: 1 },
                RankThreshold { xp: 200, rank: 3 },
            ])
            .is_err()
        );
    }

    #[test]
    fn rank_never_drops_while_xp_grows() {
        let t = table();
        let mut last = 0;
        for xp in (0..4_000).step_by(7) {
            let rank = t.rank_for(xp);
            assert!(rank >= last, "rank dropped at xp {}", xp);
            last = rank;
        }
    }

    #[test]
    fn progress_adds_up_inside_every_rank() {
        let t = table();
        for xp in 0..=3_000 {
            let rank = t.rank_for(xp);
            let p = t.progress(xp, rank);
            assert_eq!(p.value + p.xp_for_current_rank, xp);
            assert!(p.value >= 0 && p.value <= p.max, "xp {} rank {}: {:?}", xp, rank, p);
            assert!(p.percent <= 100);
        }
    }

    #[test]
    fn progress_below_rank_two_starts_at_zero() {
        let p = table().progress(40, 1);
        assert_eq!(p.xp_for_current_rank, 0);
        assert_eq!(p.max, 100);
        assert_eq!(p.percent, 40);
    }

    #[test]
    fn progress_floors_the_percentage() {
        // rank 2 spans 100..500
        let p = table().progress(233, 2);
        assert_eq!(p.value, 133);
        assert_eq!(p.max, 400);
        assert_eq!(p.percent, 33);
    }

    #[test]
    fn progress_past_the_top_threshold_is_full() {
        let p = table().progress(4_000, 4);
        assert_eq!(p.percent, 100);
        assert_eq!(p.value, p.max);
    }

    #[test]
    fn add_xp_reports_rank_change() {
        let settings = XpSettings::default();
        let mut player = Player { xp: 95, rank: 1 };

        let progress = settings.add_xp(&mut player, XpAction::JoinContest).unwrap();

        assert_eq!(progress.addition, 10);
        assert!(progress.rank_changed);
        assert_eq!(player.xp, 105);
        assert_eq!(player.rank, 2);
    }

    #[test]
    fn add_xp_without_credit_is_a_noop() {
        let mut settings = XpSettings::default();
        settings.credits.remove(&XpAction::CorrectAnswer);
        let mut player = Player { xp: 42, rank: 1 };

        assert!(settings.add_xp(&mut player, XpAction::CorrectAnswer).is_none());
        assert_eq!(player.xp, 42);
        assert_eq!(player.rank, 1);
    }

    #[test]
    fn merged_progress_sums_additions() {
        let settings = XpSettings::default();
        let mut player = Player { xp: 90, rank: 1 };
        let first = settings.add_xp(&mut player, XpAction::CorrectAnswer);
        let second = settings.add_xp(&mut player, XpAction::QuizFullScore);

        let merged = XpProgress::merge_into(first, second).unwrap();

        assert_eq!(merged.addition, 22);
        assert!(merged.rank_changed);
        assert_eq!(merged.xp, 112);
    }

    #[test]
    fn features_unlock_by_rank() {
        let requirements = BTreeMap::from([
            ("inviteFriendsToContest".to_string(), 2),
            ("newContest".to_string(), 3),
        ]);
        assert!(unlocked_features(&requirements, 1).is_empty());
        assert_eq!(unlocked_features(&requirements, 2), vec!["inviteFriendsToContest"]);
        assert_eq!(unlocked_features(&requirements, 4).len(), 2);
    }
}
