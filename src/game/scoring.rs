// src/game/scoring.rs

//! Applies a finished quiz to its contest: user, team and contest scores plus
//! leader election.

use chrono::{DateTime, Utc};

use crate::{
    error::GameError,
    models::contest::{Contest, Leader, TeamId},
};

/// What changed in the contest when a quiz score was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringOutcome {
    pub team: TeamId,
    pub added: i64,
    pub became_contest_leader: bool,
    pub became_team_leader: bool,
}

/// Adds `quiz_score` to `player`'s standing in `contest` and re-elects leaders.
///
/// A leader is only replaced by a strictly higher score; ties keep the incumbent.
/// An empty contest leader seat needs a positive score. An empty team leader seat
/// is filled by anyone.
pub fn apply_quiz_score(
    contest: &mut Contest,
    player: &Leader,
    quiz_score: i64,
    played_at: DateTime<Utc>,
) -> Result<ScoringOutcome, GameError> {
    let me = contest
        .users
        .get_mut(&player.user_id)
        .ok_or(GameError::NotJoinedToContest)?;
    let team = me.team;
    me.score += quiz_score;
    me.team_scores[team.index()] += quiz_score;
    me.last_played = Some(played_at);
    let my_score = me.score;
    let my_team_score = me.team_scores[team.index()];

    contest.score += quiz_score;
    contest.team_mut(team).score += quiz_score;

    let leader_score = contest
        .leader
        .as_ref()
        .and_then(|leader| contest.users.get(&leader.user_id))
        .map(|user| user.score);
    let became_contest_leader = my_score > leader_score.unwrap_or(0);
    if became_contest_leader {
        contest.leader = Some(player.clone());
    }

    let team_leader_score = contest
        .team(team)
        .leader
        .as_ref()
        .and_then(|leader| contest.users.get(&leader.user_id))
        .map(|user| user.team_scores[team.index()]);
    let became_team_leader = team_leader_score.is_none_or(|score| my_team_score > score);
    if became_team_leader {
        contest.team_mut(team).leader = Some(player.clone());
    }

    Ok(ScoringOutcome {
        team,
        added: quiz_score,
        became_contest_leader,
        became_team_leader,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::models::contest::{ContestUser, Team};

    fn leader(id: &str) -> Leader {
        Leader {
            user_id: id.to_string(),
            name: id.to_uppercase(),
            avatar: format!("{}.png", id),
        }
    }

    fn user(team: TeamId, score: i64) -> ContestUser {
        let mut team_scores = [0, 0];
        team_scores[team.index()] = score;
        ContestUser {
            team,
            score,
            team_scores,
            last_played: None,
        }
    }

    /// "alice" leads the contest and team 0 with 100, "bob" leads team 1 with 60,
    /// "me" is on team 0 with 30.
    fn contest() -> Contest {
        let users = HashMap::from([
            ("alice".to_string(), user(TeamId::First, 100)),
            ("bob".to_string(), user(TeamId::Second, 60)),
            ("me".to_string(), user(TeamId::First, 30)),
        ]);
        Contest {
            id: "c1".into(),
            name: String::new(),
            score: 190,
            teams: [
                Team {
                    score: 130,
                    leader: Some(leader("alice")),
                },
                Team {
                    score: 60,
                    leader: Some(leader("bob")),
                },
            ],
            users,
            leader: Some(leader("alice")),
            version: 3,
        }
    }

    fn assert_invariants(c: &Contest) {
        assert_eq!(c.score, c.teams[0].score + c.teams[1].score);
        for (index, team) in c.teams.iter().enumerate() {
            let contributed: i64 = c
                .users
                .values()
                .filter(|u| u.team.index() == index)
                .map(|u| u.team_scores[index])
                .sum();
            assert_eq!(team.score, contributed);
            if let Some(leader) = &team.leader {
                assert!(c.users.contains_key(&leader.user_id));
            }
        }
        if let Some(leader) = &c.leader {
            assert!(c.users.contains_key(&leader.user_id));
        }
    }

    #[test]
    fn small_score_updates_totals_without_leader_change() {
        let mut c = contest();
        let outcome = apply_quiz_score(&mut c, &leader("me"), 40, Utc::now()).unwrap();

        assert_eq!(outcome.team, TeamId::First);
        assert!(!outcome.became_contest_leader);
        assert!(!outcome.became_team_leader);
        assert_eq!(c.users["me"].score, 70);
        assert_eq!(c.users["me"].team_scores, [70, 0]);
        assert!(c.users["me"].last_played.is_some());
        assert_eq!(c.teams[0].score, 170);
        assert_eq!(c.score, 230);
        assert_invariants(&c);
    }

    #[test]
    fn tie_keeps_the_existing_leader() {
        let mut c = contest();
        let outcome = apply_quiz_score(&mut c, &leader("me"), 70, Utc::now()).unwrap();

        assert!(!outcome.became_contest_leader);
        assert!(!outcome.became_team_leader);
        assert_eq!(c.leader.as_ref().unwrap().user_id, "alice");
        assert_invariants(&c);
    }

    #[test]
    fn overtaking_replaces_both_leaders() {
        let mut c = contest();
        let outcome = apply_quiz_score(&mut c, &leader("me"), 71, Utc::now()).unwrap();

        assert!(outcome.became_contest_leader);
        assert!(outcome.became_team_leader);
        assert_eq!(c.leader, Some(leader("me")));
        assert_eq!(c.teams[0].leader, Some(leader("me")));
        assert_eq!(c.teams[1].leader, Some(leader("bob")));
        assert_invariants(&c);
    }

    #[test]
    fn current_leader_scoring_again_is_not_a_change() {
        let mut c = contest();
        let outcome = apply_quiz_score(&mut c, &leader("alice"), 50, Utc::now()).unwrap();

        assert!(!outcome.became_contest_leader);
        assert!(!outcome.became_team_leader);
        assert_invariants(&c);
    }

    #[test]
    fn missing_team_leader_is_filled() {
        let mut c = contest();
        c.teams[1].leader = None;
        let outcome = apply_quiz_score(&mut c, &leader("bob"), 0, Utc::now()).unwrap();

        assert!(outcome.became_team_leader);
        assert_eq!(c.teams[1].leader, Some(leader("bob")));
    }

    #[test]
    fn empty_contest_seat_needs_a_positive_score() {
        let mut c = contest();
        c.leader = None;
        c.users.insert("newbie".to_string(), user(TeamId::Second, 0));
        let outcome = apply_quiz_score(&mut c, &leader("newbie"), 0, Utc::now()).unwrap();
        assert!(!outcome.became_contest_leader);
        assert_eq!(c.leader, None);

        let outcome = apply_quiz_score(&mut c, &leader("newbie"), 5, Utc::now()).unwrap();
        assert!(outcome.became_contest_leader);
        assert_eq!(c.leader, Some(leader("newbie")));
        assert_invariants(&c);
    }

    #[test]
    fn non_participant_is_rejected() {
        let mut c = contest();
        let err = apply_quiz_score(&mut c, &leader("stranger"), 10, Utc::now()).unwrap_err();
        assert_eq!(err, GameError::NotJoinedToContest);
        assert_eq!(c.score, 190);
    }
}
