// src/game/stories.rs

use crate::{
    game::scoring::ScoringOutcome,
    models::{
        contest::Contest,
        leaderboard::FriendScore,
        quiz::{BackgroundFacts, Story},
    },
};

/// Compares the facts captured at quiz start with the scored contest.
///
/// Emission order is fixed: contest leader, team leader, perfect score, team
/// comeback, passed friends. A team that started behind and ends tied gets neither
/// comeback story.
pub fn derive_stories(
    facts: &BackgroundFacts,
    outcome: &ScoringOutcome,
    contest: &Contest,
    perfect: bool,
    passed_friends: Vec<FriendScore>,
    share_distance: f64,
) -> Vec<Story> {
    let mut stories = Vec::new();

    if outcome.became_contest_leader {
        stories.push(Story::BecameContestLeader);
    }
    if outcome.became_team_leader {
        stories.push(Story::BecameTeamLeader);
    }
    if perfect {
        stories.push(Story::PerfectScore);
    }

    if facts.my_team_started_behind {
        let mine = contest.team(outcome.team).score;
        let theirs = contest.team(outcome.team.other()).score;
        if mine > theirs {
            stories.push(Story::MyTeamStartedLeading);
        } else if mine < theirs && contest.team_distance_percent(outcome.team.other()) < share_distance {
            stories.push(Story::MyTeamAlmostLeads);
        }
    }

    if !passed_friends.is_empty() {
        stories.push(Story::PassedFriends { passed_friends });
    }

    stories
}
