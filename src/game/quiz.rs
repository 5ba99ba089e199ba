// src/game/quiz.rs

//! Quiz lifecycle: start, serve the next question, evaluate an answer.

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::{
    config::GameSettings,
    error::GameError,
    game::rank::{XpAction, XpProgress, unlocked_features},
    models::{
        contest::{Contest, TeamId},
        question::{ClientQuestion, Direction, Question},
        quiz::{BackgroundFacts, Quiz, QuizClientData, QuizPhase, QuizServerData, Share},
        session::Session,
    },
};

/// Quiz configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QuizSettings {
    /// Score of each question, by question index. Its length is the quiz length.
    pub levels: Vec<i64>,

    /// Distance (percent of contest score) deciding the team comeback stories.
    pub team_percent_distance_for_share: f64,

    /// Lowest score a correct answer is worth after hint/answer costs.
    pub min_question_score: i64,

    /// How long the client waits before revealing the correct answer.
    pub reveal_correct_answer_delay_ms: u64,

    pub friends_above_me_limit: i64,
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            levels: vec![10, 20, 30, 40, 50],
            team_percent_distance_for_share: 10.0,
            min_question_score: 0,
            reveal_correct_answer_delay_ms: 3000,
            friends_above_me_limit: 5,
        }
    }
}

impl QuizSettings {
    pub fn total_questions(&self) -> usize {
        self.levels.len()
    }

    pub fn level_score(&self, question_index: usize) -> i64 {
        self.levels.get(question_index).copied().unwrap_or(0)
    }
}

/// Answer submitted by the client.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerInput {
    /// 1-based answer id.
    pub id: i64,
    #[serde(default)]
    pub hint_used: bool,
    #[serde(default)]
    pub answer_used: bool,
}

/// What the client learns about the question it just answered.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnsweredQuestion {
    pub answer_id: usize,
    pub correct: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_answer_id: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reveal_delay_ms: Option<u64>,
    #[serde(skip)]
    pub question_id: i64,
    #[serde(skip)]
    pub question_score: i64,
}

/// Everything `evaluate_answer` changed on the session.
#[derive(Debug, Clone)]
pub struct AnswerOutcome {
    pub question: AnsweredQuestion,
    pub finished: bool,
    pub perfect: bool,
    pub xp_progress: Option<XpProgress>,
    /// Recomputed feature list, present only when the rank went up.
    pub features: Option<Vec<String>>,
}

/// Captures the contest facts stories are later derived from.
///
/// On a tie the lead goes to the team the player is not on: any score the player
/// earns then puts their own team in front.
pub fn background_facts(contest: &Contest, my_team: TeamId, share_distance: f64) -> BackgroundFacts {
    let mine = contest.team(my_team).score;
    let theirs = contest.team(my_team.other()).score;

    let leading_team = if mine > theirs {
        my_team
    } else {
        my_team.other()
    };

    let my_team_started_behind =
        mine < theirs && contest.team_distance_percent(my_team.other()) > share_distance;

    BackgroundFacts {
        leading_team: Some(leading_team),
        my_team_started_behind,
        friends_above_me: None,
    }
}

/// Creates a quiz for `user_id` in `contest`. No question is served yet.
pub fn new_quiz(contest: &Contest, user_id: &str, settings: &QuizSettings) -> Result<Quiz, GameError> {
    let me = contest
        .users
        .get(user_id)
        .ok_or(GameError::NotJoinedToContest)?;

    Ok(Quiz {
        client_data: QuizClientData {
            total_questions: settings.total_questions(),
            current_question_index: -1,
            finished: false,
            current_question: None,
        },
        server_data: QuizServerData {
            previous_questions: Vec::new(),
            contest_id: contest.id.clone(),
            score: 0,
            correct_answers: 0,
            current_question: None,
            share: Share {
                data: background_facts(contest, me.team, settings.team_percent_distance_for_share),
                stories: Vec::new(),
            },
        },
    })
}

/// Topic ids of `language` in random order; callers try them until one still has
/// unseen questions.
pub fn topic_order(settings: &GameSettings, language: &str) -> Vec<i64> {
    let mut topics = settings.trivia_topics(language).to_vec();
    topics.shuffle(&mut rand::thread_rng());
    topics
}

impl Quiz {
    pub fn phase(&self) -> QuizPhase {
        if self.client_data.finished {
            QuizPhase::Finished
        } else {
            QuizPhase::InProgress
        }
    }

    pub fn is_perfect(&self) -> bool {
        self.server_data.correct_answers == self.client_data.total_questions
    }

    /// Checks a new question may be served.
    pub fn ensure_can_advance(&self) -> Result<(), GameError> {
        if self.phase() == QuizPhase::Finished {
            return Err(GameError::QuizFinished);
        }
        if self
            .client_data
            .current_question
            .as_ref()
            .is_some_and(|question| !question.answered)
        {
            return Err(GameError::QuestionNotAnswered);
        }
        let next_index = self.client_data.current_question_index + 1;
        if next_index as usize >= self.client_data.total_questions {
            return Err(GameError::NoMoreQuestions);
        }
        Ok(())
    }

    /// Makes `question` the current question.
    pub fn serve_question(&mut self, question: Question, direction: Direction) {
        self.client_data.current_question_index += 1;
        self.server_data.previous_questions.push(question.id);
        self.client_data.current_question = Some(ClientQuestion::new(&question, direction));
        self.server_data.current_question = Some(question);
    }

    /// Evaluates an answer to the current question and adds its score.
    ///
    /// Finishes the quiz when the answered question is the last one.
    pub fn record_answer(
        &mut self,
        input: &AnswerInput,
        settings: &QuizSettings,
    ) -> Result<AnsweredQuestion, GameError> {
        if self.phase() == QuizPhase::Finished {
            return Err(GameError::QuizFinished);
        }
        let (Some(question), Some(client_question)) = (
            self.server_data.current_question.as_ref(),
            self.client_data.current_question.as_mut(),
        ) else {
            return Err(GameError::SessionExpiredDuringQuiz);
        };
        if client_question.answered {
            return Err(GameError::QuestionAlreadyAnswered);
        }
        if input.id < 1 || input.id as usize > question.answers.len() {
            return Err(GameError::InvalidAnswerId);
        }

        let answer_id = input.id as usize;
        client_question.answered = true;
        let correct = question.answers[answer_id - 1].correct;
        let index = self.client_data.current_question_index.max(0) as usize;

        let mut question_score = 0;
        let mut correct_answer_id = None;
        if correct {
            // answer cost wins over hint cost
            let cost = if input.answer_used && question.answer_cost.is_some() {
                question.answer_cost
            } else if input.hint_used {
                question.hint_cost
            } else {
                None
            };
            question_score = (settings.level_score(index) - cost.unwrap_or(0).max(0))
                .max(settings.min_question_score);
            self.server_data.correct_answers += 1;
            self.server_data.score += question_score;
        } else {
            correct_answer_id = question.correct_answer_id();
        }

        let question_id = question.id;
        if index + 1 == self.client_data.total_questions {
            self.client_data.finished = true;
        }

        Ok(AnsweredQuestion {
            answer_id,
            correct,
            correct_answer_id,
            reveal_delay_ms: correct_answer_id.map(|_| settings.reveal_correct_answer_delay_ms),
            question_id,
            question_score,
        })
    }
}

/// Applies an answer to the session's quiz, grants XP and, when the quiz finishes,
/// adds its score to the session's lifetime score.
pub fn evaluate_answer(
    session: &mut Session,
    input: &AnswerInput,
    settings: &GameSettings,
) -> Result<AnswerOutcome, GameError> {
    let quiz = session
        .quiz
        .as_mut()
        .ok_or(GameError::SessionExpiredDuringQuiz)?;
    let question = quiz.record_answer(input, &settings.quiz)?;
    let finished = quiz.phase() == QuizPhase::Finished;
    let perfect = finished && quiz.is_perfect();
    let quiz_score = quiz.server_data.score;

    let mut xp_progress = None;
    if question.correct {
        xp_progress = settings.xp.add_xp(session, XpAction::CorrectAnswer);
    }
    if perfect {
        let bonus = settings.xp.add_xp(session, XpAction::QuizFullScore);
        xp_progress = XpProgress::merge_into(xp_progress, bonus);
    }
    if finished {
        session.score += quiz_score;
    }

    let features = match xp_progress {
        Some(progress) if progress.rank_changed => {
            session.features = unlocked_features(&settings.features, session.rank);
            Some(session.features.clone())
        }
        _ => None,
    };

    Ok(AnswerOutcome {
        question,
        finished,
        perfect,
        xp_progress,
        features,
    })
}
