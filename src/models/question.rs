// src/models/question.rs

use serde::{Deserialize, Serialize};

/// One selectable answer of a question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,

    /// Only ever sent to the client inside server-side quiz state.
    #[serde(default)]
    pub correct: bool,
}

/// Represents a question document in the document store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: i64,

    /// Topic the question belongs to; decides the forced text direction.
    pub topic_id: i64,

    pub text: String,

    /// Answers in display order. Answer ids are 1-based positions in this list.
    pub answers: Vec<Answer>,

    /// Score deducted when the player used a hint and answered correctly.
    #[serde(default)]
    pub hint_cost: Option<i64>,

    /// Score deducted when the player revealed the answer. Wins over `hint_cost`.
    #[serde(default)]
    pub answer_cost: Option<i64>,

    #[serde(default)]
    pub correct_count: i64,

    #[serde(default)]
    pub wrong_count: i64,
}

impl Question {
    /// 1-based id of the first answer flagged correct.
    pub fn correct_answer_id(&self) -> Option<usize> {
        self.answers
            .iter()
            .position(|answer| answer.correct)
            .map(|index| index + 1)
    }
}

/// Text direction a question is rendered in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Ltr,
    Rtl,
}

/// Represents a topic document. Topics group questions and may force a direction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub force_direction: Option<Direction>,
}

/// Answer as seen by the client: text only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientAnswer {
    pub text: String,
}

/// DTO for sending the current question to the client (no correct-answer flags).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientQuestion {
    pub id: i64,
    pub text: String,
    pub answers: Vec<ClientAnswer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint_cost: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer_cost: Option<i64>,
    pub direction: Direction,
    pub answered: bool,
}

impl ClientQuestion {
    pub fn new(question: &Question, direction: Direction) -> Self {
        Self {
            id: question.id,
            text: question.text.clone(),
            answers: question
                .answers
                .iter()
                .map(|answer| ClientAnswer {
                    text: answer.text.clone(),
                })
                .collect(),
            hint_cost: question.hint_cost,
            answer_cost: question.answer_cost,
            direction,
            answered: false,
        }
    }
}

/// Criteria used to pick the next question of a quiz.
#[derive(Debug, Clone)]
pub struct QuestionCriteria {
    pub topic_id: i64,

    /// Question ids already served in this quiz.
    pub exclude: Vec<i64>,
}
