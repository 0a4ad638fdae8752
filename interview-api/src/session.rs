//! Interview sessions: MCQ progression, coding attempts and feedback.

use serde::{Deserialize, Serialize};

use crate::bank::QuestionBank;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "type")]
    pub kind: String,
    pub mcq_index: usize,
    pub score: u32,
    /// Best coding run recorded for this session.
    pub coding: Option<CodingAttempt>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodingAttempt {
    pub problem_id: String,
    pub passed: usize,
    pub total: usize,
}

impl CodingAttempt {
    fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.passed as f64 / self.total as f64
        }
    }
}

impl Session {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            mcq_index: 0,
            score: 0,
            coding: None,
        }
    }

    /// Keep the attempt if it beats the recorded one.
    pub fn record_coding(&mut self, attempt: CodingAttempt) {
        let better = match &self.coding {
            Some(best) => attempt.ratio() > best.ratio(),
            None => true,
        };
        if better {
            self.coding = Some(attempt);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct McqNext {
    pub id: Option<String>,
    pub question: Option<String>,
    pub options: Vec<String>,
    /// 1-based position of the returned question.
    pub index: usize,
    pub total: usize,
}

impl McqNext {
    fn none(index: usize, total: usize) -> Self {
        Self {
            id: None,
            question: None,
            options: Vec::new(),
            index,
            total,
        }
    }
}

/// Question the session should answer next, without advancing.
pub fn next_question(session: Option<&Session>, bank: &QuestionBank) -> McqNext {
    let Some(session) = session else {
        return McqNext::none(0, 0);
    };
    let total = bank.mcq_count();
    match bank.mcq_at(session.mcq_index) {
        Some(q) => McqNext {
            id: Some(q.id.clone()),
            question: Some(q.question.clone()),
            options: q.options.clone(),
            index: session.mcq_index + 1,
            total,
        },
        None => McqNext::none(session.mcq_index, total),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct McqSubmission {
    pub correct: bool,
    pub score_delta: u32,
    pub total_score: u32,
    pub next_available: bool,
}

impl McqSubmission {
    pub fn unknown_session() -> Self {
        Self {
            correct: false,
            score_delta: 0,
            total_score: 0,
            next_available: false,
        }
    }
}

/// Grade an answer and advance the session by one question.
pub fn submit_answer(
    session: &mut Session,
    bank: &QuestionBank,
    question_id: &str,
    selected_index: usize,
) -> McqSubmission {
    let correct = bank
        .mcq_by_id(question_id)
        .is_some_and(|q| q.answer == selected_index);
    let score_delta = u32::from(correct);
    session.score += score_delta;
    session.mcq_index += 1;
    McqSubmission {
        correct,
        score_delta,
        total_score: session.score,
        next_available: session.mcq_index < bank.mcq_count(),
    }
}

/// Mocked HR turn count and score until answer scoring exists.
const HR_TURNS: u32 = 3;
const HR_SCORE: f64 = 0.7;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedbackSummary {
    pub mcq_score: u32,
    pub hr_turns: u32,
    pub coding: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedbackScores {
    pub mcq: u32,
    pub hr: f64,
    pub coding: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feedback {
    pub summary: FeedbackSummary,
    pub scores: FeedbackScores,
}

pub fn feedback(session: Option<&Session>) -> Feedback {
    let mcq = session.map_or(0, |s| s.score);
    let attempt = session.and_then(|s| s.coding.as_ref());
    Feedback {
        summary: FeedbackSummary {
            mcq_score: mcq,
            hr_turns: HR_TURNS,
            coding: if attempt.is_some() {
                "attempted"
            } else {
                "not_attempted"
            },
        },
        scores: FeedbackScores {
            mcq,
            hr: HR_SCORE,
            coding: attempt.map_or(0.0, CodingAttempt::ratio),
        },
    }
}
