//! Built-in question bank: multiple-choice questions and coding problems.

use std::collections::HashSet;

use anyhow::{Context, Result, bail};
use judge::TestCase;
use serde::{Deserialize, Serialize};

const MCQ_BANK: &str = include_str!("../data/mcq_bank.json");
const CODING_PROBLEMS: &str = include_str!("../data/coding_problems.json");

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct McqQuestion {
    pub id: String,
    pub question: String,
    pub options: Vec<String>,
    /// Index into `options`. Never sent to clients.
    pub answer: usize,
}

/// Client view of a question, without the answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct McqPrompt {
    pub id: String,
    pub question: String,
    pub options: Vec<String>,
}

impl From<&McqQuestion> for McqPrompt {
    fn from(q: &McqQuestion) -> Self {
        Self {
            id: q.id.clone(),
            question: q.question.clone(),
            options: q.options.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CodingProblem {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub prompt: String,
    /// Hidden tests; only the judge sees them.
    pub tests: Vec<TestCase>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProblemSummary {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone)]
pub struct QuestionBank {
    mcqs: Vec<McqQuestion>,
    problems: Vec<CodingProblem>,
}

impl QuestionBank {
    /// Bank compiled into the binary.
    pub fn builtin() -> Result<Self> {
        Self::from_json(MCQ_BANK, CODING_PROBLEMS)
    }

    pub fn from_json(mcq_json: &str, problems_json: &str) -> Result<Self> {
        let mcqs: Vec<McqQuestion> = serde_json::from_str(mcq_json).context("parse mcq bank")?;
        let problems: Vec<CodingProblem> =
            serde_json::from_str(problems_json).context("parse coding problems")?;
        let bank = Self { mcqs, problems };
        bank.validate()?;
        Ok(bank)
    }

    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for q in &self.mcqs {
            if !seen.insert(q.id.as_str()) {
                bail!("duplicate mcq id {}", q.id);
            }
            if q.answer >= q.options.len() {
                bail!("mcq {} answer index {} out of range", q.id, q.answer);
            }
        }
        let mut seen = HashSet::new();
        for p in &self.problems {
            if !seen.insert(p.id.as_str()) {
                bail!("duplicate problem id {}", p.id);
            }
            if p.tests.is_empty() {
                bail!("problem {} has no tests", p.id);
            }
        }
        Ok(())
    }

    pub fn mcq_count(&self) -> usize {
        self.mcqs.len()
    }

    pub fn mcq_at(&self, index: usize) -> Option<&McqQuestion> {
        self.mcqs.get(index)
    }

    pub fn mcq_by_id(&self, id: &str) -> Option<&McqQuestion> {
        self.mcqs.iter().find(|q| q.id == id)
    }

    pub fn mcq_prompts(&self) -> Vec<McqPrompt> {
        self.mcqs.iter().map(McqPrompt::from).collect()
    }

    pub fn problem(&self, id: &str) -> Option<&CodingProblem> {
        self.problems.iter().find(|p| p.id == id)
    }

    pub fn problem_summaries(&self) -> Vec<ProblemSummary> {
        self.problems
            .iter()
            .map(|p| ProblemSummary {
                id: p.id.clone(),
                title: p.title.clone(),
            })
            .collect()
    }
}
