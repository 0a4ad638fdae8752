//! Resume to job-description matching.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static TOKEN_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9]+").expect("token split regex"));

fn term_counts(text: &str) -> HashMap<String, u32> {
    let lowered = text.to_lowercase();
    let mut counts = HashMap::new();
    for token in TOKEN_SPLIT.split(&lowered).filter(|t| !t.is_empty()) {
        *counts.entry(token.to_string()).or_insert(0) += 1;
    }
    counts
}

fn norm(counts: &HashMap<String, u32>) -> f64 {
    counts
        .values()
        .map(|&c| f64::from(c) * f64::from(c))
        .sum::<f64>()
        .sqrt()
}

/// Bag-of-words cosine similarity. 0 when either side has no tokens.
pub fn cosine_similarity(a: &str, b: &str) -> f64 {
    let va = term_counts(a);
    let vb = term_counts(b);
    let (na, nb) = (norm(&va), norm(&vb));
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    let dot: f64 = va
        .iter()
        .filter_map(|(term, &ca)| vb.get(term).map(|&cb| f64::from(ca) * f64::from(cb)))
        .sum();
    dot / (na * nb)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skill {
    pub name: &'static str,
    pub level: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchReport {
    pub score: f64,
    pub skills: Vec<Skill>,
    pub gaps: Vec<&'static str>,
}

/// Skills and gaps are fixed until extraction exists.
pub fn match_texts(resume: &str, jd: &str) -> MatchReport {
    MatchReport {
        score: cosine_similarity(resume, jd),
        skills: vec![
            Skill {
                name: "python",
                level: "intermediate",
            },
            Skill {
                name: "react",
                level: "beginner",
            },
        ],
        gaps: vec!["kubernetes", "aws"],
    }
}
