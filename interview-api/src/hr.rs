//! HR round: rotating prompts and rough transcript metrics.

use serde::Serialize;

pub const HR_QUESTIONS: [&str; 3] = [
    "Tell me about yourself.",
    "Describe a challenging project you worked on.",
    "What are your strengths and weaknesses?",
];

/// Prompt for a session that has logged `event_count` proctor events.
pub fn question_for(event_count: usize) -> &'static str {
    HR_QUESTIONS[event_count % HR_QUESTIONS.len()]
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptMetrics {
    pub words_per_min_approx: usize,
    pub filler_ratio_approx: f64,
    pub sentiment_approx: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestReport {
    pub transcript: String,
    pub metrics: TranscriptMetrics,
}

pub fn analyze(transcript: &str) -> TranscriptMetrics {
    let words = transcript.split_whitespace().count();
    let lowered = transcript.to_lowercase();
    TranscriptMetrics {
        words_per_min_approx: (words / 3).clamp(60, 160),
        filler_ratio_approx: if lowered.contains("um") { 0.15 } else { 0.05 },
        sentiment_approx: if lowered.contains("enjoy") {
            "positive"
        } else {
            "neutral"
        },
    }
}

pub fn ingest(transcript: Option<String>) -> IngestReport {
    let transcript = transcript.unwrap_or_default();
    let metrics = analyze(&transcript);
    IngestReport {
        transcript,
        metrics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotates_by_event_count() {
        assert_eq!(question_for(0), HR_QUESTIONS[0]);
        assert_eq!(question_for(2), HR_QUESTIONS[2]);
        assert_eq!(question_for(4), HR_QUESTIONS[1]);
    }

    #[test]
    fn words_per_minute_is_clamped() {
        assert_eq!(analyze("").words_per_min_approx, 60);
        let long = "word ".repeat(600);
        assert_eq!(analyze(&long).words_per_min_approx, 160);
        let mid = "word ".repeat(300);
        assert_eq!(analyze(&mid).words_per_min_approx, 100);
    }

    #[test]
    fn filler_and_sentiment_markers() {
        let m = analyze("Um, I really ENJOY building things");
        assert_eq!(m.filler_ratio_approx, 0.15);
        assert_eq!(m.sentiment_approx, "positive");

        let m = analyze("I build things");
        assert_eq!(m.filler_ratio_approx, 0.05);
        assert_eq!(m.sentiment_approx, "neutral");
    }

    #[test]
    fn missing_transcript_is_empty() {
        let report = ingest(None);
        assert_eq!(report.transcript, "");
        assert_eq!(report.metrics.words_per_min_approx, 60);
    }
}
