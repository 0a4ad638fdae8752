//! Proctoring event log and flags.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const HARD_FLAG_EVENT: &str = "webcam_off";
const SOFT_FLAG_EVENT: &str = "tab_blur";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProctorEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub meta: Option<Value>,
    pub at: DateTime<Utc>,
}

impl ProctorEvent {
    pub fn now(kind: impl Into<String>, meta: Option<Value>) -> Self {
        Self {
            kind: kind.into(),
            meta,
            at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProctorFlags {
    pub events: Vec<ProctorEvent>,
    pub hard_flag: bool,
    pub soft_flag_count: usize,
}

pub fn flags(events: Vec<ProctorEvent>) -> ProctorFlags {
    let hard_flag = events.iter().any(|e| e.kind == HARD_FLAG_EVENT);
    let soft_flag_count = events.iter().filter(|e| e.kind == SOFT_FLAG_EVENT).count();
    ProctorFlags {
        events,
        hard_flag,
        soft_flag_count,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn counts_blur_and_flags_webcam() {
        let events = vec![
            ProctorEvent::now("tab_blur", None),
            ProctorEvent::now("tab_blur", Some(json!({"ms": 1200}))),
            ProctorEvent::now("focus", None),
        ];
        let report = flags(events);
        assert!(!report.hard_flag);
        assert_eq!(report.soft_flag_count, 2);

        let report = flags(vec![ProctorEvent::now("webcam_off", None)]);
        assert!(report.hard_flag);
        assert_eq!(report.soft_flag_count, 0);
    }

    #[test]
    fn serializes_kind_as_type() {
        let event = ProctorEvent::now("tab_blur", None);
        let json = serde_json::to_value(&event).expect("serialize");
        assert_eq!(json["type"], "tab_blur");
        assert!(json["meta"].is_null());
        assert!(json["at"].is_string());
    }
}
