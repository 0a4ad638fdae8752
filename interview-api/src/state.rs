//! Shared application state for request handlers.

use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::bank::QuestionBank;
use crate::config::ServerConfig;
use crate::dispatch::JudgeDispatcher;
use crate::proctor::ProctorEvent;
use crate::session::Session;
use crate::store::{KeyValueStore, MemoryStore};

/// Uploaded resume or posted job description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub name: Option<String>,
    pub text: String,
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub bank: Arc<QuestionBank>,
    pub profiles: Arc<dyn KeyValueStore<Value>>,
    pub resumes: Arc<dyn KeyValueStore<Document>>,
    pub jds: Arc<dyn KeyValueStore<Document>>,
    pub sessions: Arc<dyn KeyValueStore<Session>>,
    /// Proctor log per session id.
    pub proctor_events: Arc<dyn KeyValueStore<Vec<ProctorEvent>>>,
    pub dispatcher: JudgeDispatcher,
}

impl AppState {
    /// State backed by in-memory stores and the built-in question bank.
    pub fn in_memory(config: ServerConfig) -> Result<Self> {
        config.validate()?;
        let bank = QuestionBank::builtin()?;
        let dispatcher = JudgeDispatcher::new(config.judge.clone())?;
        Ok(Self {
            config: Arc::new(config),
            bank: Arc::new(bank),
            profiles: Arc::new(MemoryStore::new()),
            resumes: Arc::new(MemoryStore::new()),
            jds: Arc::new(MemoryStore::new()),
            sessions: Arc::new(MemoryStore::new()),
            proctor_events: Arc::new(MemoryStore::new()),
            dispatcher,
        })
    }
}
