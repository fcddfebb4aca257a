// Per-session state: the uploaded resume text, the job description, the
// output language and the match-percentage history. Nothing here outlives
// the process; ending a session, or leaving it idle past the configured
// timeout, drops all of it.

pub mod handlers;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::info;
use uuid::Uuid;

use crate::analysis::insights::ScoreHistory;
use crate::models::analysis::{AnalysisRequest, Instruction, Language};

#[derive(Debug)]
pub struct SessionContext {
    id: Uuid,
    created_at: DateTime<Utc>,
    language: Language,
    resume_file_name: Option<String>,
    resume_text: String,
    job_description: String,
    scores: ScoreHistory,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub language: Language,
    pub resume_file_name: Option<String>,
    pub resume_chars: usize,
    pub job_description_chars: usize,
    pub score_count: usize,
}

impl SessionContext {
    pub fn new(language: Language) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            language,
            resume_file_name: None,
            resume_text: String::new(),
            job_description: String::new(),
            scores: ScoreHistory::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn resume_text(&self) -> &str {
        &self.resume_text
    }

    pub fn scores(&self) -> &ScoreHistory {
        &self.scores
    }

    pub fn set_resume(&mut self, file_name: impl Into<String>, text: String) {
        self.resume_file_name = Some(file_name.into());
        self.resume_text = text;
    }

    pub fn set_job_description(&mut self, job_description: String) {
        self.job_description = job_description;
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    pub fn record_score(&mut self, score: u8) -> bool {
        self.scores.push(score)
    }

    /// Whether both inputs an analysis needs are present.
    pub fn is_ready(&self) -> bool {
        !self.resume_text.trim().is_empty() && !self.job_description.trim().is_empty()
    }

    /// Snapshots the session inputs into an immutable request.
    pub fn analysis_request(&self, instruction: Instruction) -> AnalysisRequest {
        AnalysisRequest::new(
            self.job_description.clone(),
            self.resume_text.clone(),
            instruction,
            self.language,
        )
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            id: self.id,
            created_at: self.created_at,
            language: self.language,
            resume_file_name: self.resume_file_name.clone(),
            resume_chars: self.resume_text.chars().count(),
            job_description_chars: self.job_description.chars().count(),
            score_count: self.scores.len(),
        }
    }
}

pub type SharedSession = Arc<Mutex<SessionContext>>;

/// Longest pause between two idle sweeps.
const MAX_SWEEP_PERIOD: Duration = Duration::from_secs(60);

struct StoredSession {
    session: SharedSession,
    last_seen: Instant,
}

/// In-memory registry of live sessions. Each session has its own lock so
/// independent sessions never contend.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, StoredSession>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self, language: Language) -> SessionSummary {
        let context = SessionContext::new(language);
        let summary = context.summary();
        self.sessions.write().await.insert(
            context.id(),
            StoredSession {
                session: Arc::new(Mutex::new(context)),
                last_seen: Instant::now(),
            },
        );
        info!(session_id = %summary.id, language = %language, "Session created");
        summary
    }

    /// Looks a session up and marks it as active.
    pub async fn get(&self, id: Uuid) -> Option<SharedSession> {
        let mut sessions = self.sessions.write().await;
        let stored = sessions.get_mut(&id)?;
        stored.last_seen = Instant::now();
        Some(stored.session.clone())
    }

    /// Removes the session; its history goes with it.
    pub async fn end(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            info!(session_id = %id, "Session ended");
        }
        removed
    }

    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drops every session not looked up within `max_idle`. Returns how many
    /// were removed.
    pub async fn expire_idle(&self, max_idle: Duration) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, stored| now.duration_since(stored.last_seen) < max_idle);
        before - sessions.len()
    }

    /// Runs `expire_idle` periodically for the life of the process.
    pub fn spawn_sweeper(&self, max_idle: Duration) -> JoinHandle<()> {
        let store = self.clone();
        let period = max_idle.min(MAX_SWEEP_PERIOD);
        tokio::spawn(async move {
            let mut tick = interval(period);
            tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tick.tick().await;
                let removed = store.expire_idle(max_idle).await;
                if removed > 0 {
                    info!(removed, "Expired idle sessions");
                }
            }
        })
    }
}
