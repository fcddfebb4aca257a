use std::sync::Arc;

use crate::llm_client::Dispatcher;
use crate::session::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Read-only after start-up; provider configs never change at runtime.
    pub dispatcher: Arc<Dispatcher>,
    pub sessions: SessionStore,
}
