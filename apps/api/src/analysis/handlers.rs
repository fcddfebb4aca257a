//! Axum route handlers for the Analysis API.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::analysis::tasks::{catalogue, AnalysisTask, TaskDescriptor};
use crate::errors::AppError;
use crate::llm_client::ProviderSummary;
use crate::models::analysis::{AnalysisResult, Instruction};
use crate::session::handlers::load_session;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Either a catalogued `task` or a free-form `instruction`, never both.
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub provider: String,
    #[serde(default)]
    pub task: Option<AnalysisTask>,
    #[serde(default)]
    pub instruction: Option<String>,
    /// Only consulted for free-form instructions.
    #[serde(default)]
    pub extract_percentage: bool,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub task: Option<AnalysisTask>,
    pub result: AnalysisResult,
    pub score_recorded: bool,
}

impl AnalyzeRequest {
    fn resolve_instruction(&self) -> Result<Instruction, AppError> {
        match (&self.task, &self.instruction) {
            (Some(task), None) => Ok(task.instruction()),
            (None, Some(text)) if !text.trim().is_empty() => Ok(if self.extract_percentage {
                Instruction::expecting_percentage(text.as_str())
            } else {
                Instruction::new(text.as_str())
            }),
            (None, Some(_)) => Err(AppError::Validation(
                "instruction cannot be empty".to_string(),
            )),
            (Some(_), Some(_)) => Err(AppError::Validation(
                "provide either task or instruction, not both".to_string(),
            )),
            (None, None) => Err(AppError::Validation(
                "either task or instruction is required".to_string(),
            )),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/providers
pub async fn handle_list_providers(State(state): State<AppState>) -> Json<Vec<ProviderSummary>> {
    Json(state.dispatcher.providers())
}

/// GET /api/v1/tasks
pub async fn handle_list_tasks() -> Json<Vec<TaskDescriptor>> {
    Json(catalogue())
}

/// POST /api/v1/sessions/:id/analyze
///
/// Runs one analysis against the session's resume and job description.
/// The session lock is released while the provider call is in flight; an
/// extracted match percentage is appended to the session's score history.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let instruction = request.resolve_instruction()?;
    let session = load_session(&state, id).await?;

    let analysis_request = {
        let ctx = session.lock().await;
        if !ctx.is_ready() {
            return Err(AppError::Validation(
                "upload a resume and provide a job description first".to_string(),
            ));
        }
        ctx.analysis_request(instruction)
    };

    let result = state
        .dispatcher
        .analyze(&analysis_request, &request.provider)
        .await?;

    let score_recorded = match result.extracted_percentage {
        Some(score) => session.lock().await.record_score(score),
        None => false,
    };

    info!(
        session_id = %id,
        provider = %result.provider_id,
        task = ?request.task,
        score_recorded,
        "Analysis completed"
    );

    Ok(Json(AnalyzeResponse {
        task: request.task,
        result,
        score_recorded,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(task: Option<AnalysisTask>, instruction: Option<&str>) -> AnalyzeRequest {
        AnalyzeRequest {
            provider: "gemini".to_string(),
            task,
            instruction: instruction.map(str::to_string),
            extract_percentage: true,
        }
    }

    #[test]
    fn test_task_resolves_to_catalogued_instruction() {
        let instruction = request(Some(AnalysisTask::Summary), None)
            .resolve_instruction()
            .unwrap();
        assert_eq!(instruction, AnalysisTask::Summary.instruction());
        assert!(!instruction.expects_percentage);
    }

    #[test]
    fn test_custom_instruction_carries_opt_in() {
        let instruction = request(None, Some("Give a match percentage"))
            .resolve_instruction()
            .unwrap();
        assert!(instruction.expects_percentage);
    }

    #[test]
    fn test_task_and_instruction_are_exclusive() {
        assert!(request(Some(AnalysisTask::Summary), Some("x"))
            .resolve_instruction()
            .is_err());
        assert!(request(None, None).resolve_instruction().is_err());
        assert!(request(None, Some("  ")).resolve_instruction().is_err());
    }
}
