use axum::{
    body::Bytes,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::analysis::insights::{top_skills, ScoreStats, SkillFrequency, DEFAULT_TOP_SKILLS};
use crate::errors::AppError;
use crate::extraction::extract_text;
use crate::models::analysis::Language;
use crate::session::{SessionSummary, SharedSession};
use crate::state::AppState;

/// Multipart field names accepted for the resume file.
const UPLOAD_FIELDS: [&str; 2] = ["file", "resume"];

#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub language: Language,
}

#[derive(Debug, Deserialize)]
pub struct JobDescriptionRequest {
    pub job_description: String,
}

#[derive(Debug, Deserialize)]
pub struct LanguageRequest {
    pub language: Language,
}

#[derive(Debug, Serialize)]
pub struct ResumeUploadResponse {
    pub file_name: String,
    pub chars: usize,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ScoresResponse {
    pub scores: Vec<u8>,
    /// `null` until at least one score has been recorded.
    pub stats: Option<ScoreStats>,
}

#[derive(Debug, Deserialize)]
pub struct SkillsQuery {
    pub limit: Option<usize>,
}

pub(crate) async fn load_session(state: &AppState, id: Uuid) -> Result<SharedSession, AppError> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
}

/// POST /api/v1/sessions
///
/// An empty body creates an English session. Anything else must be a valid
/// `CreateSessionRequest`.
pub async fn handle_create_session(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<SessionSummary>), AppError> {
    let request = parse_create_request(&body)?;
    let summary = state.sessions.create(request.language).await;
    Ok((StatusCode::CREATED, Json(summary)))
}

fn parse_create_request(body: &[u8]) -> Result<CreateSessionRequest, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(CreateSessionRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::Validation(format!("invalid session request: {e}")))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSummary>, AppError> {
    let session = load_session(&state, id).await?;
    let summary = session.lock().await.summary();
    Ok(Json(summary))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_end_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.sessions.end(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Session {id} not found")))
    }
}

/// POST /api/v1/sessions/:id/resume
///
/// Accepts a multipart upload and stores the extracted text on the session.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<ResumeUploadResponse>, AppError> {
    let session = load_session(&state, id).await?;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart body: {e}")))?
    {
        if !field.name().is_some_and(|name| UPLOAD_FIELDS.contains(&name)) {
            continue;
        }
        let file_name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::Validation("uploaded file has no file name".to_string()))?;
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("could not read upload: {e}")))?;
        upload = Some((file_name, data));
        break;
    }

    let (file_name, data) = upload
        .ok_or_else(|| AppError::Validation("multipart field 'file' is required".to_string()))?;

    // PDF and DOCX parsing is CPU-bound; keep it off the async workers.
    let name = file_name.clone();
    let text = tokio::task::spawn_blocking(move || extract_text(&name, &data))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("extraction task failed: {e}")))??;

    let chars = text.chars().count();
    info!(session_id = %id, %file_name, chars, "Resume processed");

    session.lock().await.set_resume(file_name.clone(), text.clone());

    Ok(Json(ResumeUploadResponse {
        file_name,
        chars,
        text,
    }))
}

/// PUT /api/v1/sessions/:id/job-description
pub async fn handle_set_job_description(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<JobDescriptionRequest>,
) -> Result<Json<SessionSummary>, AppError> {
    if request.job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "job_description cannot be empty".to_string(),
        ));
    }

    let session = load_session(&state, id).await?;
    let mut ctx = session.lock().await;
    ctx.set_job_description(request.job_description);
    Ok(Json(ctx.summary()))
}

/// PUT /api/v1/sessions/:id/language
pub async fn handle_set_language(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<LanguageRequest>,
) -> Result<Json<SessionSummary>, AppError> {
    let session = load_session(&state, id).await?;
    let mut ctx = session.lock().await;
    ctx.set_language(request.language);
    Ok(Json(ctx.summary()))
}

/// GET /api/v1/sessions/:id/scores
pub async fn handle_get_scores(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ScoresResponse>, AppError> {
    let session = load_session(&state, id).await?;
    let ctx = session.lock().await;
    Ok(Json(ScoresResponse {
        scores: ctx.scores().scores().to_vec(),
        stats: ctx.scores().stats(),
    }))
}

/// GET /api/v1/sessions/:id/skills
pub async fn handle_get_skills(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<SkillsQuery>,
) -> Result<Json<Vec<SkillFrequency>>, AppError> {
    let session = load_session(&state, id).await?;
    let ctx = session.lock().await;
    let limit = query.limit.unwrap_or(DEFAULT_TOP_SKILLS);
    Ok(Json(top_skills(ctx.resume_text(), limit)))
}
