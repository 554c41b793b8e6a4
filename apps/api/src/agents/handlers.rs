//! Axum route handlers for the agent endpoints.
//!
//! Public `/v1/*` endpoints take typed bodies. The `/v1/local/*` endpoints are
//! called by the agent platform with loosely shaped JSON, so they accept any
//! object and answer 200 with degraded content when fields are missing.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::agents::app_writer::draft_cover_letter;
use crate::agents::coach::interview_coach;
use crate::agents::cv_analyzer::analyze_profile;
use crate::agents::job_scout::{filter_jobs, JobFilters};
use crate::agents::matcher::match_jobs;
use crate::errors::AppError;
use crate::llm_client::ChatModel;
use crate::models::api::{
    AnalyzeRequest, AnalyzeResponse, CoachRequest, CoachResponse, LocalCoachRequest,
    MatchRequest, MatchesResponse, WriteRequest, WriteResponse,
};
use crate::models::profile::{JobItem, MatchResult, UserProfile};
use crate::state::AppState;

const UPLOAD_FIELD: &str = "file";

/// Served by `/v1/analyze` when there is no text to analyze.
pub fn default_analysis() -> AnalyzeResponse {
    AnalyzeResponse {
        skills: ["Python", "JavaScript", "Git", "Problem Solving"]
            .map(String::from)
            .to_vec(),
        highlights: vec![
            "Strong analytical skills".to_string(),
            "Team collaboration".to_string(),
        ],
        profile_text: "Basic technical profile".to_string(),
    }
}

async fn analyze_or_default(text: &str, llm: Option<&dyn ChatModel>) -> AnalyzeResponse {
    if text.trim().is_empty() {
        return default_analysis();
    }
    analyze_profile(text, llm).await
}

/// Null, empty strings, empty arrays and empty objects count as missing.
fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(a)) => a.is_empty(),
        Some(Value::Object(o)) => o.is_empty(),
        Some(_) => false,
    }
}

fn field<T: DeserializeOwned>(body: &Value, key: &str) -> Result<T, serde_json::Error> {
    serde_json::from_value(body.get(key).cloned().unwrap_or(Value::Null))
}

// ────────────────────────────────────────────────────────────────────────────
// Public API
// ────────────────────────────────────────────────────────────────────────────

/// GET /v1/jobs/sample
pub async fn handle_sample_jobs(State(state): State<AppState>) -> Json<Vec<JobItem>> {
    Json(state.sample_jobs().await.to_vec())
}

/// POST /v1/analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Json<AnalyzeResponse> {
    Json(analyze_or_default(request.body(), state.chat_model()).await)
}

/// POST /v1/analyze/upload
///
/// Multipart form with a PDF in the `file` field. The PDF text is analyzed
/// exactly like `/v1/analyze`.
pub async fn handle_analyze_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let mut pdf = None;
    while let Some(part) = multipart.next_field().await? {
        if part.name() == Some(UPLOAD_FIELD) {
            pdf = Some(part.bytes().await?);
            break;
        }
    }

    let pdf = pdf
        .filter(|bytes| !bytes.is_empty())
        .ok_or_else(|| AppError::Validation(format!("A non-empty '{UPLOAD_FIELD}' part is required")))?;
    info!("Extracting text from uploaded PDF ({} bytes)", pdf.len());

    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&pdf))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("PDF extraction task failed: {e}")))?
        .map_err(|e| AppError::Validation(format!("Could not read PDF: {e}")))?;

    Ok(Json(analyze_or_default(&text, state.chat_model()).await))
}

/// POST /v1/match
pub async fn handle_match(
    State(state): State<AppState>,
    Json(request): Json<MatchRequest>,
) -> Json<Vec<MatchResult>> {
    Json(match_jobs(&request.profile, &request.jobs, state.embedding_provider()).await)
}

/// POST /v1/write
pub async fn handle_write(
    State(state): State<AppState>,
    Json(request): Json<WriteRequest>,
) -> Json<WriteResponse> {
    let cover_letter = draft_cover_letter(state.chat_model(), &request.job, &request.profile).await;
    Json(WriteResponse { cover_letter })
}

/// POST /v1/coach
pub async fn handle_coach(
    State(state): State<AppState>,
    Json(request): Json<CoachRequest>,
) -> Json<CoachResponse> {
    let skills = request
        .profile
        .as_ref()
        .map(|p| p.skills().to_vec())
        .unwrap_or_default();
    let company = request.company.as_deref().unwrap_or_default();

    Json(interview_coach(state.chat_model(), &request.role, company, &skills).await)
}

// ────────────────────────────────────────────────────────────────────────────
// Agent platform endpoints
// ────────────────────────────────────────────────────────────────────────────

/// POST /v1/local/cv_analyzer: `{text}`; blank text yields an empty analysis.
pub async fn handle_local_cv_analyzer(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Json<AnalyzeResponse> {
    let text = body.get("text").and_then(Value::as_str).unwrap_or_default();
    Json(analyze_profile(text, state.chat_model()).await)
}

/// POST /v1/local/job_scout: `{filters?}`; unreadable filters are ignored.
pub async fn handle_local_job_scout(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Json<Value> {
    let filters = field::<Option<JobFilters>>(&body, "filters").unwrap_or_else(|e| {
        warn!("Ignoring malformed job scout filters: {e}");
        None
    });
    let jobs = filter_jobs(state.sample_jobs().await, &filters.unwrap_or_default());
    Json(json!({ "jobs": jobs }))
}

/// POST /v1/local/matcher: `{profile, jobs}`.
pub async fn handle_local_matcher(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Json<MatchesResponse> {
    if is_blank(body.get("profile")) || is_blank(body.get("jobs")) {
        return Json(MatchesResponse { matches: vec![] });
    }

    let parsed = field::<UserProfile>(&body, "profile")
        .and_then(|profile| Ok((profile, field::<Vec<JobItem>>(&body, "jobs")?)));
    let matches = match parsed {
        Ok((profile, jobs)) => match_jobs(&profile, &jobs, state.embedding_provider()).await,
        Err(e) => {
            warn!("Matcher request was malformed: {e}");
            vec![]
        }
    };
    Json(MatchesResponse { matches })
}

/// POST /v1/local/app_writer: `{job, profile}`.
pub async fn handle_local_app_writer(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Json<WriteResponse> {
    if is_blank(body.get("job")) || is_blank(body.get("profile")) {
        return Json(WriteResponse {
            cover_letter: "Missing job or profile data".to_string(),
        });
    }

    let parsed = field::<JobItem>(&body, "job")
        .and_then(|job| Ok((job, field::<UserProfile>(&body, "profile")?)));
    let cover_letter = match parsed {
        Ok((job, profile)) => draft_cover_letter(state.chat_model(), &job, &profile).await,
        Err(e) => {
            warn!("App writer request was malformed: {e}");
            format!("Error generating cover letter: {e}")
        }
    };
    Json(WriteResponse { cover_letter })
}

/// POST /v1/local/coach: `{role, company?, skills?}`.
pub async fn handle_local_coach(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Json<CoachResponse> {
    let request = match serde_json::from_value::<LocalCoachRequest>(body) {
        Ok(request) => request,
        Err(e) => {
            warn!("Coach request was malformed: {e}");
            return Json(CoachResponse {
                questions: vec![],
                tips: vec![format!("Error getting coaching advice: {e}")],
            });
        }
    };

    if request.role.trim().is_empty() {
        return Json(CoachResponse {
            questions: vec![],
            tips: vec!["Please provide a role to get coaching advice".to_string()],
        });
    }

    Json(
        interview_coach(
            state.chat_model(),
            &request.role,
            &request.company,
            &request.skills,
        )
        .await,
    )
}
