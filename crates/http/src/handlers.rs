//! Endpoint handlers, grounded on `send_router.py` for the
//! `/api/send/*` quota and ledger logic and `external_router.py` for the
//! enqueue/summary shape.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use scrapcore_core::JobKind;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::{authenticate, check_scope, enforce_https, get_client_account, validate_username};
use crate::error::ApiError;
use crate::AppState;

const MAX_ERROR_LENGTH: usize = 2000;
const MAX_JOB_ID_LENGTH: usize = 64;
const MAX_TASK_ID_LENGTH: usize = 160;

async fn rate_limit_or_reject(state: &AppState, client_id: &str, endpoint: &str, rpm: u32) -> Result<(), ApiError> {
    let key = format!("{client_id}:{endpoint}");
    let decision = state.limiter.allow(&key, rpm.max(1), 60.0).await;
    if decision.allowed {
        Ok(())
    } else {
        Err(ApiError::rate_limited(decision.retry_after_s))
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub api_key: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub client_id: String,
    pub scopes: Vec<String>,
    pub expires_in: u64,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    enforce_https(&headers, state.cfg.require_https)?;
    let mut probe_headers = HeaderMap::new();
    probe_headers.insert("x-api-key", req.api_key.parse().map_err(|_| ApiError::bad_request("invalid api_key"))?);
    let client = authenticate(&probe_headers, &state.signer, &state.store, &state.cfg).await?;
    let token = state.signer.issue(&client.id, client.scopes.clone())?;
    Ok(Json(LoginResponse {
        token,
        client_id: client.id,
        scopes: client.scopes,
        expires_in: 3600,
    }))
}

#[derive(Debug, Deserialize)]
pub struct EnqueueFollowingsRequest {
    pub target_username: String,
    pub limit: i64,
}

#[derive(Debug, Serialize)]
pub struct JobIdResponse {
    pub job_id: String,
}

pub async fn enqueue_followings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<EnqueueFollowingsRequest>,
) -> Result<Json<JobIdResponse>, ApiError> {
    enforce_https(&headers, state.cfg.require_https)?;
    let client = authenticate(&headers, &state.signer, &state.store, &state.cfg).await?;
    check_scope(&client, "fetch")?;
    rate_limit_or_reject(&state, &client.id, "followings.enqueue", client.rate_rpm).await?;
    let account = get_client_account(&headers, &state.cfg)?;
    validate_username(&req.target_username, &state.cfg)?;

    let limit = req.limit.clamp(1, state.cfg.max_followings_limit);
    let job_id = Uuid::new_v4().to_string();
    let extra = json!({
        "limit": limit,
        "client_account": account,
        "target_username": req.target_username,
        "client_id": client.id,
    });
    state
        .store
        .create_job(&job_id, JobKind::FetchFollowings.as_str(), 5, 1, extra, 1, &client.id)
        .await?;

    Ok(Json(JobIdResponse { job_id }))
}

#[derive(Debug, Deserialize)]
pub struct EnqueueAnalyzeRequest {
    pub usernames: Vec<String>,
    #[serde(default)]
    pub batch_size: Option<i32>,
    #[serde(default)]
    pub priority: Option<i32>,
    #[serde(default)]
    pub extra: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct EnqueueAnalyzeResponse {
    pub job_id: String,
    pub total_items: usize,
}

pub async fn enqueue_analyze(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<EnqueueAnalyzeRequest>,
) -> Result<Json<EnqueueAnalyzeResponse>, ApiError> {
    enforce_https(&headers, state.cfg.require_https)?;
    let client = authenticate(&headers, &state.signer, &state.store, &state.cfg).await?;
    check_scope(&client, "analyze")?;
    rate_limit_or_reject(&state, &client.id, "analyze.enqueue", client.rate_rpm).await?;

    if req.usernames.len() > state.cfg.max_analyze_usernames {
        return Err(ApiError::bad_request("too many usernames")
            .with_details(json!({ "max": state.cfg.max_analyze_usernames })));
    }
    for u in &req.usernames {
        validate_username(u, &state.cfg)?;
    }

    let batch_size = req.batch_size.unwrap_or(25).clamp(1, state.cfg.max_analyze_batch_size);
    let priority = req.priority.unwrap_or(5);
    let mut extra = req.extra.unwrap_or_else(|| json!({}));
    if let Value::Object(ref mut map) = extra {
        map.insert("usernames".to_string(), json!(req.usernames));
    } else {
        return Err(ApiError::bad_request("extra must be a JSON object"));
    }
    if serde_json::to_vec(&extra).map(|v| v.len()).unwrap_or(0) > state.cfg.max_extra_bytes {
        return Err(ApiError::bad_request("extra payload too large"));
    }

    let job_id = Uuid::new_v4().to_string();
    let total_items = req.usernames.len();
    state
        .store
        .create_job(&job_id, JobKind::AnalyzeProfile.as_str(), priority, batch_size, extra, total_items as i32, &client.id)
        .await?;

    Ok(Json(EnqueueAnalyzeResponse { job_id, total_items }))
}

#[derive(Debug, Serialize)]
pub struct JobSummaryResponse {
    pub queued: i64,
    pub sent: i64,
    pub ok: i64,
    pub error: i64,
}

pub async fn job_summary(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(job_id): Path<String>,
) -> Result<Json<JobSummaryResponse>, ApiError> {
    let client = authenticate(&headers, &state.signer, &state.store, &state.cfg).await?;
    rate_limit_or_reject(&state, &client.id, "jobs.summary", client.rate_rpm).await?;

    let owner = state
        .store
        .get_job_client_id(&job_id)
        .await?
        .ok_or_else(|| ApiError::job_not_found(&job_id))?;
    if owner != client.id {
        return Err(ApiError::job_ownership(&job_id));
    }

    let summary = state.store.job_summary(&job_id).await?;
    Ok(Json(JobSummaryResponse {
        queued: summary.queued,
        sent: summary.sent,
        ok: summary.ok,
        error: summary.error,
    }))
}

#[derive(Debug, Deserialize)]
pub struct SendPullRequest {
    pub limit: i64,
}

#[derive(Debug, Serialize)]
pub struct SendPullResponse {
    pub tasks: Vec<SendTaskView>,
}

#[derive(Debug, Serialize)]
pub struct SendTaskView {
    pub job_id: String,
    pub task_id: String,
    pub username: Option<String>,
    pub payload: Option<Value>,
}

/// `/api/send/pull`, grounded on `send_router.py`'s
/// `pull` handler: daily quota check, `effective_limit = min(requested, remaining)`.
pub async fn send_pull(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<SendPullRequest>,
) -> Result<Json<SendPullResponse>, ApiError> {
    enforce_https(&headers, state.cfg.require_https)?;
    let client = authenticate(&headers, &state.signer, &state.store, &state.cfg).await?;
    check_scope(&client, "send")?;
    rate_limit_or_reject(&state, &client.id, "send.pull", client.rate_rpm).await?;
    let account = get_client_account(&headers, &state.cfg)?;

    let requested = req.limit.clamp(1, state.cfg.max_pull_limit);

    let limits = state
        .store
        .get_client_limits(&client.id)
        .await?
        .ok_or_else(|| ApiError::configuration("client has no configured limits"))?;

    let sent_today = state.store.count_messages_sent_today(&client.id).await?;
    let in_flight_today = state.store.count_tasks_sent_today(&client.id).await?;
    let remaining = (limits.messages_per_day as i64 - sent_today - in_flight_today).max(0);
    if remaining == 0 {
        return Err(ApiError::rate_limited(3600.0));
    }

    let effective_limit = requested.min(remaining);
    let leased = state.store.lease_tasks(&account, effective_limit, Some(client.id.as_str())).await?;

    let tasks = leased
        .into_iter()
        .map(|t| SendTaskView {
            job_id: t.job_id,
            task_id: t.task_id,
            username: t.username,
            payload: t.payload,
        })
        .collect();

    Ok(Json(SendPullResponse { tasks }))
}

#[derive(Debug, Deserialize)]
pub struct SendResultRequest {
    pub job_id: String,
    pub task_id: String,
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub dest_username: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SendResultResponse {
    pub accepted: bool,
}

/// `/api/send/result`, grounded on `send_router.py`'s
/// `result` handler: ledger insert + task mark are best-effort-logged,
/// never fail the request.
pub async fn send_result(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<SendResultRequest>,
) -> Result<Json<SendResultResponse>, ApiError> {
    enforce_https(&headers, state.cfg.require_https)?;
    let client = authenticate(&headers, &state.signer, &state.store, &state.cfg).await?;
    check_scope(&client, "send")?;
    rate_limit_or_reject(&state, &client.id, "send.result", client.rate_rpm).await?;
    let account = get_client_account(&headers, &state.cfg)?;

    if req.job_id.len() > MAX_JOB_ID_LENGTH || req.task_id.len() > MAX_TASK_ID_LENGTH {
        return Err(ApiError::bad_request("job_id or task_id too long"));
    }
    if let Some(err) = &req.error {
        if err.len() > MAX_ERROR_LENGTH {
            return Err(ApiError::bad_request("error message too long"));
        }
    }

    if req.ok {
        if let Some(dest) = req.dest_username.as_deref().filter(|d| !d.is_empty()) {
            if let Err(e) = state
                .store
                .register_message_sent(&account, dest, Some(req.job_id.as_str()), Some(req.task_id.as_str()), &client.id)
                .await
            {
                tracing::warn!(error = %e, job_id = %req.job_id, task_id = %req.task_id, "ledger insert failed");
            }
        }
        state.store.mark_task_ok(&req.job_id, &req.task_id, None).await?;
    } else {
        let error = req.error.clone().unwrap_or_else(|| "unknown error".to_string());
        state.store.mark_task_error(&req.job_id, &req.task_id, &error).await?;
    }

    match state.store.all_tasks_finished(&req.job_id).await {
        Ok(true) => {
            if let Err(e) = state.store.mark_job_done(&req.job_id).await {
                tracing::warn!(error = %e, job_id = %req.job_id, "job completion mark failed");
            }
        }
        Ok(false) => {}
        Err(e) => tracing::warn!(error = %e, job_id = %req.job_id, "job completion check failed"),
    }

    Ok(Json(SendResultResponse { accepted: true }))
}
