use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Client {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub api_key_hash: String,
    pub status: String,
    pub metadata: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Client {
    pub fn is_active(&self) -> bool {
        self.status == "active"
    }
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct ClientLimits {
    pub client_id: String,
    pub requests_per_minute: i32,
    pub requests_per_hour: i32,
    pub requests_per_day: i32,
    pub messages_per_day: i32,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub kind: String,
    pub priority: i32,
    pub batch_size: i32,
    pub extra: Value,
    pub total_items: i32,
    pub status: String,
    pub client_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Subset of Job used by the Dispatcher's job-scan step.
/// Promoted to a first-class Store return type per SPEC_FULL's
/// `get_job_metadata` supplement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobMeta {
    pub id: String,
    pub kind: String,
    pub priority: i32,
    pub batch_size: i32,
    pub extra: Value,
    pub total_items: i32,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Task {
    pub row_id: i64,
    pub job_id: String,
    pub task_id: String,
    pub correlation_id: String,
    pub account_id: Option<String>,
    pub username: Option<String>,
    pub payload: Option<Value>,
    pub status: String,
    pub client_id: String,
    pub attempts: i32,
    pub leased_at: Option<DateTime<Utc>>,
    pub lease_expires_at: Option<DateTime<Utc>>,
    pub lease_ttl: i32,
    pub leased_by: Option<String>,
    pub error_msg: Option<String>,
    pub sent_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobSummary {
    pub queued: i64,
    pub sent: i64,
    pub ok: i64,
    pub error: i64,
}
