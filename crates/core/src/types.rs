use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Closed enum of Job/Task kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    FetchFollowings,
    AnalyzeProfile,
    SendMessage,
}

impl JobKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::FetchFollowings => "fetch_followings",
            JobKind::AnalyzeProfile => "analyze_profile",
            JobKind::SendMessage => "send_message",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "fetch_followings" => Some(JobKind::FetchFollowings),
            "analyze_profile" => Some(JobKind::AnalyzeProfile),
            "send_message" => Some(JobKind::SendMessage),
            _ => None,
        }
    }
}

impl std::fmt::Display for JobKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dispatched to a Worker via the per-account Task transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskEnvelope {
    pub id: String,
    pub task: JobKind,
    pub correlation_id: String,
    pub account_id: String,
    pub payload: Value,
}

/// Emitted by a Worker back to the Router via the per-account Result transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultEnvelope {
    pub id: Option<String>,
    pub correlation_id: Option<String>,
    pub account_id: String,
    pub ok: bool,
    pub error: Option<String>,
    #[serde(default)]
    pub result: Value,
}

impl ResultEnvelope {
    pub fn is_heartbeat(&self) -> bool {
        self.result.get("type").and_then(Value::as_str) == Some("heartbeat")
    }

    pub fn heartbeat(account_id: impl Into<String>) -> Self {
        ResultEnvelope {
            id: None,
            correlation_id: None,
            account_id: account_id.into(),
            ok: true,
            error: None,
            result: serde_json::json!({ "type": "heartbeat" }),
        }
    }

    pub fn retryable(&self) -> bool {
        self.result.get("retryable").and_then(Value::as_bool).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_kind_round_trips_through_its_wire_string() {
        for kind in [JobKind::FetchFollowings, JobKind::AnalyzeProfile, JobKind::SendMessage] {
            assert_eq!(JobKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(JobKind::parse("not_a_kind"), None);
    }

    #[test]
    fn heartbeat_is_detected_and_never_retryable() {
        let hb = ResultEnvelope::heartbeat("acct-1");
        assert!(hb.is_heartbeat());
        assert!(!hb.retryable());
    }

    #[test]
    fn retryable_defaults_to_false_when_unset() {
        let res = ResultEnvelope {
            id: Some("t1".into()),
            correlation_id: Some("j1".into()),
            account_id: "acct-1".into(),
            ok: false,
            error: Some("boom".into()),
            result: Value::Null,
        };
        assert!(!res.is_heartbeat());
        assert!(!res.retryable());
    }
}

/// Client JWT claims issued by `POST /api/auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientTokenClaims {
    pub iss: String,
    pub aud: String,
    pub sub: String,
    pub exp: usize,
    pub iat: usize,
    pub client_id: String,
    pub scopes: Vec<String>,
}
