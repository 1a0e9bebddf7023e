use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Deserialize)]
pub struct ApiClientEntry {
    pub key: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default)]
    pub rate: ApiClientRate,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiClientRate {
    #[serde(default = "default_rpm")]
    pub rpm: u32,
}

fn default_rpm() -> u32 {
    60
}

pub type ApiClientsTable = HashMap<String, ApiClientEntry>;

#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub api_shared_secret: Option<String>,
    pub api_clients: ApiClientsTable,
    pub require_https: bool,
    pub require_account_in_config: bool,
    pub configured_accounts: Vec<String>,
    pub production: bool,
    pub max_pull_limit: i64,
    pub max_analyze_usernames: usize,
    pub max_analyze_batch_size: i32,
    pub max_followings_limit: i64,
    pub max_username_length: usize,
    pub max_extra_bytes: usize,
    pub username_regex: String,
    pub account_regex: String,
    pub redis_url: Option<String>,
    pub cors_origins: Vec<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            api_shared_secret: None,
            api_clients: HashMap::new(),
            require_https: false,
            require_account_in_config: false,
            configured_accounts: Vec::new(),
            production: false,
            max_pull_limit: 100,
            max_analyze_usernames: 500,
            max_analyze_batch_size: 200,
            max_followings_limit: 100,
            max_username_length: 64,
            max_extra_bytes: 20_000,
            username_regex: r"^[a-zA-Z0-9._]{2,30}$".to_string(),
            account_regex: r"^[a-zA-Z0-9._-]{2,30}$".to_string(),
            redis_url: None,
            cors_origins: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_clients_table_deserializes_with_rate_defaults() {
        let raw = r#"{
            "acme": {"key": "secret-acme", "scopes": ["fetch_followings", "send_message"]},
            "widgets": {"key": "secret-widgets", "scopes": ["analyze_profile"], "rate": {"rpm": 30}}
        }"#;
        let table: ApiClientsTable = serde_json::from_str(raw).unwrap();
        assert_eq!(table["acme"].rate.rpm, 60, "rate.rpm must default to 60 rpm when omitted");
        assert_eq!(table["widgets"].rate.rpm, 30);
        assert_eq!(table["acme"].scopes, vec!["fetch_followings", "send_message"]);
    }
}
