//! Environment-variable configuration, following the same `clap`-derive
//! config idiom as `trace-dispatcher/src/main.rs`.

use clap::Parser;

#[derive(Debug, Clone, Parser)]
pub struct AppConfig {
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value_t = 10)]
    pub db_max_connections: u32,

    #[arg(long, env = "APP_ENV", default_value = "development")]
    pub app_env: String,

    #[arg(long, env = "HTTP_BIND_ADDR", default_value = "0.0.0.0:8080")]
    pub http_bind_addr: String,

    #[arg(long, env = "ACCOUNTS_USERNAMES", value_delimiter = ',')]
    pub accounts_usernames: Vec<String>,

    #[arg(long, env = "REDIS_URL")]
    pub redis_url: Option<String>,

    #[arg(long, env = "SQS_TASK_QUEUE_URL")]
    pub sqs_task_queue_url: Option<String>,

    #[arg(long, env = "SQS_RESULT_QUEUE_URL")]
    pub sqs_result_queue_url: Option<String>,

    #[arg(long, env = "AWS_REGION")]
    pub aws_region: Option<String>,

    #[arg(long, env = "LOCAL_QUEUE_CAPACITY", default_value_t = 256)]
    pub local_queue_capacity: usize,

    // Router knobs.
    #[arg(long, env = "WORKER_MAX_INFLIGHT_PER_ACCOUNT", default_value_t = 5)]
    pub worker_max_inflight_per_account: u32,
    #[arg(long, env = "WORKER_TOKENS_CAPACITY", default_value_t = 5.0)]
    pub worker_tokens_capacity: f64,
    #[arg(long, env = "WORKER_TOKENS_REFILL_PER_SEC", default_value_t = 1.0)]
    pub worker_tokens_refill_per_sec: f64,
    #[arg(long, env = "WORKER_BASE_BACKOFF_S", default_value_t = 2.0)]
    pub worker_base_backoff_s: f64,
    #[arg(long, env = "WORKER_MAX_BACKOFF_S", default_value_t = 120.0)]
    pub worker_max_backoff_s: f64,
    #[arg(long, env = "WORKER_JITTER_S", default_value_t = 1.0)]
    pub worker_jitter_s: f64,
    #[arg(long, env = "WORKER_AGING_STEP", default_value_t = 0.05)]
    pub worker_aging_step: f64,
    #[arg(long, env = "WORKER_AGING_CAP", default_value_t = 1.0)]
    pub worker_aging_cap: f64,
    #[arg(long, env = "WORKER_LOAD_BALANCE_WEIGHT", default_value_t = 1.0)]
    pub worker_load_balance_weight: f64,
    #[arg(long, env = "WORKER_TOKEN_AVAILABILITY_WEIGHT", default_value_t = 1.0)]
    pub worker_token_availability_weight: f64,
    #[arg(long, env = "WORKER_URGENCY_WEIGHT", default_value_t = 1.0)]
    pub worker_urgency_weight: f64,
    #[arg(long, env = "WORKER_DEFAULT_BATCH_SIZE", default_value_t = 10)]
    pub worker_default_batch_size: usize,
    #[arg(long, env = "WORKER_MAX_ATTEMPTS", default_value_t = 5)]
    pub worker_max_attempts: i32,
    #[arg(long, env = "WORKER_HEARTBEAT_S", default_value_t = 30)]
    pub worker_heartbeat_s: u64,
    #[arg(long, env = "WORKER_POLL_INTERVAL_MS", default_value_t = 200)]
    pub worker_poll_interval_ms: u64,

    #[arg(long, env = "SCAN_INTERVAL_S", default_value_t = 2)]
    pub scan_interval_s: u64,
    #[arg(long, env = "LEASE_CLEANUP_INTERVAL", default_value_t = 60)]
    pub lease_cleanup_interval: u64,
    #[arg(long, env = "CLEANUP_INTERVAL", default_value_t = 86400)]
    pub cleanup_interval: u64,
    #[arg(long, env = "CLEANUP_STALE_DAYS", default_value_t = 14)]
    pub cleanup_stale_days: i32,
    #[arg(long, env = "CLEANUP_FINISHED_DAYS", default_value_t = 14)]
    pub cleanup_finished_days: i32,
    #[arg(long, env = "CLEANUP_BATCH", default_value_t = 1000)]
    pub cleanup_batch: i64,
    #[arg(long, env = "LEASE_RECLAIM_BATCH", default_value_t = 500)]
    pub lease_reclaim_batch: i64,

    #[arg(long, env = "API_SHARED_SECRET")]
    pub api_shared_secret: Option<String>,
    #[arg(long, env = "API_CLIENTS_JSON")]
    pub api_clients_json: Option<String>,
    #[arg(long, env = "JWT_SECRET_KEY")]
    pub jwt_secret_key: String,
    #[arg(long, env = "JWT_ISSUER", default_value = "scrapcore")]
    pub jwt_issuer: String,
    #[arg(long, env = "JWT_AUDIENCE", default_value = "scrapcore-clients")]
    pub jwt_audience: String,
    #[arg(long, env = "JWT_KID", default_value = "k1")]
    pub jwt_kid: String,
    #[arg(long, env = "JWT_NEXT_KID")]
    pub jwt_next_kid: Option<String>,
    #[arg(long, env = "JWT_NEXT_SECRET_KEY")]
    pub jwt_next_secret_key: Option<String>,
    #[arg(long, env = "JWT_TTL_S", default_value_t = 3600)]
    pub jwt_ttl_s: u64,

    #[arg(long, env = "REQUIRE_HTTPS")]
    pub require_https: Option<bool>,
    #[arg(long, env = "REQUIRE_ACCOUNT_IN_CONFIG")]
    pub require_account_in_config: Option<bool>,
    #[arg(long, env = "CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Vec<String>,
    #[arg(long, env = "FAIL_CLOSED_ON_REDIS_ERROR")]
    pub fail_closed_on_redis_error: Option<bool>,

    #[arg(long, env = "SECRETS_PROVIDER", default_value = "env")]
    pub secrets_provider: String,
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("production")
    }

    pub fn resolved_require_https(&self) -> bool {
        self.require_https.unwrap_or_else(|| self.is_production())
    }

    pub fn resolved_require_account_in_config(&self) -> bool {
        self.require_account_in_config.unwrap_or_else(|| self.is_production())
    }

    pub fn resolved_fail_closed_on_redis_error(&self) -> bool {
        self.fail_closed_on_redis_error.unwrap_or_else(|| self.is_production())
    }
}
