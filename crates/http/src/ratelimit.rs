//! Distributed token-bucket rate limiter, grounded on
//! `infrastructure/redis/rate_limiter.py`'s `DistributedRateLimiter`: same
//! Lua script, same fail-open/fail-closed policy, ported from the
//! `redis-py`/`eval` idiom to the `redis` crate's async `Script` type.

use redis::aio::ConnectionManager;
use redis::Script;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::warn;

const LUA_TOKEN_BUCKET: &str = r#"
local key = KEYS[1]
local now = tonumber(ARGV[1])
local capacity = tonumber(ARGV[2])
local refill_rate = tonumber(ARGV[3])
local period = tonumber(ARGV[4])

local bucket = redis.call('HMGET', key, 'tokens', 'last_refill')
local tokens = tonumber(bucket[1]) or capacity
local last_refill = tonumber(bucket[2]) or now

local elapsed = math.max(0, now - last_refill)
tokens = math.min(capacity, tokens + elapsed * refill_rate)

if tokens >= 1.0 then
    tokens = tokens - 1.0
    redis.call('HMSET', key, 'tokens', tokens, 'last_refill', now)
    redis.call('EXPIRE', key, math.ceil(period * 2))
    return {1, 0}
else
    local needed = 1.0 - tokens
    local wait_time = needed / refill_rate
    redis.call('HMSET', key, 'tokens', tokens, 'last_refill', now)
    redis.call('EXPIRE', key, math.ceil(period * 2))
    return {0, wait_time}
end
"#;

#[derive(Clone, Copy, Debug)]
pub struct RateDecision {
    pub allowed: bool,
    pub retry_after_s: f64,
}

/// `None` when no `REDIS_URL` is configured: the limiter is disabled and
/// every call is allowed, matching the Python fallback's in-memory-disabled
/// mode rather than its dev-only in-process bucket (documented deviation,
/// see DESIGN.md).
pub struct DistributedRateLimiter {
    conn: Option<Arc<Mutex<ConnectionManager>>>,
    fail_closed: bool,
}

impl DistributedRateLimiter {
    pub async fn connect(redis_url: Option<&str>, fail_closed: bool) -> Self {
        let conn = match redis_url {
            Some(url) => match redis::Client::open(url) {
                Ok(client) => match client.get_connection_manager().await {
                    Ok(mgr) => Some(Arc::new(Mutex::new(mgr))),
                    Err(e) => {
                        warn!(error = %e, "redis connection manager init failed, rate limiter disabled");
                        None
                    }
                },
                Err(e) => {
                    warn!(error = %e, "invalid redis url, rate limiter disabled");
                    None
                }
            },
            None => None,
        };
        Self { conn, fail_closed }
    }

    pub async fn allow(&self, key: &str, rpm: u32, period_seconds: f64) -> RateDecision {
        let Some(conn) = &self.conn else {
            return RateDecision { allowed: true, retry_after_s: 0.0 };
        };

        let redis_key = format!("rate_limit:{key}");
        let now = chrono::Utc::now().timestamp_millis() as f64 / 1000.0;
        let capacity = rpm as f64;
        let refill_rate = capacity / period_seconds;

        let script = Script::new(LUA_TOKEN_BUCKET);
        let mut guard = conn.lock().await;
        let result: redis::RedisResult<(i64, f64)> = script
            .key(&redis_key)
            .arg(now)
            .arg(capacity)
            .arg(refill_rate)
            .arg(period_seconds)
            .invoke_async(&mut *guard)
            .await;

        match result {
            Ok((allowed, retry_after)) => RateDecision {
                allowed: allowed == 1,
                retry_after_s: retry_after,
            },
            Err(e) => {
                warn!(error = %e, key, "redis rate limit error");
                if self.fail_closed {
                    RateDecision { allowed: false, retry_after_s: period_seconds }
                } else {
                    RateDecision { allowed: true, retry_after_s: 0.0 }
                }
            }
        }
    }

    #[allow(dead_code)]
    async fn ping(&self) -> bool {
        let Some(conn) = &self.conn else { return false };
        let mut guard = conn.lock().await;
        let pong: redis::RedisResult<String> = redis::cmd("PING").query_async(&mut *guard).await;
        pong.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_limiter_always_allows() {
        let limiter = DistributedRateLimiter::connect(None, false).await;
        let decision = limiter.allow("client-1:endpoint", 1, 60.0).await;
        assert!(decision.allowed);
        assert_eq!(decision.retry_after_s, 0.0);
    }

    #[tokio::test]
    async fn invalid_redis_url_disables_limiter_instead_of_failing_closed() {
        let limiter = DistributedRateLimiter::connect(Some("not-a-valid-url"), true).await;
        let decision = limiter.allow("client-1:endpoint", 1, 60.0).await;
        assert!(decision.allowed, "an unreachable/invalid redis url must degrade to disabled, not block requests");
    }
}
