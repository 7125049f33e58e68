//! Redis-backed GCRA limiter.

use super::{RateDecision, RateLimit, RateLimitBackend, RateLimitError};
use async_trait::async_trait;
use redis::{Client, Script, aio::ConnectionManager};
use std::time::Duration;
use tracing::{debug, info};

/// Generic cell rate algorithm. Stores one theoretical arrival time per key
/// and expires it once the bucket is full again.
///
/// Returns `{allowed, remaining, retry_after, reset_after}`; the two
/// durations are seconds rendered as strings to keep their fractions.
const GCRA_SCRIPT: &str = r#"
local key = KEYS[1]
local burst = tonumber(ARGV[1])
local rate = tonumber(ARGV[2])
local period = tonumber(ARGV[3])

local emission_interval = period / rate
local burst_offset = emission_interval * burst

local epoch = 1483228800
local now = redis.call("TIME")
now = (now[1] - epoch) + (now[2] / 1000000)

local tat = redis.call("GET", key)
if not tat then
  tat = now
else
  tat = tonumber(tat)
end
tat = math.max(tat, now)

local new_tat = tat + emission_interval
local allow_at = new_tat - burst_offset
local diff = now - allow_at
local remaining = diff / emission_interval

if remaining < 0 then
  return {0, 0, tostring(-diff), tostring(tat - now)}
end

local reset_after = new_tat - now
if reset_after > 0 then
  redis.call("SET", key, new_tat, "EX", math.ceil(reset_after))
end

return {1, math.floor(remaining), "-1", tostring(reset_after)}
"#;

/// Limiter state lives in Redis, so every instance of the service shares it.
pub struct RedisRateLimiter {
    connection: ConnectionManager,
    script: Script,
}

impl RedisRateLimiter {
    /// Connects to Redis and validates the connection with a PING.
    pub async fn connect(redis_url: &str) -> Result<Self, RateLimitError> {
        info!("Connecting to Redis rate-limit backend");

        let client = Client::open(redis_url)?;
        let connection = ConnectionManager::new(client).await?;

        let mut probe = connection.clone();
        redis::cmd("PING").query_async::<String>(&mut probe).await?;

        info!("Connected to Redis");

        Ok(Self {
            connection,
            script: Script::new(GCRA_SCRIPT),
        })
    }
}

fn seconds(raw: &str) -> Duration {
    raw.parse::<f64>()
        .ok()
        .filter(|s| s.is_finite() && *s > 0.0)
        .map(Duration::from_secs_f64)
        .unwrap_or_default()
}

#[async_trait]
impl RateLimitBackend for RedisRateLimiter {
    async fn allow(&self, key: &str, limit: &RateLimit) -> Result<RateDecision, RateLimitError> {
        if limit.rate == 0 || limit.burst == 0 || limit.period.is_zero() {
            return Err(RateLimitError::InvalidLimit(*limit));
        }

        let mut conn = self.connection.clone();
        let (allowed, remaining, retry_after, _reset_after): (i64, i64, String, String) = self
            .script
            .key(key)
            .arg(limit.burst)
            .arg(limit.rate)
            .arg(limit.period.as_secs_f64())
            .invoke_async(&mut conn)
            .await?;

        debug!(key, allowed, remaining, "Rate decision");

        if allowed > 0 {
            Ok(RateDecision::allow(remaining.max(0) as u32))
        } else {
            Ok(RateDecision::deny(seconds(&retry_after)))
        }
    }
}
