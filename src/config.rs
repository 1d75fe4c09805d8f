use std::{env, time::Duration};

pub const DEFAULT_THRESHOLD: f64 = 0.75;
pub const DEFAULT_MAX_RETRIES: u32 = 5;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 500;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub bind_addr: String,
    pub model_source: String,
    pub engine_url: String,
    pub threshold: f64,
    pub retry: RetryPolicy,
}

/// How the page side reacts to a "model not loaded" reply.
///
/// The first request is not counted; up to `max_retries` further requests are
/// sent, each after `delay`. Every request gets at most `timeout` to answer;
/// a timed-out request is not retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
            timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self {
            bind_addr: env::var("PHISHBLOCK_BIND").unwrap_or_else(|_| "127.0.0.1:8088".to_string()),
            model_source: env::var("PHISHBLOCK_MODEL")
                .unwrap_or_else(|_| "./phishblock_model.json".to_string()),
            engine_url: env::var("PHISHBLOCK_ENGINE_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8088".to_string()),
            threshold: parse_var("PHISHBLOCK_THRESHOLD").unwrap_or(DEFAULT_THRESHOLD),
            retry: RetryPolicy {
                max_retries: parse_var("PHISHBLOCK_MAX_RETRIES").unwrap_or(DEFAULT_MAX_RETRIES),
                delay: Duration::from_millis(
                    parse_var("PHISHBLOCK_RETRY_DELAY_MS").unwrap_or(DEFAULT_RETRY_DELAY_MS),
                ),
                timeout: Duration::from_millis(
                    parse_var("PHISHBLOCK_REQUEST_TIMEOUT_MS").unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS),
                ),
            },
        }
    }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
