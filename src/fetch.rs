//! Feed fetching with bounded retry and backoff.
//!
//! The feed host (Medium) rate-limits aggressively, so the fetcher retries
//! transport errors and 429/503 responses with a linearly growing, jittered
//! delay, honoring a numeric `Retry-After` header when one is present.
//!
//! # Retry Strategy
//!
//! - Up to 5 attempts
//! - Delay per attempt: server-supplied `Retry-After` if numeric, otherwise
//!   `base_delay × attempt` (3 s base)
//! - 0–1.5 s of random jitter, total capped at 60 seconds
//! - Exhausting the budget returns the last error to the caller

use rand::{Rng, rng};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, RETRY_AFTER};
use reqwest::{Client, Response, StatusCode};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, instrument, warn};

const FEED_ACCEPT: &str = "application/rss+xml, application/xml;q=0.9, */*;q=0.8";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_BACKOFF: Duration = Duration::from_secs(60);
const JITTER_MAX_SECS: f64 = 1.5;

/// Errors surfaced by the feed fetcher after the retry budget is spent.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure (DNS, connection, TLS, timeout) or a non-2xx
    /// status surfaced through `error_for_status`.
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// The server kept answering 429/503 until the attempt budget ran out.
    #[error("HTTP {status} after {attempts} attempts")]
    RateLimited { status: u16, attempts: usize },
}

/// Attempt budget and base delay for [`fetch_feed`].
///
/// Tests shrink these so retry paths run in milliseconds.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: usize,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 5,
            base_delay: Duration::from_secs(3),
        }
    }
}

/// Build the HTTP client used for feed requests.
///
/// Carries the configured User-Agent, an Accept header favoring RSS/XML, and
/// a 30-second request timeout.
pub fn build_client(user_agent: &str) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(FEED_ACCEPT));
    Client::builder()
        .user_agent(user_agent)
        .default_headers(headers)
        .timeout(REQUEST_TIMEOUT)
        .build()
}

/// Fetch raw feed bytes, retrying per `policy`.
///
/// Transport errors and 429/503 responses are retried with a capped, jittered
/// backoff; any other failure on the final attempt is returned as-is. A hard
/// non-2xx status (e.g. 404) also lands in the retry loop, matching the
/// behavior of treating every failed attempt the same way until the budget
/// runs out.
#[instrument(level = "info", skip_all, fields(%url))]
pub async fn fetch_feed(
    client: &Client,
    url: &str,
    policy: RetryPolicy,
) -> Result<Vec<u8>, FetchError> {
    let t0 = Instant::now();
    let mut last_err: Option<FetchError> = None;

    for attempt in 1..=policy.attempts {
        let (err, wait) = match client.get(url).send().await {
            Ok(resp)
                if resp.status() == StatusCode::TOO_MANY_REQUESTS
                    || resp.status() == StatusCode::SERVICE_UNAVAILABLE =>
            {
                let status = resp.status().as_u16();
                let wait = retry_after(&resp)
                    .unwrap_or_else(|| policy.base_delay * attempt as u32);
                let wait = cap_with_jitter(wait);
                warn!(
                    status,
                    attempt,
                    max = policy.attempts,
                    wait_ms = wait.as_millis() as u64,
                    "Feed host throttling; backing off"
                );
                (
                    FetchError::RateLimited {
                        status,
                        attempts: policy.attempts,
                    },
                    wait,
                )
            }
            Ok(resp) => match async { resp.error_for_status()?.bytes().await }.await {
                Ok(bytes) => {
                    debug!(
                        bytes = bytes.len(),
                        elapsed_ms = t0.elapsed().as_millis() as u64,
                        "Fetched feed"
                    );
                    return Ok(bytes.to_vec());
                }
                Err(e) => {
                    let wait = cap_with_jitter(policy.base_delay * attempt as u32);
                    warn!(
                        attempt,
                        max = policy.attempts,
                        wait_ms = wait.as_millis() as u64,
                        error = %e,
                        "Feed fetch failed; retrying"
                    );
                    (FetchError::Network(e), wait)
                }
            },
            Err(e) => {
                let wait = cap_with_jitter(policy.base_delay * attempt as u32);
                warn!(
                    attempt,
                    max = policy.attempts,
                    wait_ms = wait.as_millis() as u64,
                    error = %e,
                    "Feed fetch failed; retrying"
                );
                (FetchError::Network(e), wait)
            }
        };

        last_err = Some(err);
        if attempt == policy.attempts {
            break;
        }
        sleep(wait).await;
    }

    // attempts >= 1, so last_err is always set by the time we get here
    Err(last_err.expect("retry loop ran at least once"))
}

/// Numeric `Retry-After` from a 429/503 response, if any. Date-form values
/// are ignored and fall through to the computed backoff.
fn retry_after(resp: &Response) -> Option<Duration> {
    resp.headers()
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

fn cap_with_jitter(wait: Duration) -> Duration {
    let jitter = Duration::from_secs_f64(rng().random_range(0.0..=JITTER_MAX_SECS));
    (wait + jitter).min(MAX_BACKOFF)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_grows_linearly_and_caps() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.base_delay * 2, Duration::from_secs(6));
        assert_eq!(policy.base_delay * 5, Duration::from_secs(15));

        // Jitter never pushes a wait past the cap.
        let capped = cap_with_jitter(Duration::from_secs(120));
        assert_eq!(capped, MAX_BACKOFF);

        let small = cap_with_jitter(Duration::from_secs(3));
        assert!(small >= Duration::from_secs(3));
        assert!(small <= Duration::from_secs_f64(3.0 + JITTER_MAX_SECS));
    }

    #[test]
    fn test_client_builds_with_configured_agent() {
        let client = build_client("MyClimateDefinitionBot/1.0");
        assert!(client.is_ok());
    }
}
