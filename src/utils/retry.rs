//! Bounded-retry JSON fetching with linear backoff.
//!
//! A fetch is modelled as an explicit state machine ([`FetchState`]). Each
//! attempt's outcome drives one transition; the machine ends in either
//! `Succeeded` or `Exhausted`, and exhaustion is reported as `None` rather
//! than an error.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::time::sleep;

/// HTTP statuses worth another attempt
const RETRYABLE_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// Retry settings for [`ResilientFetcher`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub attempts: u32,
    /// Delay unit; the k-th retry waits `backoff_step * k`
    pub backoff_step: Duration,
    /// Per-attempt timeout
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            backoff_step: Duration::from_millis(600),
            timeout: Duration::from_secs(14),
        }
    }
}

impl RetryPolicy {
    /// Delay before the retry that follows failed attempt `attempt` (1-based)
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.backoff_step * attempt
    }
}

/// Raw result of one HTTP GET
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    /// Parsed JSON body; `None` when the body was absent or not valid JSON
    pub body: Option<Value>,
}

impl TransportResponse {
    pub fn new(status: u16, body: Option<Value>) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failure to get any HTTP response at all
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),
}

/// Something that can issue a JSON GET request
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    async fn get_json(
        &self,
        url: &str,
        params: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<TransportResponse, TransportError>;
}

/// Classified result of a single attempt
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    Success(Value),
    /// Timeout, network failure or a retryable status
    Transient,
    /// Any other failure; never retried
    Permanent,
}

impl AttemptOutcome {
    /// Classify a transport result
    pub fn classify(result: Result<TransportResponse, TransportError>) -> Self {
        match result {
            Err(_) => AttemptOutcome::Transient,
            Ok(response) if RETRYABLE_STATUSES.contains(&response.status) => {
                AttemptOutcome::Transient
            }
            Ok(response) if response.is_success() => match response.body {
                Some(body) => AttemptOutcome::Success(body),
                None => AttemptOutcome::Permanent,
            },
            Ok(_) => AttemptOutcome::Permanent,
        }
    }
}

/// Lifecycle of one fetch
#[derive(Debug, Clone, PartialEq)]
pub enum FetchState {
    /// About to issue attempt `attempt` (1-based)
    Pending { attempt: u32 },
    /// Attempt `attempt` failed transiently; wait `delay` before the next one
    Retrying { attempt: u32, delay: Duration },
    Succeeded(Value),
    /// Gave up after `attempts` attempts
    Exhausted { attempts: u32 },
}

impl FetchState {
    /// State that follows attempt `attempt` of `max_attempts` ending in `outcome`
    pub fn after_attempt(
        attempt: u32,
        max_attempts: u32,
        outcome: AttemptOutcome,
        policy: &RetryPolicy,
    ) -> FetchState {
        match outcome {
            AttemptOutcome::Success(value) => FetchState::Succeeded(value),
            AttemptOutcome::Transient if attempt < max_attempts => FetchState::Retrying {
                attempt,
                delay: policy.delay_after(attempt),
            },
            AttemptOutcome::Transient | AttemptOutcome::Permanent => {
                FetchState::Exhausted { attempts: attempt }
            }
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, FetchState::Succeeded(_) | FetchState::Exhausted { .. })
    }
}

/// JSON fetcher that retries transient failures and never raises
#[derive(Debug, Clone)]
pub struct ResilientFetcher {
    transport: Arc<dyn Transport>,
    policy: RetryPolicy,
}

impl ResilientFetcher {
    pub fn new(transport: Arc<dyn Transport>, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// GET `url` with the default attempts and timeout
    pub async fn request(&self, url: &str, params: &[(&str, &str)]) -> Option<Value> {
        self.request_with(url, params, self.policy.attempts, self.policy.timeout)
            .await
    }

    /// GET `url`, retrying up to `attempts` times in total
    pub async fn request_with(
        &self,
        url: &str,
        params: &[(&str, &str)],
        attempts: u32,
        timeout: Duration,
    ) -> Option<Value> {
        let max_attempts = attempts.max(1);
        let mut state = FetchState::Pending { attempt: 1 };

        loop {
            state = match state {
                FetchState::Pending { attempt } => {
                    let result = self.transport.get_json(url, params, timeout).await;
                    let outcome = AttemptOutcome::classify(result);
                    FetchState::after_attempt(attempt, max_attempts, outcome, &self.policy)
                }
                FetchState::Retrying { attempt, delay } => {
                    tracing::debug!(
                        "Attempt {}/{} for {} failed, retrying in {:?}",
                        attempt,
                        max_attempts,
                        url,
                        delay
                    );
                    sleep(delay).await;
                    FetchState::Pending {
                        attempt: attempt + 1,
                    }
                }
                FetchState::Succeeded(value) => return Some(value),
                FetchState::Exhausted { attempts } => {
                    tracing::debug!("Giving up on {} after {} attempts", url, attempts);
                    return None;
                }
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Replays scripted results; repeats the last one when the script runs out
    #[derive(Debug)]
    struct ScriptedTransport {
        script: Mutex<VecDeque<Result<TransportResponse, TransportError>>>,
        calls: AtomicUsize,
    }

    impl ScriptedTransport {
        fn new(script: Vec<Result<TransportResponse, TransportError>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn get_json(
            &self,
            _url: &str,
            _params: &[(&str, &str)],
            _timeout: Duration,
        ) -> Result<TransportResponse, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut script = self.script.lock().unwrap();
            if script.len() > 1 {
                script.pop_front().unwrap()
            } else {
                script.front().cloned().unwrap()
            }
        }
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            attempts: 3,
            backoff_step: Duration::from_millis(1),
            timeout: Duration::from_secs(1),
        }
    }

    #[tokio::test]
    async fn test_always_timing_out_gives_none_after_three_attempts() {
        let transport = ScriptedTransport::new(vec![Err(TransportError::Timeout)]);
        let fetcher = ResilientFetcher::new(transport.clone(), fast_policy());

        assert_eq!(fetcher.request("http://x", &[]).await, None);
        assert_eq!(transport.calls(), 3);
    }

    #[tokio::test]
    async fn test_success_after_transient_failures() {
        let transport = ScriptedTransport::new(vec![
            Ok(TransportResponse::new(503, None)),
            Err(TransportError::Network("reset".to_string())),
            Ok(TransportResponse::new(200, Some(json!({"ok": true})))),
        ]);
        let fetcher = ResilientFetcher::new(transport.clone(), fast_policy());

        assert_eq!(
            fetcher.request("http://x", &[("q", "a")]).await,
            Some(json!({"ok": true}))
        );
        assert_eq!(transport.calls(), 3);
    }

    #[tokio::test]
    async fn test_not_found_is_not_retried() {
        let transport = ScriptedTransport::new(vec![Ok(TransportResponse::new(404, None))]);
        let fetcher = ResilientFetcher::new(transport.clone(), fast_policy());

        assert_eq!(fetcher.request("http://x", &[]).await, None);
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_unparseable_body_is_permanent() {
        let transport = ScriptedTransport::new(vec![Ok(TransportResponse::new(200, None))]);
        let fetcher = ResilientFetcher::new(transport.clone(), fast_policy());

        assert_eq!(fetcher.request("http://x", &[]).await, None);
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_zero_attempts_still_tries_once() {
        let transport = ScriptedTransport::new(vec![Ok(TransportResponse::new(429, None))]);
        let fetcher = ResilientFetcher::new(transport.clone(), fast_policy());

        assert_eq!(
            fetcher
                .request_with("http://x", &[], 0, Duration::from_secs(1))
                .await,
            None
        );
        assert_eq!(transport.calls(), 1);
    }

    #[test]
    fn test_linear_backoff() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_after(1), Duration::from_millis(600));
        assert_eq!(policy.delay_after(2), Duration::from_millis(1200));
    }

    #[test]
    fn test_state_transitions() {
        let policy = RetryPolicy::default();

        assert_eq!(
            FetchState::after_attempt(1, 3, AttemptOutcome::Transient, &policy),
            FetchState::Retrying {
                attempt: 1,
                delay: Duration::from_millis(600)
            }
        );
        assert_eq!(
            FetchState::after_attempt(3, 3, AttemptOutcome::Transient, &policy),
            FetchState::Exhausted { attempts: 3 }
        );
        assert_eq!(
            FetchState::after_attempt(1, 3, AttemptOutcome::Permanent, &policy),
            FetchState::Exhausted { attempts: 1 }
        );
        assert!(FetchState::after_attempt(2, 3, AttemptOutcome::Success(json!(1)), &policy)
            .is_terminal());
        assert!(!FetchState::Pending { attempt: 1 }.is_terminal());
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            AttemptOutcome::classify(Ok(TransportResponse::new(502, Some(json!({}))))),
            AttemptOutcome::Transient
        );
        assert_eq!(
            AttemptOutcome::classify(Ok(TransportResponse::new(400, None))),
            AttemptOutcome::Permanent
        );
        assert_eq!(
            AttemptOutcome::classify(Err(TransportError::Timeout)),
            AttemptOutcome::Transient
        );
    }
}
