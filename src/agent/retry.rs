//! Bounded exponential-backoff retry around agent runs.

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use super::config::ResearchConfig;
use super::runner::{AgentRunner, RunResult};
use super::spec::AgentSpec;
use crate::clock::Clock;
use crate::error::AgentError;

/// Retry budget and backoff base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts allowed before giving up.
    pub max_retries: u32,
    /// Wait before the first retry. Doubles after every failure.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            base_delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Creates a policy.
    #[must_use]
    pub const fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Policy taken from the configured retry settings.
    #[must_use]
    pub const fn from_config(config: &ResearchConfig) -> Self {
        Self::new(config.max_retries, config.base_delay)
    }

    /// Wait after the failure of 0-indexed `attempt`: `base × 2^attempt`,
    /// saturating.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2_u32.saturating_pow(attempt))
    }
}

/// Runs agents, retrying transient provider failures with backoff.
///
/// Non-transient errors are returned on the spot. When every attempt fails
/// transiently the result is [`AgentError::RetryExhausted`]; no partial
/// output survives.
#[derive(Debug, Clone)]
pub struct RetryingInvoker {
    policy: RetryPolicy,
    clock: Arc<dyn Clock>,
}

impl RetryingInvoker {
    /// Creates an invoker sleeping on `clock`.
    #[must_use]
    pub fn new(policy: RetryPolicy, clock: Arc<dyn Clock>) -> Self {
        Self { policy, clock }
    }

    /// The retry policy.
    #[must_use]
    pub const fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Runs `agent` on `runner` until it succeeds, fails for good, or the
    /// retry budget is spent.
    ///
    /// Each transient failure sleeps `base × 2^attempt` before the next
    /// attempt. The final failed attempt does not sleep, since no attempt
    /// follows it: `max_retries` attempts make `max_retries - 1` sleeps.
    ///
    /// # Errors
    ///
    /// Returns the first non-transient error, or
    /// [`AgentError::RetryExhausted`] after `max_retries` transient ones.
    pub async fn invoke(
        &self,
        runner: &dyn AgentRunner,
        agent: &AgentSpec,
        prompt: &str,
        max_turns: usize,
    ) -> Result<RunResult, AgentError> {
        let mut attempt = 0;

        while attempt < self.policy.max_retries {
            match runner.run(agent, prompt, max_turns).await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_transient() => {
                    let wait = self.policy.delay_for(attempt);
                    attempt += 1;
                    if attempt == self.policy.max_retries {
                        warn!(agent = %agent.name, attempt, error = %e, "final attempt failed");
                        break;
                    }
                    let cause = if matches!(e, AgentError::RateLimited { .. }) {
                        "rate limit hit"
                    } else {
                        "provider quota exceeded"
                    };
                    warn!(
                        agent = %agent.name,
                        attempt,
                        wait_secs = wait.as_secs_f64(),
                        error = %e,
                        "{cause}, retrying"
                    );
                    self.clock.sleep(wait).await;
                }
                Err(e) => return Err(e),
            }
        }

        Err(AgentError::RetryExhausted { attempts: attempt })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use proptest::prelude::*;

    use super::*;
    use crate::agent::message::TokenUsage;
    use crate::agent::runner::StopReason;
    use crate::agent::spec::ModelTier;
    use crate::clock::ManualClock;

    /// Fails the first `failures` runs with the error built by `error`.
    struct FlakyRunner {
        failures: u32,
        error: fn() -> AgentError,
        calls: AtomicU32,
    }

    impl FlakyRunner {
        fn new(failures: u32, error: fn() -> AgentError) -> Self {
            Self {
                failures,
                error,
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl AgentRunner for FlakyRunner {
        async fn run(
            &self,
            _agent: &AgentSpec,
            _prompt: &str,
            _max_turns: usize,
        ) -> Result<RunResult, AgentError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                return Err((self.error)());
            }
            Ok(RunResult {
                final_output: "ok".to_string(),
                turns_used: 1,
                stop: StopReason::Completed,
                exchanges: Vec::new(),
                usage: TokenUsage::default(),
            })
        }
    }

    fn rate_limited() -> AgentError {
        AgentError::RateLimited {
            message: "too many requests".to_string(),
        }
    }

    fn quota() -> AgentError {
        AgentError::ApiRequest {
            message: "RESOURCE_EXHAUSTED".to_string(),
            status: None,
        }
    }

    fn fatal() -> AgentError {
        AgentError::ApiRequest {
            message: "invalid model".to_string(),
            status: Some(400),
        }
    }

    fn invoker(max_retries: u32, clock: &Arc<ManualClock>) -> RetryingInvoker {
        let clock: Arc<dyn Clock> = Arc::clone(clock) as Arc<dyn Clock>;
        RetryingInvoker::new(RetryPolicy::new(max_retries, Duration::from_secs(5)), clock)
    }

    fn agent() -> AgentSpec {
        AgentSpec::new("OrchestratorAgent", "run", ModelTier::Standard)
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 5);
        assert_eq!(policy.delay_for(0), Duration::from_secs(5));
        assert_eq!(policy.delay_for(3), Duration::from_secs(40));
    }

    #[tokio::test]
    async fn test_two_transient_failures_then_success() {
        let clock = Arc::new(ManualClock::new());
        let runner = FlakyRunner::new(2, rate_limited);

        let result = invoker(5, &clock).invoke(&runner, &agent(), "go", 20).await;

        assert!(matches!(result, Ok(ref r) if r.final_output == "ok"));
        assert_eq!(runner.calls.load(Ordering::SeqCst), 3);
        assert_eq!(
            clock.sleeps(),
            vec![Duration::from_secs(5), Duration::from_secs(10)]
        );
    }

    #[tokio::test]
    async fn test_quota_message_is_retried() {
        let clock = Arc::new(ManualClock::new());
        let runner = FlakyRunner::new(1, quota);

        let result = invoker(5, &clock).invoke(&runner, &agent(), "go", 20).await;

        assert!(result.is_ok());
        assert_eq!(clock.sleeps(), vec![Duration::from_secs(5)]);
    }

    #[tokio::test]
    async fn test_always_transient_exhausts_budget() {
        let clock = Arc::new(ManualClock::new());
        let runner = FlakyRunner::new(u32::MAX, rate_limited);

        let result = invoker(3, &clock).invoke(&runner, &agent(), "go", 20).await;

        match result {
            Err(e @ AgentError::RetryExhausted { attempts: 3 }) => {
                assert_eq!(e.to_string(), "Too many retries, giving up.");
            }
            other => unreachable!("unexpected: {other:?}"),
        }
        assert_eq!(runner.calls.load(Ordering::SeqCst), 3);
        assert_eq!(
            clock.sleeps(),
            vec![Duration::from_secs(5), Duration::from_secs(10)]
        );
    }

    #[tokio::test]
    async fn test_non_transient_fails_after_one_attempt() {
        let clock = Arc::new(ManualClock::new());
        let runner = FlakyRunner::new(u32::MAX, fatal);

        let result = invoker(5, &clock).invoke(&runner, &agent(), "go", 20).await;

        assert!(matches!(result, Err(AgentError::ApiRequest { status: Some(400), .. })));
        assert_eq!(runner.calls.load(Ordering::SeqCst), 1);
        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_zero_retries_never_runs() {
        let clock = Arc::new(ManualClock::new());
        let runner = FlakyRunner::new(0, fatal);

        let result = invoker(0, &clock).invoke(&runner, &agent(), "go", 20).await;

        assert!(matches!(result, Err(AgentError::RetryExhausted { attempts: 0 })));
        assert_eq!(runner.calls.load(Ordering::SeqCst), 0);
    }

    proptest! {
        #[test]
        fn prop_backoff_doubles(base_ms in 1_u64..10_000, attempt in 0_u32..16) {
            let policy = RetryPolicy::new(5, Duration::from_millis(base_ms));
            prop_assert_eq!(
                policy.delay_for(attempt + 1),
                policy.delay_for(attempt) * 2
            );
            prop_assert_eq!(
                policy.delay_for(attempt),
                Duration::from_millis(base_ms * (1_u64 << attempt))
            );
        }
    }
}
