use crate::utils::error::{ProvisionError, Result};
use std::future::Future;
use std::time::Duration;

/// Bounded readiness polling: at most `max_attempts` checks, `interval` apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl PollPolicy {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }

    /// No waiting between attempts.
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(Duration::ZERO, max_attempts)
    }
}

/// Outcome of a single readiness check.
#[derive(Debug)]
pub enum PollStatus<T> {
    Done(T),
    /// Not ready yet; the string describes what was observed.
    Pending(String),
}

/// Repeats `check` until it reports `Done`, returns an error, or the budget runs out.
///
/// On exhaustion `on_exhausted` receives the last observation and builds the error.
pub async fn poll_until<T, F, Fut, E>(
    resource: &str,
    policy: PollPolicy,
    mut check: F,
    on_exhausted: E,
) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<PollStatus<T>>>,
    E: FnOnce(Option<String>, u32) -> ProvisionError,
{
    let mut last_observation = None;

    for attempt in 1..=policy.max_attempts {
        match check(attempt).await? {
            PollStatus::Done(value) => {
                tracing::debug!("{} ready after {} attempt(s)", resource, attempt);
                return Ok(value);
            }
            PollStatus::Pending(observed) => {
                tracing::info!(
                    "⏳ Waiting for {} ({}, attempt {}/{})",
                    resource,
                    observed,
                    attempt,
                    policy.max_attempts
                );
                last_observation = Some(observed);
            }
        }

        if attempt < policy.max_attempts {
            tokio::time::sleep(policy.interval).await;
        }
    }

    Err(on_exhausted(last_observation, policy.max_attempts))
}

/// Default exhaustion error.
pub fn timeout_error(resource: &str) -> impl FnOnce(Option<String>, u32) -> ProvisionError + '_ {
    move |last, attempts| ProvisionError::Timeout {
        resource: resource.to_string(),
        attempts,
        last_seen: last.unwrap_or_else(|| "nothing".to_string()),
    }
}
