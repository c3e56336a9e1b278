/// Fixed-count, fixed-sleep retry combinator.
///
/// Every transient-failure site in the pipeline uses the same shape: try N
/// times with a constant sleep between attempts, then give up with the last
/// error. There is no backoff curve and no error classification beyond
/// "did the budget run out".
use crate::error::{ProvisionError, Result};
use std::future::Future;
use std::time::Duration;

/// Attempt budget with a constant sleep between attempts.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self { attempts, delay }
    }
}

/// Run `op` up to `policy.attempts` times, sleeping `policy.delay` between
/// attempts. Returns the first success or the last error once the budget is
/// exhausted.
pub async fn retry<T, F, Fut>(policy: RetryPolicy, what: &str, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut last_err = None;

    for attempt in 1..=policy.attempts {
        match op().await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!(
                        "[Retry] {} succeeded on attempt {}/{}",
                        what,
                        attempt,
                        policy.attempts
                    );
                }
                return Ok(value);
            }
            Err(e) => {
                tracing::warn!(
                    "[Retry] {} failed on attempt {}/{}: {}",
                    what,
                    attempt,
                    policy.attempts,
                    e
                );
                last_err = Some(e);
                if attempt < policy.attempts {
                    tokio::time::sleep(policy.delay).await;
                }
            }
        }
    }

    Err(last_err.unwrap_or_else(|| {
        ProvisionError::Runtime(format!("{} configured with zero attempts", what))
    }))
}
