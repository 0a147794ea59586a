use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use uuid::Uuid;

/// Exponential backoff policy for outbound delivery attempts.
#[derive(Clone, Debug)]
pub struct RetryConfig {
    /// Retries allowed after the initial attempt.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Backoff ceiling.
    pub max_delay: Duration,
    /// Multiplier applied to the delay after each failed attempt.
    pub multiplier: f64,
    /// Spread sleeps uniformly below the computed delay.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            multiplier: 2.0,
            jitter: true,
        }
    }
}

#[derive(Debug)]
pub enum RetryResult<T, E> {
    /// Operation succeeded.
    Success(T),
    /// Operation kept failing transiently until the retry budget ran out.
    Exhausted(E),
    /// Operation hit a terminal error; no retry was attempted.
    PermanentFailure(E),
}

/// Whether an error is worth another attempt.
pub trait IsTransient {
    fn is_transient(&self) -> bool;
}

fn with_jitter(delay: Duration) -> Duration {
    // Full jitter drawn from UUID entropy, floored so sleeps never collapse
    // to zero.
    let fraction = (Uuid::new_v4().as_u128() % 1000) as f64 / 1000.0;
    delay.mul_f64(fraction.max(0.05))
}

/// Run `operation` until it succeeds, fails terminally, or exhausts the
/// retry budget. The attempt number (1-based) is passed to each call.
pub async fn retry_on_transient<F, Fut, T, E>(config: &RetryConfig, mut operation: F) -> RetryResult<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display + IsTransient,
{
    let mut attempt = 0;
    let mut delay = config.initial_delay;

    loop {
        attempt += 1;

        match operation(attempt).await {
            Ok(result) => {
                if attempt > 1 {
                    log::info!("Delivery succeeded on attempt {attempt}");
                }
                return RetryResult::Success(result);
            }
            Err(error) => {
                if !error.is_transient() {
                    log::error!("Terminal failure, not retrying: {error}");
                    return RetryResult::PermanentFailure(error);
                }
                if attempt > config.max_retries {
                    log::error!("Giving up after {attempt} attempts: {error}");
                    return RetryResult::Exhausted(error);
                }

                let pause = if config.jitter { with_jitter(delay) } else { delay };
                log::warn!(
                    "Attempt {attempt} failed ({error}), retrying in {}ms",
                    pause.as_millis()
                );
                sleep(pause).await;

                delay = Duration::from_millis(((delay.as_millis() as f64) * config.multiplier) as u64)
                    .min(config.max_delay);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[derive(Debug)]
    struct TestError {
        transient: bool,
    }

    impl fmt::Display for TestError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "test error (transient={})", self.transient)
        }
    }

    impl IsTransient for TestError {
        fn is_transient(&self) -> bool {
            self.transient
        }
    }

    fn fast_config(max_retries: u32) -> RetryConfig {
        RetryConfig {
            max_retries,
            initial_delay: Duration::from_millis(5),
            max_delay: Duration::from_millis(20),
            multiplier: 2.0,
            jitter: false,
        }
    }

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let counter = Arc::new(AtomicU32::new(0));
        let c = counter.clone();

        let result = retry_on_transient(&fast_config(3), |_attempt| {
            let c = c.clone();
            async move {
                if c.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(TestError { transient: true })
                } else {
                    Ok("delivered")
                }
            }
        })
        .await;

        assert!(matches!(result, RetryResult::Success("delivered")));
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhausts_the_retry_budget() {
        let counter = Arc::new(AtomicU32::new(0));
        let c = counter.clone();

        let result = retry_on_transient(&fast_config(2), |_attempt| {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(TestError { transient: true })
            }
        })
        .await;

        assert!(matches!(result, RetryResult::Exhausted(_)));
        // Initial attempt plus two retries.
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn terminal_errors_short_circuit() {
        let counter = Arc::new(AtomicU32::new(0));
        let c = counter.clone();

        let result = retry_on_transient(&fast_config(5), |_attempt| {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(TestError { transient: false })
            }
        })
        .await;

        assert!(matches!(result, RetryResult::PermanentFailure(_)));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn jitter_never_exceeds_the_computed_delay() {
        let delay = Duration::from_millis(500);
        for _ in 0..50 {
            let jittered = with_jitter(delay);
            assert!(jittered <= delay);
            assert!(jittered >= Duration::from_millis(25));
        }
    }
}
