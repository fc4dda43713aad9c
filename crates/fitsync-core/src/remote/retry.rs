use std::time::Duration;

use crate::config::RetryConfig;

/// Retry a closure on failed `ureq` calls with exponential backoff + jitter.
///
/// Used by the listing call, which retries on any non-success response or
/// network error, bounded by a fixed attempt count rather than wall-clock
/// time. The first retry waits `retry_delay_ms`; each further attempt
/// doubles the delay up to `retry_max_delay_ms`.
#[allow(clippy::result_large_err)]
pub fn retry_call<T>(
    config: &RetryConfig,
    op_name: &str,
    f: impl Fn() -> std::result::Result<T, ureq::Error>,
) -> std::result::Result<T, ureq::Error> {
    let mut delay_ms = config.retry_delay_ms;
    let mut last_err = None;

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            let jitter = rand::random::<u64>() % delay_ms.max(1);
            std::thread::sleep(Duration::from_millis(delay_ms + jitter));
            delay_ms = (delay_ms * 2).min(config.retry_max_delay_ms);
        }
        match f() {
            Ok(val) => return Ok(val),
            Err(e) if attempt < config.max_retries => {
                tracing::warn!(
                    "backup API {op_name}: attempt {}/{} failed, retrying: {e}",
                    attempt + 1,
                    config.max_retries + 1,
                );
                last_err = Some(e);
            }
            Err(e) => return Err(e),
        }
    }
    Err(last_err.unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fast_retry(max_retries: usize) -> RetryConfig {
        RetryConfig {
            max_retries,
            retry_delay_ms: 1,
            retry_max_delay_ms: 1,
        }
    }

    fn transport_error() -> ureq::Error {
        // A request against a closed port yields a Transport error quickly.
        ureq::AgentBuilder::new()
            .timeout(Duration::from_millis(100))
            .build()
            .get("http://127.0.0.1:1/unreachable")
            .call()
            .unwrap_err()
    }

    #[test]
    fn returns_first_success() {
        let calls = AtomicUsize::new(0);
        let result = retry_call(&fast_retry(3), "list", || {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, ureq::Error>(42)
        });
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn attempt_budget_is_bounded() {
        let calls = AtomicUsize::new(0);
        let result: Result<(), _> = retry_call(&fast_retry(3), "list", || {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(transport_error())
        });
        assert!(result.is_err());
        // 1 initial attempt + 3 retries
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn zero_retries_means_single_attempt() {
        let calls = AtomicUsize::new(0);
        let result: Result<(), _> = retry_call(&fast_retry(0), "list", || {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(transport_error())
        });
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn recovers_after_transient_failures() {
        let calls = AtomicUsize::new(0);
        let result = retry_call(&fast_retry(3), "list", || {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(transport_error())
            } else {
                Ok("ok")
            }
        });
        assert_eq!(result.unwrap(), "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
