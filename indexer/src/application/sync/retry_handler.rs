//! Retry handler for RPC fetches made by the sync driver

use std::future::Future;
use tokio::time::{sleep, Duration};

use crate::utils::logging;

/// Retries operations that may fail temporarily, with exponential backoff
#[derive(Debug)]
pub struct RetryHandler {
    max_retries: u32,
    base_delay_ms: u64,
}

impl RetryHandler {
    pub fn with_config(max_retries: u32, base_delay_ms: u64) -> Self {
        Self {
            max_retries: max_retries.max(1),
            base_delay_ms,
        }
    }

    /// Execute an operation, logging each failed attempt under `operation_name`
    pub async fn execute_with_retry_and_logging<F, Fut, T, E>(
        &self,
        operation: F,
        operation_name: &str,
    ) -> Result<T, E>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let mut retry_count = 0;

        loop {
            match operation().await {
                Ok(result) => {
                    if retry_count > 0 {
                        logging::log_info(&format!(
                            "{} succeeded after {} retries",
                            operation_name, retry_count
                        ));
                    }
                    return Ok(result);
                }
                Err(e) => {
                    retry_count += 1;

                    if retry_count >= self.max_retries {
                        logging::log_error(&format!(
                            "{} failed after {} attempts: {}",
                            operation_name, self.max_retries, e
                        ));
                        return Err(e);
                    }

                    let delay = self.calculate_delay(retry_count);
                    logging::log_warning(&format!(
                        "{} failed (attempt {}/{}): {}. Retrying in {}ms",
                        operation_name, retry_count, self.max_retries, e, delay
                    ));

                    sleep(Duration::from_millis(delay)).await;
                }
            }
        }
    }

    /// Calculate exponential backoff delay
    fn calculate_delay(&self, retry_count: u32) -> u64 {
        self.base_delay_ms
            .saturating_mul(2_u64.saturating_pow(retry_count.saturating_sub(1)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_backoff_doubles() {
        let handler = RetryHandler::with_config(5, 100);
        assert_eq!(handler.calculate_delay(1), 100);
        assert_eq!(handler.calculate_delay(2), 200);
        assert_eq!(handler.calculate_delay(4), 800);
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let handler = RetryHandler::with_config(3, 1);
        let attempts = AtomicU32::new(0);

        let result: Result<u32, String> = handler
            .execute_with_retry_and_logging(
                || async {
                    let n = attempts.fetch_add(1, Ordering::SeqCst) + 1;
                    if n < 3 {
                        Err(format!("attempt {}", n))
                    } else {
                        Ok(n)
                    }
                },
                "flaky",
            )
            .await;

        assert_eq!(result, Ok(3));
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let handler = RetryHandler::with_config(2, 1);
        let attempts = AtomicU32::new(0);

        let result: Result<(), String> = handler
            .execute_with_retry_and_logging(
                || async {
                    attempts.fetch_add(1, Ordering::SeqCst);
                    Err("down".to_string())
                },
                "broken",
            )
            .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }
}
