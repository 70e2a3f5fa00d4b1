//! services/api/src/adapters/retry.rs
//!
//! A small retry policy for outbound HTTP calls: a bounded number of retries with
//! exponential backoff, triggered by connection failures or a fixed set of statuses.

use reqwest::{RequestBuilder, Response, StatusCode};
use std::time::Duration;
use tracing::warn;

/// Statuses that are worth retrying: rate limiting and transient server faults.
pub const RETRY_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_factor: Duration,
    pub retry_statuses: &'static [u16],
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff_factor: Duration::from_millis(500),
            retry_statuses: &RETRY_STATUSES,
        }
    }
}

impl RetryPolicy {
    pub fn should_retry_status(&self, status: StatusCode) -> bool {
        self.retry_statuses.contains(&status.as_u16())
    }

    /// The delay before the given retry (1-based): `factor * 2^(retry - 1)`.
    pub fn backoff_for(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(16);
        self.backoff_factor * 2u32.pow(exponent)
    }

    /// Sends the request built by `build`, retrying on connection errors and on the
    /// retryable statuses. The last response is returned as-is once retries run out,
    /// so callers still check its status.
    pub async fn send<F>(&self, build: F) -> Result<Response, reqwest::Error>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut retry = 0;
        loop {
            match build().send().await {
                Ok(response)
                    if retry < self.max_retries && self.should_retry_status(response.status()) =>
                {
                    warn!(status = %response.status(), retry = retry + 1, "Retrying request");
                }
                Ok(response) => return Ok(response),
                Err(e) if retry < self.max_retries && (e.is_connect() || e.is_timeout()) => {
                    warn!(error = %e, retry = retry + 1, "Retrying request after transport error");
                }
                Err(e) => return Err(e),
            }
            retry += 1;
            tokio::time::sleep(self.backoff_for(retry)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
    };

    /// Serves `statuses` in order, one per connection, repeating the last one.
    /// Returns the base URL and a counter of requests served.
    async fn scripted_server(statuses: Vec<u16>) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let served = hits.clone();
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                let index = served.fetch_add(1, Ordering::SeqCst);
                let status = statuses[index.min(statuses.len() - 1)];
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                let reply = format!(
                    "HTTP/1.1 {status} Scripted\r\ncontent-length: 0\r\nconnection: close\r\n\r\n"
                );
                let _ = socket.write_all(reply.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });
        (format!("http://{addr}/"), hits)
    }

    async fn send_scripted(statuses: Vec<u16>) -> (u16, usize) {
        let (url, hits) = scripted_server(statuses).await;
        let policy = RetryPolicy {
            backoff_factor: Duration::ZERO,
            ..RetryPolicy::default()
        };
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        let response = policy.send(|| client.get(&url)).await.unwrap();
        (response.status().as_u16(), hits.load(Ordering::SeqCst))
    }

    #[tokio::test]
    async fn test_send_returns_last_response_when_retries_run_out() {
        assert_eq!(send_scripted(vec![503, 503, 503]).await, (503, 3));
    }

    #[tokio::test]
    async fn test_send_recovers_after_a_retryable_status() {
        assert_eq!(send_scripted(vec![503, 200]).await, (200, 2));
    }

    #[tokio::test]
    async fn test_send_does_not_retry_client_errors() {
        assert_eq!(send_scripted(vec![404]).await, (404, 1));
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 2);
        assert_eq!(policy.backoff_factor, Duration::from_millis(500));
    }

    #[test]
    fn test_retryable_statuses() {
        let policy = RetryPolicy::default();
        for code in [429, 500, 502, 503, 504] {
            let status = StatusCode::from_u16(code).unwrap();
            assert!(policy.should_retry_status(status), "{code} should retry");
        }
        assert!(!policy.should_retry_status(StatusCode::OK));
        assert!(!policy.should_retry_status(StatusCode::NOT_FOUND));
        assert!(!policy.should_retry_status(StatusCode::NOT_IMPLEMENTED));
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_for(1), Duration::from_millis(500));
        assert_eq!(policy.backoff_for(2), Duration::from_millis(1000));
        assert_eq!(policy.backoff_for(3), Duration::from_millis(2000));
    }
}
