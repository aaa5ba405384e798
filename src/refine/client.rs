//! Refinement client with bounded exponential-backoff retry.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::error::RefineError;
use super::types::{PromptRequest, PromptResponse, RefineOptions};
use crate::retry::{classify_status, RetryConfig, StatusClass};

/// Default service location.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Default timeout for a single HTTP attempt.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const REFINE_PATH: &str = "/refine-prompt";

/// Configuration for the refinement client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// Timeout applied to each HTTP attempt, not to the whole retry sequence.
    pub timeout: Duration,
    pub retry: RetryConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Set the service base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the per-attempt timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry policy.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}

/// Result of one HTTP attempt, already classified.
#[derive(Debug)]
enum AttemptOutcome {
    Succeeded(PromptResponse),
    Retry(RefineError),
    Fail(RefineError),
}

/// Client for the prompt refinement service.
///
/// Cloning is cheap: the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct RefineClient {
    base_url: String,
    endpoint: String,
    http: Client,
    retry: RetryConfig,
}

impl RefineClient {
    /// Create a client for `base_url` with the given per-attempt timeout and
    /// the default retry policy.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, RefineError> {
        Self::from_config(
            ClientConfig::default()
                .with_base_url(base_url)
                .with_timeout(timeout),
        )
    }

    /// Create a client from a full configuration.
    pub fn from_config(config: ClientConfig) -> Result<Self, RefineError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(RefineError::HttpClient)?;

        Ok(Self::with_http_client(config.base_url, http).with_retry_config(config.retry))
    }

    /// Create a client around an already configured `reqwest::Client`.
    pub fn with_http_client(base_url: impl Into<String>, http: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let endpoint = format!("{}{}", base_url, REFINE_PATH);

        Self {
            base_url,
            endpoint,
            http,
            retry: RetryConfig::default(),
        }
    }

    /// Replace the retry policy.
    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    /// Refine a prompt with no optional parameters and return only the
    /// refined text.
    pub async fn refine(&self, lazy_prompt: impl Into<String>) -> Result<String, RefineError> {
        self.refine_with_options(lazy_prompt, RefineOptions::default())
            .await
            .map(|response| response.refined_prompt)
    }

    /// Refine a prompt with optional parameters.
    ///
    /// An empty prompt fails with [`RefineError::Validation`] before any
    /// request is sent.
    pub async fn refine_with_options(
        &self,
        lazy_prompt: impl Into<String>,
        options: RefineOptions,
    ) -> Result<PromptResponse, RefineError> {
        let request = PromptRequest::new(lazy_prompt, options)?;
        self.send(&request).await
    }

    /// Send an already built request, retrying transient failures.
    pub async fn send(&self, request: &PromptRequest) -> Result<PromptResponse, RefineError> {
        self.send_with_cancel(request, &CancellationToken::new()).await
    }

    /// Send a request, abandoning the whole retry sequence once `cancel` fires.
    ///
    /// Cancellation interrupts both an in-flight attempt and a backoff sleep.
    pub async fn send_with_cancel(
        &self,
        request: &PromptRequest,
        cancel: &CancellationToken,
    ) -> Result<PromptResponse, RefineError> {
        // Fields are public, so a request may not have gone through `PromptRequest::new`.
        if request.lazy_prompt.is_empty() {
            return Err(RefineError::Validation(
                "lazy prompt cannot be empty".to_string(),
            ));
        }

        let body = request.to_json()?;
        let max_attempts = self.retry.max_attempts();
        let mut attempt: u32 = 0;

        loop {
            let delay = self.retry.delay_before(attempt);
            if !delay.is_zero() {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        return Err(RefineError::Cancelled { attempts: attempt });
                    }
                    _ = sleep(delay) => {}
                }
            }

            if cancel.is_cancelled() {
                return Err(RefineError::Cancelled { attempts: attempt });
            }

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Err(RefineError::Cancelled { attempts: attempt + 1 });
                }
                outcome = self.attempt(&body, attempt) => outcome,
            };

            match outcome {
                AttemptOutcome::Succeeded(response) => {
                    debug!(attempt = attempt + 1, "refine request succeeded");
                    return Ok(response);
                }
                AttemptOutcome::Fail(e) => {
                    debug!(attempt = attempt + 1, error = %e, "refine request failed, not retrying");
                    return Err(e);
                }
                AttemptOutcome::Retry(e) => {
                    if attempt >= self.retry.max_retries {
                        return Err(RefineError::MaxRetriesExceeded {
                            attempts: attempt + 1,
                            last: Box::new(e),
                        });
                    }

                    warn!(
                        attempt = attempt + 1,
                        max_attempts,
                        delay_ms = self.retry.delay_before(attempt + 1).as_millis() as u64,
                        error = %e,
                        "refine request failed, retrying"
                    );
                    attempt += 1;
                }
            }
        }
    }

    /// Issue one POST and classify what came back.
    async fn attempt(&self, body: &[u8], attempt: u32) -> AttemptOutcome {
        let number = attempt + 1;
        debug!(attempt = number, url = %self.endpoint, "sending refine request");

        let response = match self
            .http
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_vec())
            .send()
            .await
        {
            Ok(response) => response,
            Err(source) => {
                return AttemptOutcome::Retry(RefineError::Transport {
                    attempt: number,
                    source,
                })
            }
        };

        let status = response.status().as_u16();
        match classify_status(status) {
            StatusClass::Success => match response.bytes().await {
                Ok(bytes) => match PromptResponse::from_json(&bytes) {
                    Ok(decoded) => AttemptOutcome::Succeeded(decoded),
                    Err(e) => AttemptOutcome::Fail(e),
                },
                Err(source) => AttemptOutcome::Retry(RefineError::Transport {
                    attempt: number,
                    source,
                }),
            },
            StatusClass::ClientError => AttemptOutcome::Fail(RefineError::ClientStatus { status }),
            StatusClass::Retryable => AttemptOutcome::Retry(RefineError::UnexpectedStatus {
                status,
                attempt: number,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Nothing listens on the discard port, so any request that escaped
    // validation would surface as a transport error instead.
    const UNREACHABLE: &str = "http://127.0.0.1:9";

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.retry, RetryConfig::default());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = RefineClient::new("http://example.test/api/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://example.test/api");
        assert_eq!(client.endpoint, "http://example.test/api/refine-prompt");
    }

    #[test]
    fn test_with_retry_config_replaces_policy() {
        let retry = RetryConfig::with_retries(7).with_multiplier(1.5);
        let client = RefineClient::new(UNREACHABLE, Duration::from_secs(1))
            .unwrap()
            .with_retry_config(retry);
        assert_eq!(client.retry_config(), &retry);
    }

    #[test]
    fn test_from_config_carries_retry() {
        let config = ClientConfig::default()
            .with_base_url(UNREACHABLE)
            .with_retry(RetryConfig::no_retry());
        let client = RefineClient::from_config(config).unwrap();
        assert_eq!(client.retry_config().max_retries, 0);
    }

    #[tokio::test]
    async fn test_empty_prompt_fails_before_network() {
        let client = RefineClient::new(UNREACHABLE, Duration::from_secs(1)).unwrap();

        let err = client.refine("").await.unwrap_err();
        assert!(matches!(err, RefineError::Validation(_)));

        let request = PromptRequest {
            lazy_prompt: String::new(),
            domain: None,
            expertise_level: None,
            output_format: None,
            include_best_practices: None,
            include_examples: None,
        };
        let err = client.send(&request).await.unwrap_err();
        assert!(matches!(err, RefineError::Validation(_)));
    }

    #[tokio::test]
    async fn test_cancelled_token_stops_before_first_attempt() {
        let client = RefineClient::new(UNREACHABLE, Duration::from_secs(1)).unwrap();
        let request = PromptRequest::new("test", RefineOptions::default()).unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = client.send_with_cancel(&request, &cancel).await.unwrap_err();
        assert!(matches!(err, RefineError::Cancelled { attempts: 0 }));
    }
}
