//! Core HTTP operations with rate limiting and retry logic
//!
//! Every request waits on a shared `governor` rate limiter. Throttled (429)
//! and overloaded (503) responses, as well as transport failures, are retried
//! with exponential backoff; once the retries run out the last response or
//! error is handed back to the caller unchanged.

use std::num::NonZeroU32;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Jitter, Quota, RateLimiter};
use reqwest::{Client, Method, StatusCode};
use url::Url;

use super::RawResponse;
use crate::constants::limits;
use crate::errors::{AuthError, AuthResult, Result};

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// HTTP operations handler with resilience patterns
#[derive(Debug)]
pub struct HttpHandler {
    client: Client,
    rate_limiter: DirectRateLimiter,
    max_retries: u32,
}

impl HttpHandler {
    /// Creates a new HttpHandler with the given client and rate limiting
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidSetup` if the rate limit is zero
    pub fn new(client: Client, rate_limit_rps: u32, max_retries: u32) -> AuthResult<Self> {
        let rate_limiter = Self::build_rate_limiter(rate_limit_rps)?;
        Ok(Self {
            client,
            rate_limiter,
            max_retries,
        })
    }

    fn build_rate_limiter(rate_limit_rps: u32) -> AuthResult<DirectRateLimiter> {
        let rps = NonZeroU32::new(rate_limit_rps).ok_or_else(|| AuthError::InvalidSetup {
            reason: "Rate limit must be non-zero".to_string(),
        })?;
        Ok(RateLimiter::direct(Quota::per_second(rps)))
    }

    /// Delay before retry number `attempt` (1-based), capped at
    /// `limits::MAX_RETRY_DELAY_MS`
    pub(crate) fn backoff_delay(attempt: u32) -> Duration {
        let millis = 2_u64
            .checked_pow(attempt)
            .and_then(|factor| limits::RETRY_BASE_DELAY_MS.checked_mul(factor))
            .map_or(limits::MAX_RETRY_DELAY_MS, |ms| {
                ms.min(limits::MAX_RETRY_DELAY_MS)
            });
        Duration::from_millis(millis)
    }

    fn is_retryable(status: StatusCode) -> bool {
        status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::SERVICE_UNAVAILABLE
    }

    /// Send an authenticated request and read the full response body
    ///
    /// Non-success statuses are not errors at this level; the caller decides
    /// what each status means for the resource at hand.
    ///
    /// # Errors
    ///
    /// Returns `WorkspaceError::Http` if the request still fails at the
    /// transport level after all retries
    pub async fn execute(
        &self,
        method: Method,
        url: &Url,
        bearer_token: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<RawResponse> {
        let mut retries = 0;
        loop {
            self.rate_limiter
                .until_ready_with_jitter(Jitter::up_to(Duration::from_millis(100)))
                .await;

            let mut request = self
                .client
                .request(method.clone(), url.clone())
                .bearer_auth(bearer_token);
            if let Some(json) = body {
                request = request.json(json);
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if Self::is_retryable(status) && retries < self.max_retries {
                        retries += 1;
                        let delay = Self::backoff_delay(retries);
                        tracing::warn!(
                            "{} from {} {}. Backing off for {}ms",
                            status,
                            method,
                            url.path(),
                            delay.as_millis()
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }

                    let body = response.text().await?;
                    tracing::debug!("{} {} answered {}", method, url.path(), status);
                    return Ok(RawResponse { status, body });
                }
                Err(e) if retries < self.max_retries => {
                    retries += 1;
                    let delay = Self::backoff_delay(retries);
                    tracing::warn!(
                        "Request failed (attempt {}/{}): {}. Retrying in {}ms",
                        retries,
                        self.max_retries,
                        e,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    tracing::error!("Request failed after {} retries: {}", self.max_retries, e);
                    return Err(e.into());
                }
            }
        }
    }

    /// Get a reference to the underlying HTTP client
    pub fn client(&self) -> &Client {
        &self.client
    }
}
