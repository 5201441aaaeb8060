pub mod normalize;
pub mod query;
pub mod types;

use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};
use url::Url;

use normalize::normalize;
use query::QueryDocument;
use types::{ResultSet, SparqlResponse};

const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";
const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
const DEFAULT_MAX_ATTEMPTS: u32 = 3;
/// Upper bound on attempts per query, whatever the configuration asks for.
pub const MAX_ATTEMPTS: u32 = 5;
const INITIAL_BACKOFF_MS: u64 = 500;
const MAX_BACKOFF_MS: u64 = 8_000;
const ERROR_SNIPPET_CHARS: usize = 200;

#[derive(Debug, thiserror::Error)]
pub enum WikidataError {
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Query service rate limit exceeded. Please retry later.")]
    RateLimited,

    #[error("Query service error ({code}): {message}")]
    Service { code: u16, message: String },

    #[error("Unexpected response from query service: {0}")]
    Protocol(String),

    #[error("Malformed response from query service: {0}")]
    MalformedResponse(String),
}

/// Runs SPARQL against a knowledge service.
/// Implemented by `WikidataClient` for production; mock implementations used in tests.
pub trait QueryClient {
    async fn execute(&self, query: &QueryDocument) -> Result<SparqlResponse, WikidataError>;

    /// Execute and normalize in one step.
    async fn fetch_items(&self, query: &QueryDocument) -> Result<ResultSet, WikidataError> {
        let response = self.execute(query).await?;
        normalize(&response)
    }
}

/// Client for a SPARQL endpoint speaking the Wikidata Query Service dialect.
///
/// The endpoint is injected; timeouts come from the `reqwest::Client` it is built with.
#[derive(Clone)]
pub struct WikidataClient {
    http: Client,
    endpoint: Url,
    max_attempts: u32,
}

impl WikidataClient {
    pub fn new(http: Client, endpoint: Url) -> Self {
        Self {
            http,
            endpoint,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Total attempts for transient failures, clamped to `1..=MAX_ATTEMPTS`.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.clamp(1, MAX_ATTEMPTS);
        self
    }

    async fn send_once(&self, query: &QueryDocument) -> Result<SparqlResponse, WikidataError> {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("query", query.as_str())
            .finish();

        let response = self
            .http
            .post(self.endpoint.clone())
            .header(ACCEPT, SPARQL_RESULTS_JSON)
            .header(CONTENT_TYPE, FORM_URLENCODED)
            .header(USER_AGENT, crate::USER_AGENT)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!("query service rate limited");
            return Err(WikidataError::RateLimited);
        }

        let text = response.text().await?;
        if !status.is_success() {
            let snippet: String = text.chars().take(ERROR_SNIPPET_CHARS).collect();
            warn!(status = %status, "query service error");
            return Err(WikidataError::Service {
                code: status.as_u16(),
                message: format!("HTTP {status}: {}", snippet.trim()),
            });
        }

        let body = serde_json::from_str::<SparqlResponse>(&text).map_err(|e| {
            warn!(error = %e, "query service returned an undecodable body");
            WikidataError::Protocol(format!("expected SPARQL JSON results ({e})"))
        })?;
        debug!(endpoint = %self.endpoint, bytes = text.len(), "query complete");
        Ok(body)
    }
}

impl QueryClient for WikidataClient {
    async fn execute(&self, query: &QueryDocument) -> Result<SparqlResponse, WikidataError> {
        let mut attempt = 0;
        loop {
            match self.send_once(query).await {
                Ok(response) => return Ok(response),
                Err(e) if is_retriable(&e) && attempt + 1 < self.max_attempts => {
                    let delay_ms = jittered_backoff(attempt);
                    debug!(
                        attempt = attempt + 1,
                        delay_ms,
                        error = %e,
                        "retrying after transient error"
                    );
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

pub(crate) fn is_retriable(e: &WikidataError) -> bool {
    match e {
        WikidataError::RateLimited => true,
        WikidataError::Service { code, .. } => (500..=599).contains(code),
        WikidataError::Transport(e) => e.is_timeout() || e.is_connect(),
        WikidataError::Protocol(_) | WikidataError::MalformedResponse(_) => false,
    }
}

/// Equal jitter backoff: base/2 + rand(0, base/2), base capped at `MAX_BACKOFF_MS`.
fn jittered_backoff(attempt: u32) -> u64 {
    let base = INITIAL_BACKOFF_MS
        .saturating_mul(2u64.saturating_pow(attempt))
        .min(MAX_BACKOFF_MS);
    let half = base / 2;
    half + fastrand::u64(..half.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_5xx_and_rate_limit_are_retriable() {
        assert!(is_retriable(&WikidataError::RateLimited));
        assert!(is_retriable(&WikidataError::Service {
            code: 503,
            message: "unavailable".into()
        }));
    }

    #[test]
    fn client_and_shape_errors_are_not_retriable() {
        assert!(!is_retriable(&WikidataError::Service {
            code: 400,
            message: "bad query".into()
        }));
        assert!(!is_retriable(&WikidataError::Protocol("x".into())));
        assert!(!is_retriable(&WikidataError::MalformedResponse("x".into())));
    }

    #[test]
    fn backoff_stays_within_equal_jitter_bounds() {
        for attempt in 0..4 {
            let base = INITIAL_BACKOFF_MS * 2u64.pow(attempt);
            let delay = jittered_backoff(attempt);
            assert!(delay >= base / 2 && delay < base, "attempt {attempt}: {delay}");
        }
    }

    #[test]
    fn backoff_is_capped_for_late_attempts() {
        for attempt in [5, 19, 60, u32::MAX] {
            let delay = jittered_backoff(attempt);
            assert!(
                delay >= MAX_BACKOFF_MS / 2 && delay < MAX_BACKOFF_MS,
                "attempt {attempt}: {delay}"
            );
        }
    }

    #[test]
    fn attempts_are_clamped() {
        let client = WikidataClient::new(
            Client::new(),
            Url::parse(crate::config::DEFAULT_ENDPOINT).unwrap(),
        );
        assert_eq!(client.clone().with_max_attempts(0).max_attempts, 1);
        assert_eq!(client.clone().with_max_attempts(4).max_attempts, 4);
        assert_eq!(client.with_max_attempts(20).max_attempts, MAX_ATTEMPTS);
    }
}
