//! SOAP transport
//!
//! One client per connector run. Each call generates a fresh token passport,
//! serializes the envelope, posts it with a bounded timeout, and classifies
//! the response. The retry loop wraps the whole call, so a transient vendor
//! status discovered during envelope validation is retried like any other.

use super::envelope::{build_request, Envelope, RequestBody, SearchPreferences};
use crate::auth::TokenPassport;
use crate::config::TapConfig;
use crate::constants::{DEFAULT_PAGE_SIZE, MAX_RETRIES};
use crate::error::{Error, Result};
use rand::Rng;
use reqwest::header::CONTENT_TYPE;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Executes SOAP calls against one account's service endpoint.
#[derive(Debug, Clone)]
pub struct SoapClient {
    http: reqwest::Client,
    config: TapConfig,
    retry_unit: Duration,
}

impl SoapClient {
    /// Build a client from the connector config.
    pub fn new(config: &TapConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            http,
            config: config.clone(),
            retry_unit: Duration::from_secs(1),
        })
    }

    /// Shrink the backoff unit so retry tests run in milliseconds
    #[cfg(test)]
    pub(crate) fn with_retry_unit(mut self, unit: Duration) -> Self {
        self.retry_unit = unit;
        self
    }

    /// Fetch a schema document (WSDL or type catalog) as text.
    pub async fn fetch_document(&self, url: &str) -> Result<String> {
        debug!(%url, "fetching schema document");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?
            .error_for_status()?;
        Ok(response.text().await?)
    }

    /// Execute one SOAP call and classify its response.
    ///
    /// `record_type` only tags the timing event; the request itself is fully
    /// described by `body`.
    pub async fn call(&self, record_type: &str, body: &RequestBody) -> Result<Envelope> {
        let operation = body.operation();
        let passport = TokenPassport::generate(&self.config)?;
        let preferences = operation
            .uses_search_preferences()
            .then(SearchPreferences::default);
        let request = build_request(&passport, preferences.as_ref(), body)?;

        let started = Instant::now();
        let response = self
            .http
            .post(self.config.service_url())
            .header(CONTENT_TYPE, "text/xml; charset=utf-8")
            .header("SOAPAction", operation.name())
            .body(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let http_status = response.status();
        let text = response.text().await?;
        let elapsed = started.elapsed();

        if !http_status.is_success() {
            emit_timer(record_type, operation.name(), elapsed, "failed", 0);
            // A SOAP fault rides on a non-2xx response; prefer its message
            if let Err(fault @ Error::FatalApi { .. }) = Envelope::parse(&text) {
                return Err(fault);
            }
            return Err(Error::fatal_api(
                format!("HTTP_{}", http_status.as_u16()),
                snippet(&text),
            ));
        }

        let envelope = Envelope::parse(&text)?;
        if let Err(e) = envelope.validate_status() {
            emit_timer(record_type, operation.name(), elapsed, "failed", 0);
            return Err(e);
        }

        emit_timer(
            record_type,
            operation.name(),
            elapsed,
            "succeeded",
            envelope.approximate_record_count(DEFAULT_PAGE_SIZE),
        );
        Ok(envelope)
    }

    /// Execute one SOAP call, retrying transient vendor statuses.
    ///
    /// Exponential backoff doubling from the retry unit, with random jitter.
    /// Fatal and transport errors propagate on the first occurrence.
    pub async fn call_with_retry(&self, record_type: &str, body: &RequestBody) -> Result<Envelope> {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.call(record_type, body).await {
                Ok(envelope) => return Ok(envelope),
                Err(e) if e.is_retryable() && attempt < MAX_RETRIES => {
                    let delay = self.backoff_delay(attempt);
                    warn!(
                        %record_type,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "transient API error, backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) if e.is_retryable() => {
                    warn!(%record_type, attempt, error = %e, "giving up on transient error");
                    return Err(Error::MaxRetriesExceeded {
                        max_retries: MAX_RETRIES,
                    });
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// `unit * 2^attempt` plus up to one unit of jitter
    fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponent = 2u32.saturating_pow(attempt.min(8));
        let jitter = rand::thread_rng().gen_range(0..=self.retry_unit.as_millis() as u64);
        self.retry_unit * exponent + Duration::from_millis(jitter)
    }

    /// Surface request timeouts distinctly from other transport failures
    fn transport_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::Timeout {
                timeout_ms: self.config.request_timeout().as_millis() as u64,
            }
        } else {
            Error::Http(e)
        }
    }
}

/// Timing event for one request, tagged with the stream and outcome.
fn emit_timer(record_type: &str, operation: &str, elapsed: Duration, status: &str, records: u64) {
    info!(
        metric = "http_request_duration",
        %record_type,
        %operation,
        %status,
        duration_ms = elapsed.as_millis() as u64,
        records,
        "request timing"
    );
}

/// Bounded excerpt of an unexpected response body, for error messages
fn snippet(text: &str) -> String {
    const LIMIT: usize = 200;
    if text.len() <= LIMIT {
        text.to_string()
    } else {
        let mut end = LIMIT;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &text[..end])
    }
}
