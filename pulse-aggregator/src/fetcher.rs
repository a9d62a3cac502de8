use crate::types::{AggregatorError, FetchConfig, Result};
use backoff::{backoff::Backoff, exponential::ExponentialBackoff};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error, warn};
use url::Url;

/// HTTP GET with bounded retries and exponential backoff.
///
/// Failures never escape: after the last attempt the caller gets `None`.
pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .build()?;

        Ok(Self { client, config })
    }

    /// Headers that make the request look like it came from a browser.
    pub fn browser_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(&self.config.browser_user_agent) {
            headers.insert(USER_AGENT, value);
        }
        headers
    }

    /// Fetch `url` with `params` appended as a query string and return the body.
    ///
    /// Per-call `headers` override the client defaults (including the user agent).
    pub async fn fetch(
        &self,
        url: &str,
        params: &[(&str, String)],
        headers: Option<HeaderMap>,
    ) -> Option<String> {
        let target = match build_url(url, params) {
            Ok(target) => target,
            Err(e) => {
                error!("Refusing to fetch {}: {}", url, e);
                return None;
            }
        };

        // Waits 2^attempt * delay between attempts: 1s, 2s, ...
        let delay = Duration::from_secs(self.config.retry_delay_seconds);
        let mut backoff: ExponentialBackoff<backoff::SystemClock> = ExponentialBackoff {
            current_interval: delay,
            initial_interval: delay,
            randomization_factor: 0.0,
            multiplier: 2.0,
            max_interval: delay * 32,
            max_elapsed_time: None,
            ..Default::default()
        };

        let max_attempts = self.config.max_attempts.max(1);
        for attempt in 1..=max_attempts {
            match self.try_once(&target, headers.as_ref()).await {
                Ok(body) => {
                    debug!("Fetched {} ({} bytes)", target, body.len());
                    return Some(body);
                }
                Err(e) => {
                    warn!(
                        "Request failed (attempt {}/{}): {} - {}",
                        attempt, max_attempts, target, e
                    );
                    if attempt < max_attempts {
                        if let Some(wait) = backoff.next_backoff() {
                            tokio::time::sleep(wait).await;
                        }
                    }
                }
            }
        }

        error!("Giving up on {} after {} attempts", target, max_attempts);
        None
    }

    async fn try_once(&self, url: &Url, headers: Option<&HeaderMap>) -> Result<String> {
        let mut request = self.client.get(url.clone());
        if let Some(headers) = headers {
            request = request.headers(headers.clone());
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AggregatorError::General(format!(
                "HTTP {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        Ok(response.text().await?)
    }
}

fn build_url(url: &str, params: &[(&str, String)]) -> Result<Url> {
    let parsed = if params.is_empty() {
        Url::parse(url)?
    } else {
        Url::parse_with_params(url, params.iter().map(|(k, v)| (*k, v.as_str())))?
    };

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(AggregatorError::General(format!("unsupported scheme: {}", other))),
    }
}
