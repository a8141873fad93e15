use crate::config::ScraperConfig;
use crate::credentials::Credentials;
use crate::error::FetchError;
use rand::Rng;
use reqwest::{header::RETRY_AFTER, Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::error::Error;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Body of a 429 response
#[derive(Debug, Deserialize)]
struct RateLimitBody {
    #[serde(default)]
    retry_after: Option<f64>,
}

/// Retry bookkeeping for one fetch call chain
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RetryState {
    pub attempt_count: u32,
    pub wait: Duration,
}

/// Performs GETs against the API, waiting out every 429 it is handed
pub struct RateLimitedFetcher {
    client: Client,
    config: ScraperConfig,
}

impl RateLimitedFetcher {
    pub fn new(
        config: ScraperConfig,
        credentials: &Credentials,
    ) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .default_headers(credentials.headers()?)
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    /// GET `url` with `params`, retrying without limit while the server
    /// answers 429. `label` names the request in log lines.
    pub async fn fetch(
        &self,
        url: &str,
        params: &[(&str, &str)],
        label: &str,
    ) -> Result<Value, FetchError> {
        let mut retry = RetryState::default();

        loop {
            let response = self.client.get(url).query(params).send().await?;
            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                retry.attempt_count += 1;
                retry.wait = self.backoff_for(response).await;
                warn!(
                    "Hit rate limit on {}, retrying after {:.2}s (attempt {})",
                    label,
                    retry.wait.as_secs_f64(),
                    retry.attempt_count
                );
                sleep(retry.wait).await;
                continue;
            }

            if !status.is_success() {
                debug!("{} returned {}", label, status);
                return Err(FetchError::Upstream { status });
            }

            if retry.attempt_count > 0 {
                debug!(
                    "{} succeeded after {} rate limited attempts",
                    label, retry.attempt_count
                );
            }
            return Ok(response.json::<Value>().await?);
        }
    }

    /// Advised wait of a 429 response, scaled by the safety factor
    async fn backoff_for(&self, response: Response) -> Duration {
        let header_secs = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<f64>().ok());

        let body_secs = response
            .json::<RateLimitBody>()
            .await
            .ok()
            .and_then(|body| body.retry_after);

        let advised = body_secs
            .or(header_secs)
            .filter(|secs| secs.is_finite() && *secs >= 0.0)
            .unwrap_or_else(|| self.fallback_secs());

        scaled_wait(advised, self.config.retry_factor)
    }

    fn fallback_secs(&self) -> f64 {
        let range = self.config.fallback_retry_secs.clone();
        if range.is_empty() {
            return range.start.max(0.0);
        }
        rand::rng().random_range(range)
    }
}

/// `advised * factor` as a wait. Values too large for a `Duration` saturate
/// rather than collapsing to an immediate retry.
pub fn scaled_wait(advised_secs: f64, factor: f64) -> Duration {
    let secs = advised_secs * factor;
    if secs.is_nan() || secs <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}
