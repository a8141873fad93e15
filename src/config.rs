//! Scraper configuration
//!
//! Every endpoint, query parameter and timing constant used by the pipeline
//! lives here so the fetcher and formatter never reach for globals.

use std::ops::Range;
use std::time::Duration;
use tracing::warn;

/// Query parameters sent with every profile request
pub const PROFILE_QUERY: [(&str, &str); 3] = [
    ("with_mutual_friends", "true"),
    ("with_mutual_friends_count", "false"),
    ("with_mutual_guilds", "true"),
];

/// Configuration for a single scraper run
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// Base URL of the private API, without a trailing slash
    pub api_base: String,
    /// Base URL of the asset CDN, without a trailing slash
    pub cdn_base: String,
    /// `size` query value appended to asset URLs
    pub asset_size: u32,
    /// Multiplier applied to every advised rate limit wait
    pub retry_factor: f64,
    /// Range (seconds) to draw from when a 429 carries no advised wait
    pub fallback_retry_secs: Range<f64>,
    /// Range (seconds) to cool down after the collection stage
    pub cooldown_secs: Range<f64>,
    /// Timeout for a single HTTP request
    pub request_timeout: Duration,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            api_base: "https://discord.com/api/v9".to_string(),
            cdn_base: "https://cdn.discordapp.com".to_string(),
            asset_size: 2048,
            retry_factor: 2.0,
            fallback_retry_secs: 2.0..4.0,
            cooldown_secs: 1.0..2.0,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl ScraperConfig {
    /// Build a configuration from `SCRAPER_*` environment variables, falling
    /// back to the defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(api_base) = std::env::var("SCRAPER_API_BASE") {
            config.api_base = api_base.trim_end_matches('/').to_string();
        }
        if let Ok(cdn_base) = std::env::var("SCRAPER_CDN_BASE") {
            config.cdn_base = cdn_base.trim_end_matches('/').to_string();
        }
        if let Some(size) = parse_env::<u32>("SCRAPER_ASSET_SIZE") {
            config.asset_size = size;
        }
        if let Some(factor) = parse_env::<f64>("SCRAPER_RETRY_FACTOR") {
            if factor > 0.0 {
                config.retry_factor = factor;
            } else {
                warn!("Ignoring non-positive SCRAPER_RETRY_FACTOR {}", factor);
            }
        }
        if let Some(secs) = parse_env::<u64>("SCRAPER_REQUEST_TIMEOUT_SECS") {
            config.request_timeout = Duration::from_secs(secs);
        }

        config
    }

    pub fn channels_url(&self) -> String {
        format!("{}/users/@me/channels", self.api_base)
    }

    pub fn profile_url(&self, user_id: &str) -> String {
        format!("{}/users/{}/profile", self.api_base, user_id)
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring unparsable {}={:?}", key, raw);
            None
        }
    }
}
