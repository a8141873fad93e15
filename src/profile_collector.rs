//! Sequential profile collection, one request in flight at a time

use crate::config::PROFILE_QUERY;
use crate::contact_enumerator::Contact;
use crate::error::{PipelineError, Stage};
use crate::rate_limited_fetcher::RateLimitedFetcher;
use indicatif::ProgressBar;
use rand::Rng;
use serde_json::Value;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info};

/// Profile payload exactly as the API returned it
#[derive(Debug, Clone, PartialEq)]
pub struct RawProfile(pub Value);

impl RawProfile {
    pub fn value(&self) -> &Value {
        &self.0
    }
}

pub struct ProfileCollector<'a> {
    fetcher: &'a RateLimitedFetcher,
    progress: ProgressBar,
}

impl<'a> ProfileCollector<'a> {
    pub fn new(fetcher: &'a RateLimitedFetcher, progress: ProgressBar) -> Self {
        Self { fetcher, progress }
    }

    /// Fetch every contact's profile in order, skipping the ones that fail
    pub async fn collect(&self, contacts: &[Contact]) -> Result<Vec<RawProfile>, PipelineError> {
        if contacts.is_empty() {
            error!("User list is empty, nothing to collect");
            return Err(PipelineError::EmptyInput(Stage::Collect));
        }

        let total = contacts.len();
        self.progress.set_length(total as u64);
        let mut profiles = Vec::with_capacity(total);

        for (idx, contact) in contacts.iter().enumerate() {
            let position = idx + 1;
            let name = contact.label();
            self.progress.set_message(name.to_string());
            self.progress
                .suspend(|| info!("Scraping user {} [{}/{}]...", name, position, total));

            let url = self.fetcher.config().profile_url(&contact.id);
            let label = format!("user {}", contact.id);
            match self.fetcher.fetch(&url, &PROFILE_QUERY, &label).await {
                Ok(profile) => {
                    self.progress.suspend(|| {
                        info!(
                            "Successfully scraped user {} [{} remaining]",
                            name,
                            total - position
                        )
                    });
                    profiles.push(RawProfile(profile));
                }
                Err(e) => {
                    self.progress
                        .suspend(|| error!("Unable to scrape user {}: {}", name, e));
                }
            }
            self.progress.inc(1);
        }

        self.progress.finish_and_clear();
        self.cool_down().await;
        Ok(profiles)
    }

    async fn cool_down(&self) {
        let range = self.fetcher.config().cooldown_secs.clone();
        let secs = if range.is_empty() {
            range.start.max(0.0)
        } else {
            rand::rng().random_range(range)
        };
        let pause = Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO);
        debug!("Cooling down for {:.2}s", pause.as_secs_f64());
        sleep(pause).await;
    }
}
