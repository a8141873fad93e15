//! Pipeline - enumerate contacts, collect their profiles, render the report
//!
//! Stages run strictly in order on a single task. A stage that produces
//! nothing stops the run before anything reaches the report sink.

use crate::config::ScraperConfig;
use crate::contact_enumerator::ContactEnumerator;
use crate::credentials::Credentials;
use crate::error::{PipelineError, Stage};
use crate::profile_aggregator::{ProfileAggregator, RenderedProfile};
use crate::profile_collector::ProfileCollector;
use crate::rate_limited_fetcher::RateLimitedFetcher;
use crate::report_formatter::ReportFormatter;
use crate::report_writer::ReportSink;
use indicatif::ProgressBar;
use std::error::Error;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Counts from a completed run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub contacts: usize,
    pub fetched: usize,
    pub rendered: usize,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    /// The report was handed to the sink
    Completed(RunSummary),
    /// A stage came up empty and no report was produced
    ShortCircuited(Stage),
    /// Cancelled at a suspension point; nothing was written
    Cancelled,
}

/// Rendered profiles with the counts that produced them
struct Report {
    contacts: usize,
    fetched: usize,
    rendered: Vec<RenderedProfile>,
}

pub struct Pipeline {
    fetcher: RateLimitedFetcher,
    progress: ProgressBar,
}

impl Pipeline {
    pub fn new(
        config: ScraperConfig,
        credentials: &Credentials,
    ) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(Self {
            fetcher: RateLimitedFetcher::new(config, credentials)?,
            progress: ProgressBar::hidden(),
        })
    }

    /// Show collection progress on `progress` instead of a hidden bar
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Run to completion unless `cancellation_token` fires before the
    /// report is ready. Once the sink is called the write is not raced.
    pub async fn run_until_cancelled(
        &self,
        sink: &dyn ReportSink,
        cancellation_token: &CancellationToken,
    ) -> Result<PipelineOutcome, Box<dyn Error + Send + Sync>> {
        let start = Instant::now();
        let report = tokio::select! {
            biased;
            _ = cancellation_token.cancelled() => {
                self.progress.abandon();
                warn!("Scrape cancelled, nothing written");
                return Ok(PipelineOutcome::Cancelled);
            }
            report = self.produce() => report,
        };
        Self::deliver(report, sink, start).await
    }

    pub async fn run(
        &self,
        sink: &dyn ReportSink,
    ) -> Result<PipelineOutcome, Box<dyn Error + Send + Sync>> {
        let start = Instant::now();
        let report = self.produce().await;
        Self::deliver(report, sink, start).await
    }

    /// Run the three stages, stopping at the first that comes up empty
    async fn produce(&self) -> Result<Report, Stage> {
        let contacts = match ContactEnumerator::new(&self.fetcher).enumerate().await {
            Ok(contacts) if !contacts.is_empty() => contacts,
            Ok(_) | Err(_) => {
                error!("No contacts found, stopping");
                return Err(Stage::Enumerate);
            }
        };

        let collector = ProfileCollector::new(&self.fetcher, self.progress.clone());
        let profiles = match collector.collect(&contacts).await {
            Ok(profiles) => profiles,
            Err(PipelineError::EmptyInput(stage)) => return Err(stage),
        };

        let aggregator = ProfileAggregator::new(self.fetcher.config(), ReportFormatter::default());
        let rendered = match aggregator.render(&profiles) {
            Ok(rendered) => rendered,
            Err(PipelineError::EmptyInput(stage)) => {
                error!("No profiles were fetched, stopping");
                return Err(stage);
            }
        };

        Ok(Report {
            contacts: contacts.len(),
            fetched: profiles.len(),
            rendered,
        })
    }

    async fn deliver(
        report: Result<Report, Stage>,
        sink: &dyn ReportSink,
        start: Instant,
    ) -> Result<PipelineOutcome, Box<dyn Error + Send + Sync>> {
        let report = match report {
            Ok(report) => report,
            Err(stage) => return Ok(PipelineOutcome::ShortCircuited(stage)),
        };

        sink.write(&report.rendered).await?;

        let summary = RunSummary {
            contacts: report.contacts,
            fetched: report.fetched,
            rendered: report.rendered.len(),
            elapsed: start.elapsed(),
        };
        info!(
            "Successfully scraped {} of {} users in {:.2}s",
            summary.rendered,
            summary.contacts,
            summary.elapsed.as_secs_f64()
        );
        Ok(PipelineOutcome::Completed(summary))
    }
}
