pub mod config;
pub mod contact_enumerator;
pub mod credentials;
pub mod error;
pub mod pipeline;
pub mod profile_aggregator;
pub mod profile_collector;
pub mod rate_limited_fetcher;
pub mod report_formatter;
pub mod report_writer;

#[cfg(test)]
mod tests;

pub use config::ScraperConfig;
pub use contact_enumerator::{Contact, ContactEnumerator};
pub use credentials::{CredentialError, Credentials};
pub use error::{FetchError, PipelineError, Stage};
pub use pipeline::{Pipeline, PipelineOutcome, RunSummary};
pub use profile_aggregator::{AssetKind, ProfileAggregator, RenderedProfile};
pub use profile_collector::{ProfileCollector, RawProfile};
pub use rate_limited_fetcher::{RateLimitedFetcher, RetryState};
pub use report_formatter::{Placeholders, ProfileRecord, ReportFormatter};
pub use report_writer::{FileReportWriter, ReportSink};
