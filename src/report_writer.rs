//! Report persistence

use crate::profile_aggregator::RenderedProfile;
use async_trait::async_trait;
use std::error::Error;
use std::path::PathBuf;
use tracing::info;

/// Receives the finished report of a run
#[async_trait]
pub trait ReportSink: Send + Sync {
    async fn write(
        &self,
        profiles: &[RenderedProfile],
    ) -> Result<(), Box<dyn Error + Send + Sync>>;
}

/// Join rendered blocks into the report text
pub fn report_text(profiles: &[RenderedProfile]) -> String {
    profiles
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Writes the report as one UTF-8 text file
#[derive(Debug, Clone)]
pub struct FileReportWriter {
    path: PathBuf,
}

impl FileReportWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[async_trait]
impl ReportSink for FileReportWriter {
    async fn write(
        &self,
        profiles: &[RenderedProfile],
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        info!("Writing parsed users info to {:?}", self.path);

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        tokio::fs::write(&self.path, report_text(profiles)).await?;
        Ok(())
    }
}
