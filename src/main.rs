use anyhow::{anyhow, Context, Result};
use clap::Parser;
use dm_profile_scraper::{Credentials, FileReportWriter, Pipeline, PipelineOutcome, ScraperConfig};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "dm-profile-scraper",
    version = "0.1.0",
    about = "Collect the profiles of everyone you share a DM channel with"
)]
struct Args {
    /// Account token; prompted for on stdin when not given
    #[arg(short, long, env = "DISCORD_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Where to write the report
    #[arg(short, long, default_value = "./ScrapedUsers.txt")]
    output: PathBuf,

    /// Disable the progress bar
    #[arg(long)]
    no_progress: bool,
}

fn setup_tracing() {
    if std::env::var("TOKIO_CONSOLE").is_ok() {
        console_subscriber::init();
        info!("tokio-console enabled on port 6669");
        return;
    }

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,dm_profile_scraper=debug"));

    fmt()
        .with_env_filter(env_filter)
        .with_timer(fmt::time::SystemTime)
        .with_target(false)
        .with_level(true)
        .init();
}

fn progress_bar(hidden: bool) -> Result<ProgressBar> {
    if hidden {
        return Ok(ProgressBar::hidden());
    }

    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} users ({eta}) {msg}")?
            .progress_chars("#>-"),
    );
    Ok(bar)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    setup_tracing();
    let args = Args::parse();

    let credentials = match args.token.as_deref() {
        Some(token) => Credentials::parse(token).context("Invalid token")?,
        None => {
            let stdin = std::io::stdin();
            Credentials::prompt(stdin.lock(), std::io::stdout())
                .context("Failed to read token")?
        }
    };

    let config = ScraperConfig::from_env();
    info!("Using API at {}", config.api_base);

    let pipeline = Pipeline::new(config, &credentials)
        .map_err(|e| anyhow!("Failed to build HTTP session: {e}"))?
        .with_progress(progress_bar(args.no_progress)?);
    let writer = FileReportWriter::new(args.output);

    let cancellation_token = CancellationToken::new();
    let ctrl_c_token = cancellation_token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Exiting scraper...");
            ctrl_c_token.cancel();
        }
    });

    let outcome = pipeline
        .run_until_cancelled(&writer, &cancellation_token)
        .await
        .map_err(|e| anyhow!("Failed to write report to {:?}: {e}", writer.path()))?;

    match outcome {
        PipelineOutcome::Completed(summary) => info!(
            "Report with {} profiles written to {:?}",
            summary.rendered,
            writer.path()
        ),
        PipelineOutcome::ShortCircuited(stage) => {
            error!("Nothing to report, run stopped at the {} stage", stage)
        }
        PipelineOutcome::Cancelled => warn!("Run cancelled"),
    }

    Ok(())
}
