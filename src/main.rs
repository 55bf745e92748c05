use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::{error, info};

use bicing_ingest::config::{AwsCredentials, Settings};
use bicing_ingest::fetch::Fetcher;
use bicing_ingest::notify::{self, Mailer};
use bicing_ingest::storage::{LocalStore, S3Store};
use bicing_ingest::{estimate, ingest, logging};

#[derive(Parser)]
#[command(
    name = "bicing-ingest",
    about = "Polls the Bicing station feed and archives snapshots to S3"
)]
struct Cli {
    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Measure how often the feed's update time changes
    EstimateRefresh,
    /// Fetch the feed, persist a new snapshot locally, and upload it
    Ingest,
    /// Mail the accumulated error log to the operator and delete it
    ReportErrors,
    /// Mail an "alive" notification to the operator
    Heartbeat,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match Settings::new() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = logging::init(&settings.log_file) {
        eprintln!("failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match cli.action {
        Action::Ingest => run_ingest(&settings).await,
        Action::EstimateRefresh => run_estimate(&settings).await,
        Action::ReportErrors => run_report(&settings).await,
        Action::Heartbeat => run_heartbeat(&settings).await,
    }
}

async fn run_ingest(settings: &Settings) -> ExitCode {
    let fetcher = match build_fetcher(settings) {
        Some(fetcher) => fetcher,
        None => return ExitCode::FAILURE,
    };
    let credentials = match AwsCredentials::load(&settings.credentials_file) {
        Ok(credentials) => credentials,
        Err(e) => {
            error!(%e, "cannot load AWS credentials");
            return ExitCode::FAILURE;
        }
    };

    let store = LocalStore::new(&settings.data_dir);
    let sink = S3Store::connect(
        settings.s3.region.clone(),
        settings.s3.bucket.clone(),
        &credentials,
    )
    .await;

    let ok = ingest::run_repeatedly(
        &fetcher,
        &store,
        &sink,
        settings.schedule.runs,
        Duration::from_millis(settings.schedule.pause_ms),
    )
    .await;

    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

async fn run_estimate(settings: &Settings) -> ExitCode {
    let fetcher = match build_fetcher(settings) {
        Some(fetcher) => fetcher,
        None => return ExitCode::FAILURE,
    };

    let estimated = estimate::refresh_rate(
        &fetcher,
        settings.schedule.estimate_trials,
        Duration::from_millis(settings.schedule.estimate_sleep_ms),
    )
    .await;

    match estimated {
        Ok(Some(delta)) => {
            println!("Estimated bicing data refresh rate: {delta} seconds");
            ExitCode::SUCCESS
        }
        Ok(None) => {
            println!(
                "No refresh observed in {} trials",
                settings.schedule.estimate_trials
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(%e, "refresh rate estimation failed");
            ExitCode::FAILURE
        }
    }
}

async fn run_report(settings: &Settings) -> ExitCode {
    match Mailer::from_config(&settings.email) {
        Ok(mailer) => {
            notify::report_errors(&mailer, &settings.log_file).await;
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("cannot build mailer: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run_heartbeat(settings: &Settings) -> ExitCode {
    match Mailer::from_config(&settings.email) {
        Ok(mailer) => {
            // Best effort: a failed send is reported on stderr, not the exit code
            if notify::heartbeat(&mailer).await {
                info!("heartbeat sent");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("cannot build mailer: {e}");
            ExitCode::FAILURE
        }
    }
}

fn build_fetcher(settings: &Settings) -> Option<Fetcher> {
    match Fetcher::new(
        settings.endpoint_url.clone(),
        Duration::from_secs(settings.http_timeout_secs),
    ) {
        Ok(fetcher) => Some(fetcher),
        Err(e) => {
            error!(%e, "cannot build HTTP client");
            None
        }
    }
}
