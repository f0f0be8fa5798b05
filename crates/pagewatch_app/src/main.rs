mod config;

use std::process::ExitCode;

use anyhow::Context;
use chrono::Local;
use clap::Parser;
use pagewatch_core::{MonitorKey, RunOutcome};
use pagewatch_engine::{
    CheckReport, CheckRunner, FileStateStore, Fetcher, HttpFetcher, RenderingFetcher,
    TelegramNotifier,
};
use pagewatch_logging::{level_for_verbosity, watch_error, watch_info};

use config::{Cli, FetcherConfig, MonitorConfig};

const EXIT_ABORTED: u8 = 1;
const EXIT_CONFIG: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();
    pagewatch_logging::initialize(cli.log_destination(), level_for_verbosity(cli.verbose));

    status("Checking website");

    let config = match cli.validate() {
        Ok(config) => config,
        Err(err) => {
            watch_error!("ERROR: {}", err);
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    match run(config) {
        Ok(code) => code,
        Err(err) => {
            watch_error!("{:#}", err);
            ExitCode::from(EXIT_ABORTED)
        }
    }
}

fn run(config: MonitorConfig) -> anyhow::Result<ExitCode> {
    let MonitorConfig {
        target_url,
        state,
        fetcher,
        policy,
        telegram,
    } = config;

    let store = FileStateStore::new(state);
    let key = MonitorKey::from_url(&target_url);
    // Held until the run ends so overlapping invocations cannot interleave.
    let _lock = match store.try_lock(&key) {
        Ok(lock) => lock,
        Err(err) => {
            watch_error!("Not checking {}: {}", target_url, err);
            return Ok(ExitCode::from(EXIT_ABORTED));
        }
    };

    let fetcher: Box<dyn Fetcher> = match fetcher {
        FetcherConfig::Http(settings) => Box::new(HttpFetcher::new(settings)),
        FetcherConfig::Rendered(settings) => Box::new(RenderingFetcher::new(settings)),
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("starting async runtime")?;

    let report = runtime.block_on(async {
        let notifier = TelegramNotifier::new(telegram).context("building notifier")?;
        watch_info!("Monitoring {} (state slot {})", target_url, key);
        let report = CheckRunner::new(fetcher.as_ref(), &notifier, &store)
            .with_policy(policy)
            .run(&target_url)
            .await;
        anyhow::Ok(report)
    })?;

    status(&summary(&report));
    Ok(match report.outcome {
        RunOutcome::StateUnavailable => ExitCode::from(EXIT_ABORTED),
        _ => ExitCode::SUCCESS,
    })
}

fn summary(report: &CheckReport) -> String {
    let headline = match report.outcome {
        RunOutcome::Baselined => "First run - baseline saved",
        RunOutcome::Unchanged => "No changes detected",
        RunOutcome::ChangeNotified => "Website has changed - operator notified",
        RunOutcome::ChangeUndelivered => "Website has changed - notification failed, will retry",
        RunOutcome::FetchFailed => "Failed to fetch website content, stopping check",
        RunOutcome::StateUnavailable => "Stored state unreadable, stopping check",
    };
    format!(
        "{headline} (notifications sent: {}, failed: {}, state saved: {})",
        report.notifications_sent,
        report.notifications_failed,
        if report.committed { "yes" } else { "no" }
    )
}

fn status(line: &str) {
    println!("[{}] {}", Local::now().format("%Y-%m-%d %H:%M:%S"), line);
}
