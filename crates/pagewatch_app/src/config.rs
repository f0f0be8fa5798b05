//! Command-line and environment configuration, validated once at start-up.

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser, ValueEnum};
use pagewatch_core::BaselinePolicy;
use pagewatch_engine::{
    BotToken, FetchSettings, RenderSettings, StateLayout, TelegramSettings, DEFAULT_STATE_FILE,
    DEFAULT_TELEGRAM_API,
};
use pagewatch_logging::LogDestination;

#[derive(Parser, Debug)]
#[command(
    name = "pagewatch",
    version,
    about = "Check a web page once and report changes to a Telegram chat"
)]
pub struct Cli {
    /// Page to monitor.
    #[arg(long, env = "WEBSITE_URL")]
    pub target_url: Option<String>,

    /// Bot API token used to send notifications.
    #[arg(long, env = "BOT_TOKEN", hide_env_values = true)]
    pub notifier_token: Option<BotToken>,

    /// Chat that receives notifications.
    #[arg(long, env = "CHAT_ID")]
    pub notifier_channel: Option<String>,

    /// File holding the last committed fingerprint.
    #[arg(long, env = "PAGEWATCH_STATE_FILE", default_value = DEFAULT_STATE_FILE)]
    pub state_file: PathBuf,

    /// Keep one state file per target in this directory instead of `--state-file`.
    #[arg(long, env = "PAGEWATCH_STATE_DIR")]
    pub state_dir: Option<PathBuf>,

    /// How the page is fetched.
    #[arg(long, env = "PAGEWATCH_FETCH_MODE", value_enum, default_value_t = FetchMode::Http)]
    pub fetch_mode: FetchMode,

    /// Whether the first run announces itself.
    #[arg(long, env = "PAGEWATCH_BASELINE", value_enum, default_value_t = BaselineArg::Silent)]
    pub baseline: BaselineArg,

    /// Network timeout for fetching and notifying.
    #[arg(long, env = "PAGEWATCH_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Time scripts may run before a rendered page is captured.
    #[arg(long, env = "PAGEWATCH_SETTLE_SECS", default_value_t = 5)]
    pub settle_secs: u64,

    /// Headless browser executable for `--fetch-mode rendered`.
    #[arg(long, env = "PAGEWATCH_BROWSER", default_value = "chromium")]
    pub browser: PathBuf,

    /// Bot API base URL.
    #[arg(long, env = "PAGEWATCH_NOTIFIER_API", default_value = DEFAULT_TELEGRAM_API)]
    pub notifier_api: String,

    /// Also append log output to this file.
    #[arg(long, env = "PAGEWATCH_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FetchMode {
    /// Plain HTTP GET.
    Http,
    /// Headless browser; waits for scripts to settle.
    Rendered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BaselineArg {
    Silent,
    Announced,
}

impl From<BaselineArg> for BaselinePolicy {
    fn from(value: BaselineArg) -> Self {
        match value {
            BaselineArg::Silent => BaselinePolicy::Silent,
            BaselineArg::Announced => BaselinePolicy::Announced,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required configuration: {}", .0.join(", "))]
    Missing(Vec<&'static str>),
    #[error("target url {url:?} is not a valid http(s) url: {reason}")]
    InvalidUrl { url: String, reason: String },
}

#[derive(Debug, Clone)]
pub enum FetcherConfig {
    Http(FetchSettings),
    Rendered(RenderSettings),
}

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub target_url: String,
    pub state: StateLayout,
    pub fetcher: FetcherConfig,
    pub policy: BaselinePolicy,
    pub telegram: TelegramSettings,
}

impl Cli {
    pub fn log_destination(&self) -> LogDestination {
        match &self.log_file {
            Some(path) => LogDestination::Both(path.clone()),
            None => LogDestination::Terminal,
        }
    }

    /// Check required keys and build the run configuration.
    ///
    /// Every missing key is reported at once.
    pub fn validate(self) -> Result<MonitorConfig, ConfigError> {
        let target_url = present(self.target_url);
        let token = self.notifier_token.filter(|token| !token.is_empty());
        let channel = present(self.notifier_channel);

        let (Some(target_url), Some(token), Some(channel)) =
            (target_url.clone(), token.clone(), channel.clone())
        else {
            let mut missing = Vec::new();
            if target_url.is_none() {
                missing.push("target_url (WEBSITE_URL)");
            }
            if token.is_none() {
                missing.push("notifier_token (BOT_TOKEN)");
            }
            if channel.is_none() {
                missing.push("notifier_channel (CHAT_ID)");
            }
            return Err(ConfigError::Missing(missing));
        };

        validate_target(&target_url)?;

        let timeout = Duration::from_secs(self.timeout_secs);
        let fetcher = match self.fetch_mode {
            FetchMode::Http => FetcherConfig::Http(FetchSettings {
                request_timeout: timeout,
                ..FetchSettings::default()
            }),
            FetchMode::Rendered => FetcherConfig::Rendered(RenderSettings {
                browser: self.browser,
                settle: Duration::from_secs(self.settle_secs),
                timeout,
                ..RenderSettings::default()
            }),
        };

        let state = match self.state_dir {
            Some(dir) => StateLayout::PerTarget(dir),
            None => StateLayout::SingleFile(self.state_file),
        };

        let mut telegram = TelegramSettings::new(token, channel);
        telegram.api_base = self.notifier_api;
        telegram.timeout = timeout;

        Ok(MonitorConfig {
            target_url,
            state,
            fetcher,
            policy: self.baseline.into(),
            telegram,
        })
    }
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validate_target(raw: &str) -> Result<(), ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };
    let url = url::Url::parse(raw).map_err(|err| invalid(err.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(invalid(format!("unsupported scheme {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn base_cli() -> Cli {
        Cli {
            target_url: Some("https://tickets.example.com/shows".to_string()),
            notifier_token: Some(BotToken::new("123:abc")),
            notifier_channel: Some("-100200".to_string()),
            state_file: PathBuf::from(DEFAULT_STATE_FILE),
            state_dir: None,
            fetch_mode: FetchMode::Http,
            baseline: BaselineArg::Silent,
            timeout_secs: 30,
            settle_secs: 5,
            browser: PathBuf::from("chromium"),
            notifier_api: DEFAULT_TELEGRAM_API.to_string(),
            log_file: None,
            verbose: 0,
        }
    }

    #[test]
    fn complete_config_validates_with_defaults() {
        let config = base_cli().validate().expect("valid");
        assert_eq!(config.target_url, "https://tickets.example.com/shows");
        assert_eq!(config.policy, BaselinePolicy::Silent);
        assert_eq!(
            config.state,
            StateLayout::SingleFile(PathBuf::from("state/last_hash.txt"))
        );
        assert_eq!(config.telegram.chat_id, "-100200");
        assert!(matches!(config.fetcher, FetcherConfig::Http(_)));
    }

    #[test]
    fn all_missing_keys_are_reported() {
        let cli = Cli {
            target_url: None,
            notifier_token: Some("   ".parse().unwrap()),
            notifier_channel: None,
            ..base_cli()
        };
        assert_eq!(
            cli.validate().unwrap_err(),
            ConfigError::Missing(vec![
                "target_url (WEBSITE_URL)",
                "notifier_token (BOT_TOKEN)",
                "notifier_channel (CHAT_ID)",
            ])
        );
    }

    #[test]
    fn non_http_target_is_rejected() {
        let cli = Cli {
            target_url: Some("ftp://example.com/file".to_string()),
            ..base_cli()
        };
        assert!(matches!(
            cli.validate(),
            Err(ConfigError::InvalidUrl { .. })
        ));

        let cli = Cli {
            target_url: Some("example.com".to_string()),
            ..base_cli()
        };
        assert!(matches!(
            cli.validate(),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn rendered_mode_and_state_dir_are_honoured() {
        let cli = Cli {
            fetch_mode: FetchMode::Rendered,
            settle_secs: 8,
            baseline: BaselineArg::Announced,
            state_dir: Some(PathBuf::from("/var/lib/pagewatch")),
            ..base_cli()
        };
        let config = cli.validate().expect("valid");
        assert_eq!(config.policy, BaselinePolicy::Announced);
        assert_eq!(
            config.state,
            StateLayout::PerTarget(PathBuf::from("/var/lib/pagewatch"))
        );
        match config.fetcher {
            FetcherConfig::Rendered(settings) => {
                assert_eq!(settings.settle, Duration::from_secs(8));
                assert_eq!(settings.browser, PathBuf::from("chromium"));
            }
            other => panic!("expected rendered fetcher, got {other:?}"),
        }
    }

    #[test]
    fn flags_parse_into_cli() {
        let cli = Cli::try_parse_from([
            "pagewatch",
            "--target-url",
            "https://example.com",
            "--notifier-token",
            "t",
            "--notifier-channel",
            "c",
            "--fetch-mode",
            "rendered",
            "--baseline",
            "announced",
            "-vv",
        ])
        .expect("parse");
        assert_eq!(cli.fetch_mode, FetchMode::Rendered);
        assert_eq!(cli.baseline, BaselineArg::Announced);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn token_is_not_printed_with_the_cli() {
        let cli = Cli::try_parse_from([
            "pagewatch",
            "--notifier-token",
            "123:very-secret",
        ])
        .expect("parse");
        assert!(!format!("{cli:?}").contains("very-secret"));
    }

    #[test]
    fn log_file_adds_file_destination() {
        let cli = Cli {
            log_file: Some(PathBuf::from("pagewatch.log")),
            ..base_cli()
        };
        assert_eq!(
            cli.log_destination(),
            LogDestination::Both(PathBuf::from("pagewatch.log"))
        );
        assert_eq!(base_cli().log_destination(), LogDestination::Terminal);
    }
}
