use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use pagewatch_logging::{watch_debug, watch_warn};
use tokio::process::Command;

use crate::fetch::BROWSER_USER_AGENT;
use crate::{FailureKind, FetchError, FetchMetadata, Fetcher, PageSnapshot};

#[derive(Debug, Clone)]
pub struct RenderSettings {
    /// Chromium-family executable.
    pub browser: PathBuf,
    /// How long scripts may run after navigation before the DOM is captured.
    pub settle: Duration,
    /// Deadline for launch and navigation, on top of `settle`.
    pub timeout: Duration,
    pub user_agent: String,
    /// Passed before the generated flags.
    pub extra_args: Vec<String>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            browser: PathBuf::from("chromium"),
            settle: Duration::from_secs(5),
            timeout: Duration::from_secs(30),
            user_agent: BROWSER_USER_AGENT.to_string(),
            extra_args: Vec::new(),
        }
    }
}

/// Fetches the DOM after JavaScript has run, using a headless browser process.
///
/// The browser is a child process owned by the fetch future; it is killed when
/// the future completes or is dropped, so timeouts never leak a browser.
#[derive(Debug, Clone)]
pub struct RenderingFetcher {
    settings: RenderSettings,
}

impl RenderingFetcher {
    pub fn new(settings: RenderSettings) -> Self {
        Self { settings }
    }

    fn command(&self, url: &str) -> Command {
        let mut command = Command::new(&self.settings.browser);
        command
            .args(&self.settings.extra_args)
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-first-run")
            .arg(format!("--user-agent={}", self.settings.user_agent))
            .arg(format!(
                "--virtual-time-budget={}",
                self.settings.settle.as_millis()
            ))
            .arg("--dump-dom")
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }
}

#[async_trait::async_trait]
impl Fetcher for RenderingFetcher {
    async fn fetch(&self, url: &str) -> Result<PageSnapshot, FetchError> {
        let parsed = url::Url::parse(url)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;

        let child = self.command(parsed.as_str()).spawn().map_err(|err| {
            FetchError::new(
                FailureKind::Render,
                format!("could not launch {:?}: {err}", self.settings.browser),
            )
        })?;
        watch_debug!("Launched {:?} for {}", self.settings.browser, parsed);

        let deadline = self.settings.timeout + self.settings.settle;
        let output = match tokio::time::timeout(deadline, child.wait_with_output()).await {
            Ok(result) => result.map_err(|err| FetchError::new(FailureKind::Render, err.to_string()))?,
            Err(_) => {
                return Err(FetchError::new(
                    FailureKind::Timeout,
                    format!("browser did not finish within {deadline:?}"),
                ))
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            watch_warn!("Browser exited with {}: {}", output.status, stderr.trim());
            return Err(FetchError::new(
                FailureKind::Render,
                format!("browser exited with {}", output.status),
            ));
        }

        // --dump-dom always serializes as UTF-8.
        let text = match String::from_utf8(output.stdout) {
            Ok(text) => text,
            Err(err) => {
                watch_warn!("Browser output is not valid UTF-8: {}", err.utf8_error());
                String::from_utf8_lossy(err.as_bytes()).into_owned()
            }
        };

        let metadata = FetchMetadata {
            original_url: url.to_string(),
            final_url: parsed.to_string(),
            redirect_count: 0,
            content_type: Some("text/html".to_string()),
            encoding_label: "UTF-8".to_string(),
            byte_len: text.len() as u64,
        };
        Ok(PageSnapshot { text, metadata })
    }
}
