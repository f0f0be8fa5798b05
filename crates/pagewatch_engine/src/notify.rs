use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use pagewatch_core::Notice;
use pagewatch_logging::{watch_info, watch_warn};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TELEGRAM_API: &str = "https://api.telegram.org";

/// Outbound message channel. Failures are reported as `false`, never raised.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: &str) -> bool;
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("could not build http client: {0}")]
    Client(String),
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("message rejected: {0}")]
    Rejected(String),
}

/// Bot credential. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct BotToken(String);

impl BotToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn expose(&self) -> &str {
        &self.0
    }
}

impl FromStr for BotToken {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s.trim()))
    }
}

impl fmt::Debug for BotToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BotToken(***)")
    }
}

#[derive(Debug, Clone)]
pub struct TelegramSettings {
    pub api_base: String,
    pub token: BotToken,
    pub chat_id: String,
    pub timeout: Duration,
}

impl TelegramSettings {
    pub fn new(token: BotToken, chat_id: impl Into<String>) -> Self {
        Self {
            api_base: DEFAULT_TELEGRAM_API.to_string(),
            token,
            chat_id: chat_id.into(),
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApiReply {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Sends HTML-formatted messages through the Telegram Bot API.
#[derive(Debug)]
pub struct TelegramNotifier {
    client: reqwest::Client,
    settings: TelegramSettings,
}

impl TelegramNotifier {
    pub fn new(settings: TelegramSettings) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|err| NotifyError::Client(err.to_string()))?;
        Ok(Self { client, settings })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.settings.api_base.trim_end_matches('/'),
            self.settings.token.expose()
        )
    }

    pub async fn send(&self, message: &str) -> Result<(), NotifyError> {
        let payload = SendMessage {
            chat_id: &self.settings.chat_id,
            text: message,
            parse_mode: "HTML",
        };
        // reqwest errors carry the URL, which embeds the token.
        let response = self
            .client
            .post(self.endpoint())
            .json(&payload)
            .send()
            .await
            .map_err(|err| NotifyError::Network(err.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::HttpStatus(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| NotifyError::Network(err.without_url()))?;
        match serde_json::from_slice::<ApiReply>(&body) {
            Ok(reply) if !reply.ok => Err(NotifyError::Rejected(
                reply
                    .description
                    .unwrap_or_else(|| "no description".to_string()),
            )),
            _ => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, message: &str) -> bool {
        match self.send(message).await {
            Ok(()) => {
                watch_info!("Notification sent to chat {}", self.settings.chat_id);
                true
            }
            Err(err) => {
                watch_warn!("Notification to chat {} failed: {}", self.settings.chat_id, err);
                false
            }
        }
    }
}

/// Render a notice in Telegram's HTML dialect.
pub fn render_notice(notice: &Notice) -> String {
    match notice {
        Notice::Changed { url } => format!(
            "🚨 <b>WEBSITE CHANGED!</b>\n\nThe monitored page has been updated:\n{}\n\nCheck it now!",
            escape(url)
        ),
        Notice::MonitorStarted { url } => format!(
            "🎭 <b>Website Monitor Started</b>\n\nNow monitoring: {}\nYou'll be notified when the site changes!",
            escape(url)
        ),
        Notice::FetchFailed { url, reason } => format!(
            "🚨 <b>MONITOR ERROR</b>\n\nCould not fetch {}.\nError: {}",
            escape(url),
            escape(reason)
        ),
    }
}

fn escape(text: &str) -> String {
    html_escape::encode_text(text).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_redacted_in_debug() {
        let settings = TelegramSettings::new(BotToken::new("123:secret"), "42");
        let printed = format!("{settings:?}");
        assert!(!printed.contains("secret"));
        assert!(printed.contains("***"));
    }

    #[test]
    fn error_notice_escapes_reason() {
        let text = render_notice(&Notice::FetchFailed {
            url: "https://example.com/?a=1&b=2".to_string(),
            reason: "bad <html>".to_string(),
        });
        assert!(text.contains("MONITOR ERROR"));
        assert!(text.contains("https://example.com/?a=1&amp;b=2"));
        assert!(text.contains("bad &lt;html&gt;"));
    }

    #[test]
    fn change_and_error_wording_differ() {
        let url = "https://example.com".to_string();
        let change = render_notice(&Notice::Changed { url: url.clone() });
        let error = render_notice(&Notice::FetchFailed {
            url,
            reason: "x".to_string(),
        });
        assert!(change.contains("WEBSITE CHANGED"));
        assert!(!error.contains("WEBSITE CHANGED"));
    }
}
