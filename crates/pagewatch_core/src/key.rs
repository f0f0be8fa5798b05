use std::fmt;

use url::Url;

/// Identity of a monitored target; one persisted fingerprint exists per key.
///
/// Built from the target URL so that trivially different spellings
/// (`HTTPS://Example.com/` vs `https://example.com`) share one state slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonitorKey(String);

impl MonitorKey {
    pub fn from_url(raw: &str) -> Self {
        Self(normalize_url_for_key(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MonitorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn normalize_url_for_key(raw: &str) -> String {
    let trimmed = raw.trim();
    let Ok(mut url) = Url::parse(trimmed) else {
        return trimmed.to_ascii_lowercase();
    };
    // Fragments never reach the server.
    url.set_fragment(None);

    let path = url.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        url.set_path(path.trim_end_matches('/'));
    }

    let mut normalized = url.to_string();
    if url.path() == "/" && url.query().is_none() {
        normalized.pop();
    }
    normalized
}
