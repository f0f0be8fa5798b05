#![cfg(unix)]

use std::path::PathBuf;
use std::time::Duration;

use pagewatch_engine::{FailureKind, Fetcher, RenderSettings, RenderingFetcher};

/// Stand-in browser: `sh -c <script> fake-browser <flags...> <url>`.
fn shell_browser(script: &str) -> RenderSettings {
    RenderSettings {
        browser: PathBuf::from("/bin/sh"),
        settle: Duration::from_millis(10),
        timeout: Duration::from_secs(5),
        extra_args: vec![
            "-c".to_string(),
            script.to_string(),
            "fake-browser".to_string(),
        ],
        ..RenderSettings::default()
    }
}

#[tokio::test]
async fn renders_dom_from_browser_stdout() {
    let script = r#"for last; do :; done; printf '<html><body><p>%s</p></body></html>' "$last""#;
    let fetcher = RenderingFetcher::new(shell_browser(script));

    let snapshot = fetcher
        .fetch("https://example.com/app")
        .await
        .expect("render ok");
    assert_eq!(
        snapshot.text,
        "<html><body><p>https://example.com/app</p></body></html>"
    );
    assert_eq!(snapshot.metadata.content_type.as_deref(), Some("text/html"));
}

#[tokio::test]
async fn passes_settle_budget_and_dump_flag() {
    let script = r#"printf '%s\n' "$@""#;
    let fetcher = RenderingFetcher::new(shell_browser(script));

    let snapshot = fetcher.fetch("https://example.com/").await.expect("render ok");
    let args: Vec<&str> = snapshot.text.lines().collect();
    assert!(args.contains(&"--dump-dom"));
    assert!(args.contains(&"--virtual-time-budget=10"));
    assert!(args.iter().any(|a| a.starts_with("--user-agent=Mozilla/5.0")));
    assert_eq!(args.last(), Some(&"https://example.com/"));
}

#[tokio::test]
async fn nonzero_exit_is_render_failure() {
    let fetcher = RenderingFetcher::new(shell_browser("echo boom >&2; exit 3"));
    let err = fetcher.fetch("https://example.com/").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Render);
}

#[tokio::test]
async fn missing_browser_is_render_failure() {
    let settings = RenderSettings {
        browser: PathBuf::from("/nonexistent/pagewatch-browser"),
        ..RenderSettings::default()
    };
    let err = RenderingFetcher::new(settings)
        .fetch("https://example.com/")
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Render);
}

#[tokio::test]
async fn slow_browser_times_out() {
    let mut settings = shell_browser("sleep 5");
    settings.timeout = Duration::from_millis(100);
    let err = RenderingFetcher::new(settings)
        .fetch("https://example.com/")
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn invalid_utf8_output_is_decoded_lossily() {
    let fetcher = RenderingFetcher::new(shell_browser(r"printf '<p>caf\351</p>'"));

    let snapshot = fetcher.fetch("https://example.com/").await.expect("render ok");
    assert_eq!(snapshot.text, "<p>caf\u{fffd}</p>");
}
