//! Pagewatch engine: fetching, fingerprinting, persistence, notification and effect execution.
mod decode;
mod extract;
mod fetch;
mod fingerprint;
mod notify;
mod persist;
mod render;
mod runner;
mod store;
mod types;

pub use decode::{decode_body, DecodedText};
pub use extract::{normalize, NormalizedContent, Region};
pub use fetch::{FetchSettings, Fetcher, HttpFetcher, BROWSER_USER_AGENT};
pub use fingerprint::{digest_text, ContentDigest, ContentFingerprinter};
pub use notify::{
    render_notice, BotToken, Notifier, NotifyError, TelegramNotifier, TelegramSettings,
    DEFAULT_TELEGRAM_API,
};
pub use persist::{ensure_state_dir, replace_file, PersistError};
pub use render::{RenderSettings, RenderingFetcher};
pub use runner::{CheckReport, CheckRunner};
pub use store::{
    state_filename, FileStateStore, MemoryStateStore, StateLayout, StateLock, StateStore,
    StoreError, DEFAULT_STATE_FILE,
};
pub use types::{FailureKind, FetchError, FetchMetadata, PageSnapshot};
