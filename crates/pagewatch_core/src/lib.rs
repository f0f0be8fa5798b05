//! Pagewatch core: pure change-detection state machine.
mod effect;
mod fingerprint;
mod key;
mod msg;
mod state;
mod update;

pub use effect::{Effect, Notice, NoticeKind};
pub use fingerprint::{Fingerprint, FingerprintParseError, FINGERPRINT_LEN};
pub use key::MonitorKey;
pub use msg::Msg;
pub use state::{BaselinePolicy, CheckState, Phase, RunOutcome, Verdict};
pub use update::{classify, update};
