use crate::Fingerprint;

/// Side effect requested by [`crate::update`]; executed by the engine in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Deliver a message to the operator, then report back with `Msg::NotifyCompleted`.
    Notify(Notice),
    /// Persist the fingerprint as the new baseline for the target.
    Commit(Fingerprint),
}

/// What the operator is being told. Wording is up to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The page differs from the committed baseline.
    Changed { url: String },
    /// First run under the announced-baseline policy.
    MonitorStarted { url: String },
    /// The page could not be fetched, or came back empty.
    FetchFailed { url: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Change,
    Started,
    Error,
}

impl Notice {
    pub fn kind(&self) -> NoticeKind {
        match self {
            Notice::Changed { .. } => NoticeKind::Change,
            Notice::MonitorStarted { .. } => NoticeKind::Started,
            Notice::FetchFailed { .. } => NoticeKind::Error,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Notice::Changed { url }
            | Notice::MonitorStarted { url }
            | Notice::FetchFailed { url, .. } => url,
        }
    }
}
