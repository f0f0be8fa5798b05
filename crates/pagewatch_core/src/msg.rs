use crate::Fingerprint;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// The page was fingerprinted and the prior state loaded (`None` when no baseline exists).
    Compared {
        prior: Option<Fingerprint>,
        current: Fingerprint,
    },
    /// Fetching failed or produced no content; nothing will be compared.
    FetchFailed { reason: String },
    /// Prior state could not be read for a reason other than absence.
    StateUnavailable,
    /// The transport finished a notification attempt.
    NotifyCompleted { delivered: bool },
}
