use crate::Fingerprint;

/// What to do when a target is seen for the first time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BaselinePolicy {
    /// Record the baseline without telling anyone.
    #[default]
    Silent,
    /// Record the baseline and send a one-off "monitoring started" notice.
    Announced,
}

/// Comparison of the current fingerprint against persisted state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    NoBaseline,
    Unchanged,
    Changed,
}

/// How a run ended, as far as the state machine is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Baselined,
    Unchanged,
    /// Change delivered; its fingerprint has been handed over for commit.
    ChangeNotified,
    /// Change detected but delivery failed; the old baseline stays.
    ChangeUndelivered,
    FetchFailed,
    StateUnavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Ready,
    /// A change notice is in flight; `pending` is committed only on delivery.
    AwaitingDelivery { pending: Fingerprint },
    Finished(RunOutcome),
}

/// State of a single check run. Passed into and returned from [`crate::update`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CheckState {
    url: String,
    policy: BaselinePolicy,
    phase: Phase,
    verdict: Option<Verdict>,
}

impl CheckState {
    pub fn new(url: impl Into<String>, policy: BaselinePolicy) -> Self {
        Self {
            url: url.into(),
            policy,
            phase: Phase::Ready,
            verdict: None,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn policy(&self) -> BaselinePolicy {
        self.policy
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn verdict(&self) -> Option<Verdict> {
        self.verdict
    }

    pub fn outcome(&self) -> Option<RunOutcome> {
        match self.phase {
            Phase::Finished(outcome) => Some(outcome),
            _ => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::Finished(_))
    }

    pub(crate) fn is_ready(&self) -> bool {
        self.phase == Phase::Ready
    }

    pub(crate) fn record_verdict(&mut self, verdict: Verdict) {
        self.verdict = Some(verdict);
    }

    pub(crate) fn await_delivery(&mut self, pending: Fingerprint) {
        self.phase = Phase::AwaitingDelivery { pending };
    }

    pub(crate) fn finish(&mut self, outcome: RunOutcome) {
        self.phase = Phase::Finished(outcome);
    }
}
