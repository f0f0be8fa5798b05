use std::collections::VecDeque;

use pagewatch_core::{
    update, BaselinePolicy, CheckState, Effect, MonitorKey, Msg, NoticeKind, RunOutcome, Verdict,
};
use pagewatch_logging::{watch_error, watch_info, watch_warn};

use crate::fingerprint::{ContentDigest, ContentFingerprinter};
use crate::notify::render_notice;
use crate::{Fetcher, Notifier, StateStore};

/// Summary of one run, for the status line and for tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub outcome: RunOutcome,
    pub verdict: Option<Verdict>,
    pub notifications_sent: usize,
    pub notifications_failed: usize,
    /// A fingerprint was written to the store during this run.
    pub committed: bool,
}

/// Runs one fetch → fingerprint → compare → notify → commit cycle.
pub struct CheckRunner<'a> {
    fetcher: &'a dyn Fetcher,
    notifier: &'a dyn Notifier,
    store: &'a dyn StateStore,
    fingerprinter: ContentFingerprinter,
    policy: BaselinePolicy,
}

impl<'a> CheckRunner<'a> {
    pub fn new(
        fetcher: &'a dyn Fetcher,
        notifier: &'a dyn Notifier,
        store: &'a dyn StateStore,
    ) -> Self {
        Self {
            fetcher,
            notifier,
            store,
            fingerprinter: ContentFingerprinter,
            policy: BaselinePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: BaselinePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub async fn run(&self, url: &str) -> CheckReport {
        let key = MonitorKey::from_url(url);
        let mut tally = Tally::default();
        let state = CheckState::new(url, self.policy);

        let snapshot = match self.fetcher.fetch(url).await {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                watch_warn!("Error fetching {}: {}", url, err);
                let state = self
                    .drive(state, Msg::FetchFailed { reason: err.to_string() }, &key, &mut tally)
                    .await;
                return tally.into_report(&state);
            }
        };

        let current = match self.fingerprinter.fingerprint(snapshot.as_ref()) {
            ContentDigest::Fingerprint { fingerprint, region } => {
                watch_info!("Fingerprint {} computed over {:?}", fingerprint, region);
                fingerprint
            }
            ContentDigest::Empty => {
                watch_warn!("Fetched page {} was empty", url);
                let msg = Msg::FetchFailed {
                    reason: "page content was empty".to_string(),
                };
                let state = self.drive(state, msg, &key, &mut tally).await;
                return tally.into_report(&state);
            }
        };
        // The snapshot is not needed past this point.
        drop(snapshot);

        let msg = match self.store.load(&key) {
            Ok(prior) => Msg::Compared { prior, current },
            Err(err) => {
                // Re-baselining here could swallow a real change.
                watch_error!("Aborting check of {}: {}", url, err);
                Msg::StateUnavailable
            }
        };
        let state = self.drive(state, msg, &key, &mut tally).await;
        match state.verdict() {
            Some(Verdict::NoBaseline) => watch_info!("First run for {}; baseline recorded", key),
            Some(Verdict::Unchanged) => watch_info!("No changes detected at {}", key),
            Some(Verdict::Changed) => watch_info!("Change detected at {}", key),
            None => {}
        }
        tally.into_report(&state)
    }

    /// Feed `msg` to the state machine and execute effects until none remain.
    async fn drive(
        &self,
        mut state: CheckState,
        msg: Msg,
        key: &MonitorKey,
        tally: &mut Tally,
    ) -> CheckState {
        let mut inbox = VecDeque::from([msg]);
        while let Some(msg) = inbox.pop_front() {
            let (next, effects) = update(state, msg);
            state = next;
            for effect in effects {
                match effect {
                    Effect::Notify(notice) => {
                        let kind = notice.kind();
                        watch_info!("Sending {:?} notification for {}", kind, notice.url());
                        let delivered = self.notifier.notify(&render_notice(&notice)).await;
                        tally.record_delivery(kind, delivered);
                        inbox.push_back(Msg::NotifyCompleted { delivered });
                    }
                    Effect::Commit(fingerprint) => match self.store.save(key, &fingerprint) {
                        Ok(()) => tally.committed = true,
                        // Any notification already went out; the next run re-detects.
                        Err(err) => watch_error!("Could not save fingerprint for {}: {}", key, err),
                    },
                }
            }
        }
        state
    }
}

#[derive(Debug, Default)]
struct Tally {
    notifications_sent: usize,
    notifications_failed: usize,
    committed: bool,
}

impl Tally {
    fn record_delivery(&mut self, kind: NoticeKind, delivered: bool) {
        if delivered {
            self.notifications_sent += 1;
            watch_info!("{:?} notification delivered", kind);
        } else {
            self.notifications_failed += 1;
            watch_warn!("{:?} notification was not delivered", kind);
        }
    }

    fn into_report(self, state: &CheckState) -> CheckReport {
        CheckReport {
            // Each path through run() ends in a finished phase.
            outcome: state.outcome().unwrap_or(RunOutcome::StateUnavailable),
            verdict: state.verdict(),
            notifications_sent: self.notifications_sent,
            notifications_failed: self.notifications_failed,
            committed: self.committed,
        }
    }
}
