use crate::{BaselinePolicy, CheckState, Effect, Fingerprint, Msg, Notice, Phase, RunOutcome, Verdict};

/// Pure update function: applies a message to state and returns any effects.
///
/// A run accepts exactly one of `Compared`, `FetchFailed` or `StateUnavailable`
/// while ready; anything arriving out of turn is ignored.
pub fn update(mut state: CheckState, msg: Msg) -> (CheckState, Vec<Effect>) {
    let effects = match msg {
        Msg::Compared { prior, current } => {
            if !state.is_ready() {
                return (state, Vec::new());
            }
            let verdict = classify(prior.as_ref(), &current);
            state.record_verdict(verdict);
            match verdict {
                Verdict::NoBaseline => {
                    state.finish(RunOutcome::Baselined);
                    // The announcement is not gated on the commit.
                    let mut effects = vec![Effect::Commit(current)];
                    if state.policy() == BaselinePolicy::Announced {
                        effects.push(Effect::Notify(Notice::MonitorStarted {
                            url: state.url().to_string(),
                        }));
                    }
                    effects
                }
                Verdict::Unchanged => {
                    state.finish(RunOutcome::Unchanged);
                    Vec::new()
                }
                Verdict::Changed => {
                    state.await_delivery(current);
                    vec![Effect::Notify(Notice::Changed {
                        url: state.url().to_string(),
                    })]
                }
            }
        }
        Msg::FetchFailed { reason } => {
            if !state.is_ready() {
                return (state, Vec::new());
            }
            state.finish(RunOutcome::FetchFailed);
            vec![Effect::Notify(Notice::FetchFailed {
                url: state.url().to_string(),
                reason,
            })]
        }
        Msg::StateUnavailable => {
            if state.is_ready() {
                state.finish(RunOutcome::StateUnavailable);
            }
            Vec::new()
        }
        Msg::NotifyCompleted { delivered } => match state.phase() {
            Phase::AwaitingDelivery { pending } if delivered => {
                state.finish(RunOutcome::ChangeNotified);
                vec![Effect::Commit(pending)]
            }
            Phase::AwaitingDelivery { .. } => {
                state.finish(RunOutcome::ChangeUndelivered);
                Vec::new()
            }
            // Baseline announcements and error notices do not gate anything.
            Phase::Ready | Phase::Finished(_) => Vec::new(),
        },
    };

    (state, effects)
}

pub fn classify(prior: Option<&Fingerprint>, current: &Fingerprint) -> Verdict {
    match prior {
        None => Verdict::NoBaseline,
        Some(prior) if prior == current => Verdict::Unchanged,
        Some(_) => Verdict::Changed,
    }
}
