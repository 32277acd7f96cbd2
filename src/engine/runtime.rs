//! Per-kind resolver tasks.
//!
//! Each entity kind runs on its own named thread and replies once over a
//! bounded channel. The aggregator waits on every reply with a shared
//! deadline; a task that misses it or dies is reported as a kind-level
//! warning and its thread is left to finish on its own.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError};
use tracing::{debug, warn};

use crate::entity::EntityKind;
use crate::error::ResolutionError;
use crate::report::{ResolutionWarning, WarningReason};
use crate::resolve::{MatchedEntity, Resolver};
use crate::storage::{EntityRepository, RepositoryError};

/// Output of one kind's resolver task.
#[derive(Debug, Default)]
pub(crate) struct KindOutcome {
    pub(crate) entities: Vec<MatchedEntity>,
    pub(crate) warnings: Vec<ResolutionWarning>,
}

/// Resolves `candidates` in input order.
///
/// A failing or panicking candidate is dropped with one warning. An
/// unreachable repository drops the rest of the kind, including candidates
/// already resolved, under a single kind-level warning.
pub(crate) fn resolve_kind<R: Resolver>(
    resolver: &R,
    repository: &dyn EntityRepository,
    candidates: &[R::Candidate],
) -> KindOutcome {
    let mut outcome = KindOutcome::default();
    let mut resolved_names = Vec::with_capacity(candidates.len());

    for (idx, candidate) in candidates.iter().enumerate() {
        let name = R::candidate_name(candidate);
        let attempt = panic::catch_unwind(AssertUnwindSafe(|| resolver.resolve(repository, candidate)));
        let resolved = match attempt {
            Ok(resolved) => resolved,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!(kind = %R::KIND, candidate = name, panic = %message, "resolver panicked");
                outcome.warnings.push(ResolutionWarning::candidate(
                    R::KIND,
                    name,
                    WarningReason::ResolutionFailed {
                        message: format!("resolver panicked: {message}"),
                    },
                ));
                continue;
            }
        };
        match resolved {
            Ok(entity) => {
                resolved_names.push(name.to_string());
                outcome.entities.push(entity);
            }
            Err(ResolutionError::Repository(err @ RepositoryError::Unavailable(_))) => {
                let mut dropped = resolved_names;
                dropped.extend(candidates[idx..].iter().map(|c| R::candidate_name(c).to_string()));
                warn!(kind = %R::KIND, error = %err, dropped = dropped.len(), "repository unavailable, kind dropped");
                outcome.entities.clear();
                outcome.warnings.push(ResolutionWarning::kind_level(
                    R::KIND,
                    WarningReason::RepositoryUnavailable {
                        message: err.to_string(),
                        dropped,
                    },
                ));
                return outcome;
            }
            Err(ResolutionError::InvalidCandidate(err)) => {
                warn!(kind = %R::KIND, candidate = name, error = %err, "candidate rejected");
                outcome.warnings.push(ResolutionWarning::candidate(
                    R::KIND,
                    name,
                    WarningReason::InvalidCandidate {
                        message: err.to_string(),
                    },
                ));
            }
            Err(err) => {
                warn!(kind = %R::KIND, candidate = name, error = %err, "candidate failed to resolve");
                outcome.warnings.push(ResolutionWarning::candidate(
                    R::KIND,
                    name,
                    WarningReason::ResolutionFailed {
                        message: err.to_string(),
                    },
                ));
            }
        }
    }

    outcome
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Handle on a dispatched kind.
pub(crate) struct KindTask {
    kind: EntityKind,
    names: Vec<String>,
    rx: Receiver<KindOutcome>,
}

impl KindTask {
    fn ready(kind: EntityKind, outcome: KindOutcome) -> Self {
        let (tx, rx) = bounded(1);
        let _ = tx.send(outcome);
        Self {
            kind,
            names: Vec::new(),
            rx,
        }
    }

    /// Waits for the reply, giving up at `deadline`.
    pub(crate) fn wait(self, deadline: Option<Instant>, timeout: Option<Duration>) -> KindOutcome {
        let received = match deadline {
            Some(deadline) => self.rx.recv_deadline(deadline),
            None => self.rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        let reason = match received {
            Ok(outcome) => return outcome,
            Err(RecvTimeoutError::Timeout) => {
                let after_ms = timeout.map_or(0, |t| u64::try_from(t.as_millis()).unwrap_or(u64::MAX));
                warn!(kind = %self.kind, after_ms, dropped = self.names.len(), "resolver timed out");
                WarningReason::TimedOut {
                    after_ms,
                    dropped: self.names,
                }
            }
            Err(RecvTimeoutError::Disconnected) => {
                warn!(kind = %self.kind, dropped = self.names.len(), "resolver stopped without replying");
                WarningReason::WorkerLost { dropped: self.names }
            }
        };

        KindOutcome {
            entities: Vec::new(),
            warnings: vec![ResolutionWarning::kind_level(self.kind, reason)],
        }
    }
}

/// Starts `resolver` over `candidates` on a dedicated thread.
///
/// Empty kinds complete immediately. If the thread cannot be spawned the
/// kind is resolved on the calling thread instead.
pub(crate) fn spawn_kind<R>(
    resolver: R,
    repository: Arc<dyn EntityRepository>,
    candidates: Vec<R::Candidate>,
) -> KindTask
where
    R: Resolver + 'static,
    R::Candidate: Sync + 'static,
{
    if candidates.is_empty() {
        return KindTask::ready(R::KIND, KindOutcome::default());
    }

    let names = candidates.iter().map(|c| R::candidate_name(c).to_string()).collect();
    let resolver = Arc::new(resolver);
    let candidates = Arc::new(candidates);
    let (tx, rx) = bounded::<KindOutcome>(1);

    let spawned = {
        let resolver = Arc::clone(&resolver);
        let candidates = Arc::clone(&candidates);
        let repository = Arc::clone(&repository);
        thread::Builder::new()
            .name(format!("crm-resolve-{}", R::KIND))
            .spawn(move || {
                let outcome = resolve_kind(resolver.as_ref(), repository.as_ref(), &candidates);
                debug!(kind = %R::KIND, resolved = outcome.entities.len(), "kind finished");
                let _ = tx.send(outcome);
            })
    };

    match spawned {
        Ok(_) => KindTask {
            kind: R::KIND,
            names,
            rx,
        },
        Err(err) => {
            warn!(kind = %R::KIND, error = %err, "could not spawn resolver thread, resolving inline");
            let outcome = resolve_kind(resolver.as_ref(), repository.as_ref(), &candidates);
            KindTask::ready(R::KIND, outcome)
        }
    }
}
