//! Readiness waiting: poll targeted services until all are ready or a
//! deadline passes.
//!
//! The deadline is computed once at entry; each pass re-checks only the
//! services that have not reached a terminal state. A backend query hiccup
//! during a pass is treated as "not ready this pass" and retried, since
//! restarts commonly cause brief engine unavailability.

use crate::backend::{Health, ServiceState, StackBackend};
use crate::{Error, Result};
use futures::future::{self, Either};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Readiness classification of one service during a wait
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ReadyState {
    /// Not yet observed running
    Unknown,
    /// Container is up but the health check has not delivered a verdict
    Running,
    /// Ready: health check passing, or running with no health check configured
    Healthy,
    /// Health check failing; retried until the deadline
    Unhealthy,
    /// Still pending when the deadline passed
    TimedOut,
}

impl ReadyState {
    /// True once the service counts as ready
    pub fn is_ready(&self) -> bool {
        matches!(self, ReadyState::Healthy)
    }

    /// Terminal states are never re-checked within the same wait
    fn is_terminal(&self) -> bool {
        matches!(self, ReadyState::Healthy | ReadyState::TimedOut)
    }
}

impl std::fmt::Display for ReadyState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ReadyState::Unknown => "unknown",
            ReadyState::Running => "running",
            ReadyState::Healthy => "healthy",
            ReadyState::Unhealthy => "unhealthy",
            ReadyState::TimedOut => "timed-out",
        };
        f.write_str(name)
    }
}

/// Wait-phase record for one service
#[derive(Debug, Clone)]
pub struct ReadinessRecord {
    /// Latest classification
    pub state: ReadyState,
    /// When the service was last checked, if ever
    pub last_checked: Option<Instant>,
}

impl ReadinessRecord {
    fn unknown() -> Self {
        Self {
            state: ReadyState::Unknown,
            last_checked: None,
        }
    }
}

/// Timing parameters for one wait call
#[derive(Debug, Clone, Copy)]
pub struct WaitOptions {
    /// Overall deadline, computed once at entry as `now + timeout`
    pub timeout: Duration,
    /// Sleep between polling passes
    pub poll_interval: Duration,
}

/// Final report of a wait call
#[derive(Debug)]
pub struct WaitOutcome {
    /// Per-service records, keyed by service name
    pub records: BTreeMap<String, ReadinessRecord>,
    /// True when the wait was cancelled before completion
    pub cancelled: bool,
}

impl WaitOutcome {
    /// Services that were still pending when the wait ended
    pub fn timed_out(&self) -> Vec<String> {
        self.records
            .iter()
            .filter(|(_, rec)| rec.state == ReadyState::TimedOut)
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// True when every service reached a ready state
    pub fn all_ready(&self) -> bool {
        !self.cancelled && self.records.values().all(|rec| rec.state.is_ready())
    }

    /// Convert the report into a result, failing on timeout or interrupt
    pub fn ensure_ready(&self) -> Result<()> {
        if self.cancelled {
            return Err(Error::WaitInterrupted);
        }
        let timed_out = self.timed_out();
        if !timed_out.is_empty() {
            return Err(Error::ReadinessTimeout {
                services: timed_out,
            });
        }
        Ok(())
    }
}

/// Cancellation signal for a wait in progress, distinct from the timeout
///
/// Obtained from [`CancelToken::pair`]; triggering the [`Canceller`] makes
/// the wait stop promptly instead of sleeping out the current interval.
pub struct CancelToken {
    rx: async_channel::Receiver<()>,
}

/// The triggering half of a [`CancelToken`]
pub struct Canceller {
    tx: async_channel::Sender<()>,
}

impl CancelToken {
    /// Create a connected canceller/token pair
    pub fn pair() -> (Canceller, CancelToken) {
        let (tx, rx) = async_channel::bounded(1);
        (Canceller { tx }, CancelToken { rx })
    }

    /// Resolve when cancelled; pend forever if the canceller is dropped unused
    async fn cancelled(&self) {
        if self.rx.recv().await.is_ok() {
            return;
        }
        future::pending::<()>().await
    }
}

impl Canceller {
    /// Cancel the associated wait
    pub fn cancel(&self) {
        let _ = self.tx.try_send(());
        self.tx.close();
    }
}

/// Classify a backend-reported state, in fixed priority order
fn classify(state: &ServiceState) -> ReadyState {
    if !state.running {
        return ReadyState::Unknown;
    }
    match state.health {
        Some(Health::Healthy) => ReadyState::Healthy,
        Some(Health::Unhealthy) => ReadyState::Unhealthy,
        Some(Health::Starting) => ReadyState::Running,
        // No health check configured: liveness is the success criterion.
        None => ReadyState::Healthy,
    }
}

/// Poll the targeted services until every one is ready, the deadline
/// passes, or the wait is cancelled.
///
/// Always returns a full report; use [`WaitOutcome::ensure_ready`] to turn
/// a timeout or interrupt into an error. Services classified ready are
/// never re-checked. Terminates within `timeout + poll_interval` of entry
/// provided the backend does not hang indefinitely.
pub async fn wait_ready(
    backend: &dyn StackBackend,
    services: &[String],
    opts: WaitOptions,
    cancel: &CancelToken,
) -> WaitOutcome {
    let deadline = Instant::now() + opts.timeout;

    let mut records: BTreeMap<String, ReadinessRecord> = services
        .iter()
        .map(|name| (name.clone(), ReadinessRecord::unknown()))
        .collect();
    let mut cancelled = false;

    loop {
        for (name, record) in records.iter_mut() {
            if record.state.is_terminal() {
                continue;
            }

            match backend.service_state(name).await {
                Ok(state) => {
                    let next = classify(&state);
                    if next != record.state {
                        debug!(service = %name, from = %record.state, to = %next, "readiness transition");
                    }
                    record.state = next;
                }
                Err(err) => {
                    // Engine hiccups are expected mid-restart; retry next pass.
                    warn!(service = %name, error = %err, "status query failed, treating as not ready");
                }
            }
            record.last_checked = Some(Instant::now());
        }

        if records.values().all(|rec| rec.state.is_ready()) {
            info!("all services ready");
            break;
        }

        if Instant::now() >= deadline {
            for record in records.values_mut() {
                if !record.state.is_terminal() {
                    record.state = ReadyState::TimedOut;
                }
            }
            break;
        }

        let timer = smol::Timer::after(opts.poll_interval);
        let interrupted = cancel.cancelled();
        futures::pin_mut!(timer);
        futures::pin_mut!(interrupted);
        if let Either::Right(_) = future::select(timer, interrupted).await {
            cancelled = true;
            break;
        }
    }

    WaitOutcome { records, cancelled }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(running: bool, health: Option<Health>) -> ServiceState {
        ServiceState { running, health }
    }

    #[test]
    fn classify_priority_order() {
        assert_eq!(
            classify(&state(false, Some(Health::Healthy))),
            ReadyState::Unknown
        );
        assert_eq!(
            classify(&state(true, Some(Health::Healthy))),
            ReadyState::Healthy
        );
        assert_eq!(
            classify(&state(true, Some(Health::Unhealthy))),
            ReadyState::Unhealthy
        );
        assert_eq!(
            classify(&state(true, Some(Health::Starting))),
            ReadyState::Running
        );
        assert_eq!(classify(&state(true, None)), ReadyState::Healthy);
    }

    #[test]
    fn outcome_reports_timed_out_services() {
        let mut records = BTreeMap::new();
        records.insert(
            "a".to_string(),
            ReadinessRecord {
                state: ReadyState::Healthy,
                last_checked: Some(Instant::now()),
            },
        );
        records.insert(
            "b".to_string(),
            ReadinessRecord {
                state: ReadyState::TimedOut,
                last_checked: Some(Instant::now()),
            },
        );
        let outcome = WaitOutcome {
            records,
            cancelled: false,
        };

        assert!(!outcome.all_ready());
        assert_eq!(outcome.timed_out(), vec!["b".to_string()]);
        match outcome.ensure_ready() {
            Err(Error::ReadinessTimeout { services }) => {
                assert_eq!(services, vec!["b".to_string()]);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn cancelled_outcome_is_an_interrupt() {
        let outcome = WaitOutcome {
            records: BTreeMap::new(),
            cancelled: true,
        };
        assert!(matches!(
            outcome.ensure_ready(),
            Err(Error::WaitInterrupted)
        ));
    }
}
