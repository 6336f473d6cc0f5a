//! Task supervisor
//!
//! Tracks a dynamic set of concurrently running units of work. Units may be
//! submitted while the supervisor is running; each finished unit is removed
//! and its outcome observed exactly once.
//!
//! Ordinary units (one per inbound frame, user callbacks) are isolated: a
//! failure is logged and counted and the loop keeps going. Critical units (the
//! read loop, the heartbeat loop, the socket writer) take the supervisor down
//! with them.

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::task::{AbortHandle, JoinError, JoinHandle};
use tracing::{debug, error, trace};

use crate::error::{GatewayError, GatewayResult};

/// Outcome of a supervised unit
pub type UnitResult = anyhow::Result<()>;

struct Unit {
    name: &'static str,
    critical: bool,
    handle: JoinHandle<UnitResult>,
}

/// Wakes the supervisor when a unit finishes, panics, or is aborted
struct NotifyOnDrop(Arc<Notify>);

impl Drop for NotifyOnDrop {
    fn drop(&mut self) {
        self.0.notify_one();
    }
}

/// Aborts an adopted task when its wrapper is aborted
struct AbortOnDrop(AbortHandle);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Supervisor of concurrently running units
#[derive(Default)]
pub struct Supervisor {
    units: Mutex<Vec<Unit>>,
    notify: Arc<Notify>,
    failures: AtomicU64,
    closed: AtomicBool,
}

impl Supervisor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start `work` as an ordinary unit
    pub fn submit<F>(&self, name: &'static str, work: F)
    where
        F: Future<Output = UnitResult> + Send + 'static,
    {
        self.spawn(name, false, work);
    }

    /// Start `work` as a critical unit; its failure ends [`run_forever`](Self::run_forever)
    pub fn submit_critical<F>(&self, name: &'static str, work: F)
    where
        F: Future<Output = UnitResult> + Send + 'static,
    {
        self.spawn(name, true, work);
    }

    /// Supervise a task that was started elsewhere, as an ordinary unit
    ///
    /// Cancelling the unit (on shutdown) aborts the adopted task.
    pub fn adopt(&self, name: &'static str, handle: JoinHandle<UnitResult>) {
        let guard = AbortOnDrop(handle.abort_handle());
        self.spawn(name, false, async move {
            let _guard = guard;
            match handle.await {
                Ok(result) => result,
                Err(e) if e.is_cancelled() => Ok(()),
                Err(e) => Err(anyhow::Error::new(e)),
            }
        });
    }

    fn spawn<F>(&self, name: &'static str, critical: bool, work: F)
    where
        F: Future<Output = UnitResult> + Send + 'static,
    {
        let guard = NotifyOnDrop(Arc::clone(&self.notify));
        let handle = tokio::spawn(async move {
            let _guard = guard;
            work.await
        });

        trace!(unit = name, critical, "Unit submitted");
        self.units.lock().push(Unit {
            name,
            critical,
            handle,
        });
    }

    /// Number of units not yet observed
    pub fn len(&self) -> usize {
        self.units.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.lock().is_empty()
    }

    /// Number of ordinary units that failed so far
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    /// Remove the units that have finished, leaving the rest in place
    fn take_finished(&self) -> Vec<Unit> {
        let mut units = self.units.lock();
        let (finished, running): (Vec<_>, Vec<_>) =
            std::mem::take(&mut *units).into_iter().partition(|u| u.handle.is_finished());
        *units = running;
        finished
    }

    /// One supervision pass: observe every finished unit once
    ///
    /// Returns how many units were observed. A failed critical unit is
    /// returned as an error; units finished in the same pass are still observed.
    pub async fn poll_once(&self) -> GatewayResult<usize> {
        let finished = self.take_finished();
        let count = finished.len();
        let mut critical_failure = None;

        for unit in finished {
            if let Err(source) = self.observe(unit.name, unit.handle.await) {
                if unit.critical && critical_failure.is_none() {
                    critical_failure = Some(GatewayError::Supervisor {
                        unit: unit.name,
                        source: source.into(),
                    });
                } else {
                    error!(unit = unit.name, error = %source, "Supervised unit failed");
                    self.failures.fetch_add(1, Ordering::Relaxed);
                }
            }
        }

        match critical_failure {
            Some(err) => Err(err),
            None => Ok(count),
        }
    }

    /// Turn a join outcome into the unit's result; cancellation is not a failure
    fn observe(&self, name: &'static str, outcome: Result<UnitResult, JoinError>) -> UnitResult {
        match outcome {
            Ok(result) => {
                trace!(unit = name, ok = result.is_ok(), "Unit finished");
                result
            }
            Err(e) if e.is_cancelled() => {
                trace!(unit = name, "Unit cancelled");
                Ok(())
            }
            Err(e) => Err(anyhow::anyhow!("unit panicked: {e}")),
        }
    }

    /// Supervise until a critical unit fails or [`shutdown`](Self::shutdown) is called
    pub async fn run_forever(&self) -> GatewayResult<()> {
        debug!("Supervisor running");
        loop {
            if self.closed.load(Ordering::Acquire) {
                debug!("Supervisor stopped");
                return Ok(());
            }

            self.poll_once().await?;
            self.notify.notified().await;
        }
    }

    /// Observe every finished unit, abort the rest, and stop `run_forever`
    ///
    /// Failures observed here are logged, not returned. Idempotent.
    pub async fn shutdown(&self) {
        self.closed.store(true, Ordering::Release);

        let units = std::mem::take(&mut *self.units.lock());
        let mut aborted = 0usize;

        for unit in units {
            if unit.handle.is_finished() {
                if let Err(e) = self.observe(unit.name, unit.handle.await) {
                    error!(unit = unit.name, error = %e, "Supervised unit failed");
                    self.failures.fetch_add(1, Ordering::Relaxed);
                }
            } else {
                unit.handle.abort();
                aborted += 1;
            }
        }

        debug!(aborted, "Supervisor shut down");
        self.notify.notify_one();
    }
}

impl std::fmt::Debug for Supervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Supervisor")
            .field("units", &self.len())
            .field("failures", &self.failures())
            .field("closed", &self.closed.load(Ordering::Relaxed))
            .finish()
    }
}
