// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::{
    any::Any,
    io,
    panic::{self, AssertUnwindSafe},
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use crossbeam_channel::{Receiver, RecvTimeoutError};
use parking_lot::{Mutex, MutexGuard};
use tracing::{debug, error, info, warn, Span};

use crate::{
    device::{Light, LightState},
    effects::{Completion, CompletionCallback, Length, Policy, Timing},
    playsync::CancelHandle,
};

/// How long a stop waits by default for an in-flight step before giving up on the step thread.
pub(crate) const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// The step thread of a run.
struct Worker {
    handle: JoinHandle<()>,
    /// Disconnects (or receives) once the step loop has exited.
    exited: Receiver<()>,
}

/// Bookkeeping for a single run of an effect. Created and published by a successful start
/// before any device work, and shared between the controller and the run's step thread.
pub(crate) struct Run {
    light: Arc<dyn Light>,
    /// The controller's running flag. Cleared by finalize.
    running: Arc<AtomicBool>,
    cancel: CancelHandle,
    finalized: AtomicBool,
    /// Held by start until the step thread is spawned or start gives up.
    starting: Mutex<()>,
    /// State to reapply on finalize, if preservation was requested.
    snapshot: Mutex<Option<LightState>>,
    /// State the policy wants on the light once the run ends.
    final_state: Option<LightState>,
    steps: AtomicU64,
    cycles: AtomicU64,
    on_complete: Option<CompletionCallback>,
    worker: Mutex<Option<Worker>>,
    /// How long finalize waits for the step thread.
    grace: Duration,
    span: Span,
}

impl Run {
    pub(crate) fn new(
        light: Arc<dyn Light>,
        running: Arc<AtomicBool>,
        final_state: Option<LightState>,
        on_complete: Option<CompletionCallback>,
        grace: Duration,
        span: Span,
    ) -> Arc<Run> {
        Arc::new(Run {
            light,
            running,
            cancel: CancelHandle::new(),
            finalized: AtomicBool::new(false),
            starting: Mutex::new(()),
            snapshot: Mutex::new(None),
            final_state,
            steps: AtomicU64::new(0),
            cycles: AtomicU64::new(0),
            on_complete,
            worker: Mutex::new(None),
            grace,
            span,
        })
    }

    /// Blocks finalize from restoring state until the guard is dropped.
    pub(crate) fn starting(&self) -> MutexGuard<'_, ()> {
        self.starting.lock()
    }

    pub(crate) fn set_snapshot(&self, snapshot: LightState) {
        *self.snapshot.lock() = Some(snapshot);
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Number of steps that reached the light.
    pub(crate) fn completed_steps(&self) -> u64 {
        self.steps.load(Ordering::SeqCst)
    }

    /// Number of full cycles completed.
    pub(crate) fn completed_cycles(&self) -> u64 {
        self.cycles.load(Ordering::SeqCst)
    }

    /// Applies a state outside of the step loop. Failures are logged, never returned.
    pub(crate) fn apply(&self, state: &LightState, what: &str) {
        if let Err(e) = self.light.apply_state(state) {
            warn!(err = %e, light = %self.light.name(), "Error applying {}.", what);
        }
    }

    /// Ends the run. Only the first call does anything: cancels pending steps, waits for a
    /// start in progress and for the step thread to let go of the light, applies the final
    /// state and the snapshot, clears the running flag and finally fires the completion callback.
    pub(crate) fn finalize(&self, completion: Completion) {
        if self.finalized.swap(true, Ordering::SeqCst) {
            return;
        }
        let _enter = self.span.enter();

        self.cancel.cancel();
        drop(self.starting.lock());
        self.release_worker();

        if let Some(final_state) = &self.final_state {
            debug!(%final_state, "Applying final state.");
            self.apply(final_state, "final state");
        }
        if let Some(snapshot) = self.snapshot.lock().take() {
            debug!(%snapshot, "Restoring light state.");
            self.apply(&snapshot, "restored state");
        }

        self.running.store(false, Ordering::SeqCst);

        match &completion {
            Completion::Finished => info!(steps = self.completed_steps(), "Effect finished."),
            Completion::Stopped => info!(steps = self.completed_steps(), "Effect stopped."),
            Completion::Faulted(reason) => error!(%reason, "Effect aborted."),
        }

        if let Some(on_complete) = &self.on_complete {
            if let Err(panic) = panic::catch_unwind(AssertUnwindSafe(|| on_complete(&completion)))
            {
                error!(
                    reason = %panic_message(panic.as_ref()),
                    "Completion callback panicked."
                );
            }
        }
    }

    /// Waits out the step thread. Never waits on itself.
    fn release_worker(&self) {
        let Some(worker) = self.worker.lock().take() else {
            return;
        };

        if worker.handle.thread().id() == thread::current().id() {
            return;
        }

        match worker.exited.recv_timeout(self.grace) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                if worker.handle.join().is_err() {
                    error!("Error while joining effect thread.");
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    grace = ?self.grace,
                    "Effect thread did not stop in time, detaching it."
                );
            }
        }
    }
}

/// Spawns the step thread for a run. Steps are timed relative to `origin`.
pub(crate) fn spawn(run: Arc<Run>, policy: Arc<Policy>, origin: Instant) -> io::Result<()> {
    // Hold the slot while spawning so a concurrent stop can't miss the worker.
    let mut slot = run.worker.lock();
    let (exited_tx, exited_rx) = crossbeam_channel::bounded::<()>(1);

    let handle = {
        let run = run.clone();
        thread::Builder::new()
            .name(format!("effect-{}", policy.kind()))
            .spawn(move || {
                let completion = {
                    let _enter = run.span.enter();
                    match panic::catch_unwind(AssertUnwindSafe(|| sequence(&run, &policy, origin)))
                    {
                        Ok(completion) => completion,
                        Err(panic) => Completion::Faulted(panic_message(panic.as_ref())),
                    }
                };
                let _ = exited_tx.send(());
                run.finalize(completion);
            })?
    };

    *slot = Some(Worker {
        handle,
        exited: exited_rx,
    });

    Ok(())
}

/// The step loop. Runs on the step thread until the plan is exhausted or the run is cancelled.
///
/// Cancellation is checked after every wait, again before a step's state is computed and once
/// more right before it is written. A stop that lands after the last check can still see one
/// write go out. Finalize waits up to the run's grace period for the thread before restoring state,
/// so that write lands before the restore unless the light stalls past the grace period.
fn sequence(run: &Run, policy: &Policy, origin: Instant) -> Completion {
    let length = policy.length();
    let mut previous = origin;
    let mut step: u64 = 0;

    loop {
        if let Length::Steps(total) = length {
            if step >= total {
                return Completion::Finished;
            }
        }

        let deadline = match policy.timing(step) {
            Timing::At(offset) => origin + offset,
            Timing::After(delay) => previous + delay,
        };

        if run.cancel.wait_until(deadline) || run.cancel.is_cancelled() {
            return Completion::Stopped;
        }

        let state = policy.state_for(step);

        if run.cancel.is_cancelled() {
            return Completion::Stopped;
        }

        debug!(step, %state, "Applying step.");
        if let Err(e) = run.light.apply_state(&state) {
            warn!(err = %e, step, "Error applying step, continuing.");
        }
        run.steps.fetch_add(1, Ordering::SeqCst);
        previous = Instant::now();
        step += 1;

        if let Length::Cycles {
            steps_per_cycle,
            limit,
        } = length
        {
            if step % steps_per_cycle == 0 {
                let cycles = run.cycles.fetch_add(1, Ordering::SeqCst) + 1;
                debug!(cycles, "Cycle complete.");
                if limit.is_some_and(|limit| cycles >= limit) {
                    return Completion::Finished;
                }
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
