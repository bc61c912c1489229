// Copyright (C) 2024 Michael Wilson <mike@mdwn.dev>
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
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Instant,
};

use parking_lot::{Condvar, Mutex};

/// A cancel handle is shared between an effect controller and the thread running its steps.
/// The flag is the source of truth and can be read without locking; the condvar only exists
/// to wake a sleeping step thread early.
#[derive(Clone)]
pub struct CancelHandle {
    /// Set to true once the run should stop.
    cancelled: Arc<AtomicBool>,
    /// Guards the condvar wait so a cancel can't slip in between the check and the sleep.
    lock: Arc<Mutex<()>>,
    /// The condvar will handle notification of cancelling.
    condvar: Arc<Condvar>,
}

impl CancelHandle {
    /// Creates a new cancel handle.
    pub fn new() -> CancelHandle {
        CancelHandle {
            cancelled: Arc::new(AtomicBool::new(false)),
            lock: Arc::new(Mutex::new(())),
            condvar: Arc::new(Condvar::new()),
        }
    }

    /// Returns true if the run has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Sleeps until the deadline or until cancelled, whichever comes first.
    /// Returns true if the handle was cancelled.
    pub fn wait_until(&self, deadline: Instant) -> bool {
        let mut guard = self.lock.lock();
        while !self.is_cancelled() {
            if self.condvar.wait_until(&mut guard, deadline).timed_out() {
                break;
            }
        }
        self.is_cancelled()
    }

    /// Cancel the run. Returns true if this call did the cancelling.
    pub fn cancel(&self) -> bool {
        let _guard = self.lock.lock();
        let first = !self.cancelled.swap(true, Ordering::SeqCst);
        if first {
            self.condvar.notify_all();
        }
        first
    }
}

impl Default for CancelHandle {
    fn default() -> Self {
        CancelHandle::new()
    }
}
