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
    collections::HashSet,
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use parking_lot::Mutex;
use tracing::info;

use super::{DeviceError, LightState};

/// A mock light. Doesn't talk to anything, just records every state it was given.
#[derive(Clone)]
pub struct Light {
    name: String,
    on: Arc<AtomicBool>,
    applied: Arc<Mutex<Vec<LightState>>>,
    /// Zero-based write attempts that should fail.
    failing_writes: Arc<Mutex<HashSet<usize>>>,
    attempts: Arc<Mutex<usize>>,
    log_writes: bool,
}

impl Light {
    /// Creates a new mock light that starts switched on.
    pub fn new(name: &str) -> Light {
        Light {
            name: name.to_string(),
            on: Arc::new(AtomicBool::new(true)),
            applied: Arc::new(Mutex::new(Vec::new())),
            failing_writes: Arc::new(Mutex::new(HashSet::new())),
            attempts: Arc::new(Mutex::new(0)),
            log_writes: false,
        }
    }

    /// Creates a mock light that logs every applied state.
    pub fn logging(name: &str) -> Light {
        Light {
            log_writes: true,
            ..Light::new(name)
        }
    }

    /// Flips the power state without recording a write.
    pub fn set_on(&self, on: bool) {
        self.on.store(on, Ordering::SeqCst);
    }

    /// Makes the given zero-based write attempt fail.
    pub fn fail_write(&self, attempt: usize) {
        self.failing_writes.lock().insert(attempt);
    }

    /// All successfully applied states, in order.
    pub fn applied(&self) -> Vec<LightState> {
        self.applied.lock().clone()
    }

    /// Number of successfully applied states.
    pub fn write_count(&self) -> usize {
        self.applied.lock().len()
    }

    /// The last successfully applied state.
    pub fn last_applied(&self) -> Option<LightState> {
        self.applied.lock().last().cloned()
    }
}

impl super::Light for Light {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn apply_state(&self, state: &LightState) -> Result<(), DeviceError> {
        let attempt = {
            let mut attempts = self.attempts.lock();
            let attempt = *attempts;
            *attempts += 1;
            attempt
        };

        if self.failing_writes.lock().contains(&attempt) {
            return Err(DeviceError::Unreachable(format!(
                "{} dropped write {}",
                self.name, attempt
            )));
        }

        if let Some(on) = state.power_value() {
            self.on.store(on, Ordering::SeqCst);
        }
        if self.log_writes {
            info!(light = self.name, %state, "Applied state.");
        }
        self.applied.lock().push(state.clone());

        Ok(())
    }

    fn is_on(&self) -> bool {
        self.on.load(Ordering::SeqCst)
    }
}

impl fmt::Display for Light {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (Mock)", self.name)
    }
}
