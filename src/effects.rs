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
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

use parking_lot::Mutex;
use tracing::{error, info, span, Level};

use crate::{
    device::{Light, LightState},
    sequencer::{self, Run},
};

pub mod error;
pub mod fade;
pub mod flash;
pub mod heartbeat;
pub mod pulse;
pub mod sunrise;


pub use error::{ConfigError, EffectError};
pub use fade::{FadeBuilder, FadeConfig};
pub use flash::{FlashBuilder, FlashConfig};
pub use heartbeat::{HeartbeatBuilder, HeartbeatConfig};
pub use pulse::{pulse_brightness, PulseBuilder, PulseConfig, STEPS_PER_PULSE};
pub use sunrise::{sunrise_color, SunriseBuilder, SunriseConfig};

/// The shortest allowed time between two steps of an effect.
pub const MIN_STEP_INTERVAL: Duration = Duration::from_millis(10);

/// How a run ended. Passed to the completion callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// The configured number of steps or cycles ran.
    Finished,
    /// The run was stopped before it finished.
    Stopped,
    /// The run was aborted by a fault in the step thread.
    Faulted(String),
}

/// Called once per run, after the light has been restored.
pub type CompletionCallback = Arc<dyn Fn(&Completion) + Send + Sync>;

/// When a step fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Timing {
    /// At a fixed offset from the start of the run.
    At(Duration),
    /// After the given delay once the previous step has been written.
    After(Duration),
}

/// How long a run lasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Length {
    /// A fixed number of steps.
    Steps(u64),
    /// Repeating cycles. No limit means the run continues until stopped.
    Cycles {
        steps_per_cycle: u64,
        limit: Option<u64>,
    },
}

/// The step generation policy of an effect.
#[derive(Debug, Clone, PartialEq)]
pub enum Policy {
    Fade(FadeConfig),
    Sunrise(SunriseConfig),
    Pulse(PulseConfig),
    Heartbeat(HeartbeatConfig),
    Flash(FlashConfig),
}

impl Policy {
    /// The name of the effect kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Policy::Fade(_) => "fade",
            Policy::Sunrise(_) => "sunrise",
            Policy::Pulse(_) => "pulse",
            Policy::Heartbeat(_) => "heartbeat",
            Policy::Flash(_) => "flash",
        }
    }

    /// The state applied synchronously by start, before any step is scheduled.
    pub(crate) fn initial_state(&self, light_on: bool) -> Option<LightState> {
        match self {
            Policy::Fade(config) => config.initial_state(),
            Policy::Sunrise(config) => config.initial_state(),
            Policy::Pulse(config) => config.initial_state(light_on),
            Policy::Heartbeat(_) | Policy::Flash(_) => None,
        }
    }

    /// The state applied by finalize before any snapshot is restored.
    pub(crate) fn final_state(&self) -> Option<LightState> {
        match self {
            Policy::Flash(config) => config.final_state(),
            _ => None,
        }
    }

    pub(crate) fn length(&self) -> Length {
        match self {
            Policy::Fade(config) => config.length(),
            Policy::Sunrise(config) => config.length(),
            Policy::Pulse(config) => config.length(),
            Policy::Heartbeat(config) => config.length(),
            Policy::Flash(config) => config.length(),
        }
    }

    pub(crate) fn timing(&self, step: u64) -> Timing {
        match self {
            Policy::Fade(config) => config.timing(step),
            Policy::Sunrise(config) => config.timing(step),
            Policy::Pulse(config) => config.timing(step),
            Policy::Heartbeat(config) => config.timing(step),
            Policy::Flash(config) => config.timing(step),
        }
    }

    pub(crate) fn state_for(&self, step: u64) -> LightState {
        match self {
            Policy::Fade(config) => config.state_for(step),
            Policy::Sunrise(config) => config.state_for(step),
            Policy::Pulse(config) => config.state_for(step),
            Policy::Heartbeat(config) => config.state_for(step),
            Policy::Flash(config) => config.state_for(step),
        }
    }
}

/// Settings every effect builder accepts.
#[derive(Clone, Default)]
pub(crate) struct Common {
    pub(crate) light: Option<Arc<dyn Light>>,
    pub(crate) preserve_state: bool,
    pub(crate) on_complete: Option<CompletionCallback>,
}

impl Common {
    pub(crate) fn preserving() -> Common {
        Common {
            preserve_state: true,
            ..Common::default()
        }
    }
}

/// Generates the builder methods shared by every effect.
macro_rules! common_builder_methods {
    () => {
        /// Sets the light to drive.
        pub fn light(mut self, light: std::sync::Arc<dyn crate::device::Light>) -> Self {
            self.common.light = Some(light);
            self
        }

        /// Sets whether the light's state is captured at start and restored at the end.
        pub fn preserve_state(mut self, preserve_state: bool) -> Self {
            self.common.preserve_state = preserve_state;
            self
        }

        /// Sets a callback to run once the effect has completed or been stopped.
        pub fn on_complete<F>(mut self, on_complete: F) -> Self
        where
            F: Fn(&crate::effects::Completion) + Send + Sync + 'static,
        {
            self.common.on_complete = Some(std::sync::Arc::new(on_complete));
            self
        }

        pub(crate) fn completion_callback(
            mut self,
            on_complete: Option<crate::effects::CompletionCallback>,
        ) -> Self {
            self.common.on_complete = on_complete;
            self
        }
    };
}
pub(crate) use common_builder_methods;

/// Drives one light through one effect. At most one run is active at a time.
pub struct Effect {
    light: Arc<dyn Light>,
    policy: Arc<Policy>,
    preserve_state: bool,
    on_complete: Option<CompletionCallback>,
    /// Set by a successful start, cleared once the run has been finalized.
    running: Arc<AtomicBool>,
    /// The current (or last) run.
    run: Mutex<Option<Arc<Run>>>,
    /// How long stop waits for an in-flight step.
    shutdown_grace: Duration,
}

impl Effect {
    /// Starts building a color fade.
    pub fn fade() -> FadeBuilder {
        FadeBuilder::default()
    }

    /// Starts building a sunrise.
    pub fn sunrise() -> SunriseBuilder {
        SunriseBuilder::default()
    }

    /// Starts building a brightness pulse.
    pub fn pulse() -> PulseBuilder {
        PulseBuilder::default()
    }

    /// Starts building a heartbeat.
    pub fn heartbeat() -> HeartbeatBuilder {
        HeartbeatBuilder::default()
    }

    /// Starts building a two-color flash.
    pub fn flash() -> FlashBuilder {
        FlashBuilder::default()
    }

    pub(crate) fn new(policy: Policy, common: Common) -> Result<Effect, ConfigError> {
        let light = common.light.ok_or(ConfigError::MissingLight)?;
        Ok(Effect {
            light,
            policy: Arc::new(policy),
            preserve_state: common.preserve_state,
            on_complete: common.on_complete,
            running: Arc::new(AtomicBool::new(false)),
            run: Mutex::new(None),
            shutdown_grace: sequencer::SHUTDOWN_GRACE,
        })
    }

    /// Overrides how long stop waits for a stalled step before detaching the step thread.
    #[cfg(test)]
    pub(crate) fn with_shutdown_grace(mut self, shutdown_grace: Duration) -> Effect {
        self.shutdown_grace = shutdown_grace;
        self
    }

    /// The step policy this effect runs.
    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Starts the effect. Fails without side effects if it is already running. A stop that
    /// lands while start is still talking to the light ends the run before any step is written.
    pub fn start(&self) -> Result<(), EffectError> {
        let span = span!(
            Level::INFO,
            "effect",
            kind = self.policy.kind(),
            light = %self.light.name()
        );
        let _enter = span.enter();

        // The run is published under the slot lock before the device is touched, so a
        // concurrent stop always finds it.
        let run = {
            let mut slot = self.run.lock();
            if self
                .running
                .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                .is_err()
            {
                return Err(EffectError::AlreadyRunning);
            }

            let run = Run::new(
                self.light.clone(),
                self.running.clone(),
                self.policy.final_state(),
                self.on_complete.clone(),
                self.shutdown_grace,
                span.clone(),
            );
            *slot = Some(run.clone());
            run
        };
        let starting = run.starting();

        if self.preserve_state {
            run.set_snapshot(self.light.capture_state());
        }

        info!("Starting effect.");
        let initial = self.policy.initial_state(self.light.is_on());
        if run.is_cancelled() {
            info!("Effect stopped while starting.");
            return Ok(());
        }
        if let Some(initial) = initial {
            run.apply(&initial, "initial state");
        }

        let spawned = sequencer::spawn(run.clone(), self.policy.clone(), Instant::now());
        drop(starting);

        if let Err(e) = spawned {
            error!(err = %e, "Unable to start effect thread.");
            run.finalize(Completion::Faulted(e.to_string()));
            return Err(EffectError::Scheduler(e.to_string()));
        }

        Ok(())
    }

    /// Stops the effect. Safe to call at any time, including before start or while another
    /// thread is inside start.
    ///
    /// When this call is the one that ends the run, it returns once the light has been restored
    /// and the completion callback has fired. If the run already ended on its own, or another
    /// stop got there first, it returns right away and that cleanup may still be in progress.
    pub fn stop(&self) {
        let run = self.run.lock().clone();
        if let Some(run) = run {
            run.finalize(Completion::Stopped);
        }
    }

    /// True from a successful start until the run has been finalized.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Full cycles completed by the current or last run.
    pub fn completed_cycles(&self) -> u64 {
        self.run
            .lock()
            .as_ref()
            .map_or(0, |run| run.completed_cycles())
    }

    /// Steps written by the current or last run, excluding the initial state.
    pub fn completed_steps(&self) -> u64 {
        self.run
            .lock()
            .as_ref()
            .map_or(0, |run| run.completed_steps())
    }
}

impl Drop for Effect {
    fn drop(&mut self) {
        self.stop();
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}", self.policy.kind(), self.light)
    }
}

/// Checks that a brightness percentage is within 1..=100.
pub(crate) fn check_brightness(field: &'static str, value: u8) -> Result<(), ConfigError> {
    if !(1..=100).contains(&value) {
        return Err(ConfigError::BrightnessOutOfRange { field, value });
    }
    Ok(())
}

/// Checks both brightness bounds and that min is below max.
pub(crate) fn check_brightness_range(min: u8, max: u8) -> Result<(), ConfigError> {
    check_brightness("Minimum brightness", min)?;
    check_brightness("Maximum brightness", max)?;
    if min >= max {
        return Err(ConfigError::InvalidBrightnessRange { min, max });
    }
    Ok(())
}

pub(crate) fn check_count(field: &'static str, actual: u32, min: u32) -> Result<(), ConfigError> {
    if actual < min {
        return Err(ConfigError::TooFewSteps { field, min, actual });
    }
    Ok(())
}

pub(crate) fn check_interval(interval: Duration) -> Result<(), ConfigError> {
    if interval < MIN_STEP_INTERVAL {
        return Err(ConfigError::StepTooShort {
            interval,
            min: MIN_STEP_INTERVAL,
        });
    }
    Ok(())
}

/// `interval * n`, saturating.
pub(crate) fn nth(interval: Duration, n: u64) -> Duration {
    interval.saturating_mul(u32::try_from(n).unwrap_or(u32::MAX))
}
