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
use std::time::Duration;

use super::{
    check_brightness_range, check_count, check_interval, common_builder_methods, Common,
    ConfigError, Effect, Length, Policy, Timing,
};
use crate::{color::lerp_brightness, device::LightState};

/// Sub-steps in one pulse: five up, five down.
pub const STEPS_PER_PULSE: u64 = 10;
const HALF_PULSE: u64 = STEPS_PER_PULSE / 2;

pub const DEFAULT_PULSE_MIN_BRIGHTNESS: u8 = 10;
pub const DEFAULT_PULSE_MAX_BRIGHTNESS: u8 = 100;
pub const DEFAULT_PULSE_DURATION: Duration = Duration::from_millis(2000);
pub const DEFAULT_PULSE_COUNT: u32 = 5;

/// Brightness at the given sub-step of a pulse. Sub-steps 0-4 ramp from min to max,
/// sub-steps 5-9 ramp back down, so the sequence is a triangle wave peaking at sub-step 5.
pub fn pulse_brightness(min: u8, max: u8, sub_step: u64) -> u8 {
    let sub_step = sub_step % STEPS_PER_PULSE;
    if sub_step < HALF_PULSE {
        lerp_brightness(min, max, sub_step as f64 / HALF_PULSE as f64)
    } else {
        lerp_brightness(max, min, (sub_step - HALF_PULSE) as f64 / HALF_PULSE as f64)
    }
}

/// A breathing brightness pulse between two levels.
#[derive(Debug, Clone, PartialEq)]
pub struct PulseConfig {
    min_brightness: u8,
    max_brightness: u8,
    pulse_duration: Duration,
    pulse_count: u32,
    continuous: bool,
}

impl PulseConfig {
    pub fn min_brightness(&self) -> u8 {
        self.min_brightness
    }

    pub fn max_brightness(&self) -> u8 {
        self.max_brightness
    }

    pub fn pulse_duration(&self) -> Duration {
        self.pulse_duration
    }

    pub fn pulse_count(&self) -> u32 {
        self.pulse_count
    }

    pub fn continuous(&self) -> bool {
        self.continuous
    }

    pub fn interval(&self) -> Duration {
        self.pulse_duration / STEPS_PER_PULSE as u32
    }

    /// The light has to be on for brightness changes to show.
    pub(crate) fn initial_state(&self, light_on: bool) -> Option<LightState> {
        (!light_on).then(|| LightState::new().on())
    }

    pub(crate) fn length(&self) -> Length {
        Length::Cycles {
            steps_per_cycle: STEPS_PER_PULSE,
            limit: (!self.continuous).then_some(u64::from(self.pulse_count)),
        }
    }

    pub(crate) fn timing(&self, step: u64) -> Timing {
        if step == 0 {
            Timing::After(Duration::ZERO)
        } else {
            Timing::After(self.interval())
        }
    }

    pub(crate) fn state_for(&self, step: u64) -> LightState {
        LightState::new()
            .brightness(pulse_brightness(
                self.min_brightness,
                self.max_brightness,
                step,
            ))
            .on()
            .transition(self.interval())
    }
}

/// Builds a pulse effect. Preserves the light's state by default.
pub struct PulseBuilder {
    common: Common,
    min_brightness: u8,
    max_brightness: u8,
    pulse_duration: Duration,
    pulse_count: u32,
    continuous: bool,
}

impl Default for PulseBuilder {
    fn default() -> Self {
        PulseBuilder {
            common: Common::preserving(),
            min_brightness: DEFAULT_PULSE_MIN_BRIGHTNESS,
            max_brightness: DEFAULT_PULSE_MAX_BRIGHTNESS,
            pulse_duration: DEFAULT_PULSE_DURATION,
            pulse_count: DEFAULT_PULSE_COUNT,
            continuous: false,
        }
    }
}

impl PulseBuilder {
    common_builder_methods!();

    pub fn min_brightness(mut self, min_brightness: u8) -> Self {
        self.min_brightness = min_brightness;
        self
    }

    pub fn max_brightness(mut self, max_brightness: u8) -> Self {
        self.max_brightness = max_brightness;
        self
    }

    /// Sets the duration of one full up-and-down pulse.
    pub fn pulse_duration(mut self, pulse_duration: Duration) -> Self {
        self.pulse_duration = pulse_duration;
        self
    }

    /// Sets how many pulses to run. Ignored when continuous.
    pub fn pulse_count(mut self, pulse_count: u32) -> Self {
        self.pulse_count = pulse_count;
        self
    }

    /// Pulses until stopped.
    pub fn continuous(mut self, continuous: bool) -> Self {
        self.continuous = continuous;
        self
    }

    pub fn build(self) -> Result<Effect, ConfigError> {
        check_brightness_range(self.min_brightness, self.max_brightness)?;
        if !self.continuous {
            check_count("Pulse count", self.pulse_count, 1)?;
        }

        let config = PulseConfig {
            min_brightness: self.min_brightness,
            max_brightness: self.max_brightness,
            pulse_duration: self.pulse_duration,
            pulse_count: self.pulse_count,
            continuous: self.continuous,
        };
        check_interval(config.interval())?;

        Effect::new(Policy::Pulse(config), self.common)
    }
}
