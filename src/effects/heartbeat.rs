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
use crate::device::LightState;

/// Two beats per cycle, each one a rise and a fall.
const STEPS_PER_CYCLE: u64 = 4;

pub const DEFAULT_HEARTBEAT_MIN_BRIGHTNESS: u8 = 10;
pub const DEFAULT_HEARTBEAT_MAX_BRIGHTNESS: u8 = 100;
pub const DEFAULT_BEAT_DURATION: Duration = Duration::from_millis(200);
pub const DEFAULT_PAUSE_BETWEEN_BEATS: Duration = Duration::from_millis(150);
pub const DEFAULT_PAUSE_BETWEEN_CYCLES: Duration = Duration::from_millis(600);
pub const DEFAULT_BEAT_COUNT: u32 = 5;

/// A two-beat cardiac pattern.
///
/// One cycle: max, hold for a beat, min, short pause, max, hold for a beat, min, then a
/// longer pause before the next cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct HeartbeatConfig {
    min_brightness: u8,
    max_brightness: u8,
    beat_duration: Duration,
    pause_between_beats: Duration,
    pause_between_cycles: Duration,
    beat_count: u32,
    continuous: bool,
}

impl HeartbeatConfig {
    pub fn min_brightness(&self) -> u8 {
        self.min_brightness
    }

    pub fn max_brightness(&self) -> u8 {
        self.max_brightness
    }

    pub fn beat_duration(&self) -> Duration {
        self.beat_duration
    }

    pub fn pause_between_beats(&self) -> Duration {
        self.pause_between_beats
    }

    pub fn pause_between_cycles(&self) -> Duration {
        self.pause_between_cycles
    }

    pub fn beat_count(&self) -> u32 {
        self.beat_count
    }

    pub fn continuous(&self) -> bool {
        self.continuous
    }

    /// Time from the start of one cycle to the start of the next.
    pub fn cycle_duration(&self) -> Duration {
        self.beat_duration * 2 + self.pause_between_beats + self.pause_between_cycles
    }

    pub(crate) fn length(&self) -> Length {
        Length::Cycles {
            steps_per_cycle: STEPS_PER_CYCLE,
            limit: (!self.continuous).then_some(u64::from(self.beat_count)),
        }
    }

    pub(crate) fn timing(&self, step: u64) -> Timing {
        match step % STEPS_PER_CYCLE {
            0 if step == 0 => Timing::After(Duration::ZERO),
            0 => Timing::After(self.pause_between_cycles),
            2 => Timing::After(self.pause_between_beats),
            _ => Timing::After(self.beat_duration),
        }
    }

    pub(crate) fn state_for(&self, step: u64) -> LightState {
        let brightness = if step % 2 == 0 {
            self.max_brightness
        } else {
            self.min_brightness
        };
        LightState::new().brightness(brightness)
    }
}

/// Builds a heartbeat effect. Beats until stopped unless made non-continuous.
pub struct HeartbeatBuilder {
    common: Common,
    min_brightness: u8,
    max_brightness: u8,
    beat_duration: Duration,
    pause_between_beats: Duration,
    pause_between_cycles: Duration,
    beat_count: u32,
    continuous: bool,
}

impl Default for HeartbeatBuilder {
    fn default() -> Self {
        HeartbeatBuilder {
            common: Common::default(),
            min_brightness: DEFAULT_HEARTBEAT_MIN_BRIGHTNESS,
            max_brightness: DEFAULT_HEARTBEAT_MAX_BRIGHTNESS,
            beat_duration: DEFAULT_BEAT_DURATION,
            pause_between_beats: DEFAULT_PAUSE_BETWEEN_BEATS,
            pause_between_cycles: DEFAULT_PAUSE_BETWEEN_CYCLES,
            beat_count: DEFAULT_BEAT_COUNT,
            continuous: true,
        }
    }
}

impl HeartbeatBuilder {
    common_builder_methods!();

    pub fn min_brightness(mut self, min_brightness: u8) -> Self {
        self.min_brightness = min_brightness;
        self
    }

    pub fn max_brightness(mut self, max_brightness: u8) -> Self {
        self.max_brightness = max_brightness;
        self
    }

    /// How long each beat holds at maximum brightness.
    pub fn beat_duration(mut self, beat_duration: Duration) -> Self {
        self.beat_duration = beat_duration;
        self
    }

    pub fn pause_between_beats(mut self, pause_between_beats: Duration) -> Self {
        self.pause_between_beats = pause_between_beats;
        self
    }

    pub fn pause_between_cycles(mut self, pause_between_cycles: Duration) -> Self {
        self.pause_between_cycles = pause_between_cycles;
        self
    }

    /// Sets how many two-beat cycles to run and turns off continuous mode.
    pub fn beat_count(mut self, beat_count: u32) -> Self {
        self.beat_count = beat_count;
        self.continuous = false;
        self
    }

    pub fn continuous(mut self, continuous: bool) -> Self {
        self.continuous = continuous;
        self
    }

    pub fn build(self) -> Result<Effect, ConfigError> {
        check_brightness_range(self.min_brightness, self.max_brightness)?;
        check_interval(self.beat_duration)?;
        if !self.continuous {
            check_count("Beat count", self.beat_count, 1)?;
        }

        let config = HeartbeatConfig {
            min_brightness: self.min_brightness,
            max_brightness: self.max_brightness,
            beat_duration: self.beat_duration,
            pause_between_beats: self.pause_between_beats,
            pause_between_cycles: self.pause_between_cycles,
            beat_count: self.beat_count,
            continuous: self.continuous,
        };

        Effect::new(Policy::Heartbeat(config), self.common)
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use crate::device::mock;

    use super::*;

    fn config() -> HeartbeatConfig {
        HeartbeatConfig {
            min_brightness: 10,
            max_brightness: 90,
            beat_duration: Duration::from_millis(200),
            pause_between_beats: Duration::from_millis(150),
            pause_between_cycles: Duration::from_millis(600),
            beat_count: 2,
            continuous: false,
        }
    }

    #[test]
    fn test_cycle_pattern() {
        let config = config();

        let brightness: Vec<Option<u8>> = (0..8)
            .map(|step| config.state_for(step).brightness_value())
            .collect();
        assert_eq!(
            brightness,
            vec![90, 10, 90, 10, 90, 10, 90, 10]
                .into_iter()
                .map(Some)
                .collect::<Vec<_>>()
        );

        let timings: Vec<Timing> = (0..8).map(|step| config.timing(step)).collect();
        let ms = |ms| Timing::After(Duration::from_millis(ms));
        assert_eq!(
            timings,
            vec![ms(0), ms(200), ms(150), ms(200), ms(600), ms(200), ms(150), ms(200)]
        );

        assert_eq!(config.cycle_duration(), Duration::from_millis(1150));
        assert_eq!(
            config.length(),
            Length::Cycles {
                steps_per_cycle: 4,
                limit: Some(2)
            }
        );
    }

    #[test]
    fn test_continuous_by_default() {
        let effect = Effect::heartbeat()
            .light(Arc::new(mock::Light::new("mock-heartbeat")))
            .build()
            .expect("heartbeat should build");
        let Policy::Heartbeat(config) = effect.policy() else {
            panic!("expected a heartbeat policy");
        };
        assert!(config.continuous());
        assert_eq!(
            config.length(),
            Length::Cycles {
                steps_per_cycle: 4,
                limit: None
            }
        );
    }

    #[test]
    fn test_validation() {
        let light = Arc::new(mock::Light::new("mock-heartbeat"));

        assert_eq!(
            Effect::heartbeat()
                .light(light.clone())
                .min_brightness(100)
                .max_brightness(10)
                .build()
                .err(),
            Some(ConfigError::InvalidBrightnessRange { min: 100, max: 10 })
        );
        assert!(matches!(
            Effect::heartbeat()
                .light(light.clone())
                .beat_duration(Duration::from_millis(5))
                .build()
                .err(),
            Some(ConfigError::StepTooShort { .. })
        ));
        assert!(matches!(
            Effect::heartbeat().light(light.clone()).beat_count(0).build().err(),
            Some(ConfigError::TooFewSteps { .. })
        ));
        assert!(Effect::heartbeat()
            .light(light)
            .beat_count(3)
            .pause_between_beats(Duration::ZERO)
            .build()
            .is_ok());
    }
}
