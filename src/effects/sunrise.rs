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
    check_brightness, check_count, check_interval, common_builder_methods, nth, Common,
    ConfigError, Effect, Length, Policy, Timing,
};
use crate::{
    color::{lerp_brightness, palette, Color},
    device::LightState,
};

pub const DEFAULT_SUNRISE_DURATION: Duration = Duration::from_secs(20 * 60);
pub const DEFAULT_SUNRISE_START_BRIGHTNESS: u8 = 1;
pub const DEFAULT_SUNRISE_END_BRIGHTNESS: u8 = 100;
pub const DEFAULT_SUNRISE_STEPS: u32 = 100;
pub const MIN_SUNRISE_STEPS: u32 = 10;

/// End of the deep red to warm orange segment.
const EARLY_END: f64 = 0.25;
/// End of the warm orange to bright orange segment.
const MID_END: f64 = 0.60;

/// The sunrise color at the given progress through the effect.
///
/// | progress     | from          | to            |
/// |--------------|---------------|---------------|
/// | [0, 0.25)    | deep red      | warm orange   |
/// | [0.25, 0.60) | warm orange   | bright orange |
/// | [0.60, 1.0]  | bright orange | warm yellow   |
pub fn sunrise_color(progress: f64) -> Color {
    if progress < EARLY_END {
        palette::DEEP_RED.lerp(&palette::WARM_ORANGE, progress / EARLY_END)
    } else if progress < MID_END {
        palette::WARM_ORANGE.lerp(
            &palette::BRIGHT_ORANGE,
            (progress - EARLY_END) / (MID_END - EARLY_END),
        )
    } else {
        palette::BRIGHT_ORANGE.lerp(&palette::WARM_YELLOW, (progress - MID_END) / (1.0 - MID_END))
    }
}

/// A slow color and brightness ramp imitating a sunrise.
#[derive(Debug, Clone, PartialEq)]
pub struct SunriseConfig {
    duration: Duration,
    start_brightness: u8,
    end_brightness: u8,
    steps: u32,
}

impl SunriseConfig {
    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn start_brightness(&self) -> u8 {
        self.start_brightness
    }

    pub fn end_brightness(&self) -> u8 {
        self.end_brightness
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    pub fn interval(&self) -> Duration {
        self.duration / self.steps
    }

    pub(crate) fn initial_state(&self) -> Option<LightState> {
        Some(
            LightState::new()
                .color(palette::DEEP_RED)
                .brightness(self.start_brightness)
                .on(),
        )
    }

    pub(crate) fn length(&self) -> Length {
        Length::Steps(u64::from(self.steps))
    }

    pub(crate) fn timing(&self, step: u64) -> Timing {
        Timing::At(nth(self.interval(), step + 1))
    }

    pub(crate) fn state_for(&self, step: u64) -> LightState {
        let progress = (step + 1) as f64 / f64::from(self.steps);
        LightState::new()
            .color(sunrise_color(progress))
            .brightness(lerp_brightness(
                self.start_brightness,
                self.end_brightness,
                progress,
            ))
            .on()
    }
}

/// Builds a sunrise effect.
pub struct SunriseBuilder {
    common: Common,
    duration: Duration,
    start_brightness: u8,
    end_brightness: u8,
    steps: u32,
}

impl Default for SunriseBuilder {
    fn default() -> Self {
        SunriseBuilder {
            common: Common::default(),
            duration: DEFAULT_SUNRISE_DURATION,
            start_brightness: DEFAULT_SUNRISE_START_BRIGHTNESS,
            end_brightness: DEFAULT_SUNRISE_END_BRIGHTNESS,
            steps: DEFAULT_SUNRISE_STEPS,
        }
    }
}

impl SunriseBuilder {
    common_builder_methods!();

    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn start_brightness(mut self, start_brightness: u8) -> Self {
        self.start_brightness = start_brightness;
        self
    }

    pub fn end_brightness(mut self, end_brightness: u8) -> Self {
        self.end_brightness = end_brightness;
        self
    }

    pub fn steps(mut self, steps: u32) -> Self {
        self.steps = steps;
        self
    }

    pub fn build(self) -> Result<Effect, ConfigError> {
        check_brightness("Start brightness", self.start_brightness)?;
        check_brightness("End brightness", self.end_brightness)?;
        if self.start_brightness >= self.end_brightness {
            return Err(ConfigError::InvalidBrightnessRange {
                min: self.start_brightness,
                max: self.end_brightness,
            });
        }
        check_count("Steps", self.steps, MIN_SUNRISE_STEPS)?;

        let config = SunriseConfig {
            duration: self.duration,
            start_brightness: self.start_brightness,
            end_brightness: self.end_brightness,
            steps: self.steps,
        };
        check_interval(config.interval())?;

        Effect::new(Policy::Sunrise(config), self.common)
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use crate::device::mock;

    use super::*;

    #[test]
    fn test_sunrise_segments() {
        assert_eq!(sunrise_color(0.0), palette::DEEP_RED);
        assert_eq!(sunrise_color(0.25), palette::WARM_ORANGE);
        assert_eq!(sunrise_color(0.60), palette::BRIGHT_ORANGE);
        assert_eq!(sunrise_color(1.0), palette::WARM_YELLOW);

        // Halfway through the first segment.
        assert_eq!(sunrise_color(0.125), Color::new(140, 50, 0));
    }

    #[test]
    fn test_sunrise_only_brightens() {
        let mut previous = sunrise_color(0.0);
        for i in 1..=200 {
            let current = sunrise_color(f64::from(i) / 200.0);
            assert!(current.r >= previous.r, "red dropped at {}", i);
            assert!(current.g >= previous.g, "green dropped at {}", i);
            assert!(current.b >= previous.b, "blue dropped at {}", i);
            previous = current;
        }
    }

    #[test]
    fn test_validation() {
        let light = Arc::new(mock::Light::new("mock-sunrise"));

        assert!(Effect::sunrise().light(light.clone()).build().is_ok());
        assert_eq!(
            Effect::sunrise()
                .light(light.clone())
                .start_brightness(0)
                .build()
                .err(),
            Some(ConfigError::BrightnessOutOfRange {
                field: "Start brightness",
                value: 0
            })
        );
        assert_eq!(
            Effect::sunrise()
                .light(light.clone())
                .start_brightness(60)
                .end_brightness(40)
                .build()
                .err(),
            Some(ConfigError::InvalidBrightnessRange { min: 60, max: 40 })
        );
        assert!(matches!(
            Effect::sunrise().light(light.clone()).steps(9).build().err(),
            Some(ConfigError::TooFewSteps { min: 10, .. })
        ));
        assert!(matches!(
            Effect::sunrise()
                .light(light)
                .duration(Duration::from_millis(500))
                .steps(100)
                .build()
                .err(),
            Some(ConfigError::StepTooShort { .. })
        ));
    }

    #[test]
    fn test_plan() {
        let effect = Effect::sunrise()
            .light(Arc::new(mock::Light::new("mock-sunrise")))
            .duration(Duration::from_secs(10))
            .start_brightness(1)
            .end_brightness(100)
            .steps(10)
            .build()
            .expect("sunrise should build");
        let policy = effect.policy();

        assert_eq!(policy.length(), Length::Steps(10));
        assert_eq!(
            policy.initial_state(false),
            Some(
                LightState::new()
                    .color(palette::DEEP_RED)
                    .brightness(1)
                    .on()
            )
        );
        assert_eq!(policy.timing(0), Timing::At(Duration::from_secs(1)));
        assert_eq!(policy.timing(9), Timing::At(Duration::from_secs(10)));
        assert_eq!(
            policy.state_for(9),
            LightState::new()
                .color(palette::WARM_YELLOW)
                .brightness(100)
                .on()
        );
    }
}
