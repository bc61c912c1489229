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
    check_count, check_interval, common_builder_methods, Common, ConfigError, Effect, Length,
    Policy, Timing,
};
use crate::{color::Color, device::LightState};

/// One flash is a switch to the first color and a switch to the second.
const SWITCHES_PER_FLASH: u64 = 2;

pub const DEFAULT_FLASH_DURATION: Duration = Duration::from_millis(500);
pub const DEFAULT_FLASH_COUNT: u32 = 5;

/// Alternates between two colors at a fixed period.
#[derive(Debug, Clone, PartialEq)]
pub struct FlashConfig {
    first: Color,
    second: Color,
    flash_duration: Duration,
    flash_count: u32,
    continuous: bool,
    end_on_second: bool,
}

impl FlashConfig {
    pub fn first(&self) -> Color {
        self.first
    }

    pub fn second(&self) -> Color {
        self.second
    }

    /// How long each color is shown.
    pub fn flash_duration(&self) -> Duration {
        self.flash_duration
    }

    pub fn flash_count(&self) -> u32 {
        self.flash_count
    }

    pub fn continuous(&self) -> bool {
        self.continuous
    }

    /// Whether the light is left on the second color however the run ends.
    pub fn end_on_second(&self) -> bool {
        self.end_on_second
    }

    pub(crate) fn final_state(&self) -> Option<LightState> {
        self.end_on_second.then(|| LightState::new().color(self.second).on())
    }

    pub(crate) fn length(&self) -> Length {
        Length::Cycles {
            steps_per_cycle: SWITCHES_PER_FLASH,
            limit: (!self.continuous).then_some(u64::from(self.flash_count)),
        }
    }

    pub(crate) fn timing(&self, step: u64) -> Timing {
        if step == 0 {
            Timing::After(Duration::ZERO)
        } else {
            Timing::After(self.flash_duration)
        }
    }

    pub(crate) fn state_for(&self, step: u64) -> LightState {
        let color = if step % SWITCHES_PER_FLASH == 0 {
            self.first
        } else {
            self.second
        };
        LightState::new().color(color).on()
    }
}

/// Builds a flash effect. Flashes between black and white unless told otherwise.
pub struct FlashBuilder {
    common: Common,
    first: Color,
    second: Color,
    flash_duration: Duration,
    flash_count: u32,
    continuous: bool,
    end_on_second: bool,
}

impl Default for FlashBuilder {
    fn default() -> Self {
        FlashBuilder {
            common: Common::default(),
            first: Color::BLACK,
            second: Color::WHITE,
            flash_duration: DEFAULT_FLASH_DURATION,
            flash_count: DEFAULT_FLASH_COUNT,
            continuous: false,
            end_on_second: false,
        }
    }
}

impl FlashBuilder {
    common_builder_methods!();

    pub fn first_color(mut self, first: Color) -> Self {
        self.first = first;
        self
    }

    pub fn second_color(mut self, second: Color) -> Self {
        self.second = second;
        self
    }

    pub fn flash_duration(mut self, flash_duration: Duration) -> Self {
        self.flash_duration = flash_duration;
        self
    }

    /// Sets how many full on/off flashes to run. Ignored when continuous.
    pub fn flash_count(mut self, flash_count: u32) -> Self {
        self.flash_count = flash_count;
        self
    }

    pub fn continuous(mut self, continuous: bool) -> Self {
        self.continuous = continuous;
        self
    }

    /// Leaves the light on the second color when the flash finishes or is stopped. A preserved
    /// state is still restored afterwards.
    pub fn end_on_second_color(mut self, end_on_second: bool) -> Self {
        self.end_on_second = end_on_second;
        self
    }

    pub fn build(self) -> Result<Effect, ConfigError> {
        check_interval(self.flash_duration)?;
        if !self.continuous {
            check_count("Flash count", self.flash_count, 1)?;
        }

        let config = FlashConfig {
            first: self.first,
            second: self.second,
            flash_duration: self.flash_duration,
            flash_count: self.flash_count,
            continuous: self.continuous,
            end_on_second: self.end_on_second,
        };

        Effect::new(Policy::Flash(config), self.common)
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use crate::device::mock;

    use super::*;

    #[test]
    fn test_alternates() {
        let effect = Effect::flash()
            .light(Arc::new(mock::Light::new("mock-flash")))
            .first_color(Color::new(255, 0, 0))
            .second_color(Color::new(0, 255, 0))
            .flash_count(2)
            .build()
            .expect("flash should build");
        let policy = effect.policy();

        let colors: Vec<Option<Color>> = (0..4)
            .map(|step| policy.state_for(step).color_value())
            .collect();
        assert_eq!(
            colors,
            vec![
                Some(Color::new(255, 0, 0)),
                Some(Color::new(0, 255, 0)),
                Some(Color::new(255, 0, 0)),
                Some(Color::new(0, 255, 0)),
            ]
        );
        assert_eq!(
            policy.length(),
            Length::Cycles {
                steps_per_cycle: 2,
                limit: Some(2)
            }
        );
        assert_eq!(policy.timing(0), Timing::After(Duration::ZERO));
        assert_eq!(policy.timing(1), Timing::After(DEFAULT_FLASH_DURATION));
        assert_eq!(policy.initial_state(true), None);
        assert_eq!(policy.final_state(), None);
    }

    #[test]
    fn test_end_on_second_color() {
        let effect = Effect::flash()
            .light(Arc::new(mock::Light::new("mock-flash")))
            .second_color(Color::new(0, 0, 255))
            .end_on_second_color(true)
            .build()
            .expect("flash should build");

        assert_eq!(
            effect.policy().final_state(),
            Some(LightState::new().color(Color::new(0, 0, 255)).on())
        );
    }

    #[test]
    fn test_validation() {
        let light = Arc::new(mock::Light::new("mock-flash"));

        assert!(matches!(
            Effect::flash()
                .light(light.clone())
                .flash_duration(Duration::from_millis(9))
                .build()
                .err(),
            Some(ConfigError::StepTooShort { .. })
        ));
        assert!(matches!(
            Effect::flash().light(light.clone()).flash_count(0).build().err(),
            Some(ConfigError::TooFewSteps { .. })
        ));
        assert!(Effect::flash()
            .light(light)
            .flash_count(0)
            .continuous(true)
            .build()
            .is_ok());
    }
}
