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
    check_count, check_interval, common_builder_methods, nth, Common, ConfigError, Effect,
    Length, Policy, Timing,
};
use crate::{color::Color, device::LightState};

pub const DEFAULT_FADE_DURATION: Duration = Duration::from_secs(10);
pub const DEFAULT_FADE_STEPS: u32 = 50;
pub const MIN_FADE_STEPS: u32 = 2;

/// A linear fade of a single color.
///
/// A fade of `steps` steps writes exactly `steps` colors: the `from` color is written as the
/// initial state, the remaining steps are spread evenly over the duration and the last one is
/// exactly `to`.
#[derive(Debug, Clone, PartialEq)]
pub struct FadeConfig {
    from: Color,
    to: Color,
    duration: Duration,
    steps: u32,
}

impl FadeConfig {
    pub fn from(&self) -> Color {
        self.from
    }

    pub fn to(&self) -> Color {
        self.to
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// Time between two writes.
    pub fn interval(&self) -> Duration {
        self.duration / (self.steps - 1)
    }

    pub(crate) fn initial_state(&self) -> Option<LightState> {
        Some(LightState::new().color(self.from).on())
    }

    pub(crate) fn length(&self) -> Length {
        Length::Steps(u64::from(self.steps - 1))
    }

    pub(crate) fn timing(&self, step: u64) -> Timing {
        Timing::At(nth(self.interval(), step + 1))
    }

    pub(crate) fn state_for(&self, step: u64) -> LightState {
        LightState::new().color(self.color_at(step + 1)).on()
    }

    /// The color written at the given write index, 0 being the initial state.
    pub fn color_at(&self, index: u64) -> Color {
        let last = u64::from(self.steps - 1);
        if index >= last {
            return self.to;
        }
        self.from.lerp(&self.to, index as f64 / last as f64)
    }
}

/// Builds a fade effect.
pub struct FadeBuilder {
    common: Common,
    from: Option<Color>,
    to: Option<Color>,
    duration: Duration,
    steps: u32,
}

impl Default for FadeBuilder {
    fn default() -> Self {
        FadeBuilder {
            common: Common::default(),
            from: None,
            to: None,
            duration: DEFAULT_FADE_DURATION,
            steps: DEFAULT_FADE_STEPS,
        }
    }
}

impl FadeBuilder {
    common_builder_methods!();

    /// Sets the starting color.
    pub fn from_color(mut self, from: Color) -> Self {
        self.from = Some(from);
        self
    }

    /// Sets the ending color.
    pub fn to_color(mut self, to: Color) -> Self {
        self.to = Some(to);
        self
    }

    /// Sets the total duration of the fade.
    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Sets the number of color writes. More steps make a smoother fade.
    pub fn steps(mut self, steps: u32) -> Self {
        self.steps = steps;
        self
    }

    pub fn build(self) -> Result<Effect, ConfigError> {
        let config = self.config()?;
        Effect::new(Policy::Fade(config), self.common)
    }

    fn config(&self) -> Result<FadeConfig, ConfigError> {
        let from = self.from.ok_or(ConfigError::MissingColor("From color"))?;
        let to = self.to.ok_or(ConfigError::MissingColor("To color"))?;
        check_count("Steps", self.steps, MIN_FADE_STEPS)?;

        let config = FadeConfig {
            from,
            to,
            duration: self.duration,
            steps: self.steps,
        };
        check_interval(config.interval())?;

        Ok(config)
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use crate::device::mock;

    use super::*;

    const RED: Color = Color::new(255, 0, 0);
    const BLUE: Color = Color::new(0, 0, 255);

    fn builder() -> FadeBuilder {
        Effect::fade()
            .light(Arc::new(mock::Light::new("mock-fade")))
            .from_color(RED)
            .to_color(BLUE)
    }

    #[test]
    fn test_defaults() {
        let effect = builder().build().expect("default fade should build");
        let Policy::Fade(config) = effect.policy() else {
            panic!("expected a fade policy");
        };
        assert_eq!(config.duration(), DEFAULT_FADE_DURATION);
        assert_eq!(config.steps(), DEFAULT_FADE_STEPS);
    }

    #[test]
    fn test_validation() {
        assert_eq!(
            Effect::fade().from_color(RED).to_color(BLUE).build().err(),
            Some(ConfigError::MissingLight)
        );
        assert_eq!(
            builder().steps(1).build().err(),
            Some(ConfigError::TooFewSteps {
                field: "Steps",
                min: 2,
                actual: 1
            })
        );
        assert!(matches!(
            builder()
                .duration(Duration::from_millis(90))
                .steps(11)
                .build()
                .err(),
            Some(ConfigError::StepTooShort { .. })
        ));
        assert!(builder()
            .duration(Duration::from_millis(100))
            .steps(11)
            .build()
            .is_ok());

        let missing_to = Effect::fade()
            .light(Arc::new(mock::Light::new("mock-fade")))
            .from_color(RED)
            .build();
        assert_eq!(missing_to.err(), Some(ConfigError::MissingColor("To color")));
    }

    #[test]
    fn test_plan() {
        let effect = builder()
            .duration(Duration::from_millis(500))
            .steps(5)
            .build()
            .expect("fade should build");
        let policy = effect.policy();

        assert_eq!(policy.length(), Length::Steps(4));
        assert_eq!(
            policy.initial_state(true),
            Some(LightState::new().color(RED).on())
        );
        assert_eq!(policy.timing(0), Timing::At(Duration::from_millis(125)));
        assert_eq!(policy.timing(3), Timing::At(Duration::from_millis(500)));
        assert_eq!(policy.state_for(1), LightState::new().color(Color::new(127, 0, 127)).on());
        assert_eq!(policy.state_for(3), LightState::new().color(BLUE).on());
    }

    #[test]
    fn test_last_color_is_exact() {
        let config = FadeConfig {
            from: Color::new(3, 7, 11),
            to: Color::new(254, 1, 128),
            duration: Duration::from_secs(1),
            steps: 7,
        };
        assert_eq!(config.color_at(0), config.from());
        assert_eq!(config.color_at(6), config.to());
    }
}
