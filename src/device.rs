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
use std::{fmt, time::Duration};

use serde::{Serialize, Serializer};

use crate::color::Color;

pub mod mock;

/// Errors a light may report when a state update fails.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("Light unreachable: {0}")]
    Unreachable(String),

    #[error("Light rejected update: {0}")]
    Rejected(String),
}

/// Effects the device can render natively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NativeEffect {
    Fire,
    Candle,
    Sparkle,
    Prism,
    Opal,
    Glisten,
    Underwater,
    Cosmos,
    Sunbeam,
    Enchant,
    NoEffect,
}

/// A single atomic update to a light. Unset fields are left untouched by the device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LightState {
    #[serde(skip_serializing_if = "Option::is_none")]
    on: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    brightness: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    effect: Option<NativeEffect>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_transition"
    )]
    transition: Option<Duration>,
}

impl LightState {
    /// Creates an empty update.
    pub fn new() -> LightState {
        LightState::default()
    }

    pub fn on(mut self) -> LightState {
        self.on = Some(true);
        self
    }

    pub fn off(mut self) -> LightState {
        self.on = Some(false);
        self
    }

    /// Sets the power state explicitly.
    pub fn power(mut self, on: bool) -> LightState {
        self.on = Some(on);
        self
    }

    /// Sets the brightness percentage.
    pub fn brightness(mut self, brightness: u8) -> LightState {
        self.brightness = Some(brightness);
        self
    }

    pub fn color(mut self, color: Color) -> LightState {
        self.color = Some(color);
        self
    }

    pub fn effect(mut self, effect: NativeEffect) -> LightState {
        self.effect = Some(effect);
        self
    }

    /// Asks the device to glide to this state over the given duration.
    pub fn transition(mut self, transition: Duration) -> LightState {
        self.transition = Some(transition);
        self
    }

    pub fn power_value(&self) -> Option<bool> {
        self.on
    }

    pub fn brightness_value(&self) -> Option<u8> {
        self.brightness
    }

    pub fn color_value(&self) -> Option<Color> {
        self.color
    }

    pub fn effect_value(&self) -> Option<NativeEffect> {
        self.effect
    }

    pub fn transition_value(&self) -> Option<Duration> {
        self.transition
    }

    /// Returns true if the update would change nothing.
    pub fn is_empty(&self) -> bool {
        *self == LightState::default()
    }
}

impl fmt::Display for LightState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => write!(f, "{}", json),
            Err(_) => write!(f, "{:?}", self),
        }
    }
}

fn serialize_transition<S>(transition: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match transition {
        Some(transition) => serializer.serialize_u128(transition.as_millis()),
        None => serializer.serialize_none(),
    }
}

/// The capability set the effects need from a light. Writes are expected to be
/// quick and non-blocking from the caller's point of view.
pub trait Light: fmt::Display + Send + Sync {
    /// Returns the name of the light.
    fn name(&self) -> String;

    /// Applies the given state as a single update.
    fn apply_state(&self, state: &LightState) -> Result<(), DeviceError>;

    /// Returns whether the light is currently on.
    fn is_on(&self) -> bool;

    /// Captures the state that should be restored after an effect. Brightness and
    /// color can't be read back from most lights, so only power is captured by default.
    fn capture_state(&self) -> LightState {
        LightState::new().power(self.is_on())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_light_state_json() {
        let state = LightState::new()
            .on()
            .brightness(42)
            .color(Color::new(1, 2, 3))
            .transition(Duration::from_millis(200));
        assert_eq!(
            state.to_string(),
            r#"{"on":true,"brightness":42,"color":{"r":1,"g":2,"b":3},"transition":200}"#
        );

        let state = LightState::new().effect(NativeEffect::NoEffect);
        assert_eq!(state.to_string(), r#"{"effect":"no_effect"}"#);
    }

    #[test]
    fn test_light_state_empty() {
        assert!(LightState::new().is_empty());
        assert!(!LightState::new().off().is_empty());
        assert_eq!(LightState::new().power(false), LightState::new().off());
    }

    #[test]
    fn test_default_capture_is_power_only() {
        let light = mock::Light::new("mock-capture");
        light.set_on(false);
        assert_eq!(light.capture_state(), LightState::new().off());
        light.set_on(true);
        assert_eq!(light.capture_state(), LightState::new().on());
    }
}
