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
use std::{sync::Arc, time::Duration};

use duration_string::DurationString;
use serde::Deserialize;

use super::ProfileError;
use crate::{
    color::Color,
    device::Light,
    effects::{
        fade::{DEFAULT_FADE_DURATION, DEFAULT_FADE_STEPS},
        flash::{DEFAULT_FLASH_COUNT, DEFAULT_FLASH_DURATION},
        heartbeat::{
            DEFAULT_BEAT_COUNT, DEFAULT_BEAT_DURATION, DEFAULT_HEARTBEAT_MAX_BRIGHTNESS,
            DEFAULT_HEARTBEAT_MIN_BRIGHTNESS, DEFAULT_PAUSE_BETWEEN_BEATS,
            DEFAULT_PAUSE_BETWEEN_CYCLES,
        },
        pulse::{
            DEFAULT_PULSE_COUNT, DEFAULT_PULSE_DURATION, DEFAULT_PULSE_MAX_BRIGHTNESS,
            DEFAULT_PULSE_MIN_BRIGHTNESS,
        },
        sunrise::{
            DEFAULT_SUNRISE_DURATION, DEFAULT_SUNRISE_END_BRIGHTNESS,
            DEFAULT_SUNRISE_START_BRIGHTNESS, DEFAULT_SUNRISE_STEPS,
        },
        CompletionCallback, Effect,
    },
};

/// A YAML representation of an effect, tagged by its type.
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum Profile {
    Fade(Fade),
    Sunrise(Sunrise),
    Pulse(Pulse),
    Heartbeat(Heartbeat),
    Flash(Flash),
}

impl Profile {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Profile::Fade(_) => "fade",
            Profile::Sunrise(_) => "sunrise",
            Profile::Pulse(_) => "pulse",
            Profile::Heartbeat(_) => "heartbeat",
            Profile::Flash(_) => "flash",
        }
    }

    pub(crate) fn build(
        &self,
        light: Arc<dyn Light>,
        on_complete: Option<CompletionCallback>,
    ) -> Result<Effect, ProfileError> {
        match self {
            Profile::Fade(fade) => fade.build(light, on_complete),
            Profile::Sunrise(sunrise) => sunrise.build(light, on_complete),
            Profile::Pulse(pulse) => pulse.build(light, on_complete),
            Profile::Heartbeat(heartbeat) => heartbeat.build(light, on_complete),
            Profile::Flash(flash) => flash.build(light, on_complete),
        }
    }
}

/// Parses an optional duration string, falling back to the default.
fn duration(
    field: &'static str,
    value: &Option<String>,
    default: Duration,
) -> Result<Duration, ProfileError> {
    value.as_ref().map_or(Ok(default), |value| {
        Ok(DurationString::from_string(value.clone())
            .map_err(|source| ProfileError::Duration { field, source })?
            .into())
    })
}

/// Parses an optional hex or named color.
fn color(field: &'static str, value: &Option<String>) -> Result<Option<Color>, ProfileError> {
    value
        .as_ref()
        .map(|value| Color::parse(value).map_err(|reason| ProfileError::Color { field, reason }))
        .transpose()
}

/// A YAML representation of a fade.
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct Fade {
    /// The starting color. Required.
    from: Option<String>,

    /// The ending color. Required.
    to: Option<String>,

    duration: Option<String>,
    steps: Option<u32>,
    preserve_state: Option<bool>,
}

impl Fade {
    fn build(
        &self,
        light: Arc<dyn Light>,
        on_complete: Option<CompletionCallback>,
    ) -> Result<Effect, ProfileError> {
        let mut builder = Effect::fade()
            .light(light)
            .completion_callback(on_complete)
            .duration(duration("duration", &self.duration, DEFAULT_FADE_DURATION)?)
            .steps(self.steps.unwrap_or(DEFAULT_FADE_STEPS))
            .preserve_state(self.preserve_state.unwrap_or(false));
        if let Some(from) = color("from", &self.from)? {
            builder = builder.from_color(from);
        }
        if let Some(to) = color("to", &self.to)? {
            builder = builder.to_color(to);
        }
        Ok(builder.build()?)
    }
}

/// A YAML representation of a sunrise.
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct Sunrise {
    duration: Option<String>,
    start_brightness: Option<u8>,
    end_brightness: Option<u8>,
    steps: Option<u32>,
    preserve_state: Option<bool>,
}

impl Sunrise {
    fn build(
        &self,
        light: Arc<dyn Light>,
        on_complete: Option<CompletionCallback>,
    ) -> Result<Effect, ProfileError> {
        Ok(Effect::sunrise()
            .light(light)
            .completion_callback(on_complete)
            .duration(duration(
                "duration",
                &self.duration,
                DEFAULT_SUNRISE_DURATION,
            )?)
            .start_brightness(
                self.start_brightness
                    .unwrap_or(DEFAULT_SUNRISE_START_BRIGHTNESS),
            )
            .end_brightness(self.end_brightness.unwrap_or(DEFAULT_SUNRISE_END_BRIGHTNESS))
            .steps(self.steps.unwrap_or(DEFAULT_SUNRISE_STEPS))
            .preserve_state(self.preserve_state.unwrap_or(false))
            .build()?)
    }
}

/// A YAML representation of a pulse. Preserves the light's state unless told otherwise.
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct Pulse {
    min_brightness: Option<u8>,
    max_brightness: Option<u8>,

    /// The duration of one full pulse.
    pulse_duration: Option<String>,
    pulse_count: Option<u32>,
    continuous: Option<bool>,
    preserve_state: Option<bool>,
}

impl Pulse {
    fn build(
        &self,
        light: Arc<dyn Light>,
        on_complete: Option<CompletionCallback>,
    ) -> Result<Effect, ProfileError> {
        Ok(Effect::pulse()
            .light(light)
            .completion_callback(on_complete)
            .min_brightness(self.min_brightness.unwrap_or(DEFAULT_PULSE_MIN_BRIGHTNESS))
            .max_brightness(self.max_brightness.unwrap_or(DEFAULT_PULSE_MAX_BRIGHTNESS))
            .pulse_duration(duration(
                "pulse_duration",
                &self.pulse_duration,
                DEFAULT_PULSE_DURATION,
            )?)
            .pulse_count(self.pulse_count.unwrap_or(DEFAULT_PULSE_COUNT))
            .continuous(self.continuous.unwrap_or(false))
            .preserve_state(self.preserve_state.unwrap_or(true))
            .build()?)
    }
}

/// A YAML representation of a heartbeat.
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct Heartbeat {
    min_brightness: Option<u8>,
    max_brightness: Option<u8>,
    beat_duration: Option<String>,
    pause_between_beats: Option<String>,
    pause_between_cycles: Option<String>,
    beat_count: Option<u32>,

    /// Defaults to true unless a beat count is given.
    continuous: Option<bool>,
    preserve_state: Option<bool>,
}

impl Heartbeat {
    fn continuous(&self) -> bool {
        self.continuous.unwrap_or(self.beat_count.is_none())
    }

    fn build(
        &self,
        light: Arc<dyn Light>,
        on_complete: Option<CompletionCallback>,
    ) -> Result<Effect, ProfileError> {
        Ok(Effect::heartbeat()
            .light(light)
            .completion_callback(on_complete)
            .min_brightness(
                self.min_brightness
                    .unwrap_or(DEFAULT_HEARTBEAT_MIN_BRIGHTNESS),
            )
            .max_brightness(
                self.max_brightness
                    .unwrap_or(DEFAULT_HEARTBEAT_MAX_BRIGHTNESS),
            )
            .beat_duration(duration(
                "beat_duration",
                &self.beat_duration,
                DEFAULT_BEAT_DURATION,
            )?)
            .pause_between_beats(duration(
                "pause_between_beats",
                &self.pause_between_beats,
                DEFAULT_PAUSE_BETWEEN_BEATS,
            )?)
            .pause_between_cycles(duration(
                "pause_between_cycles",
                &self.pause_between_cycles,
                DEFAULT_PAUSE_BETWEEN_CYCLES,
            )?)
            // Setting the count clears continuous, so it has to come first.
            .beat_count(self.beat_count.unwrap_or(DEFAULT_BEAT_COUNT))
            .continuous(self.continuous())
            .preserve_state(self.preserve_state.unwrap_or(false))
            .build()?)
    }
}

/// A YAML representation of a flash.
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct Flash {
    first_color: Option<String>,
    second_color: Option<String>,

    /// How long each color is shown.
    flash_duration: Option<String>,
    flash_count: Option<u32>,
    continuous: Option<bool>,

    /// Leave the light on the second color when the flash ends.
    end_on_second_color: Option<bool>,
    preserve_state: Option<bool>,
}

impl Flash {
    fn build(
        &self,
        light: Arc<dyn Light>,
        on_complete: Option<CompletionCallback>,
    ) -> Result<Effect, ProfileError> {
        Ok(Effect::flash()
            .light(light)
            .completion_callback(on_complete)
            .first_color(color("first_color", &self.first_color)?.unwrap_or(Color::BLACK))
            .second_color(color("second_color", &self.second_color)?.unwrap_or(Color::WHITE))
            .flash_duration(duration(
                "flash_duration",
                &self.flash_duration,
                DEFAULT_FLASH_DURATION,
            )?)
            .flash_count(self.flash_count.unwrap_or(DEFAULT_FLASH_COUNT))
            .continuous(self.continuous.unwrap_or(false))
            .end_on_second_color(self.end_on_second_color.unwrap_or(false))
            .preserve_state(self.preserve_state.unwrap_or(false))
            .build()?)
    }
}
