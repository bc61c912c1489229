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

/// Invalid effect parameters. Always reported by a builder, never by a running effect.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("A light must be specified")]
    MissingLight,

    #[error("{0} must be specified")]
    MissingColor(&'static str),

    #[error("{field} must be between 1 and 100, got {value}")]
    BrightnessOutOfRange { field: &'static str, value: u8 },

    #[error("Minimum brightness {min} must be less than maximum brightness {max}")]
    InvalidBrightnessRange { min: u8, max: u8 },

    #[error("{field} must be at least {min}, got {actual}")]
    TooFewSteps {
        field: &'static str,
        min: u32,
        actual: u32,
    },

    #[error("Step interval {interval:?} is shorter than the minimum of {min:?}")]
    StepTooShort { interval: Duration, min: Duration },
}

/// Errors reported synchronously by an effect controller.
#[derive(Debug, thiserror::Error)]
pub enum EffectError {
    #[error("Effect is already running")]
    AlreadyRunning,

    #[error("Unable to schedule effect: {0}")]
    Scheduler(String),
}
