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
use std::{fs, path::Path, str::FromStr, sync::Arc};

use tracing::debug;

use crate::{
    device::Light,
    effects::{Completion, Effect},
};

mod effect;
mod error;

pub use error::ProfileError;

/// An effect described in YAML. Building it goes through the same builders, and so the same
/// validation, as effects built in code.
///
/// ```yaml
/// type: pulse
/// min_brightness: 20
/// pulse_duration: 1s
/// continuous: true
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct EffectProfile {
    profile: effect::Profile,
}

impl EffectProfile {
    /// The effect type named by the profile.
    pub fn kind(&self) -> &'static str {
        self.profile.kind()
    }

    /// Builds an effect driving the given light.
    pub fn build(&self, light: Arc<dyn Light>) -> Result<Effect, ProfileError> {
        self.profile.build(light, None)
    }

    /// Builds an effect driving the given light that reports its completion to `on_complete`.
    pub fn build_with_callback<F>(
        &self,
        light: Arc<dyn Light>,
        on_complete: F,
    ) -> Result<Effect, ProfileError>
    where
        F: Fn(&Completion) + Send + Sync + 'static,
    {
        self.profile.build(light, Some(Arc::new(on_complete)))
    }
}

impl FromStr for EffectProfile {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(EffectProfile {
            profile: serde_yml::from_str(s)?,
        })
    }
}

/// Loads an effect profile from a YAML file.
pub fn load_profile(path: &Path) -> Result<EffectProfile, ProfileError> {
    let contents = fs::read_to_string(path).map_err(|source| ProfileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let profile: EffectProfile = contents.parse()?;
    debug!(path = %path.display(), kind = profile.kind(), "Loaded effect profile.");
    Ok(profile)
}

#[cfg(test)]
mod test {
    use std::{io::Write, time::Duration};

    use crate::{
        color::Color,
        device::mock,
        effects::{ConfigError, Policy},
    };

    use super::*;

    fn build(yaml: &str) -> Result<Effect, ProfileError> {
        let profile: EffectProfile = yaml.parse()?;
        profile.build(Arc::new(mock::Light::new("mock-profile")))
    }

    #[test]
    fn test_fade_profile() -> Result<(), Box<dyn std::error::Error>> {
        let effect = build(
            r##"
type: fade
from: red
to: "#0000ff"
duration: 2s
steps: 5
"##,
        )?;

        let Policy::Fade(config) = effect.policy() else {
            panic!("expected a fade policy");
        };
        assert_eq!(config.from(), Color::new(255, 0, 0));
        assert_eq!(config.to(), Color::new(0, 0, 255));
        assert_eq!(config.duration(), Duration::from_secs(2));
        assert_eq!(config.steps(), 5);
        Ok(())
    }

    #[test]
    fn test_defaults_follow_builders() -> Result<(), Box<dyn std::error::Error>> {
        let pulse = build("type: pulse")?;
        let Policy::Pulse(config) = pulse.policy() else {
            panic!("expected a pulse policy");
        };
        assert_eq!(config.min_brightness(), 10);
        assert_eq!(config.max_brightness(), 100);
        assert_eq!(config.pulse_duration(), Duration::from_millis(2000));
        assert_eq!(config.pulse_count(), 5);
        assert!(!config.continuous());

        let heartbeat = build("type: heartbeat")?;
        let Policy::Heartbeat(config) = heartbeat.policy() else {
            panic!("expected a heartbeat policy");
        };
        assert!(config.continuous());

        let heartbeat = build("type: heartbeat\nbeat_count: 3")?;
        let Policy::Heartbeat(config) = heartbeat.policy() else {
            panic!("expected a heartbeat policy");
        };
        assert!(!config.continuous());
        assert_eq!(config.beat_count(), 3);

        let flash = build("type: flash\nfirst_color: warm_yellow")?;
        let Policy::Flash(config) = flash.policy() else {
            panic!("expected a flash policy");
        };
        assert_eq!(config.first(), Color::new(255, 220, 150));
        assert_eq!(config.second(), Color::WHITE);
        assert!(!config.end_on_second());

        let flash = build("type: flash\nend_on_second_color: true")?;
        let Policy::Flash(config) = flash.policy() else {
            panic!("expected a flash policy");
        };
        assert!(config.end_on_second());

        let sunrise = build("type: sunrise\nduration: 10m")?;
        let Policy::Sunrise(config) = sunrise.policy() else {
            panic!("expected a sunrise policy");
        };
        assert_eq!(config.duration(), Duration::from_secs(600));
        assert_eq!(config.steps(), 100);
        Ok(())
    }

    #[test]
    fn test_invalid_profiles() {
        assert!(matches!(
            build("type: fade\nto: blue"),
            Err(ProfileError::Invalid(ConfigError::MissingColor(_)))
        ));
        assert!(matches!(
            build("type: pulse\nmin_brightness: 0"),
            Err(ProfileError::Invalid(
                ConfigError::BrightnessOutOfRange { value: 0, .. }
            ))
        ));
        assert!(matches!(
            build("type: flash\nflash_duration: soon"),
            Err(ProfileError::Duration {
                field: "flash_duration",
                ..
            })
        ));
        assert!(matches!(
            build("type: flash\nfirst_color: chartreuse"),
            Err(ProfileError::Color {
                field: "first_color",
                ..
            })
        ));
        assert!(matches!(
            build("type: strobe"),
            Err(ProfileError::Parse(_))
        ));
    }

    #[test]
    fn test_build_with_callback() -> Result<(), Box<dyn std::error::Error>> {
        let profile: EffectProfile = "type: flash\nflash_duration: 10ms\nflash_count: 1".parse()?;
        let light = mock::Light::new("mock-profile");
        let completions = Arc::new(parking_lot::Mutex::new(Vec::new()));

        let effect = {
            let completions = completions.clone();
            profile.build_with_callback(Arc::new(light.clone()), move |completion| {
                completions.lock().push(completion.clone())
            })?
        };
        effect.start()?;
        crate::testutil::eventually(
            || !completions.lock().is_empty(),
            "completion never fired",
        );

        assert_eq!(*completions.lock(), vec![Completion::Finished]);
        assert_eq!(light.write_count(), 2);
        Ok(())
    }

    #[test]
    fn test_load_profile() -> Result<(), Box<dyn std::error::Error>> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "type: sunrise")?;
        writeln!(file, "duration: 30s")?;
        writeln!(file, "steps: 30")?;

        let profile = load_profile(file.path())?;
        assert_eq!(profile.kind(), "sunrise");
        assert!(profile
            .build(Arc::new(mock::Light::new("mock-profile")))
            .is_ok());

        let missing = file.path().with_extension("missing");
        assert!(matches!(
            load_profile(&missing),
            Err(ProfileError::Io { .. })
        ));
        Ok(())
    }
}
