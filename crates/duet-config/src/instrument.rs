//! Instrument configuration file format.

use duet_platform::{ANALOG_CHANNELS, ANALOG_FULL_SCALE, Pot};
use duet_synth::{AUDIO_RATE, CONTROL_RATE, EngineRates};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use crate::validation::{Checker, ValidationError, ValidationResult};

/// Resting position of every pot, as raw 0..=1023 readings.
///
/// Defaults put every pot at the bottom except cutoff, which rests fully
/// open.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct PotPositions {
    /// Base filter cutoff.
    pub cutoff: u16,
    /// Voice waveform selector.
    pub waveform: u16,
    /// Key octave.
    pub octave: u16,
    /// Envelope attack.
    pub attack: u16,
    /// Envelope release.
    pub release: u16,
    /// LFO waveform selector.
    pub lfo_waveform: u16,
    /// LFO rate.
    pub lfo_speed: u16,
    /// LFO depth.
    pub lfo_depth: u16,
}

impl Default for PotPositions {
    fn default() -> Self {
        Self {
            cutoff: ANALOG_FULL_SCALE,
            waveform: 0,
            octave: 0,
            attack: 0,
            release: 0,
            lfo_waveform: 0,
            lfo_speed: 0,
            lfo_depth: 0,
        }
    }
}

impl PotPositions {
    /// Raw position of `pot`.
    pub fn get(&self, pot: Pot) -> u16 {
        match pot {
            Pot::Cutoff => self.cutoff,
            Pot::Waveform => self.waveform,
            Pot::Octave => self.octave,
            Pot::Attack => self.attack,
            Pot::Release => self.release,
            Pot::LfoWaveform => self.lfo_waveform,
            Pot::LfoSpeed => self.lfo_speed,
            Pot::LfoDepth => self.lfo_depth,
        }
    }

    /// Move `pot` to `raw`.
    pub fn set(&mut self, pot: Pot, raw: u16) {
        let slot = match pot {
            Pot::Cutoff => &mut self.cutoff,
            Pot::Waveform => &mut self.waveform,
            Pot::Octave => &mut self.octave,
            Pot::Attack => &mut self.attack,
            Pot::Release => &mut self.release,
            Pot::LfoWaveform => &mut self.lfo_waveform,
            Pot::LfoSpeed => &mut self.lfo_speed,
            Pot::LfoDepth => &mut self.lfo_depth,
        };
        *slot = raw;
    }

    /// Readings as they appear on the analog lines.
    pub fn analog_lines(&self) -> [u16; ANALOG_CHANNELS] {
        let mut lines = [0; ANALOG_CHANNELS];
        for pot in Pot::ROUND_ROBIN {
            lines[pot.analog_channel()] = self.get(pot);
        }
        lines
    }
}

/// Static description of the instrument a score is played on.
///
/// # TOML Format
///
/// ```toml
/// audio_rate = 16384
/// control_rate = 128
/// sense_lines = [0, 0, 0, 0, 0, 0, 0, 0]
///
/// [pots]
/// cutoff = 1023
/// waveform = 700
/// lfo-depth = 300
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct InstrumentConfig {
    /// Audio ticks per second.
    pub audio_rate: u32,
    /// Control ticks per second.
    pub control_rate: u32,
    /// Analog line levels seen at power-up, used for the channel-learn check.
    pub sense_lines: [u16; ANALOG_CHANNELS],
    /// Resting pot positions.
    pub pots: PotPositions,
}

impl Default for InstrumentConfig {
    fn default() -> Self {
        Self {
            audio_rate: AUDIO_RATE,
            control_rate: CONTROL_RATE,
            sense_lines: [0; ANALOG_CHANNELS],
            pots: PotPositions::default(),
        }
    }
}

impl InstrumentConfig {
    /// Engine rates for booting the synth.
    pub fn rates(&self) -> EngineRates {
        EngineRates::new(self.audio_rate, self.control_rate)
    }

    /// Check rates and raw readings.
    pub fn validate(&self) -> ValidationResult<()> {
        let mut check = Checker::default();
        let full_scale = i64::from(ANALOG_FULL_SCALE);

        check.range(|| "control_rate".into(), i64::from(self.control_rate), 1, 10_000);
        check.range(|| "audio_rate".into(), i64::from(self.audio_rate), 1, 192_000);
        if self.control_rate > 0 && self.audio_rate % self.control_rate != 0 {
            check.push(ValidationError::RateMismatch {
                audio_rate: self.audio_rate,
                control_rate: self.control_rate,
            });
        }

        for pot in Pot::ROUND_ROBIN {
            check.range(|| format!("pots.{}", pot.name()), i64::from(self.pots.get(pot)), 0, full_scale);
        }
        for (line, &level) in self.sense_lines.iter().enumerate() {
            check.range(|| format!("sense_lines[{line}]"), i64::from(level), 0, full_scale);
        }

        check.finish()
    }

    /// Load and validate a config from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Load `path` if it exists, otherwise the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.is_file() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Save the config to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }
        std::fs::write(path, self.to_toml()?).map_err(|e| ConfigError::write_file(path, e))
    }

    /// Convert the config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = InstrumentConfig::from_toml("").unwrap();
        assert_eq!(config, InstrumentConfig::default());
        assert_eq!(config.rates(), EngineRates::default());
    }

    #[test]
    fn pots_use_panel_names() {
        let config = InstrumentConfig::from_toml(
            r#"
            [pots]
            lfo-depth = 300
            waveform = 700
            "#,
        )
        .unwrap();
        assert_eq!(config.pots.get(Pot::LfoDepth), 300);
        assert_eq!(config.pots.get(Pot::Waveform), 700);
        assert_eq!(config.pots.get(Pot::Cutoff), ANALOG_FULL_SCALE);
    }

    #[test]
    fn analog_lines_follow_wiring() {
        let mut pots = PotPositions::default();
        pots.set(Pot::Attack, 11);
        pots.set(Pot::Octave, 77);
        let lines = pots.analog_lines();
        assert_eq!(lines[0], 11);
        assert_eq!(lines[7], 77);
        assert_eq!(lines[4], ANALOG_FULL_SCALE);
    }

    #[test]
    fn mismatched_rates_are_rejected() {
        let err = InstrumentConfig::from_toml("audio_rate = 16000").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Validation(ValidationError::RateMismatch { audio_rate: 16000, control_rate: 128 })
        ));
    }

    #[test]
    fn out_of_range_readings_are_reported_together() {
        let config = InstrumentConfig {
            sense_lines: [2000; ANALOG_CHANNELS],
            ..InstrumentConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ValidationError::Multiple(ref all) if all.len() == ANALOG_CHANNELS));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(InstrumentConfig::from_toml("sample_rate = 48000").is_err());
        assert!(InstrumentConfig::from_toml("[pots]\nresonance = 3").is_err());
    }

    #[test]
    fn toml_round_trip() {
        let mut config = InstrumentConfig::default();
        config.pots.set(Pot::LfoSpeed, 512);
        config.sense_lines = [1023; ANALOG_CHANNELS];
        let parsed = InstrumentConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }
}
