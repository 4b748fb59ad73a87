//! Scores: timed panel and MIDI input for offline rendering.

use duet_platform::{ANALOG_FULL_SCALE, BEND_MAX, BEND_MIN, KEY_COUNT, MidiMessage, Pot};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use crate::validation::{Checker, ValidationError, ValidationResult};

/// Longest score accepted, one hour.
pub const MAX_DURATION_MS: u32 = 3_600_000;

fn default_channel() -> u8 {
    1
}

fn default_velocity() -> u8 {
    100
}

/// One input to the instrument.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScoreInput {
    /// MIDI note on.
    NoteOn {
        /// Channel 1..=16.
        #[serde(default = "default_channel")]
        channel: u8,
        /// Note number.
        note: u8,
        /// Velocity; 0 releases.
        #[serde(default = "default_velocity")]
        velocity: u8,
    },
    /// MIDI note off.
    NoteOff {
        /// Channel 1..=16.
        #[serde(default = "default_channel")]
        channel: u8,
        /// Note number.
        note: u8,
    },
    /// MIDI pitch wheel.
    PitchBend {
        /// Channel 1..=16.
        #[serde(default = "default_channel")]
        channel: u8,
        /// Signed bend -8192..=8191.
        value: i16,
    },
    /// MIDI controller.
    ControlChange {
        /// Channel 1..=16.
        #[serde(default = "default_channel")]
        channel: u8,
        /// Controller number.
        controller: u8,
        /// Controller value.
        value: u8,
    },
    /// Touch a capacitive key.
    KeyDown {
        /// Key index 0..=12.
        key: u8,
    },
    /// Let go of a capacitive key.
    KeyUp {
        /// Key index 0..=12.
        key: u8,
    },
    /// Move a pot.
    Pot {
        /// Panel name, e.g. `lfo-depth`.
        pot: String,
        /// Raw reading 0..=1023.
        value: u16,
    },
}

impl ScoreInput {
    /// The decoded MIDI message, for MIDI inputs.
    pub fn midi(&self) -> Option<MidiMessage> {
        match *self {
            Self::NoteOn { channel, note, velocity } => {
                Some(MidiMessage::NoteOn { channel, note, velocity })
            }
            Self::NoteOff { channel, note } => Some(MidiMessage::NoteOff {
                channel,
                note,
                velocity: 0,
            }),
            Self::PitchBend { channel, value } => Some(MidiMessage::PitchBend { channel, value }),
            Self::ControlChange { channel, controller, value } => {
                Some(MidiMessage::ControlChange { channel, controller, value })
            }
            Self::KeyDown { .. } | Self::KeyUp { .. } | Self::Pot { .. } => None,
        }
    }

    fn check(&self, index: usize, check: &mut Checker) {
        let field = |name: &str| {
            let name = name.to_string();
            move || format!("events[{index}].{name}")
        };
        let midi_byte = |check: &mut Checker, name: &str, value: u8| {
            check.range(field(name), i64::from(value), 0, 127);
        };

        match self {
            Self::NoteOn { channel, note, velocity } => {
                check.range(field("channel"), i64::from(*channel), 1, 16);
                midi_byte(check, "note", *note);
                midi_byte(check, "velocity", *velocity);
            }
            Self::NoteOff { channel, note } => {
                check.range(field("channel"), i64::from(*channel), 1, 16);
                midi_byte(check, "note", *note);
            }
            Self::PitchBend { channel, value } => {
                check.range(field("channel"), i64::from(*channel), 1, 16);
                check.range(field("value"), i64::from(*value), i64::from(BEND_MIN), i64::from(BEND_MAX));
            }
            Self::ControlChange { channel, controller, value } => {
                check.range(field("channel"), i64::from(*channel), 1, 16);
                midi_byte(check, "controller", *controller);
                midi_byte(check, "value", *value);
            }
            Self::KeyDown { key } | Self::KeyUp { key } => {
                check.range(field("key"), i64::from(*key), 0, KEY_COUNT as i64 - 1);
            }
            Self::Pot { pot, value } => {
                if Pot::from_name(pot).is_none() {
                    check.push(ValidationError::UnknownPot(pot.clone()));
                }
                check.range(field("value"), i64::from(*value), 0, i64::from(ANALOG_FULL_SCALE));
            }
        }
    }
}

/// An input at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScoreEvent {
    /// Milliseconds from the start of the score.
    pub at_ms: u32,
    /// What happens.
    #[serde(flatten)]
    pub input: ScoreInput,
}

/// A timed performance to render.
///
/// Events are kept sorted by time; events at the same time keep their file
/// order.
///
/// # TOML Format
///
/// ```toml
/// name = "two voices"
/// duration_ms = 2000
///
/// [[events]]
/// at_ms = 0
/// type = "note_on"
/// note = 57
///
/// [[events]]
/// at_ms = 250
/// type = "key_down"
/// key = 4
///
/// [[events]]
/// at_ms = 500
/// type = "pot"
/// pot = "lfo-depth"
/// value = 900
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Score {
    /// Optional title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Length of the rendering.
    pub duration_ms: u32,
    /// Inputs in time order.
    #[serde(default)]
    pub events: Vec<ScoreEvent>,
}

impl Score {
    /// An empty score lasting `duration_ms`.
    pub fn new(duration_ms: u32) -> Self {
        Self {
            name: None,
            duration_ms,
            events: Vec::new(),
        }
    }

    /// Add an input at `at_ms`, keeping time order.
    #[must_use]
    pub fn with_event(mut self, at_ms: u32, input: ScoreInput) -> Self {
        let position = self.events.partition_point(|event| event.at_ms <= at_ms);
        self.events.insert(position, ScoreEvent { at_ms, input });
        self
    }

    /// Control ticks needed to cover the whole score at `control_rate`.
    pub fn control_ticks(&self, control_rate: u32) -> u64 {
        (u64::from(self.duration_ms) * u64::from(control_rate)).div_ceil(1000)
    }

    /// Check every event and the duration.
    pub fn validate(&self) -> ValidationResult<()> {
        let mut check = Checker::default();
        check.range(|| "duration_ms".into(), i64::from(self.duration_ms), 1, i64::from(MAX_DURATION_MS));
        for (index, event) in self.events.iter().enumerate() {
            check.range(
                || format!("events[{index}].at_ms"),
                i64::from(event.at_ms),
                0,
                i64::from(self.duration_ms),
            );
            event.input.check(index, &mut check);
        }
        check.finish()
    }

    /// Load and validate a score from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Parse, sort and validate a score from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let mut score: Self = toml::from_str(toml_str)?;
        score.events.sort_by_key(|event| event.at_ms);
        score.validate()?;
        Ok(score)
    }

    /// Convert the score to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
