//! Plays a [`Score`] into the synth's input seams.
//!
//! The player stands in for the panel and the MIDI port: pots hold their
//! last position, keys read as touched between `key_down` and `key_up`, and
//! MIDI messages queue up and are handed out one per control tick.

use duet_config::{PotPositions, Score, ScoreEvent, ScoreInput};
use duet_platform::{
    ANALOG_CHANNELS, AnalogInputs, EventSource, KEY_COUNT, KeySensors, MidiMessage, Pot,
};
use std::collections::VecDeque;

/// Score-driven panel and MIDI port.
pub struct ScorePlayer<'a> {
    events: &'a [ScoreEvent],
    next: usize,
    lines: [u16; ANALOG_CHANNELS],
    keys: [bool; KEY_COUNT],
    midi: VecDeque<MidiMessage>,
}

impl<'a> ScorePlayer<'a> {
    /// Start at time zero with the pots at `resting`.
    pub fn new(score: &'a Score, resting: &PotPositions) -> Self {
        Self {
            events: &score.events,
            next: 0,
            lines: resting.analog_lines(),
            keys: [false; KEY_COUNT],
            midi: VecDeque::new(),
        }
    }

    /// Apply every event due at or before `now_ms`.
    pub fn advance_to(&mut self, now_ms: u64) {
        while let Some(event) = self.events.get(self.next) {
            if u64::from(event.at_ms) > now_ms {
                break;
            }
            self.apply(&event.input);
            self.next += 1;
        }
    }

    fn apply(&mut self, input: &ScoreInput) {
        if let Some(message) = input.midi() {
            self.midi.push_back(message);
            return;
        }
        match input {
            ScoreInput::KeyDown { key } | ScoreInput::KeyUp { key } => {
                if let Some(slot) = self.keys.get_mut(usize::from(*key)) {
                    *slot = matches!(input, ScoreInput::KeyDown { .. });
                }
            }
            ScoreInput::Pot { pot, value } => match Pot::from_name(pot) {
                Some(pot) => self.lines[pot.analog_channel()] = *value,
                None => tracing::warn!(pot = %pot, "skipping unknown pot"),
            },
            _ => {}
        }
    }

    /// MIDI messages waiting for a control tick.
    pub fn pending_midi(&self) -> usize {
        self.midi.len()
    }

    /// Events not yet reached.
    pub fn remaining_events(&self) -> usize {
        self.events.len() - self.next
    }
}

impl AnalogInputs for ScorePlayer<'_> {
    fn read_analog(&mut self, channel: usize) -> u16 {
        self.lines.get(channel).copied().unwrap_or(0)
    }
}

impl KeySensors for ScorePlayer<'_> {
    fn key_present(&mut self, key: usize) -> bool {
        self.keys.get(key).copied().unwrap_or(false)
    }
}

impl EventSource for ScorePlayer<'_> {
    fn poll_event(&mut self) -> Option<MidiMessage> {
        self.midi.pop_front()
    }
}
