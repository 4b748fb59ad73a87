//! Decoded MIDI messages and the controllers the synth responds to.
//!
//! Byte-stream parsing happens upstream; by the time a message reaches the
//! control loop it is one of the four variants of [`MidiMessage`]. Channels
//! are 1-based (1..=16) as on the wire label, never 0.

/// Most negative pitch-bend value.
pub const BEND_MIN: i16 = -8192;

/// Most positive pitch-bend value.
pub const BEND_MAX: i16 = 8191;

/// A decoded channel-voice message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiMessage {
    /// Key pressed. Velocity 0 is a release.
    NoteOn {
        /// Channel 1..=16.
        channel: u8,
        /// Note number 0..=127.
        note: u8,
        /// Velocity 0..=127.
        velocity: u8,
    },
    /// Key released.
    NoteOff {
        /// Channel 1..=16.
        channel: u8,
        /// Note number 0..=127.
        note: u8,
        /// Release velocity, ignored.
        velocity: u8,
    },
    /// Pitch wheel position.
    PitchBend {
        /// Channel 1..=16.
        channel: u8,
        /// Signed bend, [`BEND_MIN`]..=[`BEND_MAX`].
        value: i16,
    },
    /// Controller move.
    ControlChange {
        /// Channel 1..=16.
        channel: u8,
        /// Controller number 0..=127.
        controller: u8,
        /// Value 0..=127.
        value: u8,
    },
}

impl MidiMessage {
    /// Channel the message arrived on.
    pub const fn channel(&self) -> u8 {
        match *self {
            Self::NoteOn { channel, .. }
            | Self::NoteOff { channel, .. }
            | Self::PitchBend { channel, .. }
            | Self::ControlChange { channel, .. } => channel,
        }
    }

    /// Whether receiving this message teaches the channel while learning.
    ///
    /// Note and controller messages do; pitch bend does not.
    pub const fn teaches_channel(&self) -> bool {
        !matches!(self, Self::PitchBend { .. })
    }
}

/// Controllers with a fixed meaning on this instrument.
///
/// # Example
///
/// ```rust
/// use duet_platform::Controller;
///
/// assert_eq!(Controller::from_number(7), Some(Controller::Volume));
/// assert_eq!(Controller::from_number(74), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Controller {
    /// CC1: LFO depth.
    Modulation,
    /// CC5: portamento switch and glide time.
    Portamento,
    /// CC7: channel volume.
    Volume,
    /// CC20: pitch-bend range in semitones.
    BendRange,
    /// CC124: listen only on the stored channel.
    CommitChannel,
    /// CC125: listen on every channel.
    OmniOn,
}

impl Controller {
    /// Recognise a controller number.
    pub const fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Self::Modulation),
            5 => Some(Self::Portamento),
            7 => Some(Self::Volume),
            20 => Some(Self::BendRange),
            124 => Some(Self::CommitChannel),
            125 => Some(Self::OmniOn),
            _ => None,
        }
    }

    /// Controller number on the wire.
    pub const fn number(self) -> u8 {
        match self {
            Self::Modulation => 1,
            Self::Portamento => 5,
            Self::Volume => 7,
            Self::BendRange => 20,
            Self::CommitChannel => 124,
            Self::OmniOn => 125,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn controller_numbers_round_trip() {
        for number in 0..=127u8 {
            if let Some(controller) = Controller::from_number(number) {
                assert_eq!(controller.number(), number);
            }
        }
    }

    #[test]
    fn pitch_bend_does_not_teach() {
        let bend = MidiMessage::PitchBend { channel: 3, value: 100 };
        let cc = MidiMessage::ControlChange { channel: 3, controller: 7, value: 90 };
        assert!(!bend.teaches_channel());
        assert!(cc.teaches_channel());
        assert_eq!(bend.channel(), 3);
    }
}
