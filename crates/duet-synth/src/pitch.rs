//! Note-to-frequency conversion and pitch bend.
//!
//! MIDI notes use equal temperament around A4 = 440 Hz. Keys use a fixed
//! table of rounded frequencies, four octaves of thirteen keys, C to C.
//!
//! Pitch bend is a ratio applied to every voice's base frequency. Bending up
//! and down use separate tables because a semitone up and a semitone down
//! are different ratios:
//!
//! ```text
//! ratio = 1 + bend / 8192 * BEND_UP[range]     bend > 0
//! ratio = 1 + bend / 8192 * BEND_DOWN[range]   bend < 0
//! ratio = 1                                    bend = 0
//! ```

use duet_platform::KEY_COUNT;
use libm::powf;

/// Highest bend range in semitones.
pub const MAX_BEND_RANGE: u8 = 12;

/// Bend range at power-up.
pub const DEFAULT_BEND_RANGE: u8 = 2;

/// Full-scale upward bend ratio offset per semitone range (`2^(n/12) - 1`).
pub const BEND_UP: [f32; 13] = [
    0.0, 0.0595, 0.1225, 0.1892, 0.2599, 0.3348, 0.4142, 0.4983, 0.5874, 0.6818, 0.7818, 0.8877,
    1.0,
];

/// Full-scale downward bend ratio offset per semitone range (`1 - 2^(-n/12)`).
pub const BEND_DOWN: [f32; 13] = [
    0.0, 0.0561, 0.1091, 0.1591, 0.2063, 0.2508, 0.2929, 0.3326, 0.3700, 0.4054, 0.4388, 0.4703,
    0.5,
];

/// Number of key octaves.
pub const OCTAVES: usize = 4;

/// Key frequencies in Hz, by octave then key.
pub const KEY_PITCHES: [[u16; KEY_COUNT]; OCTAVES] = [
    [65, 69, 73, 78, 82, 87, 92, 98, 104, 110, 117, 123, 131],
    [131, 139, 147, 156, 165, 175, 185, 196, 208, 220, 233, 247, 262],
    [262, 277, 294, 311, 330, 349, 370, 392, 415, 440, 466, 494, 523],
    [523, 554, 587, 622, 659, 698, 740, 784, 831, 880, 932, 988, 1046],
];

/// Convert MIDI note number to frequency in Hz.
///
/// Uses standard tuning: A4 (note 69) = 440 Hz.
#[inline]
pub fn midi_to_freq(note: u8) -> f32 {
    440.0 * powf(2.0, (f32::from(note) - 69.0) / 12.0)
}

/// Frequency of `key` in `octave`, both clamped to the table.
#[inline]
pub fn key_frequency(octave: u8, key: usize) -> f32 {
    let row = &KEY_PITCHES[usize::from(octave).min(OCTAVES - 1)];
    f32::from(row[key.min(KEY_COUNT - 1)])
}

/// Bend ratio for a signed 14-bit `bend` at `range` semitones.
///
/// # Example
///
/// ```rust
/// use duet_synth::pitch::{BEND_UP, bend_ratio};
///
/// assert_eq!(bend_ratio(0, 2), 1.0);
/// assert_eq!(bend_ratio(8191, 12), 1.0 + (8191.0 / 8192.0) * BEND_UP[12]);
/// assert!(bend_ratio(-8192, 12) == 0.5);
/// ```
pub fn bend_ratio(bend: i16, range: u8) -> f32 {
    let range = usize::from(range.min(MAX_BEND_RANGE));
    let amount = f32::from(bend) / 8192.0;
    match bend {
        0 => 1.0,
        b if b > 0 => 1.0 + amount * BEND_UP[range],
        _ => 1.0 + amount * BEND_DOWN[range],
    }
}

/// Pitch-wheel state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchBend {
    range: u8,
    value: i16,
    ratio: f32,
}

impl PitchBend {
    /// Centered wheel with the default range.
    pub const fn new() -> Self {
        Self {
            range: DEFAULT_BEND_RANGE,
            value: 0,
            ratio: 1.0,
        }
    }

    /// Select the range for subsequent bends, clamped to [`MAX_BEND_RANGE`].
    ///
    /// The current ratio is kept until the wheel moves again.
    pub fn set_range(&mut self, semitones: u8) {
        self.range = semitones.min(MAX_BEND_RANGE);
    }

    /// Selected range in semitones.
    pub fn range(&self) -> u8 {
        self.range
    }

    /// Record a wheel position and return the new ratio.
    pub fn apply(&mut self, value: i16) -> f32 {
        self.value = value;
        self.ratio = bend_ratio(value, self.range);
        self.ratio
    }

    /// Last wheel position.
    pub fn value(&self) -> i16 {
        self.value
    }

    /// Current frequency ratio.
    #[inline]
    pub fn ratio(&self) -> f32 {
        self.ratio
    }
}

impl Default for PitchBend {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a4_is_440() {
        assert!((midi_to_freq(69) - 440.0).abs() < 1e-3);
        assert!((midi_to_freq(81) - 880.0).abs() < 1e-2);
    }

    #[test]
    fn key_table_lookup() {
        assert_eq!(key_frequency(2, 9), 440.0);
        assert_eq!(key_frequency(0, 0), 65.0);
        assert_eq!(key_frequency(3, 12), 1046.0);
    }

    #[test]
    fn key_lookup_clamps() {
        assert_eq!(key_frequency(9, 0), 523.0);
        assert_eq!(key_frequency(1, 40), 262.0);
    }

    #[test]
    fn zero_bend_is_exactly_unity() {
        for range in 0..=MAX_BEND_RANGE {
            assert_eq!(bend_ratio(0, range), 1.0);
        }
    }

    #[test]
    fn full_upward_bend_matches_table() {
        for k in 0..=MAX_BEND_RANGE {
            let expected = 1.0 + (8191.0 / 8192.0) * BEND_UP[usize::from(k)];
            assert_eq!(bend_ratio(8191, k), expected);
        }
    }

    #[test]
    fn two_semitone_range_bends_a_whole_tone() {
        let up = bend_ratio(8191, 2);
        let down = bend_ratio(-8192, 2);
        assert!((up - 1.1225).abs() < 1e-3);
        assert!((down - (1.0 - 0.1091)).abs() < 1e-6);
    }

    #[test]
    fn range_is_clamped() {
        let mut bend = PitchBend::new();
        bend.set_range(100);
        assert_eq!(bend.range(), MAX_BEND_RANGE);
        assert_eq!(bend.apply(-8192), 0.5);
    }

    #[test]
    fn range_change_keeps_ratio_until_next_bend() {
        let mut bend = PitchBend::new();
        let ratio = bend.apply(4096);
        bend.set_range(12);
        assert_eq!(bend.ratio(), ratio);
        assert!(bend.apply(4096) > ratio);
    }
}
