//! The eight front-panel potentiometers.
//!
//! Each pot has a fixed analog line and a fixed [`RangeMap`] from the raw
//! 0..=1023 reading into its working range. The control scheduler reads one
//! pot per tick in [`Pot::ROUND_ROBIN`] order.
//!
//! | pot          | line | range         |
//! |--------------|------|---------------|
//! | cutoff       | 4    | 30..=180      |
//! | waveform     | 6    | 1..=4         |
//! | octave       | 7    | 0..=3         |
//! | attack       | 0    | 28..=2500 ms  |
//! | release      | 1    | 25..=3000 ms  |
//! | lfo-waveform | 2    | 1..=4         |
//! | lfo-speed    | 3    | 2..=150 (0.1 Hz) |
//! | lfo-depth    | 5    | 1..=256       |

use crate::AnalogInputs;
use duet_core::RangeMap;

const DOMAIN_MAX: i32 = crate::ANALOG_FULL_SCALE as i32;

/// A front-panel potentiometer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pot {
    /// Base filter cutoff.
    Cutoff,
    /// Voice waveform selector.
    Waveform,
    /// Key octave.
    Octave,
    /// Envelope attack time.
    Attack,
    /// Envelope release time.
    Release,
    /// LFO waveform selector.
    LfoWaveform,
    /// LFO rate in tenths of a hertz.
    LfoSpeed,
    /// LFO depth.
    LfoDepth,
}

impl Pot {
    /// Read order of the control scheduler, one pot per tick.
    pub const ROUND_ROBIN: [Self; 8] = [
        Self::Cutoff,
        Self::Waveform,
        Self::Octave,
        Self::Attack,
        Self::Release,
        Self::LfoWaveform,
        Self::LfoSpeed,
        Self::LfoDepth,
    ];

    /// Analog line the pot is wired to.
    pub const fn analog_channel(self) -> usize {
        match self {
            Self::Attack => 0,
            Self::Release => 1,
            Self::LfoWaveform => 2,
            Self::LfoSpeed => 3,
            Self::Cutoff => 4,
            Self::LfoDepth => 5,
            Self::Waveform => 6,
            Self::Octave => 7,
        }
    }

    /// Conversion from raw reading to working value.
    pub const fn range_map(self) -> RangeMap {
        let (min, max) = match self {
            Self::Cutoff => (30, 180),
            Self::Waveform | Self::LfoWaveform => (1, 4),
            Self::Octave => (0, 3),
            Self::Attack => (28, 2500),
            Self::Release => (25, 3000),
            Self::LfoSpeed => (2, 150),
            Self::LfoDepth => (1, 256),
        };
        RangeMap::new(0, DOMAIN_MAX, min, max)
    }

    /// Kebab-case name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Cutoff => "cutoff",
            Self::Waveform => "waveform",
            Self::Octave => "octave",
            Self::Attack => "attack",
            Self::Release => "release",
            Self::LfoWaveform => "lfo-waveform",
            Self::LfoSpeed => "lfo-speed",
            Self::LfoDepth => "lfo-depth",
        }
    }

    /// Unit of the working value, empty for plain numbers.
    pub const fn unit(self) -> &'static str {
        match self {
            Self::Attack | Self::Release => "ms",
            Self::LfoSpeed => "0.1 Hz",
            _ => "",
        }
    }

    /// Look a pot up by [`name`](Self::name).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ROUND_ROBIN.into_iter().find(|pot| pot.name() == name)
    }

    /// Map a raw reading.
    #[inline]
    pub const fn map(self, raw: u16) -> i32 {
        self.range_map().map(raw as i32)
    }

    /// Sample the pot's line and map it.
    #[inline]
    pub fn read(self, inputs: &mut impl AnalogInputs) -> i32 {
        self.map(inputs.read_analog(self.analog_channel()))
    }
}

impl core::fmt::Display for Pot {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}
