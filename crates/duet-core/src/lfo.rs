//! Control-rate low frequency oscillator for filter modulation.
//!
//! The LFO owns a 512-cell [`WaveBank`] of [`LfoWaveform`] shapes and is
//! advanced once per control tick. Its raw signed output is turned into a
//! cutoff offset by the filter controller in `duet-synth`.

use crate::oscillator::Oscillator;
use crate::wavetable::{LfoWaveform, WaveBank};

/// Cells per LFO table.
pub const LFO_TABLE_SIZE: usize = 512;

/// Table-driven LFO producing signed 8-bit values.
///
/// # Example
///
/// ```rust
/// use duet_core::{Lfo, LfoWaveform};
///
/// let mut lfo = Lfo::new(128.0, 1.5);
/// lfo.set_waveform(LfoWaveform::Square);
///
/// let value = lfo.advance();
/// assert_eq!(value, 127);
/// ```
#[derive(Debug, Clone)]
pub struct Lfo {
    bank: WaveBank<LFO_TABLE_SIZE, LfoWaveform>,
    oscillator: Oscillator<LFO_TABLE_SIZE>,
    waveform: LfoWaveform,
}

impl Lfo {
    /// Create a sine LFO at `frequency` Hz, advanced `update_rate` times per second.
    pub fn new(update_rate: f32, frequency: f32) -> Self {
        let mut oscillator = Oscillator::new(update_rate);
        oscillator.set_frequency(frequency);
        Self {
            bank: WaveBank::new(),
            oscillator,
            waveform: LfoWaveform::Sine,
        }
    }

    /// Set the rate in Hz.
    pub fn set_frequency(&mut self, frequency: f32) {
        self.oscillator.set_frequency(frequency);
    }

    /// Rate in Hz.
    pub fn frequency(&self) -> f32 {
        self.oscillator.frequency()
    }

    /// Switch shape without resetting phase.
    pub fn set_waveform(&mut self, waveform: LfoWaveform) {
        self.waveform = waveform;
    }

    /// Current shape.
    pub fn waveform(&self) -> LfoWaveform {
        self.waveform
    }

    /// Restart the cycle.
    pub fn reset(&mut self) {
        self.oscillator.reset();
    }

    /// Read the current value and step one control tick.
    #[inline]
    pub fn advance(&mut self) -> i8 {
        self.oscillator.advance(self.bank.table(self.waveform))
    }
}
