//! Table-lookup oscillator with a Q16.16 phase accumulator.
//!
//! The upper 16 bits of the phase select a table cell and the lower 16 bits
//! carry the fraction, so frequency resolution stays fine even at control
//! rate. There is no interpolation between cells; at 2048 cells and a
//! 16 kHz update rate the quantization noise sits well under the filter.

use crate::wavetable::WaveTable;

const FRACTION_BITS: u32 = 16;
const FRACTION_SCALE: f32 = (1u32 << FRACTION_BITS) as f32;

/// Phase-accumulating reader over a [`WaveTable`] of `N` cells.
///
/// The oscillator does not own its table. Two voices sharing a waveform
/// selector read the same table through their own phase.
///
/// # Example
///
/// ```rust
/// use duet_core::{Oscillator, WaveBank, Waveform};
///
/// let bank: WaveBank<2048, Waveform> = WaveBank::new();
/// let mut osc = Oscillator::<2048>::new(16384.0);
/// osc.set_frequency(440.0);
///
/// let first = osc.advance(bank.table(Waveform::Sine));
/// assert_eq!(first, 0);
/// ```
#[derive(Debug, Clone)]
pub struct Oscillator<const N: usize> {
    /// Q16.16 position in the table
    phase: u32,
    /// Q16.16 phase step per update
    increment: u32,
    update_rate: f32,
    frequency: f32,
}

impl<const N: usize> Oscillator<N> {
    /// Create a silent oscillator advanced `update_rate` times per second.
    pub fn new(update_rate: f32) -> Self {
        const { assert!(N.is_power_of_two() && N <= 1 << FRACTION_BITS) };
        Self {
            phase: 0,
            increment: 0,
            update_rate,
            frequency: 0.0,
        }
    }

    /// Phase step for `frequency` Hz at `update_rate` updates per second.
    ///
    /// Negative frequencies produce a stopped oscillator.
    pub fn increment_for(frequency: f32, update_rate: f32) -> u32 {
        if frequency <= 0.0 || update_rate <= 0.0 {
            return 0;
        }
        (frequency * N as f32 / update_rate * FRACTION_SCALE) as u32
    }

    /// Set the frequency in Hz.
    pub fn set_frequency(&mut self, frequency: f32) {
        self.frequency = frequency.max(0.0);
        self.increment = Self::increment_for(self.frequency, self.update_rate);
    }

    /// Frequency in Hz last set through [`set_frequency`](Self::set_frequency).
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Set the raw phase step, as computed by [`increment_for`](Self::increment_for).
    ///
    /// Used when the step is computed at control rate and handed to the
    /// audio tick as a single word.
    #[inline]
    pub fn set_increment(&mut self, increment: u32) {
        self.increment = increment;
    }

    /// Raw phase step.
    pub fn increment(&self) -> u32 {
        self.increment
    }

    /// Update rate in Hz.
    pub fn update_rate(&self) -> f32 {
        self.update_rate
    }

    /// Restart the cycle at cell 0.
    pub fn reset(&mut self) {
        self.phase = 0;
    }

    /// Read the current cell and step the phase.
    #[inline]
    pub fn advance(&mut self, table: &WaveTable<N>) -> i8 {
        let index = (self.phase >> FRACTION_BITS) as usize;
        self.phase = self.phase.wrapping_add(self.increment);
        table.cell(index)
    }
}
