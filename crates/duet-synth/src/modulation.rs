//! LFO-driven filter cutoff.
//!
//! Once per control tick the LFO is read and turned into a downward offset
//! from the base cutoff:
//!
//! ```text
//! offset = 127 - lfo                      0..=255, largest at the negative peak
//! gain   = (offset * depth) >> 8          depth 1..=256
//! cutoff = base - ((base * gain) >> 8)
//! ```
//!
//! The LFO can only close the filter, never open it past the base value. At
//! depth 1 the gain is always zero; at depth 256 the negative LFO peak pulls
//! the cutoff to almost nothing.

use duet_core::{Lfo, LfoWaveform};

/// Resonance of both voice filters.
pub const RESONANCE: u8 = 35;

/// Smallest LFO depth.
pub const MIN_DEPTH: u16 = 1;

/// Largest LFO depth.
pub const MAX_DEPTH: u16 = 256;

/// Cutoff after pulling `base` down by an LFO value at `depth`.
///
/// # Example
///
/// ```rust
/// use duet_synth::modulation::modulated_cutoff;
///
/// assert_eq!(modulated_cutoff(150, -128, 1), 150);
/// assert!(modulated_cutoff(150, -128, 256) <= 1);
/// assert_eq!(modulated_cutoff(150, 127, 256), 150);
/// ```
#[inline]
pub fn modulated_cutoff(base: u8, lfo: i8, depth: u16) -> u8 {
    let offset = (127 - i32::from(lfo)) as u32;
    let gain = (offset * u32::from(depth.clamp(MIN_DEPTH, MAX_DEPTH))) >> 8;
    let base = u32::from(base);
    (base - ((base * gain) >> 8)) as u8
}

/// Filter/LFO controller shared by both voices.
#[derive(Debug, Clone)]
pub struct FilterModulator {
    lfo: Lfo,
    depth: u16,
    base_cutoff: u8,
    cutoff: u8,
}

impl FilterModulator {
    /// Controller ticked `control_rate` times per second, base cutoff 180,
    /// depth 1, LFO at 0.2 Hz.
    pub fn new(control_rate: f32) -> Self {
        Self {
            lfo: Lfo::new(control_rate, 0.2),
            depth: MIN_DEPTH,
            base_cutoff: 180,
            cutoff: 180,
        }
    }

    /// Set the depth, clamped to `1..=256`.
    pub fn set_depth(&mut self, depth: u16) {
        self.depth = depth.clamp(MIN_DEPTH, MAX_DEPTH);
    }

    /// Current depth.
    pub fn depth(&self) -> u16 {
        self.depth
    }

    /// Set the unmodulated cutoff.
    pub fn set_base_cutoff(&mut self, cutoff: u8) {
        self.base_cutoff = cutoff;
    }

    /// Unmodulated cutoff.
    pub fn base_cutoff(&self) -> u8 {
        self.base_cutoff
    }

    /// Select the LFO shape.
    pub fn set_lfo_waveform(&mut self, waveform: LfoWaveform) {
        self.lfo.set_waveform(waveform);
    }

    /// Set the LFO rate in Hz.
    pub fn set_lfo_rate(&mut self, hz: f32) {
        self.lfo.set_frequency(hz);
    }

    /// The LFO.
    pub fn lfo(&self) -> &Lfo {
        &self.lfo
    }

    /// Read the LFO once and recompute the cutoff.
    #[inline]
    pub fn tick(&mut self) -> u8 {
        let lfo = self.lfo.advance();
        self.cutoff = modulated_cutoff(self.base_cutoff, lfo, self.depth);
        self.cutoff
    }

    /// Cutoff computed by the last [`tick`](Self::tick).
    pub fn cutoff(&self) -> u8 {
        self.cutoff
    }
}
