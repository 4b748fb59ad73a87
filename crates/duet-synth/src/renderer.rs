//! Per-sample audio rendering.
//!
//! Each voice reads the shared waveform table through its own oscillator
//! and its own filter, is scaled by `(volume * gain) >> 8`, and the two are
//! summed and shifted down by [`OUTPUT_SHIFT`]. Nothing here looks at note
//! state; a released voice is silent because its gain is zero.

use crate::frame::{ControlFrame, FrameHandoff};
use crate::modulation::RESONANCE;
use duet_core::{Oscillator, ResonantLowPass, WaveBank, Waveform};

/// Cells per voice wavetable.
pub const VOICE_TABLE_SIZE: usize = 2048;

/// Right shift applied to the voice mix.
pub const OUTPUT_SHIFT: u32 = 3;

/// Audio-rate renderer for both voices.
///
/// # Example
///
/// ```rust
/// use duet_synth::{AudioRenderer, ControlFrame};
/// use duet_core::Waveform;
///
/// let mut renderer = AudioRenderer::new(16384.0);
/// let frame = ControlFrame {
///     increments: [AudioRenderer::increment_for(220.0, 16384.0), 0],
///     gains: [255, 0],
///     volume: 127,
///     cutoff: 255,
///     waveform: Waveform::Square,
/// };
/// let peak = (0..512).map(|_| renderer.render(&frame).unsigned_abs()).max();
/// assert!(peak > Some(1000));
/// ```
#[derive(Debug, Clone)]
pub struct AudioRenderer {
    bank: WaveBank<VOICE_TABLE_SIZE, Waveform>,
    oscillators: [Oscillator<VOICE_TABLE_SIZE>; 2],
    filters: [ResonantLowPass; 2],
}

impl AudioRenderer {
    /// Renderer called `audio_rate` times per second.
    pub fn new(audio_rate: f32) -> Self {
        Self {
            bank: WaveBank::new(),
            oscillators: [Oscillator::new(audio_rate), Oscillator::new(audio_rate)],
            filters: [ResonantLowPass::new(RESONANCE), ResonantLowPass::new(RESONANCE)],
        }
    }

    /// Oscillator phase step for `frequency` at `audio_rate`.
    pub fn increment_for(frequency: f32, audio_rate: f32) -> u32 {
        Oscillator::<VOICE_TABLE_SIZE>::increment_for(frequency, audio_rate)
    }

    /// Render one sample from `frame`.
    #[inline]
    pub fn render(&mut self, frame: &ControlFrame) -> i16 {
        let table = self.bank.table(frame.waveform);
        let mut mix = 0i32;
        for voice in 0..2 {
            let oscillator = &mut self.oscillators[voice];
            let filter = &mut self.filters[voice];
            oscillator.set_increment(frame.increments[voice]);
            filter.set_cutoff(frame.cutoff);
            let filtered = filter.process(i32::from(oscillator.advance(table)));
            mix += frame.voice_gain(voice) * filtered;
        }
        (mix >> OUTPUT_SHIFT).clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
    }

    /// Render one sample from the latest published frame.
    #[inline]
    pub fn tick(&mut self, handoff: &FrameHandoff) -> i16 {
        self.render(&handoff.snapshot())
    }

    /// Fill `out` from `frame`.
    pub fn render_block(&mut self, frame: &ControlFrame, out: &mut [i16]) {
        for sample in out.iter_mut() {
            *sample = self.render(frame);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: f32 = 16384.0;

    fn frame(freqs: [f32; 2], gains: [u8; 2]) -> ControlFrame {
        ControlFrame {
            increments: [
                AudioRenderer::increment_for(freqs[0], RATE),
                AudioRenderer::increment_for(freqs[1], RATE),
            ],
            gains,
            volume: 127,
            cutoff: 200,
            waveform: Waveform::Saw,
        }
    }

    #[test]
    fn zero_gain_is_silent() {
        let mut renderer = AudioRenderer::new(RATE);
        let frame = frame([220.0, 330.0], [0, 0]);
        assert!((0..2048).all(|_| renderer.render(&frame) == 0));
    }

    #[test]
    fn zero_volume_is_silent() {
        let mut renderer = AudioRenderer::new(RATE);
        let frame = ControlFrame {
            volume: 0,
            ..frame([220.0, 330.0], [255, 255])
        };
        assert!((0..2048).all(|_| renderer.render(&frame) == 0));
    }

    #[test]
    fn two_voices_are_louder_than_one() {
        let energy = |gains: [u8; 2]| {
            let mut renderer = AudioRenderer::new(RATE);
            let frame = frame([220.0, 220.0], gains);
            (0..4096).map(|_| i64::from(renderer.render(&frame)).pow(2)).sum::<i64>()
        };
        assert!(energy([255, 255]) > energy([255, 0]));
    }

    #[test]
    fn closed_filter_silences_output() {
        let mut renderer = AudioRenderer::new(RATE);
        let frame = ControlFrame {
            cutoff: 0,
            ..frame([220.0, 330.0], [255, 255])
        };
        assert!((0..1024).all(|_| renderer.render(&frame) == 0));
    }

    #[test]
    fn tick_reads_published_frame() {
        let mut renderer = AudioRenderer::new(RATE);
        let handoff = FrameHandoff::default();
        assert_eq!(renderer.tick(&handoff), 0);
        handoff.publish(frame([440.0, 0.0], [255, 0]));
        let out: Vec<i16> = (0..256).map(|_| renderer.tick(&handoff)).collect();
        assert!(out.iter().any(|&s| s != 0));
    }
}
