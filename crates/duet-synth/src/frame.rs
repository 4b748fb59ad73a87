//! Control-to-audio handoff.
//!
//! The control tick is the only writer and the audio tick the only reader.
//! Everything the renderer needs goes into one [`ControlFrame`], published
//! whole at the end of each control tick inside a critical section, so an
//! audio tick that preempts the control tick sees either the previous frame
//! or the new one, never a mix.

use core::cell::Cell;
use critical_section::Mutex;
use duet_core::Waveform;

/// Snapshot of the synthesis state for the audio tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlFrame {
    /// Q16.16 oscillator phase steps per voice.
    pub increments: [u32; 2],
    /// Envelope gains per voice.
    pub gains: [u8; 2],
    /// Channel volume, 0..=127.
    pub volume: u8,
    /// Modulated filter cutoff shared by both voices.
    pub cutoff: u8,
    /// Waveform shared by both voices.
    pub waveform: Waveform,
}

impl ControlFrame {
    /// Nothing sounding.
    pub const SILENT: Self = Self {
        increments: [0; 2],
        gains: [0; 2],
        volume: 127,
        cutoff: 0,
        waveform: Waveform::Sine,
    };

    /// `(volume * gain) >> 8` for `voice` (0 or 1).
    #[inline]
    pub fn voice_gain(&self, voice: usize) -> i32 {
        (i32::from(self.volume) * i32::from(self.gains[voice])) >> 8
    }
}

impl Default for ControlFrame {
    fn default() -> Self {
        Self::SILENT
    }
}

/// Single-writer, single-reader slot holding the latest [`ControlFrame`].
///
/// Can live in a `static` shared by the two timer interrupts.
///
/// # Example
///
/// ```rust
/// use duet_synth::{ControlFrame, FrameHandoff};
///
/// static HANDOFF: FrameHandoff = FrameHandoff::new(ControlFrame::SILENT);
///
/// let mut frame = HANDOFF.snapshot();
/// frame.gains = [200, 0];
/// HANDOFF.publish(frame);
/// assert_eq!(HANDOFF.snapshot().gains, [200, 0]);
/// ```
pub struct FrameHandoff {
    frame: Mutex<Cell<ControlFrame>>,
}

impl FrameHandoff {
    /// A slot holding `frame`.
    pub const fn new(frame: ControlFrame) -> Self {
        Self {
            frame: Mutex::new(Cell::new(frame)),
        }
    }

    /// Replace the frame. Called once at the end of a control tick.
    #[inline]
    pub fn publish(&self, frame: ControlFrame) {
        critical_section::with(|cs| self.frame.borrow(cs).set(frame));
    }

    /// Copy out the latest frame.
    #[inline]
    pub fn snapshot(&self) -> ControlFrame {
        critical_section::with(|cs| self.frame.borrow(cs).get())
    }
}

impl Default for FrameHandoff {
    fn default() -> Self {
        Self::new(ControlFrame::SILENT)
    }
}

impl core::fmt::Debug for FrameHandoff {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("FrameHandoff").field(&self.snapshot()).finish()
    }
}
