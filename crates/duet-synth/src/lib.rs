//! Duet Synth - the real-time core of a two-voice synthesizer
//!
//! Two fixed-rate loops share one core. The control tick (128 Hz) reads the
//! panel, the keys and MIDI, runs voice allocation and envelopes and
//! publishes a [`ControlFrame`]. The audio tick (16384 Hz) renders one
//! sample from the latest frame. Neither loop allocates, blocks or fails.
//!
//! # Components
//!
//! ## Input
//!
//! - [`KeyScanner`] - three-sample hysteresis debounce for the 13 keys
//! - [`ControlScheduler`] - round-robin pot polling and the fixed tick order
//!
//! ## Voices
//!
//! - [`VoiceAllocator`] - two registers shared by MIDI and keys, with stealing
//! - [`Envelope`] - control-rate linear ADSR
//! - [`PitchBend`] / [`pitch`] - note frequencies and bend ratios
//!
//! ## Sound
//!
//! - [`FilterModulator`] - LFO-driven cutoff shared by both voice filters
//! - [`AudioRenderer`] - per-sample oscillators, filters and mix
//! - [`FrameHandoff`] - tear-free control-to-audio handoff
//! - [`Instrument`] - both ticks in one loop for offline hosts
//!
//! # Example
//!
//! ```rust
//! use duet_platform::{AnalogInputs, EventSource, KeySensors, MemoryStore, MidiMessage};
//! use duet_synth::{EngineRates, Instrument};
//!
//! struct Player {
//!     pending: Option<MidiMessage>,
//! }
//! impl AnalogInputs for Player {
//!     fn read_analog(&mut self, _: usize) -> u16 { 700 }
//! }
//! impl KeySensors for Player {
//!     fn key_present(&mut self, _: usize) -> bool { false }
//! }
//! impl EventSource for Player {
//!     fn poll_event(&mut self) -> Option<MidiMessage> { self.pending.take() }
//! }
//!
//! let mut duet = Instrument::boot(EngineRates::default(), MemoryStore::new(), &[0; 8]);
//! let mut player = Player {
//!     pending: Some(MidiMessage::NoteOn { channel: 1, note: 57, velocity: 110 }),
//! };
//!
//! let mut block = vec![0i16; duet.samples_per_tick()];
//! for _ in 0..16 {
//!     duet.run_tick(&mut player, &mut block);
//! }
//! assert!(block.iter().any(|&s| s != 0));
//! ```
//!
//! # no_std Support
//!
//! The crate is `no_std` compatible. Without `std` a `critical-section`
//! implementation for the target must be linked in.
//!
//! ```toml
//! [dependencies]
//! duet-synth = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod envelope;
pub mod frame;
pub mod instrument;
pub mod key_scan;
pub mod modulation;
pub mod pitch;
pub mod renderer;
pub mod scheduler;
pub mod voice;

pub use envelope::{Envelope, EnvelopeStage};
pub use frame::{ControlFrame, FrameHandoff};
pub use instrument::Instrument;
pub use key_scan::{KeyEdge, KeyScanner, KeyState};
pub use modulation::FilterModulator;
pub use pitch::{PitchBend, midi_to_freq};
pub use renderer::AudioRenderer;
pub use scheduler::{ControlParameters, ControlScheduler, POLL_CYCLE};
pub use voice::{EMPTY_REGISTER, NoteId, NoteRequest, NoteSource, Voice, VoiceAllocator, VoiceSlot};

/// Default control tick rate in Hz.
pub const CONTROL_RATE: u32 = 128;

/// Default audio tick rate in Hz.
pub const AUDIO_RATE: u32 = 16384;

/// Tick rates of the two loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineRates {
    /// Audio ticks per second.
    pub audio_rate: u32,
    /// Control ticks per second.
    pub control_rate: u32,
}

impl EngineRates {
    /// Rates with the given values.
    pub const fn new(audio_rate: u32, control_rate: u32) -> Self {
        Self {
            audio_rate,
            control_rate,
        }
    }

    /// Audio ticks between two control ticks.
    pub const fn samples_per_tick(&self) -> usize {
        if self.control_rate == 0 {
            return 0;
        }
        (self.audio_rate / self.control_rate) as usize
    }
}

impl Default for EngineRates {
    fn default() -> Self {
        Self::new(AUDIO_RATE, CONTROL_RATE)
    }
}
