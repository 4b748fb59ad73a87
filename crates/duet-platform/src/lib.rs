//! Duet Platform - the seams between the synth core and the hardware
//!
//! The control loop reads three kinds of input and touches one kind of
//! storage, all through traits so the same core runs on a microcontroller,
//! in a host renderer, or against scripted test fixtures:
//!
//! - [`AnalogInputs`] - eight potentiometer / sense lines, 0..=1023
//! - [`KeySensors`] - thirteen capacitive key presence lines
//! - [`EventSource`] - decoded MIDI messages, at most one per poll
//! - [`PersistentStore`] - byte-addressed non-volatile memory
//!
//! On top of those seams this crate defines the potentiometer table
//! ([`Pot`]), the decoded [`MidiMessage`] and recognised [`Controller`]s, an
//! in-memory store ([`MemoryStore`]), and the MIDI [`ChannelFilter`] with
//! boot-time and runtime channel learn.
//!
//! # no_std Support
//!
//! ```toml
//! [dependencies]
//! duet-platform = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use duet_platform::{AnalogInputs, Pot};
//!
//! struct Panel([u16; 8]);
//!
//! impl AnalogInputs for Panel {
//!     fn read_analog(&mut self, channel: usize) -> u16 {
//!         self.0[channel]
//!     }
//! }
//!
//! let mut panel = Panel([0, 0, 0, 0, 1023, 0, 0, 0]);
//! assert_eq!(Pot::Cutoff.read(&mut panel), 180);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod channel;
pub mod controls;
pub mod midi;
pub mod store;

pub use channel::{ChannelFilter, ChannelMode, LEARN_THRESHOLD};
pub use controls::Pot;
pub use midi::{BEND_MAX, BEND_MIN, Controller, MidiMessage};
pub use store::{CHANNEL_ADDRESS, ERASED, MemoryStore, OMNI_ADDRESS, PersistentStore, STORE_SIZE};

/// Number of analog input lines.
pub const ANALOG_CHANNELS: usize = 8;

/// Number of capacitive keys.
pub const KEY_COUNT: usize = 13;

/// Largest raw analog reading.
pub const ANALOG_FULL_SCALE: u16 = 1023;

/// Analog potentiometer and sense lines.
///
/// Readings above [`ANALOG_FULL_SCALE`] are tolerated; every consumer
/// clamps through a [`RangeMap`](duet_core::RangeMap).
pub trait AnalogInputs {
    /// Raw reading of line `channel` (0..[`ANALOG_CHANNELS`]).
    fn read_analog(&mut self, channel: usize) -> u16;

    /// Read every line once, in channel order.
    fn read_all_analog(&mut self) -> [u16; ANALOG_CHANNELS] {
        core::array::from_fn(|channel| self.read_analog(channel))
    }
}

/// Capacitive key presence lines.
pub trait KeySensors {
    /// Whether something is touching key `key` (0..[`KEY_COUNT`]) right now.
    ///
    /// This is the raw, undebounced sample.
    fn key_present(&mut self, key: usize) -> bool;
}

/// Source of decoded MIDI messages.
pub trait EventSource {
    /// Take the next pending message, if any.
    fn poll_event(&mut self) -> Option<MidiMessage>;
}

/// Everything the control tick reads.
pub trait ControlInputs: AnalogInputs + KeySensors + EventSource {}

impl<T: AnalogInputs + KeySensors + EventSource> ControlInputs for T {}

impl<T: AnalogInputs + ?Sized> AnalogInputs for &mut T {
    fn read_analog(&mut self, channel: usize) -> u16 {
        (**self).read_analog(channel)
    }
}

impl<T: KeySensors + ?Sized> KeySensors for &mut T {
    fn key_present(&mut self, key: usize) -> bool {
        (**self).key_present(key)
    }
}

impl<T: EventSource + ?Sized> EventSource for &mut T {
    fn poll_event(&mut self) -> Option<MidiMessage> {
        (**self).poll_event()
    }
}
