//! Duet Core - fixed-point DSP primitives for a two-voice synthesizer
//!
//! Everything in this crate runs inside a control tick or an audio tick on a
//! single core, so nothing allocates and nothing can fail. Sample values are
//! signed 8-bit table cells widened to `i32` for filtering; gains and cutoffs
//! are 8-bit.
//!
//! # Components
//!
//! ## Parameter Mapping
//!
//! - [`RangeMap`] - clamped linear conversion from a raw reading to a working range
//!
//! ## Waveforms
//!
//! - [`WaveTable`] - one cycle of a waveform as signed 8-bit cells
//! - [`WaveBank`] - the four tables of a [`WaveShape`] family
//! - [`Waveform`] - voice shapes (sine, triangle, saw, square)
//! - [`LfoWaveform`] - LFO shapes (sine, saw, ramp, square)
//!
//! ## Oscillators
//!
//! - [`Oscillator`] - Q16.16 phase accumulator reading a [`WaveTable`]
//! - [`Lfo`] - control-rate oscillator with its own table bank
//!
//! ## Filtering and Glide
//!
//! - [`ResonantLowPass`] - two-pole resonant low-pass in 8-bit fixed point
//! - [`Glide`] - linear frequency ramp for portamento
//!
//! # Example
//!
//! ```rust
//! use duet_core::{Oscillator, ResonantLowPass, WaveBank, Waveform};
//!
//! let bank: WaveBank<2048, Waveform> = WaveBank::new();
//! let mut osc = Oscillator::<2048>::new(16384.0);
//! osc.set_frequency(220.0);
//!
//! let mut lpf = ResonantLowPass::new(35);
//! lpf.set_cutoff(120);
//!
//! let sample = lpf.process(i32::from(osc.advance(bank.table(Waveform::Saw))));
//! assert!(sample.abs() < 1024);
//! ```
//!
//! # no_std Support
//!
//! Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! duet-core = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod glide;
pub mod lfo;
pub mod low_pass;
pub mod oscillator;
pub mod range_map;
pub mod wavetable;

pub use glide::Glide;
pub use lfo::{LFO_TABLE_SIZE, Lfo};
pub use low_pass::ResonantLowPass;
pub use oscillator::Oscillator;
pub use range_map::RangeMap;
pub use wavetable::{LfoWaveform, WaveBank, WaveShape, WaveTable, Waveform};
