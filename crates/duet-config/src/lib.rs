//! Host-side configuration for the duet synth.
//!
//! The real-time crates take plain values; this crate reads them from disk.
//!
//! - [`InstrumentConfig`]: engine rates, resting pot positions and the
//!   power-up sense lines
//! - [`Score`]: timed MIDI, key and pot input for offline rendering
//! - store images: the raw persistent store, see [`load_store`]
//! - [`paths`]: default file locations
//!
//! # Example
//!
//! ```rust
//! use duet_config::{InstrumentConfig, Score, ScoreInput};
//!
//! let config = InstrumentConfig::from_toml("[pots]\nwaveform = 900\n").unwrap();
//! assert_eq!(config.rates().samples_per_tick(), 128);
//!
//! let score = Score::new(500).with_event(0, ScoreInput::KeyDown { key: 9 });
//! assert!(score.validate().is_ok());
//! ```

mod error;
mod instrument;
mod score;
mod store_file;

/// Platform-specific config paths.
pub mod paths;

/// Range checks for configs and scores.
pub mod validation;

pub use error::ConfigError;
pub use instrument::{InstrumentConfig, PotPositions};
pub use paths::{default_config_path, default_store_path, ensure_user_config_dir, user_config_dir};
pub use score::{MAX_DURATION_MS, Score, ScoreEvent, ScoreInput};
pub use store_file::{load_store, save_store};
pub use validation::{ValidationError, ValidationResult};
