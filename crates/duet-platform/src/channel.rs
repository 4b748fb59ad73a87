//! MIDI channel filtering and channel learn.
//!
//! The listening channel lives in the [`PersistentStore`] so it survives
//! power cycles. It is either omni or a single channel 1..=16.
//!
//! # Learning
//!
//! Holding every analog line at full scale while powering up arms learn
//! mode for the rest of the session and stores omni straight away. While
//! armed, every accepted note or controller message stores its own channel,
//! clears the omni flag and narrows listening to that channel. Controller
//! 124 re-reads the stored channel, controller 125 goes back to omni.

use crate::ANALOG_CHANNELS;
use crate::midi::MidiMessage;
use crate::store::{CHANNEL_ADDRESS, OMNI_ADDRESS, PersistentStore};

/// Every boot-time sense line must read at least this to arm learn mode.
pub const LEARN_THRESHOLD: u16 = 1000;

/// Which channels are listened to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelMode {
    /// Every channel.
    Omni,
    /// A single channel, 1..=16.
    Channel(u8),
}

impl ChannelMode {
    /// Whether a message on `channel` gets through.
    pub const fn accepts(self, channel: u8) -> bool {
        match self {
            Self::Omni => true,
            Self::Channel(listening) => listening == channel,
        }
    }

    /// Mode described by the store.
    ///
    /// A stored channel above 16 reads as 0, and 0 means omni.
    pub fn stored(store: &impl PersistentStore) -> Self {
        if store.read(OMNI_ADDRESS) == 1 {
            return Self::Omni;
        }
        Self::from_stored_channel(store.read(CHANNEL_ADDRESS))
    }

    fn from_stored_channel(channel: u8) -> Self {
        match channel {
            1..=16 => Self::Channel(channel),
            _ => Self::Omni,
        }
    }
}

/// Channel gate in front of the MIDI dispatcher.
///
/// # Example
///
/// ```rust
/// use duet_platform::{ChannelFilter, ChannelMode, MemoryStore, MidiMessage};
///
/// let mut store = MemoryStore::new();
/// let mut filter = ChannelFilter::boot(&mut store, &[1023; 8]);
/// assert!(filter.is_learning());
///
/// let msg = MidiMessage::NoteOn { channel: 4, note: 60, velocity: 90 };
/// assert!(filter.admit(&msg, &mut store));
/// assert_eq!(filter.mode(), ChannelMode::Channel(4));
///
/// let other = MidiMessage::NoteOn { channel: 9, note: 60, velocity: 90 };
/// assert!(!filter.admit(&other, &mut store));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelFilter {
    mode: ChannelMode,
    learning: bool,
}

impl ChannelFilter {
    /// Power-up: arm learn mode if every sense line is at or above
    /// [`LEARN_THRESHOLD`], then listen as the store says.
    pub fn boot(store: &mut impl PersistentStore, sense_lines: &[u16; ANALOG_CHANNELS]) -> Self {
        let learning = sense_lines.iter().all(|&level| level >= LEARN_THRESHOLD);
        if learning {
            store.write(OMNI_ADDRESS, 1);
            #[cfg(feature = "tracing")]
            tracing::info!("channel learn armed at boot, omni stored");
        }
        Self {
            mode: ChannelMode::stored(store),
            learning,
        }
    }

    /// Listen as the store says, learning disarmed.
    pub fn from_store(store: &impl PersistentStore) -> Self {
        Self {
            mode: ChannelMode::stored(store),
            learning: false,
        }
    }

    /// Current listening mode.
    pub fn mode(&self) -> ChannelMode {
        self.mode
    }

    /// Whether learn mode is armed.
    pub fn is_learning(&self) -> bool {
        self.learning
    }

    /// Gate a message, learning its channel if armed.
    ///
    /// Returns whether the message should be dispatched.
    pub fn admit(&mut self, message: &MidiMessage, store: &mut impl PersistentStore) -> bool {
        let channel = message.channel();
        if !self.mode.accepts(channel) {
            return false;
        }
        if self.learning && message.teaches_channel() {
            self.learn(channel, store);
        }
        true
    }

    /// Store `channel`, clear omni and listen on it.
    pub fn learn(&mut self, channel: u8, store: &mut impl PersistentStore) {
        store.write(CHANNEL_ADDRESS, channel);
        store.write(OMNI_ADDRESS, 0);
        self.mode = ChannelMode::from_stored_channel(channel);
        #[cfg(feature = "tracing")]
        tracing::debug!(channel, "learned MIDI channel");
    }

    /// Clear omni and listen on the stored channel.
    pub fn commit(&mut self, store: &mut impl PersistentStore) {
        store.write(OMNI_ADDRESS, 0);
        self.mode = ChannelMode::stored(store);
        #[cfg(feature = "tracing")]
        tracing::debug!(mode = ?self.mode, "committed stored MIDI channel");
    }

    /// Store omni and listen on every channel.
    pub fn force_omni(&mut self, store: &mut impl PersistentStore) {
        store.write(OMNI_ADDRESS, 1);
        self.mode = ChannelMode::Omni;
        #[cfg(feature = "tracing")]
        tracing::debug!("omni mode forced");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn store_with(channel: u8, omni: u8) -> MemoryStore {
        let mut store = MemoryStore::new();
        store.write(CHANNEL_ADDRESS, channel);
        store.write(OMNI_ADDRESS, omni);
        store
    }

    fn note_on(channel: u8) -> MidiMessage {
        MidiMessage::NoteOn { channel, note: 64, velocity: 100 }
    }

    #[test]
    fn erased_store_listens_omni() {
        let store = MemoryStore::new();
        assert_eq!(ChannelFilter::from_store(&store).mode(), ChannelMode::Omni);
    }

    #[test]
    fn stored_channel_is_used_when_omni_clear() {
        let store = store_with(7, 0);
        assert_eq!(ChannelFilter::from_store(&store).mode(), ChannelMode::Channel(7));
    }

    #[test]
    fn stored_channel_above_sixteen_reads_as_omni() {
        let store = store_with(42, 0);
        assert_eq!(ChannelFilter::from_store(&store).mode(), ChannelMode::Omni);
    }

    #[test]
    fn omni_flag_overrides_stored_channel() {
        let store = store_with(7, 1);
        assert_eq!(ChannelFilter::from_store(&store).mode(), ChannelMode::Omni);
    }

    #[test]
    fn boot_learn_needs_every_line_high() {
        let mut store = store_with(7, 0);
        let mut lines = [1023; ANALOG_CHANNELS];
        lines[5] = 999;
        let filter = ChannelFilter::boot(&mut store, &lines);
        assert!(!filter.is_learning());
        assert_eq!(filter.mode(), ChannelMode::Channel(7));
        assert_eq!(store.read(OMNI_ADDRESS), 0);
    }

    #[test]
    fn boot_learn_persists_omni_immediately() {
        let mut store = store_with(7, 0);
        let filter = ChannelFilter::boot(&mut store, &[LEARN_THRESHOLD; ANALOG_CHANNELS]);
        assert!(filter.is_learning());
        assert_eq!(filter.mode(), ChannelMode::Omni);
        assert_eq!(store.read(OMNI_ADDRESS), 1);
    }

    #[test]
    fn learning_follows_every_teaching_message() {
        let mut store = MemoryStore::new();
        let mut filter = ChannelFilter::boot(&mut store, &[1023; ANALOG_CHANNELS]);

        assert!(filter.admit(&note_on(3), &mut store));
        assert_eq!(store.read(CHANNEL_ADDRESS), 3);
        assert_eq!(store.read(OMNI_ADDRESS), 0);

        // Narrowed to 3, so channel 5 is dropped and teaches nothing.
        assert!(!filter.admit(&note_on(5), &mut store));
        assert_eq!(store.read(CHANNEL_ADDRESS), 3);

        // Omni again, learning still armed.
        filter.force_omni(&mut store);
        assert!(filter.admit(&note_on(5), &mut store));
        assert_eq!(filter.mode(), ChannelMode::Channel(5));
    }

    #[test]
    fn pitch_bend_passes_without_learning() {
        let mut store = MemoryStore::new();
        let mut filter = ChannelFilter::boot(&mut store, &[1023; ANALOG_CHANNELS]);
        let bend = MidiMessage::PitchBend { channel: 9, value: -300 };
        assert!(filter.admit(&bend, &mut store));
        assert_eq!(filter.mode(), ChannelMode::Omni);
        assert_eq!(store.read(CHANNEL_ADDRESS), crate::store::ERASED);
    }

    #[test]
    fn commit_listens_on_stored_channel() {
        let mut store = store_with(12, 1);
        let mut filter = ChannelFilter::from_store(&store);
        assert_eq!(filter.mode(), ChannelMode::Omni);
        filter.commit(&mut store);
        assert_eq!(filter.mode(), ChannelMode::Channel(12));
        assert_eq!(store.read(OMNI_ADDRESS), 0);
    }

    #[test]
    fn every_channel_event_writes_the_store() {
        let mut store = store_with(6, 0);
        let before = store.write_count();
        let mut filter = ChannelFilter::from_store(&store);

        filter.commit(&mut store);
        assert_eq!(store.write_count(), before + 1);
        filter.learn(6, &mut store);
        assert_eq!(store.write_count(), before + 3);
        filter.force_omni(&mut store);
        filter.force_omni(&mut store);
        assert_eq!(store.write_count(), before + 5);
    }
}
