//! The two voice registers and the allocation policy that fills them.
//!
//! MIDI notes and key presses compete for the same two voices under one
//! rule:
//!
//! 1. With portamento on, MIDI notes always take voice 2 and key presses may
//!    only take voice 1; a key press the rule would send to voice 2 is
//!    dropped.
//! 2. Otherwise voice 1 is taken if it is free, or if voice 2 sounds and was
//!    the most recently touched voice. Everything else lands on voice 2,
//!    stealing it without a note-off.
//!
//! A release matching a register frees it and hands "most recent" to the
//! other voice, so the next note fills the freed slot first.
//!
//! # Note identity
//!
//! Registers hold a [`NoteId`] tagged with its source. A key index and a MIDI
//! note number with the same value are different notes: releasing key 2
//! never releases MIDI note 2. [`Voice::register`] still exposes the bare
//! number with [`EMPTY_REGISTER`] for a free slot.

use crate::envelope::Envelope;

/// Bare register value of a free voice.
pub const EMPTY_REGISTER: u8 = 129;

/// Attack and decay level for key presses.
pub const KEY_LEVEL: u8 = 240;

/// Envelope level for a MIDI velocity: twice the velocity, saturated.
#[inline]
pub const fn velocity_level(velocity: u8) -> u8 {
    let doubled = velocity as u16 * 2;
    if doubled > 255 { 255 } else { doubled as u8 }
}

/// Where a note came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteSource {
    /// A MIDI note message.
    Midi,
    /// A capacitive key.
    Key,
}

/// A note as held in a voice register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NoteId {
    /// Origin of the note.
    pub source: NoteSource,
    /// MIDI note number or key index.
    pub id: u8,
}

impl NoteId {
    /// MIDI note `note`.
    pub const fn midi(note: u8) -> Self {
        Self {
            source: NoteSource::Midi,
            id: note,
        }
    }

    /// Key `index`.
    pub const fn key(index: u8) -> Self {
        Self {
            source: NoteSource::Key,
            id: index,
        }
    }
}

/// One of the two voices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoiceSlot {
    /// Voice 1.
    One,
    /// Voice 2, the portamento voice.
    Two,
}

impl VoiceSlot {
    /// Both slots in order.
    pub const ALL: [Self; 2] = [Self::One, Self::Two];

    /// Array index, 0 or 1.
    pub const fn index(self) -> usize {
        match self {
            Self::One => 0,
            Self::Two => 1,
        }
    }

    /// The other voice.
    pub const fn other(self) -> Self {
        match self {
            Self::One => Self::Two,
            Self::Two => Self::One,
        }
    }
}

/// A note-on waiting for a voice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteRequest {
    /// Identity to store in the register.
    pub note: NoteId,
    /// Attack and decay target.
    pub level: u8,
    /// Unbent frequency in Hz.
    pub frequency: f32,
}

/// A voice register with its envelope.
#[derive(Debug, Clone)]
pub struct Voice {
    note: Option<NoteId>,
    base_frequency: f32,
    carrier_frequency: f32,
    envelope: Envelope,
}

impl Voice {
    fn new(control_rate: u32) -> Self {
        Self {
            note: None,
            base_frequency: 0.0,
            carrier_frequency: 0.0,
            envelope: Envelope::new(control_rate),
        }
    }

    /// Note held, if any.
    pub fn note(&self) -> Option<NoteId> {
        self.note
    }

    /// Bare register value: note number, key index, or [`EMPTY_REGISTER`].
    pub fn register(&self) -> u8 {
        self.note.map_or(EMPTY_REGISTER, |note| note.id)
    }

    /// Whether a note holds the register.
    pub fn is_occupied(&self) -> bool {
        self.note.is_some()
    }

    /// Frequency of the held note before bend.
    pub fn base_frequency(&self) -> f32 {
        self.base_frequency
    }

    /// Frequency the oscillator plays.
    pub fn carrier_frequency(&self) -> f32 {
        self.carrier_frequency
    }

    /// The voice envelope.
    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }
}

/// Two-voice allocator.
///
/// # Example
///
/// ```rust
/// use duet_synth::{NoteId, NoteRequest, VoiceAllocator, VoiceSlot};
///
/// let mut voices = VoiceAllocator::new(128);
/// let request = NoteRequest { note: NoteId::midi(60), level: 200, frequency: 261.6 };
/// assert_eq!(voices.note_on(request), Some(VoiceSlot::One));
/// assert_eq!(voices.most_recent(), VoiceSlot::One);
///
/// voices.note_off(NoteId::midi(60));
/// assert!(!voices.voice(VoiceSlot::One).is_occupied());
/// assert_eq!(voices.most_recent(), VoiceSlot::Two);
/// ```
#[derive(Debug, Clone)]
pub struct VoiceAllocator {
    voices: [Voice; 2],
    most_recent: VoiceSlot,
    portamento: bool,
}

impl VoiceAllocator {
    /// Two free voices whose envelopes advance `control_rate` times per second.
    pub fn new(control_rate: u32) -> Self {
        Self {
            voices: [Voice::new(control_rate), Voice::new(control_rate)],
            most_recent: VoiceSlot::Two,
            portamento: false,
        }
    }

    /// Voice in `slot`.
    pub fn voice(&self, slot: VoiceSlot) -> &Voice {
        &self.voices[slot.index()]
    }

    /// Most recently triggered or released voice.
    pub fn most_recent(&self) -> VoiceSlot {
        self.most_recent
    }

    /// Number of occupied registers.
    pub fn occupied(&self) -> usize {
        self.voices.iter().filter(|v| v.is_occupied()).count()
    }

    /// Switch the portamento allocation rule.
    pub fn set_portamento(&mut self, enabled: bool) {
        self.portamento = enabled;
    }

    /// Whether the portamento rule is in force.
    pub fn portamento(&self) -> bool {
        self.portamento
    }

    /// Voice a note from `source` would take, or `None` if it would be dropped.
    pub fn choose(&self, source: NoteSource) -> Option<VoiceSlot> {
        if self.portamento && source == NoteSource::Midi {
            return Some(VoiceSlot::Two);
        }

        let one_free = !self.voices[0].is_occupied();
        let two_sounding_last = self.most_recent == VoiceSlot::Two && self.voices[1].is_occupied();
        let slot = if one_free || two_sounding_last {
            VoiceSlot::One
        } else {
            VoiceSlot::Two
        };

        if self.portamento && slot == VoiceSlot::Two {
            None
        } else {
            Some(slot)
        }
    }

    /// Allocate a voice, trigger its envelope and tune it to
    /// `request.frequency`.
    ///
    /// A held bend is not applied here; the carrier stays unbent until the
    /// next [`apply_bend`](Self::apply_bend).
    pub fn note_on(&mut self, request: NoteRequest) -> Option<VoiceSlot> {
        let Some(slot) = self.choose(request.note.source) else {
            #[cfg(feature = "tracing")]
            tracing::trace!(note = ?request.note, "key press dropped while portamento is on");
            return None;
        };

        let voice = &mut self.voices[slot.index()];
        #[cfg(feature = "tracing")]
        if let Some(stolen) = voice.note {
            tracing::debug!(?slot, ?stolen, note = ?request.note, "voice stolen");
        }

        voice.note = Some(request.note);
        voice.base_frequency = request.frequency;
        voice.carrier_frequency = request.frequency;
        voice.envelope.set_levels(request.level, request.level);
        voice.envelope.note_on();
        self.most_recent = slot;
        Some(slot)
    }

    /// Release every register holding `note`. Returns whether any did.
    pub fn note_off(&mut self, note: NoteId) -> bool {
        let mut released = false;
        for slot in VoiceSlot::ALL {
            let voice = &mut self.voices[slot.index()];
            if voice.note == Some(note) {
                voice.envelope.note_off();
                voice.note = None;
                self.most_recent = slot.other();
                released = true;
            }
        }
        released
    }

    /// Retune both voices to their base frequency times `ratio`.
    pub fn apply_bend(&mut self, ratio: f32) {
        for voice in &mut self.voices {
            voice.carrier_frequency = voice.base_frequency * ratio;
        }
    }

    /// Override the carrier of one voice, as the glide does for voice 2.
    pub fn set_carrier(&mut self, slot: VoiceSlot, frequency: f32) {
        self.voices[slot.index()].carrier_frequency = frequency;
    }

    /// Set the attack time of both envelopes.
    pub fn set_attack_ms(&mut self, ms: u32) {
        for voice in &mut self.voices {
            voice.envelope.set_attack_ms(ms);
        }
    }

    /// Set the release time of both envelopes.
    pub fn set_release_ms(&mut self, ms: u32) {
        for voice in &mut self.voices {
            voice.envelope.set_release_ms(ms);
        }
    }

    /// Advance both envelopes one control tick.
    pub fn advance_envelopes(&mut self) -> [u8; 2] {
        [self.voices[0].envelope.advance(), self.voices[1].envelope.advance()]
    }

    /// Carrier frequencies of both voices.
    pub fn carriers(&self) -> [f32; 2] {
        [self.voices[0].carrier_frequency, self.voices[1].carrier_frequency]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::EnvelopeStage;
    use crate::pitch::midi_to_freq;

    fn midi(note: u8) -> NoteRequest {
        NoteRequest {
            note: NoteId::midi(note),
            level: velocity_level(100),
            frequency: midi_to_freq(note),
        }
    }

    fn key(index: u8) -> NoteRequest {
        NoteRequest {
            note: NoteId::key(index),
            level: KEY_LEVEL,
            frequency: crate::pitch::key_frequency(1, usize::from(index)),
        }
    }

    #[test]
    fn first_note_takes_voice_one() {
        let mut voices = VoiceAllocator::new(128);
        assert_eq!(voices.note_on(midi(60)), Some(VoiceSlot::One));
        assert_eq!(voices.voice(VoiceSlot::One).register(), 60);
        assert_eq!(voices.most_recent(), VoiceSlot::One);
        assert_eq!(voices.voice(VoiceSlot::One).envelope().stage(), EnvelopeStage::Attack);
    }

    #[test]
    fn second_note_takes_voice_two() {
        let mut voices = VoiceAllocator::new(128);
        voices.note_on(midi(60));
        assert_eq!(voices.note_on(midi(64)), Some(VoiceSlot::Two));
        assert_eq!(voices.occupied(), 2);
        assert_eq!(voices.most_recent(), VoiceSlot::Two);
    }

    #[test]
    fn third_note_alternates_back_to_voice_one() {
        let mut voices = VoiceAllocator::new(128);
        voices.note_on(midi(60));
        voices.note_on(midi(64));
        // Voice 2 was touched last and sounds, so voice 1 is stolen.
        assert_eq!(voices.note_on(midi(67)), Some(VoiceSlot::One));
        assert_eq!(voices.voice(VoiceSlot::One).register(), 67);
        assert_eq!(voices.voice(VoiceSlot::Two).register(), 64);
    }

    #[test]
    fn voice_two_is_stolen_when_voice_one_was_last() {
        let mut voices = VoiceAllocator::new(128);
        voices.note_on(midi(60)); // A on voice 1
        voices.note_on(midi(62)); // C on voice 2
        voices.note_off(NoteId::midi(60));
        voices.note_on(midi(60)); // A back on voice 1, most recent 1
        assert_eq!(voices.most_recent(), VoiceSlot::One);

        assert_eq!(voices.note_on(midi(64)), Some(VoiceSlot::Two));
        assert_eq!(voices.voice(VoiceSlot::Two).register(), 64);
        assert_eq!(voices.most_recent(), VoiceSlot::Two);
        // The stolen note was not released, its register was overwritten.
        assert_eq!(voices.voice(VoiceSlot::Two).envelope().stage(), EnvelopeStage::Attack);
    }

    #[test]
    fn release_hands_most_recent_to_other_voice() {
        let mut voices = VoiceAllocator::new(128);
        voices.note_on(midi(60));
        voices.note_on(midi(64));
        assert!(voices.note_off(NoteId::midi(64)));
        assert_eq!(voices.most_recent(), VoiceSlot::One);
        assert_eq!(voices.voice(VoiceSlot::Two).register(), EMPTY_REGISTER);
        assert_eq!(voices.voice(VoiceSlot::Two).envelope().stage(), EnvelopeStage::Release);
    }

    #[test]
    fn unmatched_release_changes_nothing() {
        let mut voices = VoiceAllocator::new(128);
        voices.note_on(midi(60));
        assert!(!voices.note_off(NoteId::midi(61)));
        assert_eq!(voices.most_recent(), VoiceSlot::One);
        assert_eq!(voices.occupied(), 1);
    }

    #[test]
    fn duplicate_note_releases_both_registers() {
        let mut voices = VoiceAllocator::new(128);
        voices.note_on(midi(60));
        voices.note_on(midi(60));
        assert_eq!(voices.occupied(), 2);
        voices.note_off(NoteId::midi(60));
        assert_eq!(voices.occupied(), 0);
    }

    #[test]
    fn portamento_sends_midi_to_voice_two() {
        let mut voices = VoiceAllocator::new(128);
        voices.set_portamento(true);
        assert_eq!(voices.note_on(midi(60)), Some(VoiceSlot::Two));
        assert_eq!(voices.note_on(midi(62)), Some(VoiceSlot::Two));
        assert!(!voices.voice(VoiceSlot::One).is_occupied());
        assert_eq!(voices.voice(VoiceSlot::Two).register(), 62);
    }

    #[test]
    fn portamento_keys_only_claim_voice_one() {
        let mut voices = VoiceAllocator::new(128);
        voices.set_portamento(true);
        voices.note_on(midi(60));
        assert_eq!(voices.note_on(key(3)), Some(VoiceSlot::One));
        // Voice 1 taken and voice 1 was last: the general rule says voice 2.
        assert_eq!(voices.note_on(key(5)), None);
        assert_eq!(voices.voice(VoiceSlot::Two).register(), 60);
        assert_eq!(voices.voice(VoiceSlot::One).note(), Some(NoteId::key(3)));
    }

    #[test]
    fn key_and_midi_identities_do_not_collide() {
        // A bare register cannot tell key 2 from MIDI note 2; the tag can.
        let mut voices = VoiceAllocator::new(128);
        voices.note_on(midi(2));
        voices.note_on(key(2));
        assert_eq!(voices.voice(VoiceSlot::One).register(), voices.voice(VoiceSlot::Two).register());

        assert!(voices.note_off(NoteId::key(2)));
        assert_eq!(voices.voice(VoiceSlot::One).note(), Some(NoteId::midi(2)));
        assert!(!voices.voice(VoiceSlot::Two).is_occupied());
    }

    #[test]
    fn bend_scales_base_frequency() {
        let mut voices = VoiceAllocator::new(128);
        voices.note_on(midi(69));
        voices.apply_bend(1.5);
        assert!((voices.voice(VoiceSlot::One).carrier_frequency() - 660.0).abs() < 1e-2);
        voices.apply_bend(1.0);
        assert!((voices.voice(VoiceSlot::One).carrier_frequency() - 440.0).abs() < 1e-2);
    }

    #[test]
    fn new_note_is_unbent_until_next_bend() {
        let mut voices = VoiceAllocator::new(128);
        voices.note_on(midi(64));
        voices.apply_bend(2.0);
        voices.note_on(midi(69));
        assert!((voices.voice(VoiceSlot::Two).carrier_frequency() - 440.0).abs() < 1e-2);
        assert!((voices.voice(VoiceSlot::One).carrier_frequency() - 2.0 * midi_to_freq(64)).abs() < 1e-2);

        voices.apply_bend(2.0);
        assert!((voices.voice(VoiceSlot::Two).carrier_frequency() - 880.0).abs() < 1e-2);
    }

    #[test]
    fn velocity_level_saturates() {
        assert_eq!(velocity_level(0), 0);
        assert_eq!(velocity_level(100), 200);
        assert_eq!(velocity_level(127), 254);
        assert_eq!(velocity_level(200), 255);
    }
}
