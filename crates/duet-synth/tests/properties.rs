//! Property-based tests for duet-synth.
//!
//! Randomized note traffic, key noise, LFO values and wheel positions
//! against the allocator, debouncer and modulation invariants.

use duet_synth::modulation::modulated_cutoff;
use duet_synth::pitch::{bend_ratio, midi_to_freq};
use duet_synth::{Envelope, KeyEdge, KeyState, NoteId, NoteRequest, VoiceAllocator, VoiceSlot};
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
enum Event {
    MidiOn(u8),
    MidiOff(u8),
    KeyOn(u8),
    KeyOff(u8),
}

fn event() -> impl Strategy<Value = Event> {
    prop_oneof![
        (0u8..128).prop_map(Event::MidiOn),
        (0u8..128).prop_map(Event::MidiOff),
        (0u8..13).prop_map(Event::KeyOn),
        (0u8..13).prop_map(Event::KeyOff),
    ]
}

fn apply(voices: &mut VoiceAllocator, event: Event) -> Option<VoiceSlot> {
    match event {
        Event::MidiOn(note) => voices.note_on(NoteRequest {
            note: NoteId::midi(note),
            level: 200,
            frequency: midi_to_freq(note),
        }),
        Event::KeyOn(key) => voices.note_on(NoteRequest {
            note: NoteId::key(key),
            level: 240,
            frequency: 220.0,
        }),
        Event::MidiOff(note) => {
            voices.note_off(NoteId::midi(note));
            None
        }
        Event::KeyOff(key) => {
            voices.note_off(NoteId::key(key));
            None
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// No event sequence ever occupies more than two registers, and a note
    /// that was just started is always sounding.
    #[test]
    fn never_more_than_two_voices(events in prop::collection::vec(event(), 1..200)) {
        let mut voices = VoiceAllocator::new(128);
        for event in events {
            if let Some(slot) = apply(&mut voices, event) {
                prop_assert_eq!(voices.most_recent(), slot);
                prop_assert!(voices.voice(slot).is_occupied());
            }
            prop_assert!(voices.occupied() <= 2);
            voices.advance_envelopes();
        }
    }

    /// Under portamento every MIDI note lands on voice 2 and keys never do.
    #[test]
    fn portamento_reserves_voice_two(events in prop::collection::vec(event(), 1..200)) {
        let mut voices = VoiceAllocator::new(128);
        voices.set_portamento(true);
        for event in events {
            let slot = apply(&mut voices, event);
            match event {
                Event::MidiOn(_) => prop_assert_eq!(slot, Some(VoiceSlot::Two)),
                Event::KeyOn(_) => prop_assert_ne!(slot, Some(VoiceSlot::Two)),
                _ => {}
            }
            if let Some(note) = voices.voice(VoiceSlot::Two).note() {
                prop_assert_eq!(note.source, duet_synth::NoteSource::Midi);
            }
        }
    }

    /// The debounced state only changes after three agreeing samples.
    #[test]
    fn debounce_needs_three_agreeing_samples(samples in prop::collection::vec(any::<bool>(), 1..300)) {
        let mut key = KeyState::new();
        for (i, &present) in samples.iter().enumerate() {
            let before = key.is_latched();
            let edge = key.sample(present);
            let after = key.is_latched();
            if before != after {
                prop_assert!(i >= 2);
                prop_assert!(samples[i - 2..=i].iter().all(|&s| s == after));
            }
            match edge {
                Some(KeyEdge::Pressed) => prop_assert!(after && !before),
                Some(KeyEdge::Released) => prop_assert!(!after && before),
                None => prop_assert_eq!(before, after),
            }
        }
    }

    /// Alternating samples never latch, whatever the phase.
    #[test]
    fn alternating_samples_never_latch(start in any::<bool>(), len in 1usize..200) {
        let mut key = KeyState::new();
        for i in 0..len {
            prop_assert_eq!(key.sample(start ^ (i % 2 == 1)), None);
        }
        prop_assert!(!key.is_latched());
    }

    /// The LFO only ever closes the filter.
    #[test]
    fn cutoff_never_exceeds_base(base in 0u8..=255, lfo in any::<i8>(), depth in 0u16..400) {
        prop_assert!(modulated_cutoff(base, lfo, depth) <= base);
    }

    /// Deeper modulation never opens the filter further.
    #[test]
    fn depth_is_monotonic(base in 30u8..=180, lfo in any::<i8>(), a in 1u16..=256, b in 1u16..=256) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(modulated_cutoff(base, lfo, hi) <= modulated_cutoff(base, lfo, lo));
    }

    /// Bend ratios stay within an octave either way and rise with the wheel.
    #[test]
    fn bend_ratio_is_bounded_and_monotonic(a in -8192i16..=8191, b in -8192i16..=8191, range in 0u8..=12) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let (r_lo, r_hi) = (bend_ratio(lo, range), bend_ratio(hi, range));
        prop_assert!(r_lo <= r_hi);
        prop_assert!((0.5..=2.0).contains(&r_lo));
        prop_assert!((0.5..=2.0).contains(&r_hi));
    }

    /// Envelope gain never overshoots the note level.
    #[test]
    fn envelope_stays_below_level(
        level in 1u8..=255,
        attack in 0u32..3000,
        release in 0u32..3000,
        held in 0usize..600,
    ) {
        let mut env = Envelope::new(128);
        env.set_attack_ms(attack);
        env.set_release_ms(release);
        env.set_levels(level, level);
        env.note_on();
        for _ in 0..held {
            prop_assert!(env.advance() <= level);
        }
        env.note_off();
        for _ in 0..400 {
            prop_assert!(env.advance() <= level);
        }
        prop_assert!(!env.is_active());
    }
}
