//! Two voices demo: MIDI and key notes sharing the two registers.
//!
//! Run with: cargo run -p duet-synth --example two_voices

use duet_platform::{
    ANALOG_CHANNELS, AnalogInputs, EventSource, KEY_COUNT, KeySensors, MemoryStore, MidiMessage,
};
use duet_synth::{EngineRates, Instrument, VoiceSlot};
use std::collections::VecDeque;

/// Fixed pots, held keys and queued MIDI.
struct Panel {
    pots: [u16; ANALOG_CHANNELS],
    keys: [bool; KEY_COUNT],
    midi: VecDeque<MidiMessage>,
}

impl AnalogInputs for Panel {
    fn read_analog(&mut self, channel: usize) -> u16 {
        self.pots[channel]
    }
}

impl KeySensors for Panel {
    fn key_present(&mut self, key: usize) -> bool {
        self.keys[key]
    }
}

impl EventSource for Panel {
    fn poll_event(&mut self) -> Option<MidiMessage> {
        self.midi.pop_front()
    }
}

fn note_on(note: u8) -> MidiMessage {
    MidiMessage::NoteOn { channel: 1, note, velocity: 110 }
}

fn note_off(note: u8) -> MidiMessage {
    MidiMessage::NoteOff { channel: 1, note, velocity: 0 }
}

fn main() {
    let rates = EngineRates::default();
    let mut duet = Instrument::boot(rates, MemoryStore::new(), &[0; ANALOG_CHANNELS]);
    // cutoff, waveform, octave, attack, release, lfo waveform, lfo speed, lfo depth
    let mut panel = Panel {
        pots: [1023, 700, 600, 40, 200, 0, 300, 0],
        keys: [false; KEY_COUNT],
        midi: VecDeque::new(),
    };
    let mut block = vec![0i16; duet.samples_per_tick()];

    println!("=== duet: {} Hz audio, {} Hz control ===\n", rates.audio_rate, rates.control_rate);
    println!(" tick | event          | voice 1          | voice 2          | peak");
    println!("------+----------------+------------------+------------------+------");

    for tick in 0..160u32 {
        let event = match tick {
            0 => {
                panel.midi.push_back(note_on(57));
                "MIDI on 57"
            }
            20 => {
                panel.keys[4] = true;
                "key 4 down"
            }
            40 => {
                panel.midi.push_back(note_on(64));
                "MIDI on 64"
            }
            60 => {
                panel.keys[4] = false;
                "key 4 up"
            }
            90 => {
                panel.midi.push_back(note_off(57));
                panel.midi.push_back(note_off(64));
                "MIDI off both"
            }
            _ => "",
        };

        let frame = duet.run_tick(&mut panel, &mut block);
        if tick % 10 != 0 {
            continue;
        }

        let voices = duet.scheduler().voices();
        let describe = |slot: VoiceSlot| {
            let voice = voices.voice(slot);
            match voice.note() {
                Some(note) => format!("{:>3} {:>7.1} Hz", note.id, voice.carrier_frequency()),
                None => format!("  - gain {:>3}", frame.gains[slot.index()]),
            }
        };
        let peak = block.iter().map(|s| s.unsigned_abs()).max().unwrap_or(0);
        println!(
            "{:>5} | {:<14} | {:<16} | {:<16} | {:>5}",
            tick,
            event,
            describe(VoiceSlot::One),
            describe(VoiceSlot::Two),
            peak
        );
    }
}
