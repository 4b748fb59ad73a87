//! The control tick.
//!
//! [`ControlScheduler`] owns every piece of control-rate state and runs it in
//! a fixed order once per tick:
//!
//! 1. read one potentiometer, chosen by a modulo-8 counter
//! 2. recompute the modulated filter cutoff
//! 3. dispatch at most one pending MIDI message
//! 4. debounce all thirteen keys and allocate or release voices
//! 5. advance both envelopes
//! 6. step the portamento glide into voice 2, when enabled
//! 7. publish a [`ControlFrame`] for the audio tick
//!
//! Pots are slow and staggered; everything a player hears changing is
//! recomputed every tick.

use crate::EngineRates;
use crate::frame::{ControlFrame, FrameHandoff};
use crate::key_scan::{KeyEdge, KeyScanner};
use crate::modulation::FilterModulator;
use crate::pitch::{PitchBend, key_frequency, midi_to_freq};
use crate::renderer::AudioRenderer;
use crate::voice::{KEY_LEVEL, NoteId, NoteRequest, VoiceAllocator, VoiceSlot, velocity_level};
use duet_core::{Glide, LfoWaveform, WaveShape, Waveform};
use duet_platform::{
    ANALOG_CHANNELS, AnalogInputs, ChannelFilter, ControlInputs, Controller, MidiMessage,
    PersistentStore, Pot,
};

/// Ticks in one full pot cycle.
pub const POLL_CYCLE: usize = Pot::ROUND_ROBIN.len();

/// Milliseconds of glide per unit of controller 5.
pub const PORTAMENTO_MS_PER_STEP: u32 = 8;

/// Channel volume at power-up.
pub const DEFAULT_VOLUME: u8 = 127;

/// Latest mapped value of every pot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlParameters {
    /// Base filter cutoff, 30..=180.
    pub cutoff: u8,
    /// Voice waveform.
    pub waveform: Waveform,
    /// Key octave, 0..=3.
    pub octave: u8,
    /// Attack time in ms.
    pub attack_ms: u16,
    /// Release time in ms.
    pub release_ms: u16,
    /// LFO waveform.
    pub lfo_waveform: LfoWaveform,
    /// LFO rate in tenths of a hertz.
    pub lfo_speed: u8,
    /// Last LFO depth pot reading, 1..=256.
    pub lfo_depth: u16,
}

impl Default for ControlParameters {
    fn default() -> Self {
        Self {
            cutoff: 180,
            waveform: Waveform::Sine,
            octave: 0,
            attack_ms: 28,
            release_ms: 25,
            lfo_waveform: LfoWaveform::Sine,
            lfo_speed: 2,
            lfo_depth: 1,
        }
    }
}

/// Round-robin control loop owning all control-rate state.
///
/// # Example
///
/// ```rust
/// use duet_platform::{
///     AnalogInputs, EventSource, KeySensors, MemoryStore, MidiMessage, Pot,
/// };
/// use duet_synth::{ControlScheduler, EngineRates, FrameHandoff, VoiceSlot};
///
/// struct Rig(Option<MidiMessage>);
/// impl AnalogInputs for Rig {
///     fn read_analog(&mut self, _: usize) -> u16 { 512 }
/// }
/// impl KeySensors for Rig {
///     fn key_present(&mut self, _: usize) -> bool { false }
/// }
/// impl EventSource for Rig {
///     fn poll_event(&mut self) -> Option<MidiMessage> { self.0.take() }
/// }
///
/// let handoff = FrameHandoff::default();
/// let mut synth = ControlScheduler::boot(EngineRates::default(), MemoryStore::new(), &[0; 8]);
/// let mut rig = Rig(Some(MidiMessage::NoteOn { channel: 1, note: 60, velocity: 100 }));
///
/// assert_eq!(synth.next_pot(), Pot::Cutoff);
/// synth.tick(&mut rig, &handoff);
/// assert_eq!(synth.voices().voice(VoiceSlot::One).register(), 60);
/// assert!(handoff.snapshot().gains[0] > 0);
/// ```
#[derive(Debug, Clone)]
pub struct ControlScheduler<S: PersistentStore> {
    rates: EngineRates,
    poll_index: usize,
    params: ControlParameters,
    depth_pot: Option<u16>,
    keys: KeyScanner,
    voices: VoiceAllocator,
    bend: PitchBend,
    glide: Glide,
    modulation: FilterModulator,
    channel: ChannelFilter,
    store: S,
    volume: u8,
    frame: ControlFrame,
    ticks: u64,
}

impl<S: PersistentStore> ControlScheduler<S> {
    /// Power up: decide the MIDI channel from `store` and the boot-time
    /// `sense_lines`, and start with every voice free.
    pub fn boot(rates: EngineRates, mut store: S, sense_lines: &[u16; ANALOG_CHANNELS]) -> Self {
        let channel = ChannelFilter::boot(&mut store, sense_lines);
        let params = ControlParameters::default();

        let mut voices = VoiceAllocator::new(rates.control_rate);
        voices.set_attack_ms(u32::from(params.attack_ms));
        voices.set_release_ms(u32::from(params.release_ms));

        let mut modulation = FilterModulator::new(rates.control_rate as f32);
        modulation.set_base_cutoff(params.cutoff);
        modulation.set_lfo_rate(f32::from(params.lfo_speed) / 10.0);

        #[cfg(feature = "tracing")]
        tracing::info!(?rates, mode = ?channel.mode(), learning = channel.is_learning(), "control scheduler booted");

        Self {
            rates,
            poll_index: 0,
            params,
            depth_pot: None,
            keys: KeyScanner::new(),
            voices,
            bend: PitchBend::new(),
            glide: Glide::new(rates.control_rate as f32),
            modulation,
            channel,
            store,
            volume: DEFAULT_VOLUME,
            frame: ControlFrame::SILENT,
            ticks: 0,
        }
    }

    /// Run one control tick and publish its frame.
    pub fn tick(&mut self, inputs: &mut impl ControlInputs, handoff: &FrameHandoff) -> ControlFrame {
        self.poll_parameter(inputs);
        let cutoff = self.modulation.tick();

        if let Some(message) = inputs.poll_event() {
            self.handle_message(message);
        }

        let edges = self.keys.scan(inputs);
        for (key, edge) in edges.into_iter().enumerate() {
            match edge {
                Some(KeyEdge::Pressed) => self.key_pressed(key),
                Some(KeyEdge::Released) => {
                    self.voices.note_off(NoteId::key(key as u8));
                }
                None => {}
            }
        }

        let gains = self.voices.advance_envelopes();

        if self.voices.portamento() {
            let frequency = self.glide.advance();
            self.voices.set_carrier(VoiceSlot::Two, frequency);
        }

        let audio_rate = self.rates.audio_rate as f32;
        let carriers = self.voices.carriers();
        self.frame = ControlFrame {
            increments: carriers.map(|f| AudioRenderer::increment_for(f, audio_rate)),
            gains,
            volume: self.volume,
            cutoff,
            waveform: self.params.waveform,
        };
        handoff.publish(self.frame);
        self.ticks += 1;
        self.frame
    }

    /// Pot the next tick will read.
    pub fn next_pot(&self) -> Pot {
        Pot::ROUND_ROBIN[self.poll_index]
    }

    /// Read and apply the pot at the counter, then advance the counter.
    fn poll_parameter(&mut self, inputs: &mut impl AnalogInputs) {
        let pot = self.next_pot();
        let value = pot.read(inputs);
        self.apply_parameter(pot, value);
        self.poll_index = (self.poll_index + 1) % POLL_CYCLE;
    }

    /// Apply a mapped pot value.
    pub fn apply_parameter(&mut self, pot: Pot, value: i32) {
        let (min, max) = pot.range_map().range();
        let value = value.clamp(min, max);
        match pot {
            Pot::Cutoff => {
                self.params.cutoff = value as u8;
                self.modulation.set_base_cutoff(self.params.cutoff);
            }
            Pot::Waveform => self.params.waveform = Waveform::from_selector(value),
            Pot::Octave => self.params.octave = value as u8,
            Pot::Attack => {
                self.params.attack_ms = value as u16;
                self.voices.set_attack_ms(value as u32);
            }
            Pot::Release => {
                self.params.release_ms = value as u16;
                self.voices.set_release_ms(value as u32);
            }
            Pot::LfoWaveform => {
                self.params.lfo_waveform = LfoWaveform::from_selector(value);
                self.modulation.set_lfo_waveform(self.params.lfo_waveform);
            }
            Pot::LfoSpeed => {
                self.params.lfo_speed = value as u8;
                self.modulation.set_lfo_rate(value as f32 / 10.0);
            }
            Pot::LfoDepth => {
                // Only a moved pot takes depth back from controller 1.
                let depth = value as u16;
                if self.depth_pot != Some(depth) {
                    self.depth_pot = Some(depth);
                    self.params.lfo_depth = depth;
                    self.modulation.set_depth(depth);
                }
            }
        }
    }

    /// Dispatch one decoded MIDI message through the channel filter.
    pub fn handle_message(&mut self, message: MidiMessage) {
        if !self.channel.admit(&message, &mut self.store) {
            return;
        }

        match message {
            MidiMessage::NoteOn { note, velocity: 0, .. }
            | MidiMessage::NoteOff { note, .. } => {
                self.voices.note_off(NoteId::midi(note));
            }
            MidiMessage::NoteOn { note, velocity, .. } => self.midi_note_on(note, velocity),
            MidiMessage::PitchBend { value, .. } => {
                let ratio = self.bend.apply(value);
                self.voices.apply_bend(ratio);
            }
            MidiMessage::ControlChange { controller, value, .. } => {
                self.control_change(controller, value);
            }
        }
    }

    fn midi_note_on(&mut self, note: u8, velocity: u8) {
        let frequency = midi_to_freq(note);
        let request = NoteRequest {
            note: NoteId::midi(note),
            level: velocity_level(velocity),
            frequency,
        };
        let slot = self.voices.note_on(request);
        if slot == Some(VoiceSlot::Two) && self.voices.portamento() {
            if self.glide.get() <= 0.0 {
                self.glide.set_immediate(frequency);
            } else {
                self.glide.start(frequency);
            }
        }
    }

    fn key_pressed(&mut self, key: usize) {
        let request = NoteRequest {
            note: NoteId::key(key as u8),
            level: KEY_LEVEL,
            frequency: key_frequency(self.params.octave, key),
        };
        self.voices.note_on(request);
    }

    fn control_change(&mut self, number: u8, value: u8) {
        let Some(controller) = Controller::from_number(number) else {
            #[cfg(feature = "tracing")]
            tracing::trace!(number, value, "ignoring unmapped controller");
            return;
        };

        match controller {
            Controller::Modulation => {
                self.modulation.set_depth(u16::from(value) * 2 + 1);
            }
            Controller::Portamento => self.set_portamento(value),
            Controller::Volume => self.volume = value,
            Controller::BendRange => self.bend.set_range(value),
            Controller::CommitChannel => self.channel.commit(&mut self.store),
            Controller::OmniOn => self.channel.force_omni(&mut self.store),
        }
    }

    fn set_portamento(&mut self, value: u8) {
        let enabled = value != 0;
        if enabled {
            self.glide.set_time_ms((u32::from(value) * PORTAMENTO_MS_PER_STEP) as f32);
            if !self.voices.portamento() {
                let current = self.voices.voice(VoiceSlot::Two).carrier_frequency();
                self.glide.set_immediate(current);
            }
        }
        #[cfg(feature = "tracing")]
        if enabled != self.voices.portamento() {
            tracing::debug!(enabled, glide_ms = self.glide.time_ms(), "portamento switched");
        }
        self.voices.set_portamento(enabled);
    }

    /// Engine rates.
    pub fn rates(&self) -> EngineRates {
        self.rates
    }

    /// Counter selecting the next pot, 0..[`POLL_CYCLE`].
    pub fn poll_index(&self) -> usize {
        self.poll_index
    }

    /// Latest pot values.
    pub fn params(&self) -> &ControlParameters {
        &self.params
    }

    /// Voice registers and envelopes.
    pub fn voices(&self) -> &VoiceAllocator {
        &self.voices
    }

    /// Key debounce state.
    pub fn keys(&self) -> &KeyScanner {
        &self.keys
    }

    /// Pitch-wheel state.
    pub fn pitch_bend(&self) -> &PitchBend {
        &self.bend
    }

    /// Portamento glide.
    pub fn glide(&self) -> &Glide {
        &self.glide
    }

    /// Filter/LFO controller.
    pub fn modulation(&self) -> &FilterModulator {
        &self.modulation
    }

    /// MIDI channel filter.
    pub fn channel(&self) -> &ChannelFilter {
        &self.channel
    }

    /// Channel volume.
    pub fn volume(&self) -> u8 {
        self.volume
    }

    /// Persistent store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Give the persistent store back.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Frame published by the last tick.
    pub fn frame(&self) -> ControlFrame {
        self.frame
    }

    /// Ticks run since boot.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
