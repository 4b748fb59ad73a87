//! Both ticks wired together for hosts that drive them from one loop.
//!
//! On the device the control tick and the audio tick are separate timer
//! interrupts sharing a [`FrameHandoff`]. An offline renderer or a benchmark
//! has no timers, so [`Instrument`] runs one control tick followed by the
//! audio ticks that fall before the next one.

use crate::EngineRates;
use crate::frame::{ControlFrame, FrameHandoff};
use crate::renderer::AudioRenderer;
use crate::scheduler::ControlScheduler;
use duet_platform::{ANALOG_CHANNELS, ControlInputs, PersistentStore};

/// Control scheduler, renderer and the handoff between them.
///
/// # Example
///
/// ```rust
/// use duet_platform::{AnalogInputs, EventSource, KeySensors, MemoryStore, MidiMessage};
/// use duet_synth::{EngineRates, Instrument};
///
/// struct Silence;
/// impl AnalogInputs for Silence {
///     fn read_analog(&mut self, _: usize) -> u16 { 0 }
/// }
/// impl KeySensors for Silence {
///     fn key_present(&mut self, _: usize) -> bool { false }
/// }
/// impl EventSource for Silence {
///     fn poll_event(&mut self) -> Option<MidiMessage> { None }
/// }
///
/// let mut duet = Instrument::boot(EngineRates::default(), MemoryStore::new(), &[0; 8]);
/// let mut block = vec![0i16; duet.samples_per_tick()];
/// duet.run_tick(&mut Silence, &mut block);
/// assert!(block.iter().all(|&s| s == 0));
/// ```
#[derive(Debug)]
pub struct Instrument<S: PersistentStore> {
    scheduler: ControlScheduler<S>,
    renderer: AudioRenderer,
    handoff: FrameHandoff,
}

impl<S: PersistentStore> Instrument<S> {
    /// Boot the scheduler and build the renderer.
    pub fn boot(rates: EngineRates, store: S, sense_lines: &[u16; ANALOG_CHANNELS]) -> Self {
        Self {
            scheduler: ControlScheduler::boot(rates, store, sense_lines),
            renderer: AudioRenderer::new(rates.audio_rate as f32),
            handoff: FrameHandoff::default(),
        }
    }

    /// Audio samples per control tick.
    pub fn samples_per_tick(&self) -> usize {
        self.scheduler.rates().samples_per_tick()
    }

    /// Run one control tick, then fill `out` with audio ticks.
    ///
    /// `out` is normally [`samples_per_tick`](Self::samples_per_tick) long.
    pub fn run_tick(&mut self, inputs: &mut impl ControlInputs, out: &mut [i16]) -> ControlFrame {
        let frame = self.scheduler.tick(inputs, &self.handoff);
        for sample in out.iter_mut() {
            *sample = self.renderer.tick(&self.handoff);
        }
        frame
    }

    /// The control scheduler.
    pub fn scheduler(&self) -> &ControlScheduler<S> {
        &self.scheduler
    }

    /// Mutable access to the control scheduler, for dispatching messages
    /// outside a tick.
    pub fn scheduler_mut(&mut self) -> &mut ControlScheduler<S> {
        &mut self.scheduler
    }

    /// Give the persistent store back.
    pub fn into_store(self) -> S {
        self.scheduler.into_store()
    }
}
