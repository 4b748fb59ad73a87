//! Control-rate linear ADSR envelope with 8-bit levels.
//!
//! Each stage is a straight line from the current level to the stage target,
//! spread over the stage duration in control ticks. The level is kept in
//! 8.16 fixed point so slow segments still move every tick.
//!
//! Stage targets:
//!
//! | stage   | target        | duration          |
//! |---------|---------------|-------------------|
//! | Attack  | attack level  | attack time       |
//! | Decay   | decay level   | decay time        |
//! | Sustain | decay level   | sustain time      |
//! | Release | 0             | release time      |
//!
//! The sustain time is long enough that a held note stays in Sustain until
//! it is released; if it does run out the envelope releases on its own.

/// Default attack and decay target.
pub const DEFAULT_LEVEL: u8 = 250;

/// Fixed decay time.
pub const DECAY_MS: u32 = 100;

/// Fixed sustain time.
pub const SUSTAIN_MS: u32 = 32_500;

const LEVEL_SHIFT: u32 = 16;

/// Envelope stages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EnvelopeStage {
    /// Silent.
    #[default]
    Idle,
    /// Ramping up to the attack level.
    Attack,
    /// Ramping to the decay level.
    Decay,
    /// Holding the decay level.
    Sustain,
    /// Ramping down to silence.
    Release,
}

/// Linear ADSR envelope advanced once per control tick.
///
/// # Example
///
/// ```rust
/// use duet_synth::{Envelope, EnvelopeStage};
///
/// let mut env = Envelope::new(128);
/// env.set_attack_ms(100);
/// env.set_levels(200, 200);
/// env.note_on();
///
/// for _ in 0..12 {
///     env.advance();
/// }
/// assert_eq!(env.gain(), 200);
/// assert_eq!(env.stage(), EnvelopeStage::Decay);
///
/// env.note_off();
/// assert_eq!(env.stage(), EnvelopeStage::Release);
/// ```
#[derive(Debug, Clone)]
pub struct Envelope {
    stage: EnvelopeStage,
    /// 8.16 fixed-point level
    level: i32,
    /// Level change per tick
    step: i32,
    ticks_remaining: u32,
    target: u8,
    attack_level: u8,
    decay_level: u8,
    attack_ms: u32,
    decay_ms: u32,
    sustain_ms: u32,
    release_ms: u32,
    control_rate: u32,
}

impl Envelope {
    /// Create an idle envelope advanced `control_rate` times per second.
    ///
    /// Defaults: levels 250/250, attack 28 ms, decay 100 ms,
    /// sustain 32.5 s, release 25 ms.
    pub fn new(control_rate: u32) -> Self {
        Self {
            stage: EnvelopeStage::Idle,
            level: 0,
            step: 0,
            ticks_remaining: 0,
            target: 0,
            attack_level: DEFAULT_LEVEL,
            decay_level: DEFAULT_LEVEL,
            attack_ms: 28,
            decay_ms: DECAY_MS,
            sustain_ms: SUSTAIN_MS,
            release_ms: 25,
            control_rate: control_rate.max(1),
        }
    }

    /// Set the attack and decay targets for the next trigger.
    pub fn set_levels(&mut self, attack: u8, decay: u8) {
        self.attack_level = attack;
        self.decay_level = decay;
    }

    /// Attack and decay targets.
    pub fn levels(&self) -> (u8, u8) {
        (self.attack_level, self.decay_level)
    }

    /// Set the attack time.
    pub fn set_attack_ms(&mut self, ms: u32) {
        self.attack_ms = ms;
    }

    /// Attack time.
    pub fn attack_ms(&self) -> u32 {
        self.attack_ms
    }

    /// Set the decay time.
    pub fn set_decay_ms(&mut self, ms: u32) {
        self.decay_ms = ms;
    }

    /// Set the sustain time.
    pub fn set_sustain_ms(&mut self, ms: u32) {
        self.sustain_ms = ms;
    }

    /// Set the release time.
    pub fn set_release_ms(&mut self, ms: u32) {
        self.release_ms = ms;
    }

    /// Release time.
    pub fn release_ms(&self) -> u32 {
        self.release_ms
    }

    /// Start the attack from the current level.
    pub fn note_on(&mut self) {
        self.begin(EnvelopeStage::Attack);
    }

    /// Start the release from the current level.
    pub fn note_off(&mut self) {
        if self.stage != EnvelopeStage::Idle {
            self.begin(EnvelopeStage::Release);
        }
    }

    /// Current stage.
    pub fn stage(&self) -> EnvelopeStage {
        self.stage
    }

    /// Whether the envelope is producing anything.
    pub fn is_active(&self) -> bool {
        self.stage != EnvelopeStage::Idle
    }

    /// Current gain without advancing.
    #[inline]
    pub fn gain(&self) -> u8 {
        (self.level >> LEVEL_SHIFT).clamp(0, 255) as u8
    }

    /// Advance one control tick and return the gain.
    #[inline]
    pub fn advance(&mut self) -> u8 {
        if self.stage != EnvelopeStage::Idle {
            self.level += self.step;
            self.ticks_remaining = self.ticks_remaining.saturating_sub(1);
            if self.ticks_remaining == 0 {
                self.level = i32::from(self.target) << LEVEL_SHIFT;
                self.begin(Self::following(self.stage));
            }
        }
        self.gain()
    }

    const fn following(stage: EnvelopeStage) -> EnvelopeStage {
        match stage {
            EnvelopeStage::Idle | EnvelopeStage::Release => EnvelopeStage::Idle,
            EnvelopeStage::Attack => EnvelopeStage::Decay,
            EnvelopeStage::Decay => EnvelopeStage::Sustain,
            EnvelopeStage::Sustain => EnvelopeStage::Release,
        }
    }

    fn begin(&mut self, stage: EnvelopeStage) {
        let (target, ms) = match stage {
            EnvelopeStage::Idle => {
                self.stage = EnvelopeStage::Idle;
                self.level = 0;
                self.step = 0;
                self.ticks_remaining = 0;
                self.target = 0;
                return;
            }
            EnvelopeStage::Attack => (self.attack_level, self.attack_ms),
            EnvelopeStage::Decay => (self.decay_level, self.decay_ms),
            EnvelopeStage::Sustain => (self.decay_level, self.sustain_ms),
            EnvelopeStage::Release => (0, self.release_ms),
        };

        let ticks = self.ms_to_ticks(ms);
        self.stage = stage;
        self.target = target;
        self.ticks_remaining = ticks;
        self.step = ((i32::from(target) << LEVEL_SHIFT) - self.level) / ticks as i32;
    }

    fn ms_to_ticks(&self, ms: u32) -> u32 {
        (u64::from(ms) * u64::from(self.control_rate) / 1000).clamp(1, i32::MAX as u64) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: u32 = 128;

    #[test]
    fn idle_envelope_is_silent() {
        let mut env = Envelope::new(RATE);
        assert!((0..10).all(|_| env.advance() == 0));
        assert!(!env.is_active());
    }

    #[test]
    fn attack_rises_monotonically_to_level() {
        let mut env = Envelope::new(RATE);
        env.set_attack_ms(500); // 64 ticks
        env.set_levels(240, 240);
        env.note_on();

        let mut last = 0;
        for _ in 0..64 {
            let gain = env.advance();
            assert!(gain >= last, "attack fell from {last} to {gain}");
            last = gain;
        }
        assert_eq!(last, 240);
        assert_eq!(env.stage(), EnvelopeStage::Decay);
    }

    #[test]
    fn decay_settles_into_sustain() {
        let mut env = Envelope::new(RATE);
        env.set_attack_ms(0);
        env.set_levels(250, 100);
        env.note_on();
        env.advance(); // attack completes in its minimum single tick
        for _ in 0..12 {
            env.advance(); // 100 ms decay
        }
        assert_eq!(env.stage(), EnvelopeStage::Sustain);
        assert_eq!(env.gain(), 100);
        for _ in 0..1000 {
            assert_eq!(env.advance(), 100);
        }
    }

    #[test]
    fn release_from_sustain_reaches_idle() {
        let mut env = Envelope::new(RATE);
        env.set_attack_ms(0);
        env.set_release_ms(250); // 32 ticks
        env.note_on();
        for _ in 0..20 {
            env.advance();
        }
        env.note_off();
        for _ in 0..31 {
            assert!(env.advance() > 0);
        }
        assert_eq!(env.advance(), 0);
        assert_eq!(env.stage(), EnvelopeStage::Idle);
    }

    #[test]
    fn release_mid_attack_starts_from_current_level() {
        let mut env = Envelope::new(RATE);
        env.set_attack_ms(1000);
        env.note_on();
        for _ in 0..64 {
            env.advance();
        }
        let peak = env.gain();
        env.note_off();
        assert!(env.advance() <= peak);
    }

    #[test]
    fn retrigger_restarts_attack_without_jump() {
        let mut env = Envelope::new(RATE);
        env.set_attack_ms(0);
        env.note_on();
        for _ in 0..20 {
            env.advance();
        }
        let held = env.gain();
        env.set_attack_ms(1000);
        env.note_on();
        let next = env.advance();
        assert!(next.abs_diff(held) <= 1, "retrigger jumped from {held} to {next}");
    }

    #[test]
    fn sustain_times_out_into_release() {
        let mut env = Envelope::new(RATE);
        env.set_attack_ms(0);
        env.set_sustain_ms(1000);
        env.note_on();
        for _ in 0..(1 + 12 + 128) {
            env.advance();
        }
        assert_eq!(env.stage(), EnvelopeStage::Release);
    }

    #[test]
    fn note_off_while_idle_stays_idle() {
        let mut env = Envelope::new(RATE);
        env.note_off();
        assert_eq!(env.stage(), EnvelopeStage::Idle);
    }
}
