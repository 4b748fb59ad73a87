//! Two-pole resonant low-pass filter in 8-bit fixed point.
//!
//! Two cascaded one-pole sections with resonance fed back from the
//! difference between them:
//!
//! ```text
//! feedback = q + q * (256 - f) / 256
//! band    += f * ((x - band) + feedback * (band - low) / 256) / 256
//! low     += f * (band - low) / 256
//! y        = low
//! ```
//!
//! `f` is the cutoff (0 = closed, 255 = fully open) and `q` the resonance,
//! both on a 0..255 scale. Feedback grows as the cutoff drops so resonance
//! stays audible across the sweep. State is kept in `i32` so an 8-bit input
//! has plenty of headroom.
//!
//! Each voice needs its own instance: the cutoff may be shared, the state
//! must not be.

const ONE: i32 = 256;

#[inline]
fn fx_mul(a: i32, b: i32) -> i32 {
    (a * b) >> 8
}

/// Resonant two-pole low-pass with 8-bit cutoff and resonance.
///
/// # Example
///
/// ```rust
/// use duet_core::ResonantLowPass;
///
/// let mut lpf = ResonantLowPass::new(35);
/// lpf.set_cutoff(200);
///
/// let mut y = 0;
/// for _ in 0..200 {
///     y = lpf.process(100);
/// }
/// assert!((y - 100).abs() <= 3); // DC passes
/// ```
#[derive(Debug, Clone, Default)]
pub struct ResonantLowPass {
    cutoff: u8,
    resonance: u8,
    feedback: i32,
    band: i32,
    low: i32,
}

impl ResonantLowPass {
    /// Create a closed filter with the given resonance.
    pub fn new(resonance: u8) -> Self {
        let mut filter = Self {
            resonance,
            ..Self::default()
        };
        filter.update_feedback();
        filter
    }

    /// Set the cutoff (0..=255).
    #[inline]
    pub fn set_cutoff(&mut self, cutoff: u8) {
        if cutoff != self.cutoff {
            self.cutoff = cutoff;
            self.update_feedback();
        }
    }

    /// Current cutoff.
    pub fn cutoff(&self) -> u8 {
        self.cutoff
    }

    /// Set the resonance (0..=255).
    pub fn set_resonance(&mut self, resonance: u8) {
        self.resonance = resonance;
        self.update_feedback();
    }

    /// Current resonance.
    pub fn resonance(&self) -> u8 {
        self.resonance
    }

    /// Clear the filter memory.
    pub fn reset(&mut self) {
        self.band = 0;
        self.low = 0;
    }

    /// Filter one sample.
    #[inline]
    pub fn process(&mut self, input: i32) -> i32 {
        let f = i32::from(self.cutoff);
        self.band += fx_mul((input - self.band) + fx_mul(self.feedback, self.band - self.low), f);
        self.low += fx_mul(self.band - self.low, f);
        self.low
    }

    fn update_feedback(&mut self) {
        let q = i32::from(self.resonance);
        self.feedback = q + fx_mul(q, ONE - i32::from(self.cutoff));
    }
}
