//! Linear frequency glide for portamento.
//!
//! Adapted from a linear parameter ramp: a new target starts a fixed-length
//! ramp from wherever the glide currently is, and the value snaps exactly
//! onto the target on the last step.

/// Linear ramp between frequencies, stepped once per control tick.
///
/// # Example
///
/// ```rust
/// use duet_core::Glide;
///
/// let mut glide = Glide::new(128.0);
/// glide.set_immediate(220.0);
/// glide.set_time_ms(500.0);
/// glide.start(440.0);
///
/// let first = glide.advance();
/// assert!(first > 220.0 && first < 440.0);
/// for _ in 0..64 {
///     glide.advance();
/// }
/// assert_eq!(glide.get(), 440.0);
/// ```
#[derive(Debug, Clone)]
pub struct Glide {
    current: f32,
    target: f32,
    /// Change per step
    increment: f32,
    steps_remaining: u32,
    update_rate: f32,
    time_ms: f32,
}

impl Glide {
    /// Create a settled glide at 0 Hz, stepped `update_rate` times per second.
    pub fn new(update_rate: f32) -> Self {
        Self {
            current: 0.0,
            target: 0.0,
            increment: 0.0,
            steps_remaining: 0,
            update_rate,
            time_ms: 0.0,
        }
    }

    /// Set the duration of subsequent glides. Running glides keep their pace.
    pub fn set_time_ms(&mut self, time_ms: f32) {
        self.time_ms = time_ms.max(0.0);
    }

    /// Glide duration in milliseconds.
    pub fn time_ms(&self) -> f32 {
        self.time_ms
    }

    /// Begin a glide from the current value to `target`.
    pub fn start(&mut self, target: f32) {
        self.target = target;

        let steps = (self.time_ms / 1000.0 * self.update_rate) as u32;
        if steps == 0 {
            self.current = target;
            self.increment = 0.0;
            self.steps_remaining = 0;
        } else {
            self.increment = (target - self.current) / steps as f32;
            self.steps_remaining = steps;
        }
    }

    /// Jump to `value` with no ramp.
    pub fn set_immediate(&mut self, value: f32) {
        self.current = value;
        self.target = value;
        self.increment = 0.0;
        self.steps_remaining = 0;
    }

    /// Step once and return the new value.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        if self.steps_remaining > 0 {
            self.current += self.increment;
            self.steps_remaining -= 1;
            if self.steps_remaining == 0 {
                self.current = self.target;
            }
        }
        self.current
    }

    /// Current value without stepping.
    #[inline]
    pub fn get(&self) -> f32 {
        self.current
    }

    /// Value the glide is heading for.
    pub fn target(&self) -> f32 {
        self.target
    }

    /// True once the target has been reached.
    pub fn is_settled(&self) -> bool {
        self.steps_remaining == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_time_snaps() {
        let mut glide = Glide::new(128.0);
        glide.start(330.0);
        assert_eq!(glide.get(), 330.0);
        assert!(glide.is_settled());
    }

    #[test]
    fn glide_reaches_target_in_expected_steps() {
        let mut glide = Glide::new(128.0);
        glide.set_immediate(100.0);
        glide.set_time_ms(250.0); // 32 steps
        glide.start(200.0);

        for _ in 0..31 {
            glide.advance();
        }
        assert!(!glide.is_settled());
        assert_eq!(glide.advance(), 200.0);
        assert!(glide.is_settled());
    }

    #[test]
    fn glide_is_linear() {
        let mut glide = Glide::new(100.0);
        glide.set_immediate(0.0);
        glide.set_time_ms(100.0); // 10 steps of 10 Hz
        glide.start(100.0);
        assert!((glide.advance() - 10.0).abs() < 1e-4);
        assert!((glide.advance() - 20.0).abs() < 1e-4);
    }

    #[test]
    fn retarget_starts_from_current_value() {
        let mut glide = Glide::new(128.0);
        glide.set_immediate(400.0);
        glide.set_time_ms(1000.0);
        glide.start(200.0);
        for _ in 0..64 {
            glide.advance();
        }
        let midway = glide.get();
        glide.start(400.0);
        let next = glide.advance();
        assert!(next > midway, "should turn around from {midway}, got {next}");
    }
}
