//! Integer linear range conversion for raw control readings.
//!
//! A [`RangeMap`] declares an input domain and an output range, both
//! inclusive. Readings outside the domain are clamped before mapping, so the
//! result can never leave the output range no matter how noisy the source is.
//!
//! The conversion uses a precomputed 16.16 multiplier instead of a division
//! per call:
//!
//! ```text
//! multiplier = ((out_max - out_min + 1) << 16) / (in_max - in_min + 1)
//! out        = out_min + ((in - in_min) * multiplier) >> 16
//! ```
//!
//! Every output value owns an equal share of the input domain, which is what
//! a detented selector knob needs.

/// Clamped linear map from an inclusive input domain to an inclusive output range.
///
/// # Example
///
/// ```rust
/// use duet_core::RangeMap;
///
/// let waveform = RangeMap::new(0, 1023, 1, 4);
/// assert_eq!(waveform.map(0), 1);
/// assert_eq!(waveform.map(300), 2);
/// assert_eq!(waveform.map(1023), 4);
/// assert_eq!(waveform.map(5000), 4); // clamped
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeMap {
    in_min: i32,
    in_max: i32,
    out_min: i32,
    out_max: i32,
    multiplier: i64,
}

impl RangeMap {
    /// Create a map from `in_min..=in_max` to `out_min..=out_max`.
    ///
    /// Bounds given in the wrong order are swapped.
    pub const fn new(in_min: i32, in_max: i32, out_min: i32, out_max: i32) -> Self {
        let (in_min, in_max) = if in_min <= in_max {
            (in_min, in_max)
        } else {
            (in_max, in_min)
        };
        let (out_min, out_max) = if out_min <= out_max {
            (out_min, out_max)
        } else {
            (out_max, out_min)
        };
        let in_span = (in_max - in_min) as i64 + 1;
        let out_span = (out_max - out_min) as i64 + 1;
        Self {
            in_min,
            in_max,
            out_min,
            out_max,
            multiplier: (out_span << 16) / in_span,
        }
    }

    /// Map a raw reading into the output range.
    #[inline]
    pub const fn map(&self, raw: i32) -> i32 {
        let clamped = if raw < self.in_min {
            self.in_min
        } else if raw > self.in_max {
            self.in_max
        } else {
            raw
        };
        let offset = ((clamped - self.in_min) as i64 * self.multiplier) >> 16;
        let value = self.out_min + offset as i32;
        if value > self.out_max {
            self.out_max
        } else {
            value
        }
    }

    /// Inclusive input domain.
    pub const fn domain(&self) -> (i32, i32) {
        (self.in_min, self.in_max)
    }

    /// Inclusive output range.
    pub const fn range(&self) -> (i32, i32) {
        (self.out_min, self.out_max)
    }
}
