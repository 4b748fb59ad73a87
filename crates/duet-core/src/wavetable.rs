//! Single-cycle wavetables and the waveform families that fill them.
//!
//! Tables hold one cycle as signed 8-bit cells and are generated once at
//! construction. Two families exist: [`Waveform`] for the voice oscillators
//! and [`LfoWaveform`] for the filter LFO. Both are selected by a 1-based
//! selector value coming straight out of a [`RangeMap`](crate::RangeMap).

use core::f32::consts::PI;
use core::marker::PhantomData;
use libm::{roundf, sinf};

/// A family of four waveform shapes that can populate a [`WaveBank`].
pub trait WaveShape: Copy + core::fmt::Debug + PartialEq {
    /// Every shape of the family, in selector order.
    const ALL: [Self; 4];

    /// Waveform value in `[-1.0, 1.0]` at `phase` in `[0.0, 1.0)`.
    fn value_at(self, phase: f32) -> f32;

    /// Position of this shape in [`Self::ALL`].
    fn slot(self) -> usize;

    /// Shape for a 1-based selector, clamped to `1..=4`.
    fn from_selector(selector: i32) -> Self {
        Self::ALL[(selector.clamp(1, 4) - 1) as usize]
    }

    /// 1-based selector of this shape.
    fn selector(self) -> i32 {
        self.slot() as i32 + 1
    }
}

/// Voice oscillator shapes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Waveform {
    /// Pure sine.
    #[default]
    Sine,
    /// Linear triangle.
    Triangle,
    /// Rising sawtooth.
    Saw,
    /// 50% square.
    Square,
}

impl WaveShape for Waveform {
    const ALL: [Self; 4] = [Self::Sine, Self::Triangle, Self::Saw, Self::Square];

    fn value_at(self, phase: f32) -> f32 {
        match self {
            Self::Sine => sinf(2.0 * PI * phase),
            Self::Triangle => {
                if phase < 0.25 {
                    4.0 * phase
                } else if phase < 0.75 {
                    2.0 - 4.0 * phase
                } else {
                    4.0 * phase - 4.0
                }
            }
            Self::Saw => 2.0 * phase - 1.0,
            Self::Square => square(phase),
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

/// LFO shapes.
///
/// `Saw` falls across the cycle and `Ramp` rises.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LfoWaveform {
    /// Pure sine.
    #[default]
    Sine,
    /// Falling sawtooth.
    Saw,
    /// Rising ramp.
    Ramp,
    /// 50% square.
    Square,
}

impl WaveShape for LfoWaveform {
    const ALL: [Self; 4] = [Self::Sine, Self::Saw, Self::Ramp, Self::Square];

    fn value_at(self, phase: f32) -> f32 {
        match self {
            Self::Sine => sinf(2.0 * PI * phase),
            Self::Saw => 1.0 - 2.0 * phase,
            Self::Ramp => 2.0 * phase - 1.0,
            Self::Square => square(phase),
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

fn square(phase: f32) -> f32 {
    if phase < 0.5 { 1.0 } else { -1.0 }
}

/// One waveform cycle stored as `N` signed 8-bit cells.
///
/// `N` must be a power of two so oscillators can wrap with a mask.
#[derive(Clone, PartialEq, Eq)]
pub struct WaveTable<const N: usize> {
    cells: [i8; N],
}

impl<const N: usize> WaveTable<N> {
    /// Fill a table by sampling `shape` at `N` evenly spaced phases.
    ///
    /// Values are scaled by 127 and saturated into `i8`.
    pub fn from_fn(shape: impl Fn(f32) -> f32) -> Self {
        let mut cells = [0i8; N];
        for (i, cell) in cells.iter_mut().enumerate() {
            let phase = i as f32 / N as f32;
            *cell = roundf(shape(phase) * 127.0).clamp(-128.0, 127.0) as i8;
        }
        Self { cells }
    }

    /// Cell at `index`, wrapped into the table.
    #[inline]
    pub fn cell(&self, index: usize) -> i8 {
        self.cells[index & (N - 1)]
    }

    /// Number of cells.
    pub const fn len(&self) -> usize {
        N
    }

    /// Always false; tables have at least one cell.
    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// All cells in phase order.
    pub fn cells(&self) -> &[i8; N] {
        &self.cells
    }
}

impl<const N: usize> core::fmt::Debug for WaveTable<N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WaveTable").field("len", &N).finish()
    }
}

/// The four tables of a waveform family, indexed by shape.
///
/// # Example
///
/// ```rust
/// use duet_core::{LfoWaveform, WaveBank};
///
/// let bank: WaveBank<512, LfoWaveform> = WaveBank::new();
/// let ramp = bank.table(LfoWaveform::Ramp);
/// assert!(ramp.cell(0) < ramp.cell(511));
/// ```
#[derive(Clone)]
pub struct WaveBank<const N: usize, W: WaveShape> {
    tables: [WaveTable<N>; 4],
    shape: PhantomData<W>,
}

impl<const N: usize, W: WaveShape> WaveBank<N, W> {
    /// Generate every table of the family.
    pub fn new() -> Self {
        Self {
            tables: core::array::from_fn(|slot| {
                let shape = W::ALL[slot];
                WaveTable::from_fn(|phase| shape.value_at(phase))
            }),
            shape: PhantomData,
        }
    }

    /// Table for `shape`.
    #[inline]
    pub fn table(&self, shape: W) -> &WaveTable<N> {
        &self.tables[shape.slot()]
    }
}

impl<const N: usize, W: WaveShape> Default for WaveBank<N, W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize, W: WaveShape> core::fmt::Debug for WaveBank<N, W> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WaveBank")
            .field("len", &N)
            .field("shapes", &W::ALL)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_order_matches_panel() {
        assert_eq!(Waveform::from_selector(1), Waveform::Sine);
        assert_eq!(Waveform::from_selector(2), Waveform::Triangle);
        assert_eq!(Waveform::from_selector(3), Waveform::Saw);
        assert_eq!(Waveform::from_selector(4), Waveform::Square);
        assert_eq!(LfoWaveform::from_selector(2), LfoWaveform::Saw);
        assert_eq!(LfoWaveform::from_selector(3), LfoWaveform::Ramp);
    }

    #[test]
    fn selector_out_of_range_is_clamped() {
        assert_eq!(Waveform::from_selector(0), Waveform::Sine);
        assert_eq!(Waveform::from_selector(7), Waveform::Square);
    }

    #[test]
    fn selector_round_trips_through_slot() {
        for shape in Waveform::ALL {
            assert_eq!(Waveform::from_selector(shape.selector()), shape);
        }
    }

    #[test]
    fn sine_table_peaks_at_quarter_cycle() {
        let table = WaveTable::<2048>::from_fn(|p| Waveform::Sine.value_at(p));
        assert_eq!(table.cell(0), 0);
        assert_eq!(table.cell(512), 127);
        assert_eq!(table.cell(1536), -127);
    }

    #[test]
    fn lfo_saw_falls_and_ramp_rises() {
        let bank: WaveBank<512, LfoWaveform> = WaveBank::new();
        let saw = bank.table(LfoWaveform::Saw);
        let ramp = bank.table(LfoWaveform::Ramp);
        assert!(saw.cell(10) > saw.cell(500));
        assert!(ramp.cell(10) < ramp.cell(500));
    }

    #[test]
    fn cell_index_wraps() {
        let table = WaveTable::<512>::from_fn(|p| Waveform::Saw.value_at(p));
        assert_eq!(table.cell(512 + 3), table.cell(3));
    }

    #[test]
    fn square_is_two_level() {
        let bank: WaveBank<2048, Waveform> = WaveBank::new();
        let square = bank.table(Waveform::Square);
        assert!(square.cells().iter().all(|&c| c == 127 || c == -127));
    }
}
