//! Hysteretic debounce for the capacitive keys.
//!
//! Every control tick each key is sampled once. The last three samples
//! `a` (now), `b` and `c` (two ticks ago) feed a latch:
//!
//! ```text
//! latched' = (latched && (a || b || c)) || (a && b && c)
//! ```
//!
//! A key latches on after three positive samples in a row and unlatches
//! after three negative samples in a row; any mix holds the previous state.
//!
//! Edges are reported against an availability flag rather than the latch
//! itself: a press fires only while the key is available, and a release only
//! while it is not, so each physical press produces exactly one press edge
//! and one release edge.

use duet_platform::{KEY_COUNT, KeySensors};

/// A debounced transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEdge {
    /// The key latched on.
    Pressed,
    /// The key latched off.
    Released,
}

/// Debounce state of one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyState {
    a: bool,
    b: bool,
    c: bool,
    latched: bool,
    available: bool,
}

impl KeyState {
    /// Released key with empty history.
    pub const fn new() -> Self {
        Self {
            a: false,
            b: false,
            c: false,
            latched: false,
            available: true,
        }
    }

    /// Feed one raw sample and report any edge.
    pub fn sample(&mut self, present: bool) -> Option<KeyEdge> {
        self.a = present;
        self.latched =
            (self.latched && (self.a || self.b || self.c)) || (self.a && self.b && self.c);
        self.c = self.b;
        self.b = self.a;

        if self.latched && self.available {
            self.available = false;
            Some(KeyEdge::Pressed)
        } else if !self.latched && !self.available {
            self.available = true;
            Some(KeyEdge::Released)
        } else {
            None
        }
    }

    /// Debounced state.
    pub fn is_latched(&self) -> bool {
        self.latched
    }

    /// Whether a press edge can fire.
    pub fn is_available(&self) -> bool {
        self.available
    }
}

impl Default for KeyState {
    fn default() -> Self {
        Self::new()
    }
}

/// Debouncer for the whole keyboard.
///
/// # Example
///
/// ```rust
/// use duet_synth::{KeyEdge, KeyScanner};
///
/// let mut scanner = KeyScanner::new();
/// assert_eq!(scanner.sample(4, true), None);
/// assert_eq!(scanner.sample(4, true), None);
/// assert_eq!(scanner.sample(4, true), Some(KeyEdge::Pressed));
/// assert!(scanner.is_held(4));
/// ```
#[derive(Debug, Clone, Default)]
pub struct KeyScanner {
    keys: [KeyState; KEY_COUNT],
}

impl KeyScanner {
    /// All keys released.
    pub fn new() -> Self {
        Self {
            keys: [KeyState::new(); KEY_COUNT],
        }
    }

    /// Feed one sample to key `key`. Out-of-range keys are ignored.
    pub fn sample(&mut self, key: usize, present: bool) -> Option<KeyEdge> {
        self.keys.get_mut(key).and_then(|state| state.sample(present))
    }

    /// Sample every key once, in key order.
    pub fn scan(&mut self, sensors: &mut impl KeySensors) -> [Option<KeyEdge>; KEY_COUNT] {
        core::array::from_fn(|key| self.keys[key].sample(sensors.key_present(key)))
    }

    /// Debounced state of `key`.
    pub fn is_held(&self, key: usize) -> bool {
        self.keys.get(key).is_some_and(KeyState::is_latched)
    }

    /// Debounce state of `key`.
    pub fn key(&self, key: usize) -> Option<&KeyState> {
        self.keys.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(state: &mut KeyState, samples: &[u8]) -> Vec<Option<KeyEdge>> {
        samples.iter().map(|&s| state.sample(s != 0)).collect()
    }

    #[test]
    fn three_positive_samples_latch_on_third_tick() {
        let mut key = KeyState::new();
        let edges = feed(&mut key, &[1, 1, 1]);
        assert_eq!(edges, vec![None, None, Some(KeyEdge::Pressed)]);
        assert!(key.is_latched());
    }

    #[test]
    fn alternating_samples_never_latch() {
        let mut key = KeyState::new();
        let edges = feed(&mut key, &[1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1]);
        assert!(edges.iter().all(Option::is_none));
        assert!(!key.is_latched());
    }

    #[test]
    fn three_negative_samples_unlatch_on_third_tick() {
        let mut key = KeyState::new();
        feed(&mut key, &[1, 1, 1, 1]);
        let edges = feed(&mut key, &[0, 0, 0]);
        assert_eq!(edges, vec![None, None, Some(KeyEdge::Released)]);
        assert!(!key.is_latched());
    }

    #[test]
    fn single_dropout_holds_latch() {
        let mut key = KeyState::new();
        feed(&mut key, &[1, 1, 1]);
        let edges = feed(&mut key, &[0, 1, 0, 0, 1, 1]);
        assert!(edges.iter().all(Option::is_none));
        assert!(key.is_latched());
    }

    #[test]
    fn one_press_one_release_edge() {
        let mut key = KeyState::new();
        let edges = feed(&mut key, &[1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0]);
        let presses = edges.iter().filter(|e| **e == Some(KeyEdge::Pressed)).count();
        let releases = edges.iter().filter(|e| **e == Some(KeyEdge::Released)).count();
        assert_eq!((presses, releases), (1, 1));
    }

    #[test]
    fn availability_tracks_latch() {
        let mut key = KeyState::new();
        assert!(key.is_available());
        feed(&mut key, &[1, 1, 1]);
        assert!(!key.is_available());
        feed(&mut key, &[0, 0, 0]);
        assert!(key.is_available());
    }

    #[test]
    fn out_of_range_key_is_ignored() {
        let mut scanner = KeyScanner::new();
        assert_eq!(scanner.sample(KEY_COUNT, true), None);
        assert!(!scanner.is_held(KEY_COUNT));
    }
}
