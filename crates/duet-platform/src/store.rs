//! Byte-addressed persistent storage for the MIDI channel settings.
//!
//! Only two bytes are meaningful: [`CHANNEL_ADDRESS`] holds the learned
//! channel and [`OMNI_ADDRESS`] the omni flag. Everything else is left
//! untouched. Access is assumed to always succeed.

/// Address of the learned MIDI channel (0..=16, 0 = omni).
pub const CHANNEL_ADDRESS: usize = 2;

/// Address of the omni flag (1 = omni).
pub const OMNI_ADDRESS: usize = 3;

/// Value of a never-written byte.
pub const ERASED: u8 = 0xFF;

/// Size of the in-memory store image.
pub const STORE_SIZE: usize = 64;

/// Non-volatile byte storage.
pub trait PersistentStore {
    /// Byte at `address`.
    fn read(&self, address: usize) -> u8;

    /// Overwrite the byte at `address`, even if it already holds `value`.
    fn write(&mut self, address: usize, value: u8);
}

impl<S: PersistentStore + ?Sized> PersistentStore for &mut S {
    fn read(&self, address: usize) -> u8 {
        (**self).read(address)
    }

    fn write(&mut self, address: usize, value: u8) {
        (**self).write(address, value);
    }
}

/// RAM-backed store image.
///
/// Starts erased. Out-of-range reads return [`ERASED`] and out-of-range
/// writes are dropped.
///
/// # Example
///
/// ```rust
/// use duet_platform::{CHANNEL_ADDRESS, MemoryStore, PersistentStore};
///
/// let mut store = MemoryStore::new();
/// store.write(CHANNEL_ADDRESS, 5);
/// store.write(CHANNEL_ADDRESS, 5);
/// assert_eq!(store.read(CHANNEL_ADDRESS), 5);
/// assert_eq!(store.write_count(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryStore {
    bytes: [u8; STORE_SIZE],
    writes: u32,
}

impl MemoryStore {
    /// An erased store.
    pub const fn new() -> Self {
        Self {
            bytes: [ERASED; STORE_SIZE],
            writes: 0,
        }
    }

    /// A store holding `image`, truncated or padded with [`ERASED`].
    pub fn from_bytes(image: &[u8]) -> Self {
        let mut store = Self::new();
        let len = image.len().min(STORE_SIZE);
        store.bytes[..len].copy_from_slice(&image[..len]);
        store
    }

    /// The full image.
    pub fn as_bytes(&self) -> &[u8; STORE_SIZE] {
        &self.bytes
    }

    /// Number of writes since construction.
    pub fn write_count(&self) -> u32 {
        self.writes
    }

    /// Whether anything was written since construction.
    pub fn is_dirty(&self) -> bool {
        self.writes > 0
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PersistentStore for MemoryStore {
    fn read(&self, address: usize) -> u8 {
        self.bytes.get(address).copied().unwrap_or(ERASED)
    }

    fn write(&mut self, address: usize, value: u8) {
        if let Some(byte) = self.bytes.get_mut(address) {
            *byte = value;
            self.writes += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_store_is_erased() {
        let store = MemoryStore::new();
        assert!(store.as_bytes().iter().all(|&b| b == ERASED));
        assert!(!store.is_dirty());
    }

    #[test]
    fn out_of_range_access_is_harmless() {
        let mut store = MemoryStore::new();
        store.write(STORE_SIZE + 10, 1);
        assert_eq!(store.read(STORE_SIZE + 10), ERASED);
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn from_bytes_pads_short_images() {
        let store = MemoryStore::from_bytes(&[0, 0, 9, 0]);
        assert_eq!(store.read(CHANNEL_ADDRESS), 9);
        assert_eq!(store.read(OMNI_ADDRESS), 0);
        assert_eq!(store.read(10), ERASED);
    }

    #[test]
    fn write_through_mutable_reference() {
        fn set_omni(mut store: impl PersistentStore) {
            store.write(OMNI_ADDRESS, 1);
        }

        let mut store = MemoryStore::new();
        set_omni(&mut store);
        assert_eq!(store.read(OMNI_ADDRESS), 1);
    }
}
