//! Persistent-store images on disk.
//!
//! An image is the raw 64-byte contents of the instrument's store. A missing
//! file reads as a freshly erased store.

use duet_platform::{MemoryStore, STORE_SIZE};
use std::path::Path;

use crate::error::ConfigError;

/// Load the image at `path`, or an erased store if there is none.
pub fn load_store(path: impl AsRef<Path>) -> Result<MemoryStore, ConfigError> {
    let path = path.as_ref();
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(MemoryStore::new()),
        Err(e) => return Err(ConfigError::read_file(path, e)),
    };
    if bytes.len() != STORE_SIZE {
        return Err(ConfigError::StoreImage {
            path: path.to_path_buf(),
            len: bytes.len(),
            expected: STORE_SIZE,
        });
    }
    Ok(MemoryStore::from_bytes(&bytes))
}

/// Write `store` to `path`, creating parent directories.
pub fn save_store(path: impl AsRef<Path>, store: &MemoryStore) -> Result<(), ConfigError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
    }
    std::fs::write(path, store.as_bytes()).map_err(|e| ConfigError::write_file(path, e))
}
