//! Platform-specific locations of the instrument config and store image.
//!
//! - Linux: `~/.config/duet/`
//! - macOS: `~/Library/Application Support/duet/`
//! - Windows: `%APPDATA%\duet\`

use std::path::PathBuf;

use crate::error::ConfigError;

/// Application name used for directory paths.
const APP_NAME: &str = "duet";

/// File name of the default instrument config.
pub const CONFIG_FILE: &str = "instrument.toml";

/// File name of the default store image.
pub const STORE_FILE: &str = "store.bin";

/// Returns the user-specific configuration directory.
///
/// Falls back to the current directory if the platform has none.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Default instrument config path.
pub fn default_config_path() -> PathBuf {
    user_config_dir().join(CONFIG_FILE)
}

/// Default store image path.
pub fn default_store_path() -> PathBuf {
    user_config_dir().join(STORE_FILE)
}

/// Create the user config directory if needed and return it.
pub fn ensure_user_config_dir() -> Result<PathBuf, ConfigError> {
    let dir = user_config_dir();
    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| ConfigError::create_dir(&dir, e))?;
    }
    Ok(dir)
}
