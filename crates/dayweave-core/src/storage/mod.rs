mod config;

pub use config::{Config, GapsConfig};

use std::path::PathBuf;

/// Returns `~/.config/dayweave[-dev]/` based on DAYWEAVE_ENV.
///
/// Set DAYWEAVE_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("DAYWEAVE_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("dayweave-dev")
    } else {
        base_dir.join("dayweave")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
