use std::path::PathBuf;

use anyhow::{anyhow, Result};

/// `<platform data dir>/nutricheck/models`
pub fn default_models_dir() -> Result<PathBuf> {
	#[cfg(any(target_os = "macos", target_os = "windows"))]
	let dir = dirs::data_dir().ok_or_else(|| anyhow!("Could not determine data directory"))?;

	#[cfg(not(any(target_os = "macos", target_os = "windows")))]
	let dir = dirs::data_local_dir().ok_or_else(|| anyhow!("Could not determine data directory"))?;

	Ok(dir.join("nutricheck").join("models"))
}
