use crate::config;

use nc_nutrition::{MemoryStore, NutritionStore, SupabaseConfig, SupabaseStore};

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use serde::Serialize;

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
	Human,
	Json,
}

#[derive(Debug, Clone)]
pub struct Context {
	pub format: OutputFormat,
	models_dir: Option<PathBuf>,
	pub foods_file: Option<PathBuf>,
}

impl Context {
	pub const fn new(
		format: OutputFormat,
		models_dir: Option<PathBuf>,
		foods_file: Option<PathBuf>,
	) -> Self {
		Self {
			format,
			models_dir,
			foods_file,
		}
	}

	pub fn models_dir(&self) -> Result<PathBuf> {
		match &self.models_dir {
			Some(dir) => Ok(dir.clone()),
			None => config::default_models_dir(),
		}
	}

	/// The JSON foods file when one was given, Supabase otherwise
	pub async fn nutrition_store(&self) -> Result<Box<dyn NutritionStore>> {
		if let Some(path) = &self.foods_file {
			let store = MemoryStore::from_json_file(path)
				.await
				.with_context(|| format!("failed to open foods file {}", path.display()))?;
			return Ok(Box::new(store));
		}

		let config = SupabaseConfig::from_env().context("nutrition store is not configured")?;
		Ok(Box::new(SupabaseStore::new(config)?))
	}

	pub fn print<T: Serialize>(&self, output: &T, human: impl FnOnce(&T)) -> Result<()> {
		match self.format {
			OutputFormat::Human => human(output),
			OutputFormat::Json => println!("{}", serde_json::to_string_pretty(output)?),
		}

		Ok(())
	}
}
