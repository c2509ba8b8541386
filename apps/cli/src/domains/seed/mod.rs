use crate::context::Context;

use nc_nutrition::{
	seed::{default_foods, seed, SeedOutcome},
	MemoryStore,
};

use std::path::Path;

use anyhow::{bail, Context as _, Result};
use serde::Serialize;
use tokio::fs;

#[derive(Debug, Serialize)]
struct SeedLine {
	name: String,
	outcome: &'static str,
	#[serde(skip_serializing_if = "Option::is_none")]
	error: Option<String>,
}

impl From<(String, SeedOutcome)> for SeedLine {
	fn from((name, outcome): (String, SeedOutcome)) -> Self {
		let (outcome, error) = match outcome {
			SeedOutcome::Inserted => ("inserted", None),
			SeedOutcome::Skipped => ("skipped", None),
			SeedOutcome::Failed(e) => ("failed", Some(format!("{e:#}"))),
		};

		Self {
			name,
			outcome,
			error,
		}
	}
}

pub async fn run(ctx: &Context) -> Result<()> {
	let lines = match &ctx.foods_file {
		Some(path) => seed_file(path).await?,
		None => {
			let store = ctx.nutrition_store().await?;
			seed(store.as_ref(), default_foods())
				.await
				.into_iter()
				.map(SeedLine::from)
				.collect()
		}
	};

	let failed = lines.iter().filter(|line| line.error.is_some()).count();

	ctx.print(&lines, |lines| {
		for line in lines {
			match (&line.error, line.outcome) {
				(Some(e), _) => println!("Error inserting {}: {e}", line.name),
				(None, "skipped") => println!("Skipped (already exists): {}", line.name),
				(None, _) => println!("Inserted: {}", line.name),
			}
		}
	})?;

	if failed > 0 {
		bail!("{failed} of {} foods could not be seeded", lines.len());
	}

	Ok(())
}

/// Seeds a local foods file, creating it when it doesn't exist yet
async fn seed_file(path: &Path) -> Result<Vec<SeedLine>> {
	let store = if fs::try_exists(path).await.unwrap_or(false) {
		MemoryStore::from_json_file(path)
			.await
			.with_context(|| format!("failed to open foods file {}", path.display()))?
	} else {
		MemoryStore::new()
	};

	let lines = seed(&store, default_foods())
		.await
		.into_iter()
		.map(SeedLine::from)
		.collect();

	if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
		fs::create_dir_all(parent)
			.await
			.with_context(|| format!("failed to create {}", parent.display()))?;
	}

	fs::write(path, serde_json::to_vec_pretty(&store.records().await)?)
		.await
		.with_context(|| format!("failed to write foods file {}", path.display()))?;

	Ok(lines)
}
