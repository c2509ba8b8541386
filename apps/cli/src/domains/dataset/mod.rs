use crate::context::Context;

use std::{
	fs,
	path::{Path, PathBuf},
};

use anyhow::{bail, Context as _, Result};
use clap::Args;
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use serde::Serialize;
use tokio::task::spawn_blocking;
use tracing::{debug, info};

const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

#[derive(Args, Debug)]
pub struct SplitArgs {
	/// Directory with one sub directory of images per class
	pub source: PathBuf,

	/// Where train/ and validation/ are created
	#[arg(long, default_value = "training/data")]
	pub out: PathBuf,

	/// Share of each class that goes to train/
	#[arg(long, default_value_t = 0.8)]
	pub ratio: f64,

	/// Seed the shuffle for a reproducible split
	#[arg(long)]
	pub seed: Option<u64>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ClassSplit {
	pub class: String,
	pub train: usize,
	pub validation: usize,
}

pub async fn run(ctx: &Context, args: SplitArgs) -> Result<()> {
	let SplitArgs {
		source,
		out,
		ratio,
		seed,
	} = args;

	let splits = spawn_blocking(move || {
		let mut rng = match seed {
			Some(seed) => StdRng::seed_from_u64(seed),
			None => StdRng::from_entropy(),
		};

		split_dataset(&source, &out, ratio, &mut rng)
	})
	.await
	.context("dataset split task failed")??;

	ctx.print(&splits, |splits| {
		for split in splits {
			println!("Processing class: {}", split.class);
			println!(
				"   {} training images, {} validation images",
				split.train, split.validation
			);
		}
	})
}

/// Copies every class folder's images under `source` into `out/train/<class>` and
/// `out/validation/<class>`, shuffled, with `floor(len * ratio)` images going to training.
pub fn split_dataset(
	source: &Path,
	out: &Path,
	ratio: f64,
	rng: &mut impl Rng,
) -> Result<Vec<ClassSplit>> {
	if !(0.0..=1.0).contains(&ratio) {
		bail!("split ratio must be between 0 and 1, got {ratio}");
	}

	if !source.is_dir() {
		bail!("source directory {} does not exist", source.display());
	}

	let train_dir = out.join("train");
	let validation_dir = out.join("validation");
	for dir in [&train_dir, &validation_dir] {
		fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
	}

	info!(
		"Created dataset directories <train='{}', validation='{}'>",
		train_dir.display(),
		validation_dir.display()
	);

	let mut class_dirs = fs::read_dir(source)
		.with_context(|| format!("failed to read {}", source.display()))?
		.map(|entry| entry.map(|entry| entry.path()))
		.collect::<Result<Vec<_>, _>>()
		.with_context(|| format!("failed to read {}", source.display()))?;
	class_dirs.retain(|path| path.is_dir());
	// read_dir order is platform dependent, a seeded split must not be
	class_dirs.sort();

	let mut splits = Vec::with_capacity(class_dirs.len());

	for class_dir in class_dirs {
		let Some(class) = class_dir.file_name().map(|name| name.to_string_lossy().into_owned())
		else {
			continue;
		};

		let mut images = images_in(&class_dir)?;
		images.shuffle(rng);

		let split_at = split_index(images.len(), ratio);
		let (train, validation) = images.split_at(split_at);

		copy_all(train, &train_dir.join(&class))?;
		copy_all(validation, &validation_dir.join(&class))?;

		debug!(
			"Split class <class='{class}', train='{}', validation='{}'>",
			train.len(),
			validation.len()
		);

		splits.push(ClassSplit {
			class,
			train: train.len(),
			validation: validation.len(),
		});
	}

	Ok(splits)
}

fn images_in(dir: &Path) -> Result<Vec<PathBuf>> {
	let mut images = fs::read_dir(dir)
		.with_context(|| format!("failed to read {}", dir.display()))?
		.map(|entry| entry.map(|entry| entry.path()))
		.collect::<Result<Vec<_>, _>>()
		.with_context(|| format!("failed to read {}", dir.display()))?;

	images.retain(|path| {
		path.is_file()
			&& path
				.extension()
				.and_then(|ext| ext.to_str())
				.is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
	});
	images.sort();

	Ok(images)
}

fn copy_all(images: &[PathBuf], dest: &Path) -> Result<()> {
	fs::create_dir_all(dest).with_context(|| format!("failed to create {}", dest.display()))?;

	for image in images {
		let Some(name) = image.file_name() else {
			continue;
		};
		fs::copy(image, dest.join(name)).with_context(|| {
			format!("failed to copy {} into {}", image.display(), dest.display())
		})?;
	}

	Ok(())
}

#[allow(
	clippy::cast_possible_truncation,
	clippy::cast_sign_loss,
	clippy::cast_precision_loss
)]
fn split_index(len: usize, ratio: f64) -> usize {
	((len as f64) * ratio).floor() as usize
}
