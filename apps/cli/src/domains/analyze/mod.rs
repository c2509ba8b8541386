use crate::context::Context;

use nc_ai::{
	download::{ensure_pretrained, ModelSource},
	Classifier, DEFAULT_TOP_K,
};

use std::path::PathBuf;

use anyhow::{anyhow, Context as _, Result};
use clap::Args;
use tokio::task::spawn_blocking;
use tracing::debug;

mod report;

use report::Report;

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
	/// Path to the food image
	#[arg(required = true)]
	pub image: Option<PathBuf>,

	/// Path to a custom trained model; its class_indices.json must sit next to it
	#[arg(long)]
	pub custom_model: Option<PathBuf>,

	/// How many predictions to show
	#[arg(long, default_value_t = DEFAULT_TOP_K)]
	pub top_k: usize,

	/// Download the pretrained model and class index when they are missing
	#[arg(long)]
	pub download: bool,
}

pub async fn run(ctx: &Context, args: AnalyzeArgs) -> Result<()> {
	let image = args
		.image
		.ok_or_else(|| anyhow!("an image path is required"))?;

	// Fail on store configuration before spending time on inference
	let store = ctx.nutrition_store().await?;

	let custom_model = args.custom_model;
	let models_dir = match &custom_model {
		Some(_) => None,
		None => Some(ctx.models_dir()?),
	};

	if args.download {
		if let Some(models_dir) = &models_dir {
			ensure_pretrained(models_dir, &ModelSource::from_env()?)
				.await
				.context("failed to fetch the pretrained model")?;
		}
	}

	nc_ai::init()?;

	let top_k = args.top_k;
	let (is_custom, predictions, best_label) = spawn_blocking({
		let image = image.clone();
		move || -> Result<_> {
			let classifier = match (custom_model, models_dir) {
				(Some(model_path), _) => Classifier::custom(model_path)?,
				(None, Some(models_dir)) => Classifier::pretrained(models_dir)?,
				(None, None) => return Err(anyhow!("no model to load")),
			};

			let predictions = classifier.classify(&image, top_k)?;
			// Separate pass on purpose, the reported label must be exactly best_label's answer
			let best_label = classifier.best_label(&image)?;

			Ok((classifier.is_custom(), predictions, best_label))
		}
	})
	.await
	.context("classification task failed")??;

	debug!("Searching nutrition store <name='{best_label}'>");
	let nutrition = store
		.lookup(&best_label)
		.await
		.with_context(|| format!("failed to look up nutrition facts for '{best_label}'"))?;

	let report = Report {
		image,
		custom_model: is_custom,
		predictions,
		best_label,
		nutrition,
	};

	ctx.print(&report, |report| print!("{report}"))
}
