use std::{path::PathBuf, process::ExitCode};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod config;
mod context;
mod domains;
mod error;

use context::{Context, OutputFormat};
use domains::{analyze::AnalyzeArgs, dataset::SplitArgs};

const DEFAULT_LOG_FILTER: &str = "warn,nc_ai=info";

#[derive(Parser, Debug)]
#[command(
	name = "nutricheck",
	version,
	about = "NutriCheck - food recognition and nutrition analysis",
	args_conflicts_with_subcommands = true,
	subcommand_negates_reqs = true
)]
struct Cli {
	#[command(flatten)]
	analyze: AnalyzeArgs,

	/// Directory holding the pretrained model and its class index
	/// [default: <data dir>/nutricheck/models]
	#[arg(long, global = true, env = "NUTRICHECK_MODELS_DIR")]
	models_dir: Option<PathBuf>,

	/// Read and write nutrition facts in this JSON file instead of Supabase
	#[arg(long, global = true, env = "NUTRICHECK_FOODS_FILE")]
	foods_file: Option<PathBuf>,

	/// Output format
	#[arg(long, value_enum, global = true, default_value = "human")]
	format: OutputFormat,

	#[command(subcommand)]
	command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
	/// Insert the reference foods into the nutrition store, skipping those already present
	Seed,
	/// Split a folder of class folders into train/ and validation/ sets
	SplitDataset(SplitArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
	// A missing .env file is fine, the environment may already be set
	let _ = dotenv::dotenv();

	let cli = Cli::parse();
	init_tracing();

	match run(cli).await {
		Ok(()) => ExitCode::SUCCESS,
		Err(e) => {
			eprintln!("Error: {e:#}");
			error::exit_code(&e)
		}
	}
}

async fn run(cli: Cli) -> Result<()> {
	let ctx = Context::new(cli.format, cli.models_dir, cli.foods_file);

	match cli.command {
		None => domains::analyze::run(&ctx, cli.analyze).await,
		Some(Commands::Seed) => domains::seed::run(&ctx).await,
		Some(Commands::SplitDataset(args)) => domains::dataset::run(&ctx, args).await,
	}
}

fn init_tracing() {
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

	// Reports go to stdout, keep logs out of their way
	let _ = tracing_subscriber::fmt()
		.with_writer(std::io::stderr)
		.with_env_filter(filter)
		.try_init();
}
