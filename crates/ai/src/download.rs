use crate::classifier::{IMAGENET_INDEX_FILE, PRETRAINED_MODEL_FILE};

use nc_utils::FileIOError;

use std::{
	env,
	path::{Path, PathBuf},
};

use futures::StreamExt;
use futures_concurrency::future::TryJoin;
use thiserror::Error;
use tokio::{fs, io::AsyncWriteExt};
use tracing::{debug, info, warn};
use url::Url;

pub const PRETRAINED_MODEL_URL_ENV: &str = "NUTRICHECK_PRETRAINED_MODEL_URL";
pub const IMAGENET_INDEX_URL_ENV: &str = "NUTRICHECK_IMAGENET_INDEX_URL";

/// Keras' published copy of the ImageNet-1k class index
pub const DEFAULT_IMAGENET_INDEX_URL: &str =
	"https://storage.googleapis.com/download.tensorflow.org/data/imagenet_class_index.json";

#[derive(Debug, Error)]
pub enum DownloadError {
	#[error("no download url configured for '{file}', set {env}")]
	MissingUrl {
		file: &'static str,
		env: &'static str,
	},
	#[error("invalid url in {env}: {source}")]
	InvalidUrl {
		env: &'static str,
		#[source]
		source: url::ParseError,
	},
	#[error("request failed <url='{url}'>: {source}")]
	Request {
		url: Url,
		#[source]
		source: reqwest::Error,
	},
	#[error("download failed <url='{url}', status='{status}'>")]
	Status {
		url: Url,
		status: reqwest::StatusCode,
	},
	#[error(transparent)]
	FileIO(#[from] FileIOError),
}

/// Where the pretrained artifacts come from.
///
/// The ONNX export of MobileNetV2 has no canonical home, so its url must be configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSource {
	pub model_url: Option<Url>,
	pub index_url: Url,
}

impl ModelSource {
	pub fn from_env() -> Result<Self, DownloadError> {
		let model_url = url_from_env(PRETRAINED_MODEL_URL_ENV)?;
		let index_url = match url_from_env(IMAGENET_INDEX_URL_ENV)? {
			Some(url) => url,
			None => default_index_url()?,
		};

		Ok(Self {
			model_url,
			index_url,
		})
	}
}

fn url_from_env(var: &'static str) -> Result<Option<Url>, DownloadError> {
	match env::var(var) {
		Ok(value) if !value.trim().is_empty() => Url::parse(value.trim())
			.map(Some)
			.map_err(|source| DownloadError::InvalidUrl { env: var, source }),
		_ => Ok(None),
	}
}

fn default_index_url() -> Result<Url, DownloadError> {
	Url::parse(DEFAULT_IMAGENET_INDEX_URL).map_err(|source| DownloadError::InvalidUrl {
		env: IMAGENET_INDEX_URL_ENV,
		source,
	})
}

/// Makes sure both pretrained artifacts exist in `models_dir`, downloading whichever is missing.
///
/// Files already present are never touched. Downloads land in a `.part` file first and are
/// renamed into place once complete, so an interrupted run never leaves a truncated artifact.
pub async fn ensure_pretrained(
	models_dir: impl AsRef<Path>,
	source: &ModelSource,
) -> Result<(), DownloadError> {
	let models_dir = models_dir.as_ref();

	fs::create_dir_all(models_dir)
		.await
		.map_err(|e| FileIOError::from((models_dir, e, "failed to create models directory")))?;

	let client = reqwest::Client::new();

	let (model_fetched, index_fetched) = (
		fetch_missing(
			&client,
			source.model_url.as_ref(),
			models_dir.join(PRETRAINED_MODEL_FILE),
			PRETRAINED_MODEL_URL_ENV,
		),
		fetch_missing(
			&client,
			Some(&source.index_url),
			models_dir.join(IMAGENET_INDEX_FILE),
			IMAGENET_INDEX_URL_ENV,
		),
	)
		.try_join()
		.await?;

	if model_fetched || index_fetched {
		info!(
			"Pretrained artifacts ready <models_dir='{}'>",
			models_dir.display()
		);
	}

	Ok(())
}

async fn fetch_missing(
	client: &reqwest::Client,
	url: Option<&Url>,
	path: PathBuf,
	env: &'static str,
) -> Result<bool, DownloadError> {
	if fs::try_exists(&path)
		.await
		.map_err(|e| FileIOError::from((&path, e, "failed to check artifact")))?
	{
		debug!("Artifact already present <path='{}'>", path.display());
		return Ok(false);
	}

	let url = url.ok_or(DownloadError::MissingUrl {
		file: file_label(&path),
		env,
	})?;

	download(client, url, &path).await?;

	Ok(true)
}

fn file_label(path: &Path) -> &'static str {
	match path.file_name().and_then(|name| name.to_str()) {
		Some(PRETRAINED_MODEL_FILE) => PRETRAINED_MODEL_FILE,
		Some(IMAGENET_INDEX_FILE) => IMAGENET_INDEX_FILE,
		_ => "artifact",
	}
}

async fn download(client: &reqwest::Client, url: &Url, path: &Path) -> Result<(), DownloadError> {
	info!("Downloading <url='{url}', path='{}'>", path.display());

	let request_error = |source: reqwest::Error| DownloadError::Request {
		url: url.clone(),
		source,
	};

	let response = client
		.get(url.clone())
		.send()
		.await
		.map_err(request_error)?;

	if !response.status().is_success() {
		return Err(DownloadError::Status {
			url: url.clone(),
			status: response.status(),
		});
	}

	let part_path = part_path(path);

	let written = async {
		let mut file = fs::File::create(&part_path)
			.await
			.map_err(|e| FileIOError::from((&part_path, e, "failed to create partial download")))?;

		let mut stream = response.bytes_stream();
		let mut size = 0;
		while let Some(chunk) = stream.next().await {
			let chunk = chunk.map_err(request_error)?;
			file.write_all(&chunk)
				.await
				.map_err(|e| FileIOError::from((&part_path, e, "failed to write partial download")))?;
			size += chunk.len();
		}

		file.flush()
			.await
			.map_err(|e| FileIOError::from((&part_path, e, "failed to flush partial download")))?;

		Ok::<_, DownloadError>(size)
	}
	.await;

	let size = match written {
		Ok(size) => size,
		Err(e) => {
			if let Err(remove_err) = fs::remove_file(&part_path).await {
				warn!(
					"Failed to remove partial download <path='{}'>: {remove_err:#?}",
					part_path.display()
				);
			}
			return Err(e);
		}
	};

	fs::rename(&part_path, path)
		.await
		.map_err(|e| FileIOError::from((path, e, "failed to move download into place")))?;

	debug!("Downloaded <path='{}', bytes='{size}'>", path.display());

	Ok(())
}

fn part_path(path: &Path) -> PathBuf {
	let mut part = path.as_os_str().to_owned();
	part.push(".part");
	PathBuf::from(part)
}
