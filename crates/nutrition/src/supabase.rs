use crate::{
	error::{Error, Result},
	record::NutritionRecord,
	store::NutritionStore,
};

use std::env;

use async_trait::async_trait;
use reqwest::{
	header::{HeaderMap, HeaderValue, AUTHORIZATION},
	Response,
};
use tracing::debug;
use url::Url;

pub const SUPABASE_URL_ENV: &str = "SUPABASE_URL";
pub const SUPABASE_KEY_ENV: &str = "SUPABASE_KEY";

/// Table holding one row per food
pub const FOODS_TABLE: &str = "foods";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupabaseConfig {
	pub url: Url,
	pub key: String,
}

impl SupabaseConfig {
	pub fn new(url: &str, key: impl Into<String>) -> Result<Self> {
		Ok(Self {
			url: Url::parse(url)?,
			key: key.into(),
		})
	}

	/// Reads `SUPABASE_URL` and `SUPABASE_KEY`, failing on the first one that is unset or empty.
	pub fn from_env() -> Result<Self> {
		let url = setting(SUPABASE_URL_ENV)?;
		let key = setting(SUPABASE_KEY_ENV)?;

		Self::new(&url, key)
	}
}

fn setting(name: &'static str) -> Result<String> {
	env::var(name)
		.ok()
		.map(|value| value.trim().to_string())
		.filter(|value| !value.is_empty())
		.ok_or(Error::MissingSetting(name))
}

/// Reads and writes the `foods` table through Supabase's PostgREST interface.
#[derive(Debug, Clone)]
pub struct SupabaseStore {
	client: reqwest::Client,
	foods_url: Url,
}

impl SupabaseStore {
	pub fn new(config: SupabaseConfig) -> Result<Self> {
		let mut foods_url = config.url.clone();
		foods_url
			.path_segments_mut()
			.map_err(|()| Error::UnsupportedUrl(config.url.clone()))?
			.pop_if_empty()
			.extend(["rest", "v1", FOODS_TABLE]);

		let mut headers = HeaderMap::new();
		headers.insert(
			"apikey",
			HeaderValue::from_str(&config.key).map_err(|_| Error::InvalidApiKey)?,
		);
		let mut bearer = HeaderValue::from_str(&format!("Bearer {}", config.key))
			.map_err(|_| Error::InvalidApiKey)?;
		bearer.set_sensitive(true);
		headers.insert(AUTHORIZATION, bearer);

		let client = reqwest::Client::builder()
			.default_headers(headers)
			.build()?;

		Ok(Self { client, foods_url })
	}
}

#[async_trait]
impl NutritionStore for SupabaseStore {
	async fn lookup(&self, name: &str) -> Result<Option<NutritionRecord>> {
		let response = self
			.client
			.get(self.foods_url.clone())
			.query(&[("name", format!("eq.{name}")), ("select", "*".to_string())])
			.send()
			.await?;

		let body = ensure_success(response).await?.bytes().await?;
		let rows = serde_json::from_slice::<Vec<NutritionRecord>>(&body).map_err(Error::Payload)?;

		debug!("Looked up food <name='{name}', rows='{}'>", rows.len());

		Ok(rows.into_iter().next())
	}

	async fn insert(&self, record: NutritionRecord) -> Result<()> {
		record.validate()?;

		let response = self
			.client
			.post(self.foods_url.clone())
			.header("Prefer", "return=minimal")
			.json(&record)
			.send()
			.await?;

		ensure_success(response).await?;

		debug!("Inserted food <name='{}'>", record.name);

		Ok(())
	}
}

async fn ensure_success(response: Response) -> Result<Response> {
	let status = response.status();
	if status.is_success() {
		return Ok(response);
	}

	// The body is only there to enrich the error
	let body = response.text().await.unwrap_or_default();

	Err(Error::Status { status, body })
}
