use crate::{error::Result, record::NutritionRecord};

use async_trait::async_trait;

/// Where nutrition facts live. Lookups are exact and case sensitive on the record name.
#[async_trait]
pub trait NutritionStore: Send + Sync {
	/// `Ok(None)` when no record has this name
	async fn lookup(&self, name: &str) -> Result<Option<NutritionRecord>>;

	async fn insert(&self, record: NutritionRecord) -> Result<()>;
}
