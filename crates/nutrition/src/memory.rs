use crate::{
	error::{Error, Result},
	record::NutritionRecord,
	store::NutritionStore,
};

use nc_utils::FileIOError;

use std::{
	collections::{hash_map::Entry, HashMap},
	path::Path,
};

use async_trait::async_trait;
use tokio::{fs, sync::RwLock};
use tracing::{debug, warn};

/// Keeps every record in memory, optionally loaded from a JSON array of records.
#[derive(Debug, Default)]
pub struct MemoryStore {
	records: RwLock<HashMap<String, NutritionRecord>>,
}

impl MemoryStore {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// When names repeat, the first record wins.
	pub fn from_records(records: impl IntoIterator<Item = NutritionRecord>) -> Self {
		let mut by_name = HashMap::new();
		for record in records {
			match by_name.entry(record.name.clone()) {
				Entry::Vacant(entry) => {
					entry.insert(record);
				}
				Entry::Occupied(_) => {
					warn!("Ignoring duplicate nutrition record <name='{}'>", record.name);
				}
			}
		}

		Self {
			records: RwLock::new(by_name),
		}
	}

	/// Reads a JSON array of records, every record must be valid.
	pub async fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();

		let bytes = fs::read(path)
			.await
			.map_err(|e| FileIOError::from((path, e, "failed to read foods file")))?;

		let records = serde_json::from_slice::<Vec<NutritionRecord>>(&bytes).map_err(|source| {
			Error::FoodsFile {
				path: path.into(),
				source,
			}
		})?;

		for record in &records {
			record.validate()?;
		}

		debug!(
			"Loaded foods file <path='{}', records='{}'>",
			path.display(),
			records.len()
		);

		Ok(Self::from_records(records))
	}

	/// Every record, ordered by name
	pub async fn records(&self) -> Vec<NutritionRecord> {
		let mut records = self
			.records
			.read()
			.await
			.values()
			.cloned()
			.collect::<Vec<_>>();
		records.sort_by(|a, b| a.name.cmp(&b.name));

		records
	}

	pub async fn len(&self) -> usize {
		self.records.read().await.len()
	}

	pub async fn is_empty(&self) -> bool {
		self.records.read().await.is_empty()
	}
}

#[async_trait]
impl NutritionStore for MemoryStore {
	async fn lookup(&self, name: &str) -> Result<Option<NutritionRecord>> {
		Ok(self.records.read().await.get(name).cloned())
	}

	async fn insert(&self, record: NutritionRecord) -> Result<()> {
		record.validate()?;

		match self.records.write().await.entry(record.name.clone()) {
			Entry::Vacant(entry) => {
				entry.insert(record);
				Ok(())
			}
			Entry::Occupied(_) => Err(Error::AlreadyExists(record.name)),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	use tempfile::tempdir;

	#[tokio::test]
	async fn lookup_is_exact_and_case_sensitive() {
		let store = MemoryStore::from_records([NutritionRecord::new("pizza", 266.0, 11.0, 33.0, 10.0)]);

		assert!(store.lookup("pizza").await.unwrap().is_some());
		assert!(store.lookup("Pizza").await.unwrap().is_none());
		assert!(store.lookup("pizza ").await.unwrap().is_none());
	}

	#[tokio::test]
	async fn first_duplicate_wins() {
		let store = MemoryStore::from_records([
			NutritionRecord::new("bagel", 250.0, 10.0, 49.0, 1.5),
			NutritionRecord::new("bagel", 1.0, 1.0, 1.0, 1.0),
		]);

		assert_eq!(store.len().await, 1);
		assert!(
			(store.lookup("bagel").await.unwrap().unwrap().calories - 250.0).abs() < f64::EPSILON
		);
	}

	#[tokio::test]
	async fn insert_refuses_existing_names() {
		let store = MemoryStore::new();
		store
			.insert(NutritionRecord::new("corn", 86.0, 3.2, 19.0, 1.2))
			.await
			.unwrap();

		assert!(matches!(
			store
				.insert(NutritionRecord::new("corn", 0.0, 0.0, 0.0, 0.0))
				.await,
			Err(Error::AlreadyExists(name)) if name == "corn"
		));
	}

	#[tokio::test]
	async fn loads_json_file() {
		let dir = tempdir().unwrap();
		let path = dir.path().join("foods.json");
		std::fs::write(
			&path,
			r#"[
				{"name": "espresso", "calories": 9, "protein": 0.1, "carbs": 1.7, "fat": 0.2},
				{"name": "guacamole", "calories": 160, "protein": 2, "carbs": 9, "fat": 15}
			]"#,
		)
		.unwrap();

		let store = MemoryStore::from_json_file(&path).await.unwrap();
		assert_eq!(
			store
				.records()
				.await
				.iter()
				.map(|r| r.name.as_str())
				.collect::<Vec<_>>(),
			["espresso", "guacamole"]
		);
		assert_eq!(
			store.lookup("guacamole").await.unwrap(),
			Some(NutritionRecord::new("guacamole", 160.0, 2.0, 9.0, 15.0))
		);
	}

	#[tokio::test]
	async fn bad_json_file() {
		let dir = tempdir().unwrap();

		assert!(matches!(
			MemoryStore::from_json_file(dir.path().join("missing.json")).await,
			Err(Error::FileIO(e)) if e.is_not_found()
		));

		let path = dir.path().join("foods.json");
		std::fs::write(&path, r#"{"name": "pizza"}"#).unwrap();
		assert!(matches!(
			MemoryStore::from_json_file(&path).await,
			Err(Error::FoodsFile { .. })
		));

		std::fs::write(
			&path,
			r#"[{"name": "pizza", "calories": -1, "protein": 11, "carbs": 33, "fat": 10}]"#,
		)
		.unwrap();
		assert!(matches!(
			MemoryStore::from_json_file(&path).await,
			Err(Error::InvalidRecord { .. })
		));
	}
}
