//! Class index files: a JSON object keyed by decimal class indices, as written by Keras
//! (`{"0": "apple_pie", "1": "baby_back_ribs"}` or `{"0": ["n01440764", "tench"]}`).

use crate::error::ConfigurationError;

use nc_utils::FileIOError;

use std::{collections::BTreeMap, fmt, fs, io, marker::PhantomData, path::Path};

use serde::{
	de::{DeserializeOwned, MapAccess, Visitor},
	Deserialize, Deserializer,
};
use tracing::debug;

/// Every `key: value` pair of a JSON object in file order, repeated keys included
struct Entries<T>(Vec<(String, T)>);

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Entries<T> {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		struct EntriesVisitor<T>(PhantomData<T>);

		impl<'de, T: Deserialize<'de>> Visitor<'de> for EntriesVisitor<T> {
			type Value = Entries<T>;

			fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
				formatter.write_str("an object keyed by class index")
			}

			fn visit_map<M>(self, mut map: M) -> Result<Self::Value, M::Error>
			where
				M: MapAccess<'de>,
			{
				let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
				while let Some(entry) = map.next_entry::<String, T>()? {
					entries.push(entry);
				}
				Ok(Entries(entries))
			}
		}

		deserializer.deserialize_map(EntriesVisitor(PhantomData))
	}
}

/// Reads `path` and returns its entries ordered by class index.
///
/// The keys must be exactly `0..expected`, or `0..len` when no size is imposed.
pub(super) fn load<T: DeserializeOwned>(
	path: &Path,
	expected: Option<usize>,
) -> Result<Vec<T>, ConfigurationError> {
	let bytes = fs::read(path).map_err(|e| {
		if e.kind() == io::ErrorKind::NotFound {
			ConfigurationError::LabelFileNotFound(path.into())
		} else {
			FileIOError::from((path, e, "failed to read label file")).into()
		}
	})?;

	let entries = parse(path, &bytes, expected)?;

	debug!(
		"Loaded class index <path='{}', classes='{}'>",
		path.display(),
		entries.len()
	);

	Ok(entries)
}

pub(super) fn parse<T: DeserializeOwned>(
	path: &Path,
	bytes: &[u8],
	expected: Option<usize>,
) -> Result<Vec<T>, ConfigurationError> {
	let Entries(raw) = serde_json::from_slice::<Entries<T>>(bytes).map_err(|source| {
		ConfigurationError::LabelFileParse {
			path: path.into(),
			source,
		}
	})?;

	let mut indexed = BTreeMap::new();
	for (key, value) in raw {
		let index = class_index(&key).ok_or_else(|| ConfigurationError::InvalidClassIndex {
			path: path.into(),
			key: key.clone(),
		})?;

		// Catches repeated keys as well as "1" next to "01"
		if indexed.insert(index, value).is_some() {
			return Err(ConfigurationError::DuplicateClassIndex {
				path: path.into(),
				index,
			});
		}
	}

	let expected = expected.unwrap_or(indexed.len());

	let missing = (0..expected)
		.filter(|index| !indexed.contains_key(index))
		.collect::<Vec<_>>();
	let unexpected = indexed
		.range(expected..)
		.map(|(index, _)| *index)
		.collect::<Vec<_>>();

	if !missing.is_empty() || !unexpected.is_empty() {
		return Err(ConfigurationError::IncompleteLabels {
			path: path.into(),
			expected,
			missing,
			unexpected,
		});
	}

	Ok(indexed.into_values().collect())
}

/// Plain decimal digits only, `usize::from_str` would also take a leading `+`
fn class_index(key: &str) -> Option<usize> {
	if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
		return None;
	}

	key.parse().ok()
}
