use super::{index_file, LabelDecoder, Prediction};
use crate::error::ConfigurationError;

use std::path::Path;

/// Class names for a custom trained model, read from its `class_indices.json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMap {
	names: Vec<String>,
}

impl LabelMap {
	/// `names[i]` is the name of class `i`
	#[must_use]
	pub const fn new(names: Vec<String>) -> Self {
		Self { names }
	}

	/// Loads a `{"<index>": "<name>"}` file. With `classes` set the file must cover exactly
	/// `0..classes`, otherwise it must cover `0..len` without gaps.
	pub fn load(path: impl AsRef<Path>, classes: Option<usize>) -> Result<Self, ConfigurationError> {
		index_file::load(path.as_ref(), classes).map(Self::new)
	}

	#[must_use]
	pub fn names(&self) -> &[String] {
		&self.names
	}
}

impl LabelDecoder for LabelMap {
	fn num_classes(&self) -> usize {
		self.names.len()
	}

	fn prediction(&self, index: usize, confidence: f32) -> Option<Prediction> {
		self.names.get(index).map(|name| Prediction {
			class_index: index,
			class_id: None,
			label: name.clone(),
			confidence,
		})
	}
}
