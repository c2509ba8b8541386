use super::{index_file, LabelDecoder, Prediction};
use crate::error::ConfigurationError;

use std::path::Path;

/// Size of the ImageNet-1k taxonomy the pretrained model was trained on
pub const IMAGENET_CLASSES: usize = 1000;

#[derive(Debug, Clone)]
struct Synset {
	id: String,
	name: String,
}

/// The ImageNet-1k class index (`imagenet_class_index.json`), mapping each output of the
/// pretrained model to its WordNet id and human readable name.
#[derive(Debug, Clone)]
pub struct ImageNetLabels {
	synsets: Vec<Synset>,
}

impl ImageNetLabels {
	/// Loads the Keras class index: `{"0": ["n01440764", "tench"], ...}` covering all 1000 classes.
	pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
		index_file::load::<(String, String)>(path.as_ref(), Some(IMAGENET_CLASSES))
			.map(Self::from_entries)
	}

	/// `(wordnet_id, name)` per class, in class order
	#[must_use]
	pub fn from_entries(entries: Vec<(String, String)>) -> Self {
		Self {
			synsets: entries
				.into_iter()
				.map(|(id, name)| Synset { id, name })
				.collect(),
		}
	}
}

impl LabelDecoder for ImageNetLabels {
	fn num_classes(&self) -> usize {
		self.synsets.len()
	}

	fn prediction(&self, index: usize, confidence: f32) -> Option<Prediction> {
		self.synsets.get(index).map(|synset| Prediction {
			class_index: index,
			class_id: Some(synset.id.clone()),
			label: synset.name.clone(),
			confidence,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	use std::{collections::BTreeMap, fs};

	fn index_json(classes: usize) -> String {
		let entries = (0..classes)
			.map(|i| {
				let entry = match i {
					963 => ("n07873807".to_string(), "pizza".to_string()),
					933 => ("n07697313".to_string(), "cheeseburger".to_string()),
					_ => (format!("n{i:08}"), format!("class_{i}")),
				};
				(i.to_string(), entry)
			})
			.collect::<BTreeMap<_, _>>();

		serde_json::to_string(&entries).unwrap()
	}

	#[test]
	fn loads_keras_class_index() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("imagenet_class_index.json");
		fs::write(&path, index_json(IMAGENET_CLASSES)).unwrap();

		let labels = ImageNetLabels::load(&path).unwrap();
		assert_eq!(labels.num_classes(), IMAGENET_CLASSES);

		let mut scores = vec![0.0; IMAGENET_CLASSES];
		scores[963] = 0.6;
		scores[933] = 0.3;
		scores[0] = 0.1;

		let ranked = labels.decode(&scores, 3).unwrap();
		assert_eq!(ranked[0].label, "pizza");
		assert_eq!(ranked[0].class_id.as_deref(), Some("n07873807"));
		assert_eq!(ranked[0].class_index, 963);
		assert_eq!(ranked[1].label, "cheeseburger");
		assert_eq!(ranked[2].class_index, 0);
	}

	#[test]
	fn truncated_index_is_rejected() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("imagenet_class_index.json");
		fs::write(&path, index_json(999)).unwrap();

		assert!(matches!(
			ImageNetLabels::load(&path),
			Err(ConfigurationError::IncompleteLabels { ref missing, .. }) if missing == &[999]
		));
	}

	#[test]
	fn entries_must_be_id_name_pairs() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("imagenet_class_index.json");
		fs::write(&path, r#"{"0": "tench"}"#).unwrap();

		assert!(matches!(
			ImageNetLabels::load(&path),
			Err(ConfigurationError::LabelFileParse { .. })
		));
	}
}
