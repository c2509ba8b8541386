use crate::{
	error::{ClassifierError, ConfigurationError, InferenceError},
	labels::{ImageNetLabels, LabelDecoder, LabelMap, Prediction},
	model::{ImageModel, OnnxModel},
};

use nc_images::Preprocessor;

use std::path::Path;

use tracing::{debug, info};

/// Pretrained MobileNetV2 model file inside the models directory
pub const PRETRAINED_MODEL_FILE: &str = "mobilenet_v2.onnx";
/// ImageNet class index shipped beside the pretrained model
pub const IMAGENET_INDEX_FILE: &str = "imagenet_class_index.json";
/// Label map expected in the same directory as a custom model
pub const CUSTOM_LABELS_FILE: &str = "class_indices.json";

pub const DEFAULT_TOP_K: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierMode {
	/// ImageNet-1k model with the builtin taxonomy
	Pretrained,
	/// Fine-tuned model with its own label map
	Custom,
}

/// Image path in, ranked food labels out.
///
/// Owns its model and label decoder for its whole lifetime and never mutates them, so a single
/// instance can be shared between threads.
pub struct Classifier {
	mode: ClassifierMode,
	model: Box<dyn ImageModel>,
	decoder: Box<dyn LabelDecoder>,
	preprocessor: Preprocessor,
}

impl Classifier {
	/// Binds a model to its labels. When the model declares its class count, the decoder must
	/// name exactly that many classes.
	pub fn new(
		mode: ClassifierMode,
		model: Box<dyn ImageModel>,
		decoder: Box<dyn LabelDecoder>,
	) -> Result<Self, ConfigurationError> {
		if let Some(classes) = model.num_classes() {
			if classes != decoder.num_classes() {
				return Err(ConfigurationError::CardinalityMismatch {
					model: classes,
					labels: decoder.num_classes(),
				});
			}
		}

		let (width, height) = model.input_size();
		let preprocessor = Preprocessor::new(width, height).map_err(|source| {
			ConfigurationError::InvalidInputSize {
				width,
				height,
				source,
			}
		})?;

		Ok(Self {
			mode,
			model,
			decoder,
			preprocessor,
		})
	}

	/// Loads the pretrained MobileNetV2 and the ImageNet class index from `models_dir`.
	pub fn pretrained(models_dir: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
		let models_dir = models_dir.as_ref();

		let model = OnnxModel::load(models_dir.join(PRETRAINED_MODEL_FILE))?;
		let labels = ImageNetLabels::load(models_dir.join(IMAGENET_INDEX_FILE))?;

		info!(
			"Using pretrained classifier <models_dir='{}'>",
			models_dir.display()
		);

		Self::new(ClassifierMode::Pretrained, Box::new(model), Box::new(labels))
	}

	/// Loads a custom model and the `class_indices.json` next to it.
	pub fn custom(model_path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
		let model_path = model_path.as_ref();

		let model = OnnxModel::load(model_path)?;
		let labels_path = model_path
			.parent()
			.unwrap_or_else(|| Path::new("."))
			.join(CUSTOM_LABELS_FILE);
		let labels = LabelMap::load(&labels_path, model.num_classes())?;

		info!(
			"Using custom classifier <model='{}', labels='{}', classes='{}'>",
			model_path.display(),
			labels_path.display(),
			labels.num_classes()
		);

		Self::new(ClassifierMode::Custom, Box::new(model), Box::new(labels))
	}

	#[must_use]
	pub const fn mode(&self) -> ClassifierMode {
		self.mode
	}

	#[must_use]
	pub fn is_custom(&self) -> bool {
		self.mode == ClassifierMode::Custom
	}

	#[must_use]
	pub const fn preprocessor(&self) -> &Preprocessor {
		&self.preprocessor
	}

	/// The `top_k` most likely classes for the image at `path`, most likely first.
	pub fn classify(
		&self,
		path: impl AsRef<Path>,
		top_k: usize,
	) -> Result<Vec<Prediction>, ClassifierError> {
		let path = path.as_ref();

		let input = self.preprocessor.preprocess(path)?;
		let scores = self.model.predict(&input)?;
		let ranked = self.decoder.decode(&scores, top_k)?;

		debug!(
			"Classified <path='{}', top_k='{top_k}', best='{}'>",
			path.display(),
			ranked.first().map_or("", |p| p.label.as_str())
		);

		Ok(ranked)
	}

	/// Label of the single most likely class, the key used for nutrition lookups.
	pub fn best_label(&self, path: impl AsRef<Path>) -> Result<String, ClassifierError> {
		self.classify(path, 1)?
			.into_iter()
			.next()
			.map(|prediction| prediction.label)
			.ok_or_else(|| InferenceError::EmptyPrediction.into())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	use ndarray::Array4;

	struct Fixed {
		scores: Vec<f32>,
		size: (u32, u32),
	}

	impl ImageModel for Fixed {
		fn input_size(&self) -> (u32, u32) {
			self.size
		}

		fn num_classes(&self) -> Option<usize> {
			Some(self.scores.len())
		}

		fn predict(&self, _: &Array4<f32>) -> Result<Vec<f32>, InferenceError> {
			Ok(self.scores.clone())
		}
	}

	fn labels(names: &[&str]) -> Box<dyn LabelDecoder> {
		Box::new(LabelMap::new(names.iter().map(ToString::to_string).collect()))
	}

	#[test]
	fn class_counts_must_agree() {
		let model = Box::new(Fixed {
			scores: vec![0.25; 4],
			size: (224, 224),
		});

		assert!(matches!(
			Classifier::new(ClassifierMode::Custom, model, labels(&["a", "b", "c"])),
			Err(ConfigurationError::CardinalityMismatch {
				model: 4,
				labels: 3
			})
		));
	}

	#[test]
	fn preprocessor_follows_model_input() {
		let classifier = Classifier::new(
			ClassifierMode::Custom,
			Box::new(Fixed {
				scores: vec![1.0],
				size: (160, 128),
			}),
			labels(&["a"]),
		)
		.unwrap();

		assert_eq!(classifier.preprocessor().size(), (160, 128));
		assert!(classifier.is_custom());
	}

	#[test]
	fn zero_sized_model_input_is_a_configuration_error() {
		assert!(matches!(
			Classifier::new(
				ClassifierMode::Pretrained,
				Box::new(Fixed {
					scores: vec![1.0],
					size: (0, 224),
				}),
				labels(&["a"]),
			),
			Err(ConfigurationError::InvalidInputSize { width: 0, .. })
		));
	}

	#[test]
	fn custom_model_needs_an_existing_file() {
		let dir = tempfile::tempdir().unwrap();

		assert!(matches!(
			Classifier::custom(dir.path().join("food_model.onnx")),
			Err(ConfigurationError::ModelFileNotFound(_))
		));
		assert!(matches!(
			Classifier::pretrained(dir.path()),
			Err(ConfigurationError::ModelFileNotFound(_))
		));
	}
}
