use crate::error::ConfigurationError;

use serde::Serialize;

mod custom;
mod imagenet;
mod index_file;
mod ranking;

pub use custom::LabelMap;
pub use imagenet::{ImageNetLabels, IMAGENET_CLASSES};
pub use ranking::top_k;

/// One ranked entry of a classification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
	/// Position of this class in the model's output vector
	pub class_index: usize,
	/// Taxonomy identifier, when the taxonomy has one (WordNet ids for ImageNet)
	pub class_id: Option<String>,
	pub label: String,
	pub confidence: f32,
}

/// Turns a model's score vector into named, ranked predictions.
pub trait LabelDecoder: Send + Sync {
	/// Number of classes this decoder has names for
	fn num_classes(&self) -> usize;

	/// Names the class at `index`, `None` if the decoder has no such class.
	fn prediction(&self, index: usize, confidence: f32) -> Option<Prediction>;

	/// The `k` highest scores, descending, ties broken by the lower class index.
	///
	/// `k` larger than the number of classes is clamped, `k == 0` yields nothing. A score
	/// vector whose length disagrees with [`LabelDecoder::num_classes`] is a configuration
	/// problem, never silently truncated.
	fn decode(&self, scores: &[f32], k: usize) -> Result<Vec<Prediction>, ConfigurationError> {
		let classes = self.num_classes();
		if scores.len() != classes {
			return Err(ConfigurationError::CardinalityMismatch {
				model: scores.len(),
				labels: classes,
			});
		}

		top_k(scores, k)
			.into_iter()
			.map(|index| {
				self.prediction(index, scores[index])
					.ok_or(ConfigurationError::UnknownClassIndex { index, classes })
			})
			.collect()
	}
}

impl<T: LabelDecoder + ?Sized> LabelDecoder for Box<T> {
	fn num_classes(&self) -> usize {
		(**self).num_classes()
	}

	fn prediction(&self, index: usize, confidence: f32) -> Option<Prediction> {
		(**self).prediction(index, confidence)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	/// Knows every class up to `classes` but only names the even ones
	struct Sparse {
		classes: usize,
	}

	impl LabelDecoder for Sparse {
		fn num_classes(&self) -> usize {
			self.classes
		}

		fn prediction(&self, index: usize, confidence: f32) -> Option<Prediction> {
			(index % 2 == 0).then(|| Prediction {
				class_index: index,
				class_id: None,
				label: format!("class_{index}"),
				confidence,
			})
		}
	}

	#[test]
	fn unknown_index_is_fatal_not_skipped() {
		let decoder = Sparse { classes: 3 };

		assert!(matches!(
			decoder.decode(&[0.1, 0.8, 0.1], 1),
			Err(ConfigurationError::UnknownClassIndex {
				index: 1,
				classes: 3
			})
		));

		// Odd classes not reached, nothing to complain about
		assert_eq!(decoder.decode(&[0.6, 0.1, 0.3], 2).unwrap().len(), 2);
	}

	#[test]
	fn score_length_must_match_classes() {
		let decoder = Sparse { classes: 4 };

		assert!(matches!(
			decoder.decode(&[0.5, 0.5], 1),
			Err(ConfigurationError::CardinalityMismatch {
				model: 2,
				labels: 4
			})
		));
	}

	#[test]
	fn boxed_decoders_decode_the_same() {
		let boxed: Box<dyn LabelDecoder> = Box::new(LabelMap::new(vec![
			"pizza".to_string(),
			"salad".to_string(),
		]));

		let ranked = boxed.decode(&[0.3, 0.7], 2).unwrap();
		assert_eq!(ranked[0].label, "salad");
		assert_eq!(ranked[1].label, "pizza");
	}
}
