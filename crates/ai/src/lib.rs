//! Food image classification.
//!
//! A [`Classifier`] pairs an [`ImageModel`] with a [`LabelDecoder`]: either the pretrained
//! MobileNetV2 with the ImageNet taxonomy, or a fine-tuned model with its own label map.

use tracing::debug;

pub mod classifier;
pub mod download;
mod error;
pub mod labels;
pub mod model;

pub use classifier::{Classifier, ClassifierMode, DEFAULT_TOP_K};
pub use error::{ClassifierError, ConfigurationError, InferenceError};
pub use labels::{LabelDecoder, Prediction};
pub use model::{ImageModel, OnnxModel};

/// Commits the process wide ONNX Runtime environment with the best execution providers for
/// this platform. Sessions created before this call fall back to the default CPU provider.
pub fn init() -> Result<(), ConfigurationError> {
	// Ok(false) means the environment was already committed, which is fine
	let committed = ort::init()
		.with_name("nutricheck")
		.with_execution_providers({
			#[cfg(any(target_os = "macos", target_os = "ios"))]
			{
				use ort::execution_providers::{
					CoreMLExecutionProvider, XNNPACKExecutionProvider,
				};

				[
					CoreMLExecutionProvider::default().build(),
					XNNPACKExecutionProvider::default().build(),
				]
			}

			#[cfg(target_os = "windows")]
			{
				use ort::execution_providers::DirectMLExecutionProvider;

				[DirectMLExecutionProvider::default().build()]
			}

			#[cfg(target_os = "linux")]
			{
				use ort::execution_providers::XNNPACKExecutionProvider;

				[XNNPACKExecutionProvider::default().build()]
			}
		})
		.commit()
		.map_err(ConfigurationError::RuntimeInit)?;

	debug!("Initialized AI environment <fresh='{committed}'>");

	Ok(())
}
