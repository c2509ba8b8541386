use nc_ai::{download::DownloadError, ClassifierError, ConfigurationError};

use std::process::ExitCode;

/// The image is missing, unreadable or not an image
pub const EXIT_INPUT: u8 = 2;
/// Model, labels or their sources are unusable
pub const EXIT_CONFIGURATION: u8 = 3;
pub const EXIT_INFERENCE: u8 = 4;
/// The nutrition store failed, which is different from not knowing the food
pub const EXIT_NUTRITION_STORE: u8 = 5;

pub fn exit_code(e: &anyhow::Error) -> ExitCode {
	ExitCode::from(exit_status(e))
}

fn exit_status(e: &anyhow::Error) -> u8 {
	for cause in e.chain() {
		if let Some(e) = cause.downcast_ref::<ClassifierError>() {
			return match e {
				ClassifierError::Preprocess(_) => EXIT_INPUT,
				ClassifierError::Configuration(_) => EXIT_CONFIGURATION,
				ClassifierError::Inference(_) => EXIT_INFERENCE,
			};
		}

		if cause.is::<ConfigurationError>() || cause.is::<DownloadError>() {
			return EXIT_CONFIGURATION;
		}

		if cause.is::<nc_nutrition::Error>() {
			return EXIT_NUTRITION_STORE;
		}
	}

	1
}
