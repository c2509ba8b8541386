use nc_utils::FileIOError;

use std::path::Path;

use thiserror::Error;

/// Everything that can go wrong while classifying a single image.
///
/// Preprocessing failures are surfaced untouched, so callers can still tell a missing file
/// from a corrupt one through [`nc_images::Error::is_input_error`] and
/// [`nc_images::Error::is_decode_error`].
#[derive(Debug, Error)]
pub enum ClassifierError {
	#[error(transparent)]
	Preprocess(#[from] nc_images::Error),
	#[error(transparent)]
	Configuration(#[from] ConfigurationError),
	#[error(transparent)]
	Inference(#[from] InferenceError),
}

/// The model artifact and its labels can't be used together, or can't be loaded at all.
#[derive(Debug, Error)]
pub enum ConfigurationError {
	#[error("failed to initialize the ONNX runtime: {0}")]
	RuntimeInit(#[source] ort::Error),
	#[error("model file not found: <path='{}'>", .0.display())]
	ModelFileNotFound(Box<Path>),
	#[error("failed to load model <path='{}'>: {source}", path.display())]
	ModelLoad {
		path: Box<Path>,
		#[source]
		source: ort::Error,
	},
	#[error("incompatible model <path='{}'>: {reason}", path.display())]
	IncompatibleModel { path: Box<Path>, reason: String },
	#[error("invalid model input size {width}x{height}: {source}")]
	InvalidInputSize {
		width: u32,
		height: u32,
		#[source]
		source: nc_images::Error,
	},

	#[error("label file not found: <path='{}'>", .0.display())]
	LabelFileNotFound(Box<Path>),
	#[error(transparent)]
	FileIO(#[from] FileIOError),
	#[error("failed to parse label file <path='{}'>: {source}", path.display())]
	LabelFileParse {
		path: Box<Path>,
		#[source]
		source: serde_json::Error,
	},
	#[error("label file <path='{}'> has a key that is not a decimal class index: '{key}'", path.display())]
	InvalidClassIndex { path: Box<Path>, key: String },
	#[error("label file <path='{}'> lists class index {index} more than once", path.display())]
	DuplicateClassIndex { path: Box<Path>, index: usize },
	#[error(
		"label file <path='{}'> must cover class indices 0..{expected}; missing: {missing:?}, unexpected: {unexpected:?}",
		path.display()
	)]
	IncompleteLabels {
		path: Box<Path>,
		expected: usize,
		missing: Vec<usize>,
		unexpected: Vec<usize>,
	},

	#[error("model and labels disagree on the number of classes: <model='{model}', labels='{labels}'>")]
	CardinalityMismatch { model: usize, labels: usize },
	#[error("class index {index} has no label (labels cover {classes} classes)")]
	UnknownClassIndex { index: usize, classes: usize },
}

/// Running the model failed. These are structural problems, retrying won't help.
#[derive(Debug, Error)]
pub enum InferenceError {
	#[error("model executor failed: {0}")]
	ModelExecutorFailed(#[from] ort::Error),
	#[error("model output has unexpected shape {shape:?}; expected [1, classes] or [classes]")]
	UnexpectedOutputShape { shape: Vec<usize> },
	#[error("model input has shape {found:?} but the model expects {expected:?}")]
	InputShapeMismatch {
		expected: Vec<usize>,
		found: Vec<usize>,
	},
	#[error("model produced no predictions")]
	EmptyPrediction,
	#[error("inference backend failed: {0}")]
	Backend(String),
}
