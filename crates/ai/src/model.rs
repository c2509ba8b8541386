use crate::error::{ConfigurationError, InferenceError};

use nc_images::DEFAULT_INPUT_SIZE;
use nc_utils::FileIOError;

use std::{
	fmt, fs, io,
	num::NonZeroUsize,
	path::Path,
	sync::Mutex,
	thread,
};

use ndarray::Array4;
use ort::{
	session::{builder::GraphOptimizationLevel, Session},
	value::TensorRef,
};
use tracing::{debug, info};

/// A trained image classifier: takes a `(1, H, W, 3)` tensor and yields one score per class.
///
/// Implementations must be deterministic, the same tensor always gives the same vector.
pub trait ImageModel: Send + Sync {
	/// `(width, height)` of the tensors this model accepts
	fn input_size(&self) -> (u32, u32);

	/// Number of classes, if the model declares it statically
	fn num_classes(&self) -> Option<usize>;

	fn predict(&self, input: &Array4<f32>) -> Result<Vec<f32>, InferenceError>;
}

/// An ONNX model executed through ONNX Runtime.
///
/// `Session::run` needs exclusive access, so the session lives behind a mutex and concurrent
/// callers take turns.
pub struct OnnxModel {
	session: Mutex<Session>,
	input_name: String,
	output_name: String,
	input_size: (u32, u32),
	num_classes: Option<usize>,
}

impl OnnxModel {
	pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
		let path = path.as_ref();

		match fs::metadata(path) {
			Ok(metadata) if metadata.is_file() => {}
			Ok(_) => return Err(ConfigurationError::ModelFileNotFound(path.into())),
			Err(e) if e.kind() == io::ErrorKind::NotFound => {
				return Err(ConfigurationError::ModelFileNotFound(path.into()))
			}
			Err(e) => return Err(FileIOError::from((path, e, "failed to stat model file")).into()),
		}

		let session = build_session(path).map_err(|source| ConfigurationError::ModelLoad {
			path: path.into(),
			source,
		})?;

		let incompatible = |reason: String| ConfigurationError::IncompatibleModel {
			path: path.into(),
			reason,
		};

		let input = session
			.inputs
			.first()
			.ok_or_else(|| incompatible("model declares no inputs".to_string()))?;
		let output = session
			.outputs
			.first()
			.ok_or_else(|| incompatible("model declares no outputs".to_string()))?;

		let input_shape = input
			.input_type
			.tensor_shape()
			.map(|dims| dims.iter().copied().collect::<Vec<i64>>())
			.ok_or_else(|| incompatible(format!("input '{}' is not a tensor", input.name)))?;
		let input_size = image_input_size(&input_shape).map_err(incompatible)?;

		let output_shape = output
			.output_type
			.tensor_shape()
			.map(|dims| dims.iter().copied().collect::<Vec<i64>>())
			.ok_or_else(|| incompatible(format!("output '{}' is not a tensor", output.name)))?;
		let num_classes = output_classes(&output_shape).map_err(incompatible)?;

		let input_name = input.name.clone();
		let output_name = output.name.clone();

		info!(
			"Loaded model <path='{}', input='{input_name}', output='{output_name}', \
			input_size='{}x{}', classes='{}'>",
			path.display(),
			input_size.0,
			input_size.1,
			num_classes.map_or_else(|| "dynamic".to_string(), |c| c.to_string()),
		);

		Ok(Self {
			session: Mutex::new(session),
			input_name,
			output_name,
			input_size,
			num_classes,
		})
	}
}

impl fmt::Debug for OnnxModel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("OnnxModel")
			.field("input_name", &self.input_name)
			.field("output_name", &self.output_name)
			.field("input_size", &self.input_size)
			.field("num_classes", &self.num_classes)
			.finish_non_exhaustive()
	}
}

impl ImageModel for OnnxModel {
	fn input_size(&self) -> (u32, u32) {
		self.input_size
	}

	fn num_classes(&self) -> Option<usize> {
		self.num_classes
	}

	fn predict(&self, input: &Array4<f32>) -> Result<Vec<f32>, InferenceError> {
		let (width, height) = self.input_size;
		let expected = vec![1, to_usize(height), to_usize(width), 3];
		if input.shape() != expected.as_slice() {
			return Err(InferenceError::InputShapeMismatch {
				expected,
				found: input.shape().to_vec(),
			});
		}

		let mut session = self.session.lock().map_err(|_| {
			InferenceError::Backend("model session lock poisoned".to_string())
		})?;

		let outputs = session.run(ort::inputs![
			self.input_name.as_str() => TensorRef::from_array_view(input)?
		])?;

		let (shape, scores) = outputs[self.output_name.as_str()].try_extract_tensor::<f32>()?;

		let shape = shape
			.iter()
			.map(|&dim| usize::try_from(dim).unwrap_or(0))
			.collect::<Vec<_>>();

		match shape.as_slice() {
			[classes] | [1, classes] if *classes == scores.len() => {
				debug!("Model produced <classes='{classes}'>");
				Ok(scores.to_vec())
			}
			_ => Err(InferenceError::UnexpectedOutputShape { shape }),
		}
	}
}

fn build_session(path: &Path) -> ort::Result<Session> {
	let threads = thread::available_parallelism().map_or(1, NonZeroUsize::get);

	Session::builder()?
		.with_optimization_level(GraphOptimizationLevel::Level3)?
		.with_intra_threads(threads)?
		.commit_from_file(path)
}

/// Accepts `[1|-1, H, W, 3]`; dynamic spatial dimensions fall back to the reference size.
fn image_input_size(shape: &[i64]) -> Result<(u32, u32), String> {
	let [batch, height, width, channels] = shape else {
		return Err(format!("input must be 4 dimensional NHWC, found {shape:?}"));
	};

	if !matches!(*batch, 1 | -1) {
		return Err(format!("input batch dimension must be 1, found {batch}"));
	}

	if *channels != 3 {
		return Err(format!("input must have 3 channels in the last dimension, found {channels}"));
	}

	let (default_width, default_height) = DEFAULT_INPUT_SIZE;
	let spatial = |dim: i64, fallback: u32| {
		if dim < 0 {
			Ok(fallback)
		} else {
			u32::try_from(dim)
				.ok()
				.filter(|&d| d > 0)
				.ok_or_else(|| format!("input has an invalid spatial dimension {dim}"))
		}
	};

	Ok((
		spatial(*width, default_width)?,
		spatial(*height, default_height)?,
	))
}

/// Accepts `[C]` or `[1|-1, C]`; a dynamic `C` yields `None`.
fn output_classes(shape: &[i64]) -> Result<Option<usize>, String> {
	let classes = match shape {
		[classes] | [1 | -1, classes] => *classes,
		_ => return Err(format!("output must be [1, classes], found {shape:?}")),
	};

	Ok(usize::try_from(classes).ok())
}

#[allow(clippy::as_conversions)] // u32 always fits in usize on the platforms we support
const fn to_usize(value: u32) -> usize {
	value as usize
}
