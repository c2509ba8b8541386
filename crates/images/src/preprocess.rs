use crate::{
	consts::DEFAULT_INPUT_SIZE,
	error::{Error, Result},
	formatter::format_image,
};

use std::path::Path;

use image::{imageops::FilterType, DynamicImage};
use ndarray::Array4;
use tracing::debug;

/// Turns an image file into the `(1, H, W, 3)` tensor a MobileNetV2-family model expects.
///
/// Pixel values are scaled from `[0, 255]` into `[-1, 1]`, which is the normalization used by
/// both the pretrained ImageNet model and the models fine-tuned on top of it, so a single
/// preprocessor serves every classifier mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Preprocessor {
	width: u32,
	height: u32,
	filter: FilterType,
}

impl Default for Preprocessor {
	fn default() -> Self {
		let (width, height) = DEFAULT_INPUT_SIZE;
		Self {
			width,
			height,
			filter: FilterType::Nearest,
		}
	}
}

impl Preprocessor {
	pub fn new(width: u32, height: u32) -> Result<Self> {
		if width == 0 || height == 0 {
			return Err(Error::InvalidSize(width, height));
		}

		Ok(Self {
			width,
			height,
			filter: FilterType::Nearest,
		})
	}

	#[must_use]
	pub fn with_filter(mut self, filter: FilterType) -> Self {
		self.filter = filter;
		self
	}

	/// Target `(width, height)`
	#[must_use]
	pub const fn size(&self) -> (u32, u32) {
		(self.width, self.height)
	}

	pub fn preprocess(&self, path: impl AsRef<Path>) -> Result<Array4<f32>> {
		let path = path.as_ref();
		let img = format_image(path)?;

		debug!(
			"Preprocessing <path='{}', original_size='{}x{}', target_size='{}x{}'>",
			path.display(),
			img.width(),
			img.height(),
			self.width,
			self.height
		);

		self.to_tensor(&img)
	}

	pub fn to_tensor(&self, img: &DynamicImage) -> Result<Array4<f32>> {
		let rgb = img
			.resize_exact(self.width, self.height, self.filter)
			.into_rgb8();

		// The raw RGB buffer is already laid out row-major as H x W x C
		let data = rgb
			.into_raw()
			.into_iter()
			.map(|value| f32::from(value) / 127.5 - 1.0)
			.collect::<Vec<_>>();

		Ok(Array4::from_shape_vec(
			(1, dim(self.height), dim(self.width), 3),
			data,
		)?)
	}
}

/// Preprocess with the reference 224x224 configuration
pub fn preprocess(path: impl AsRef<Path>) -> Result<Array4<f32>> {
	Preprocessor::default().preprocess(path)
}

#[allow(clippy::as_conversions)] // u32 always fits in usize on the platforms we support
const fn dim(value: u32) -> usize {
	value as usize
}
