use nc_utils::FileIOError;

use std::path::Path;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
	#[error("image file not found: <path='{}'>", .0.display())]
	NotFound(Box<Path>),
	#[error(transparent)]
	FileIO(#[from] FileIOError),
	#[error("the image provided is too large (over 24MiB): <path='{}', size='{size}'>", path.display())]
	TooLarge { path: Box<Path>, size: u64 },
	#[error("the image provided is in an unsupported format: <path='{}'>", .0.display())]
	Unsupported(Box<Path>),
	#[error("error while decoding the image (via the `image` crate): {0}")]
	Image(#[from] image::ImageError),
	#[error("invalid model input size: {0}x{1}")]
	InvalidSize(u32, u32),
	#[error("failed to shape the image into a tensor: {0}")]
	Shape(#[from] ndarray::ShapeError),
}

impl Error {
	/// The file could be read but its contents are not an image we can decode
	#[must_use]
	pub const fn is_decode_error(&self) -> bool {
		matches!(self, Self::Unsupported(_) | Self::Image(_))
	}

	/// The path is missing, unreadable or otherwise not an acceptable input
	#[must_use]
	pub const fn is_input_error(&self) -> bool {
		matches!(
			self,
			Self::NotFound(_) | Self::FileIO(_) | Self::TooLarge { .. }
		)
	}
}
