use crate::{error::Result, generic::GenericHandler, ImageHandler};

use std::path::Path;

use image::DynamicImage;

pub fn format_image(path: impl AsRef<Path>) -> Result<DynamicImage> {
	GenericHandler {}.handle_image(path.as_ref())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::Error;

	use std::fs;

	use image::{ImageFormat, Rgb, RgbImage};
	use tempfile::tempdir;

	#[test]
	fn decodes_by_content_not_extension() {
		let dir = tempdir().unwrap();
		let path = dir.path().join("actually_a_png.jpg");
		RgbImage::from_pixel(4, 3, Rgb([10, 20, 30]))
			.save_with_format(&path, ImageFormat::Png)
			.unwrap();

		let img = format_image(&path).unwrap();
		assert_eq!((img.width(), img.height()), (4, 3));
	}

	#[test]
	fn missing_file_is_input_error() {
		let dir = tempdir().unwrap();
		let err = format_image(dir.path().join("nope.png")).unwrap_err();

		assert!(matches!(err, Error::NotFound(_)));
		assert!(err.is_input_error());
		assert!(!err.is_decode_error());
	}

	#[test]
	fn unknown_bytes_are_decode_error() {
		let dir = tempdir().unwrap();
		let path = dir.path().join("notes.png");
		fs::write(&path, b"definitely not an image").unwrap();

		let err = format_image(&path).unwrap_err();
		assert!(matches!(err, Error::Unsupported(_)));
		assert!(err.is_decode_error());
	}

	#[test]
	fn truncated_image_is_decode_error() {
		let dir = tempdir().unwrap();
		let path = dir.path().join("truncated.png");
		let full = dir.path().join("full.png");
		RgbImage::from_pixel(32, 32, Rgb([200, 100, 0]))
			.save_with_format(&full, ImageFormat::Png)
			.unwrap();
		let bytes = fs::read(&full).unwrap();
		fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();

		let err = format_image(&path).unwrap_err();
		assert!(matches!(err, Error::Image(_)));
		assert!(err.is_decode_error());
	}
}
