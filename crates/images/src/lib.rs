#![warn(
	clippy::all,
	clippy::pedantic,
	clippy::correctness,
	clippy::perf,
	clippy::style,
	clippy::suspicious,
	clippy::complexity,
	clippy::nursery,
	clippy::unwrap_used,
	unused_qualifications,
	rust_2018_idioms,
	clippy::expect_used,
	trivial_casts,
	trivial_numeric_casts,
	unused_allocation,
	clippy::dbg_macro
)]
#![forbid(unsafe_code)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

mod consts;
mod error;
mod formatter;
mod generic;
mod preprocess;

pub use consts::{DEFAULT_INPUT_SIZE, GENERIC_MAXIMUM_FILE_SIZE};
pub use error::{Error, Result};
pub use formatter::format_image;
pub use image::{imageops::FilterType, DynamicImage};
pub use preprocess::{preprocess, Preprocessor};

use nc_utils::FileIOError;

use std::{fs, io::Read, path::Path};

pub trait ImageHandler {
	fn maximum_size(&self) -> u64
	where
		Self: Sized; // thanks vtables

	fn get_data(&self, path: &Path) -> Result<Vec<u8>>
	where
		Self: Sized,
	{
		let mut file = fs::File::open(path).map_err(|e| match e.kind() {
			std::io::ErrorKind::NotFound => Error::NotFound(path.into()),
			_ => FileIOError::from((path, e, "Failed to open image")).into(),
		})?;

		let size = file
			.metadata()
			.map_err(|e| FileIOError::from((path, e, "Failed to read image metadata")))?
			.len();

		if size > self.maximum_size() {
			return Err(Error::TooLarge {
				path: path.into(),
				size,
			});
		}

		let mut data = vec![];
		file.read_to_end(&mut data)
			.map_err(|e| FileIOError::from((path, e, "Failed to read image")))?;

		Ok(data)
	}

	fn handle_image(&self, path: &Path) -> Result<DynamicImage>;
}
