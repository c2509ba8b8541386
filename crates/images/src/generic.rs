use crate::{
	consts::GENERIC_MAXIMUM_FILE_SIZE,
	error::{Error, Result},
	ImageHandler,
};

use std::path::Path;

use image::DynamicImage;
use tracing::trace;

/// Handles every raster format the `image` crate can sniff from the file contents
pub struct GenericHandler {}

impl ImageHandler for GenericHandler {
	fn maximum_size(&self) -> u64 {
		GENERIC_MAXIMUM_FILE_SIZE
	}

	fn handle_image(&self, path: &Path) -> Result<DynamicImage> {
		let data = self.get_data(path)?; // this also makes sure the file isn't above the maximum size

		// Extensions lie, content doesn't
		let format = image::guess_format(&data).map_err(|_| Error::Unsupported(path.into()))?;
		trace!(?format, "Decoding <path='{}'>", path.display());

		Ok(image::load_from_memory_with_format(&data, format)?)
	}
}
