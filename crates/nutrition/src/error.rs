use nc_utils::FileIOError;

use std::path::Path;

use url::Url;

pub type Result<T> = std::result::Result<T, Error>;

/// Operational failures of a nutrition store. A food that simply isn't in the store is not an
/// error, lookups report it as `Ok(None)`.
#[derive(thiserror::Error, Debug)]
pub enum Error {
	#[error("missing required setting: {0}")]
	MissingSetting(&'static str),
	#[error("invalid store url: {0}")]
	InvalidUrl(#[from] url::ParseError),
	#[error("store url can't hold a path: <url='{0}'>")]
	UnsupportedUrl(Url),
	#[error("store api key is not a valid header value")]
	InvalidApiKey,

	#[error("request to the nutrition store failed: {0}")]
	Request(#[from] reqwest::Error),
	#[error("nutrition store responded with an error <status='{status}'>: {body}")]
	Status {
		status: reqwest::StatusCode,
		body: String,
	},
	#[error("nutrition store returned an unreadable payload: {0}")]
	Payload(#[source] serde_json::Error),

	#[error(transparent)]
	FileIO(#[from] FileIOError),
	#[error("failed to parse foods file <path='{}'>: {source}", path.display())]
	FoodsFile {
		path: Box<Path>,
		#[source]
		source: serde_json::Error,
	},
	#[error("invalid nutrition record <name='{name}'>: {reason}")]
	InvalidRecord { name: String, reason: &'static str },
	#[error("a nutrition record already exists <name='{0}'>")]
	AlreadyExists(String),
}
