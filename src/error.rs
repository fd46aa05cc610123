//! Crate-wide error types and `Result` alias.

/// Library-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed source error carried by transport failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Unified error type for the JWKS client crate.
#[allow(missing_docs)]
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Reqwest(#[from] reqwest::Error),
	#[error(transparent)]
	Serde(#[from] serde_json::Error),
	#[error(transparent)]
	Url(#[from] url::ParseError),

	#[error("Transport failure while fetching {url}: {source}")]
	Transport {
		url: url::Url,
		#[source]
		source: BoxError,
	},
	#[error("Upstream HTTP status {status} from {url}.")]
	HttpStatus { status: http::StatusCode, url: url::Url },
	#[error("Malformed key set from {url}: {source}")]
	Parse {
		url: url::Url,
		#[source]
		source: serde_json::Error,
	},
	#[error("Unexpected failure during key refresh: {0}")]
	Unexpected(String),
	#[error("Validation failed for {field}: {reason}")]
	Validation { field: &'static str, reason: String },
}
impl Error {
	/// Wrap any transport-level failure for the given endpoint.
	pub fn transport(url: &url::Url, source: impl Into<BoxError>) -> Self {
		Self::Transport { url: url.clone(), source: source.into() }
	}
}
