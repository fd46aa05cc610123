//! Key set retrieval: one GET, status check, size guard, parse.

// crates.io
use tokio::time;
use url::Url;
// self
use crate::{_prelude::*, config::ClientConfig, http::transport::Transport, key::KeySet};

/// Fetch and parse the key set published at `url`.
///
/// The request timeout is enforced here as well as handed to the transport, so injected
/// transports cannot outlive it.
pub async fn fetch_keys<T>(transport: &T, url: &Url, config: &ClientConfig) -> Result<KeySet>
where
	T: Transport,
{
	let start = Instant::now();
	let response =
		match time::timeout(config.request_timeout, transport.get(url, config.request_timeout))
			.await
		{
			Ok(response) => response?,
			Err(elapsed) => return Err(Error::transport(url, elapsed)),
		};
	let status = response.status;

	if status.as_u16() >= 400 {
		return Err(Error::HttpStatus { status, url: url.clone() });
	}
	if response.body.len() as u64 > config.max_response_bytes {
		return Err(Error::Validation {
			field: "max_response_bytes",
			reason: format!(
				"Response size {size} bytes exceeds the configured guard of {limit} bytes.",
				size = response.body.len(),
				limit = config.max_response_bytes
			),
		});
	}

	let keys = KeySet::from_slice(&response.body)
		.map_err(|source| Error::Parse { url: url.clone(), source })?;

	tracing::trace!(%url, %status, elapsed = ?start.elapsed(), "key set response parsed");

	Ok(keys)
}
