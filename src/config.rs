//! Client configuration and validation.

// crates.io
use serde::{Deserialize, Serialize};
// self
use crate::_prelude::*;

/// Default lifetime of a fetched key set.
pub const DEFAULT_CACHE_TIMEOUT: Duration = Duration::from_secs(600);
/// Default bound on a single key set request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Default size guard (1 MiB).
pub const DEFAULT_MAX_RESPONSE_BYTES: u64 = 1_048_576;

/// Resolved configuration consumed by the refresh coordinator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
	/// How long a fetched key set stays authoritative.
	#[serde(default = "default_cache_timeout")]
	pub cache_timeout: Duration,
	/// Upper bound on one fetch, including connection setup.
	#[serde(default = "default_request_timeout")]
	pub request_timeout: Duration,
	/// Verify the endpoint's TLS certificate chain.
	#[serde(default = "default_true")]
	pub strict_tls: bool,
	/// Emit informational fetch diagnostics.
	#[serde(default)]
	pub debug_logging: bool,
	/// Emit fetch failure diagnostics.
	#[serde(default = "default_true")]
	pub error_logging: bool,
	/// Maximum size allowed for key set payloads in bytes.
	#[serde(default = "default_max_response_bytes")]
	pub max_response_bytes: u64,
}
impl ClientConfig {
	/// Create a configuration pre-populated with default values.
	pub fn new() -> Self {
		Self::default()
	}

	/// Set the lifetime of fetched key sets.
	pub fn with_cache_timeout(mut self, timeout: Duration) -> Self {
		self.cache_timeout = timeout;

		self
	}

	/// Set the bound on a single key set request.
	pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
		self.request_timeout = timeout;

		self
	}

	/// Enable or disable TLS certificate verification.
	pub fn with_strict_tls(mut self, strict_tls: bool) -> Self {
		self.strict_tls = strict_tls;

		self
	}

	/// Toggle informational fetch diagnostics.
	pub fn with_debug_logging(mut self, enabled: bool) -> Self {
		self.debug_logging = enabled;

		self
	}

	/// Toggle fetch failure diagnostics.
	pub fn with_error_logging(mut self, enabled: bool) -> Self {
		self.error_logging = enabled;

		self
	}

	/// Set the payload size guard.
	pub fn with_max_response_bytes(mut self, limit: u64) -> Self {
		self.max_response_bytes = limit;

		self
	}

	/// Validate the configuration against the documented constraints.
	pub fn validate(&self) -> Result<()> {
		if self.request_timeout.is_zero() {
			return Err(Error::Validation {
				field: "request_timeout",
				reason: "Must be greater than zero.".into(),
			});
		}
		if self.max_response_bytes == 0 {
			return Err(Error::Validation {
				field: "max_response_bytes",
				reason: "Must be greater than zero.".into(),
			});
		}

		Ok(())
	}
}
impl Default for ClientConfig {
	fn default() -> Self {
		Self {
			cache_timeout: DEFAULT_CACHE_TIMEOUT,
			request_timeout: DEFAULT_REQUEST_TIMEOUT,
			strict_tls: true,
			debug_logging: false,
			error_logging: true,
			max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
		}
	}
}

fn default_cache_timeout() -> Duration {
	DEFAULT_CACHE_TIMEOUT
}

fn default_request_timeout() -> Duration {
	DEFAULT_REQUEST_TIMEOUT
}

fn default_max_response_bytes() -> u64 {
	DEFAULT_MAX_RESPONSE_BYTES
}

fn default_true() -> bool {
	true
}
