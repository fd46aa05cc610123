//! Transport abstraction over the outbound GET request.

// crates.io
use http::{StatusCode, header::ACCEPT};
use reqwest::{Client, redirect::Policy};
use url::Url;
// self
use crate::{_prelude::*, config::ClientConfig};

/// Maximum redirect depth followed by [`HttpTransport`].
const MAX_REDIRECTS: usize = 10;

/// Status and body of a completed GET.
#[derive(Clone, Debug)]
pub struct HttpResponse {
	/// Response status returned by the endpoint.
	pub status: StatusCode,
	/// Raw response body; empty for error statuses.
	pub body: Vec<u8>,
}
impl HttpResponse {
	/// Construct a response from its parts.
	pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
		Self { status, body: body.into() }
	}
}

/// Performs the single GET a refresh needs.
///
/// Implementations report connection and timeout failures as [`Error::Transport`]; any HTTP
/// status, including error statuses, is returned as a response.
pub trait Transport: Send + Sync + 'static {
	/// Fetch `url`, giving up after `timeout`.
	fn get(
		&self,
		url: &Url,
		timeout: Duration,
	) -> impl Future<Output = Result<HttpResponse>> + Send;
}

/// Default [`Transport`] backed by a dedicated reqwest client.
#[derive(Clone, Debug)]
pub struct HttpTransport {
	client: Client,
}
impl HttpTransport {
	/// Build a transport honouring the configured TLS policy and request timeout.
	pub fn new(config: &ClientConfig) -> Result<Self> {
		let client = Client::builder()
			.redirect(Policy::limited(MAX_REDIRECTS))
			.user_agent(format!("jwks-client/{}", env!("CARGO_PKG_VERSION")))
			.danger_accept_invalid_certs(!config.strict_tls)
			.timeout(config.request_timeout)
			.build()?;

		Ok(Self { client })
	}
}
impl Transport for HttpTransport {
	async fn get(&self, url: &Url, timeout: Duration) -> Result<HttpResponse> {
		let response = self
			.client
			.get(url.clone())
			.header(ACCEPT, "application/json")
			.timeout(timeout)
			.send()
			.await
			.map_err(|err| Error::transport(url, err))?;
		let status = response.status();

		if status.is_client_error() || status.is_server_error() {
			return Ok(HttpResponse::new(status, Vec::new()));
		}

		let body = response.bytes().await.map_err(|err| Error::transport(url, err))?;

		Ok(HttpResponse::new(status, body.to_vec()))
	}
}
