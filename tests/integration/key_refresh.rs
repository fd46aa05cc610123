// std
use std::{net::TcpListener, sync::Arc, time::Duration};
// crates.io
use jwks_client::{ClientConfig, Error, RefreshCoordinator, Result};
use wiremock::{
	Mock, MockServer, ResponseTemplate,
	matchers::{header, method, path},
};
// self
use crate::{JWKS_BODY, JWKS_PATH, endpoint};

#[tokio::test]
async fn caches_key_set_after_initial_fetch() -> Result<()> {
	let _ = tracing_subscriber::fmt::try_init();

	let server = MockServer::start().await;

	Mock::given(method("GET"))
		.and(path(JWKS_PATH))
		.and(header("accept", "application/json"))
		.respond_with(
			ResponseTemplate::new(200)
				.set_body_string(JWKS_BODY)
				.insert_header("content-type", "application/json"),
		)
		.expect(1)
		.mount(&server)
		.await;

	let client =
		RefreshCoordinator::new(endpoint(&server), ClientConfig::new().with_debug_logging(true))?;
	let first = client.get_keys().await?;
	let second = client.get_keys().await?;

	assert_eq!(first.len(), 2);
	assert!(Arc::ptr_eq(&first, &second));
	assert!(client.expiration().await.is_some());

	server.verify().await;

	Ok(())
}

#[tokio::test]
async fn error_status_keeps_cache_empty_and_next_call_retries() -> Result<()> {
	let _ = tracing_subscriber::fmt::try_init();

	let server = MockServer::start().await;

	Mock::given(method("GET"))
		.and(path(JWKS_PATH))
		.respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
		.up_to_n_times(1)
		.expect(1)
		.mount(&server)
		.await;
	Mock::given(method("GET"))
		.and(path(JWKS_PATH))
		.respond_with(ResponseTemplate::new(200).set_body_string(JWKS_BODY))
		.expect(1)
		.mount(&server)
		.await;

	let client = RefreshCoordinator::new(endpoint(&server), ClientConfig::new())?;
	let err = client.get_keys().await.unwrap_err();

	assert!(matches!(err, Error::HttpStatus { status, .. } if status.as_u16() == 500));
	assert!(client.cached_keys().await.is_none());
	assert!(client.expiration().await.is_none());

	let keys = client.get_keys().await?;

	assert_eq!(keys.len(), 2);

	server.verify().await;

	Ok(())
}

#[tokio::test]
async fn malformed_body_is_reported_as_parse_error() -> Result<()> {
	let server = MockServer::start().await;

	Mock::given(method("GET"))
		.and(path(JWKS_PATH))
		.respond_with(ResponseTemplate::new(200).set_body_string(r#"{"keys":[{"blah":"jjj"}}"#))
		.mount(&server)
		.await;

	let client = RefreshCoordinator::new(endpoint(&server), ClientConfig::new())?;
	let err = client.get_keys().await.unwrap_err();

	assert!(matches!(err, Error::Parse { .. }), "unexpected error {err:?}");
	assert!(client.cached_keys().await.is_none());

	Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_callers_trigger_a_single_fetch() -> Result<()> {
	let server = MockServer::start().await;

	Mock::given(method("GET"))
		.and(path(JWKS_PATH))
		.respond_with(
			ResponseTemplate::new(200)
				.set_body_string(JWKS_BODY)
				.set_delay(Duration::from_millis(200)),
		)
		.expect(1)
		.mount(&server)
		.await;

	let client = RefreshCoordinator::new(endpoint(&server), ClientConfig::new())?;
	let handles = (0..16)
		.map(|_| {
			let client = client.clone();

			tokio::spawn(async move { client.get_keys().await })
		})
		.collect::<Vec<_>>();

	for handle in handles {
		let keys = handle.await.expect("join")?;

		assert_eq!(keys.len(), 2);
	}

	server.verify().await;

	Ok(())
}

#[tokio::test]
async fn expired_entry_is_refetched() -> Result<()> {
	let server = MockServer::start().await;

	Mock::given(method("GET"))
		.and(path(JWKS_PATH))
		.respond_with(ResponseTemplate::new(200).set_body_string(JWKS_BODY))
		.expect(2)
		.mount(&server)
		.await;

	let client = RefreshCoordinator::new(
		endpoint(&server),
		ClientConfig::new().with_cache_timeout(Duration::from_millis(50)),
	)?;
	let first = client.get_keys().await?;

	tokio::time::sleep(Duration::from_millis(100)).await;

	assert!(client.snapshot().await.stale);

	let second = client.get_keys().await?;

	assert!(!Arc::ptr_eq(&first, &second));
	assert_eq!(first, second);

	server.verify().await;

	Ok(())
}

#[tokio::test]
async fn slow_endpoint_fails_with_transport_error() -> Result<()> {
	let server = MockServer::start().await;

	Mock::given(method("GET"))
		.and(path(JWKS_PATH))
		.respond_with(
			ResponseTemplate::new(200).set_body_string(JWKS_BODY).set_delay(Duration::from_secs(2)),
		)
		.mount(&server)
		.await;

	let client = RefreshCoordinator::new(
		endpoint(&server),
		ClientConfig::new().with_request_timeout(Duration::from_millis(200)),
	)?;
	let err = client.get_keys().await.unwrap_err();

	assert!(matches!(err, Error::Transport { .. }), "unexpected error {err:?}");
	assert!(client.cached_keys().await.is_none());

	Ok(())
}

#[tokio::test]
async fn unreachable_endpoint_fails_with_transport_error() -> Result<()> {
	let addr = TcpListener::bind("127.0.0.1:0").expect("bind").local_addr().expect("local addr");
	let url = format!("http://{addr}{JWKS_PATH}");
	let client = RefreshCoordinator::new(url, ClientConfig::new().with_strict_tls(false))?;
	let err = client.get_keys().await.unwrap_err();

	assert!(matches!(err, Error::Transport { .. }), "unexpected error {err:?}");

	Ok(())
}
