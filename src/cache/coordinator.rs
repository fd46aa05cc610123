//! Refresh coordinator handling key set retrieval and cache lifecycle.

// std
use std::any::Any;
// crates.io
use tokio::sync::{Mutex, RwLock};
use url::Url;
// self
use crate::{
	_prelude::*,
	cache::{entry::CacheEntry, store::KeyStore},
	config::ClientConfig,
	http::{
		client::fetch_keys,
		transport::{HttpTransport, Transport},
	},
	key::{Key, KeySet},
};

/// Expiration used when `now + cache_timeout` overflows the clock.
const FAR_FUTURE: Duration = Duration::from_secs(60 * 60 * 24 * 365 * 30);

/// Serves cached key sets and performs the single in-flight refresh.
///
/// Readers of a fresh entry only take the shared side of the store lock. A stale read queues on
/// the single-flight guard, re-checks the store once it holds the guard, and only then fetches;
/// the store's write lock is held just long enough to swap in the new entry. Failed fetches never
/// touch the store.
#[derive(Debug)]
pub struct RefreshCoordinator<T = HttpTransport> {
	endpoint: Arc<Url>,
	config: Arc<ClientConfig>,
	transport: Arc<T>,
	store: Arc<RwLock<KeyStore>>,
	single_flight: Arc<Mutex<()>>,
}
impl RefreshCoordinator<HttpTransport> {
	/// Build a coordinator with its own reqwest-backed transport.
	pub fn new(endpoint: impl AsRef<str>, config: ClientConfig) -> Result<Self> {
		config.validate()?;

		let transport = HttpTransport::new(&config)?;

		Self::with_transport(endpoint, config, transport)
	}
}
impl<T> RefreshCoordinator<T>
where
	T: Transport,
{
	/// Build a coordinator around the supplied transport.
	pub fn with_transport(
		endpoint: impl AsRef<str>,
		config: ClientConfig,
		transport: T,
	) -> Result<Self> {
		config.validate()?;

		let endpoint = Url::parse(endpoint.as_ref())?;

		Ok(Self {
			endpoint: Arc::new(endpoint),
			config: Arc::new(config),
			transport: Arc::new(transport),
			store: Arc::new(RwLock::new(KeyStore::new())),
			single_flight: Arc::new(Mutex::new(())),
		})
	}

	/// Key set endpoint this coordinator fetches from.
	pub fn endpoint(&self) -> &Url {
		&self.endpoint
	}

	/// Configuration in effect.
	pub fn config(&self) -> &ClientConfig {
		&self.config
	}

	/// Return the cached key set, refreshing it first when stale.
	#[tracing::instrument(skip(self), fields(endpoint = %self.endpoint))]
	pub async fn get_keys(&self) -> Result<Arc<KeySet>> {
		let fresh = { self.store.read().await.fresh(Instant::now()) };

		if let Some(keys) = fresh {
			return Ok(keys);
		}

		self.refresh_blocking().await
	}

	/// Look up the signing key published last under `kid`.
	///
	/// `Ok(None)` means the key set was obtained but holds no such signing key.
	#[tracing::instrument(skip(self), fields(endpoint = %self.endpoint))]
	pub async fn get_signing_key(&self, kid: &str) -> Result<Option<Key>> {
		let keys = self.get_keys().await?;

		Ok(keys.signing_key(kid).cloned())
	}

	/// Refresh the key set if it is stale; a no-op while the cached entry is fresh.
	#[tracing::instrument(skip(self), fields(endpoint = %self.endpoint))]
	pub async fn refresh(&self) -> Result<()> {
		self.refresh_blocking().await.map(|_| ())
	}

	/// Last stored key set without fetching, even when stale.
	pub async fn cached_keys(&self) -> Option<Arc<KeySet>> {
		self.store.read().await.current()
	}

	/// Wall-clock expiration of the stored key set, if any.
	pub async fn expiration(&self) -> Option<DateTime<Utc>> {
		self.store.read().await.entry().map(CacheEntry::expires_at_wallclock)
	}

	/// Capture the current cache state for status reporting.
	pub async fn snapshot(&self) -> CacheSnapshot {
		let now = Instant::now();
		let captured_at = Utc::now();
		let store = self.store.read().await;
		let entry = store.entry();

		CacheSnapshot {
			captured_at,
			keys: entry.map(|entry| entry.keys().clone()),
			fetched_at: entry.map(CacheEntry::fetched_at),
			expires_at: entry.map(CacheEntry::expires_at_wallclock),
			stale: store.is_stale(now),
		}
	}

	async fn refresh_blocking(&self) -> Result<Arc<KeySet>> {
		let _guard = self.single_flight.lock().await;
		let fresh = { self.store.read().await.fresh(Instant::now()) };

		if let Some(keys) = fresh {
			tracing::trace!("key set already fresh; skipping fetch");

			return Ok(keys);
		}

		self.observe_fetch_started();

		let keys = match self.fetch().await {
			Ok(keys) => Arc::new(keys),
			Err(err) => {
				self.observe_fetch_failed(&err);

				return Err(err);
			},
		};
		let now = Instant::now();
		let expires_at =
			now.checked_add(self.config.cache_timeout).unwrap_or_else(|| now + FAR_FUTURE);
		let expires_at_wallclock = {
			let mut store = self.store.write().await;

			store.replace(keys.clone(), expires_at);
			store.entry().map(CacheEntry::expires_at_wallclock)
		};

		self.observe_fetch_succeeded(keys.len(), expires_at_wallclock);

		Ok(keys)
	}

	async fn fetch(&self) -> Result<KeySet> {
		let transport = self.transport.clone();
		let endpoint = self.endpoint.clone();
		let config = self.config.clone();
		let task =
			tokio::spawn(async move { fetch_keys(transport.as_ref(), &endpoint, &config).await });

		match task.await {
			Ok(result) => result,
			Err(err) => {
				let reason =
					if err.is_panic() { panic_message(err.into_panic()) } else { err.to_string() };

				self.observe_recovered(&reason);

				Err(Error::Unexpected(reason))
			},
		}
	}

	fn observe_fetch_started(&self) {
		if self.config.debug_logging {
			tracing::debug!("begin fetch key set");
		}
	}

	fn observe_fetch_succeeded(&self, count: usize, expires_at: Option<DateTime<Utc>>) {
		if self.config.debug_logging {
			tracing::debug!(count, expires_at = ?expires_at, "fetched keys");
		}
	}

	fn observe_fetch_failed(&self, err: &Error) {
		if !self.config.error_logging {
			return;
		}

		match err {
			Error::HttpStatus { status, .. } => {
				tracing::warn!(
					status = status.as_u16(),
					"key set request returned non-success status"
				);
			},
			// Already reported when the task was recovered.
			Error::Unexpected(_) => {},
			err => tracing::warn!(error = %err, "key set fetch failed"),
		}
	}

	fn observe_recovered(&self, reason: &str) {
		if self.config.error_logging {
			tracing::error!(reason, "recovered from unexpected failure during key refresh");
		}
	}
}
impl<T> Clone for RefreshCoordinator<T> {
	fn clone(&self) -> Self {
		Self {
			endpoint: self.endpoint.clone(),
			config: self.config.clone(),
			transport: self.transport.clone(),
			store: self.store.clone(),
			single_flight: self.single_flight.clone(),
		}
	}
}

/// Snapshot of cache state captured for status reporting.
#[derive(Clone, Debug)]
pub struct CacheSnapshot {
	/// Wall-clock time the snapshot was taken.
	pub captured_at: DateTime<Utc>,
	/// Stored key set, if any.
	pub keys: Option<Arc<KeySet>>,
	/// When the stored key set was installed.
	pub fetched_at: Option<DateTime<Utc>>,
	/// When the stored key set expires.
	pub expires_at: Option<DateTime<Utc>>,
	/// Whether the next read will trigger a refresh.
	pub stale: bool,
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
	if let Some(message) = payload.downcast_ref::<&str>() {
		(*message).to_string()
	} else if let Some(message) = payload.downcast_ref::<String>() {
		message.clone()
	} else {
		"refresh task panicked".into()
	}
}
