//! Cache entry pairing a key set with its expiration.

// self
use crate::{_prelude::*, key::KeySet};

/// A fetched key set and the instant it stops being authoritative.
///
/// The fields are only ever replaced together, by installing a new entry.
#[derive(Clone, Debug)]
pub struct CacheEntry {
	keys: Arc<KeySet>,
	expires_at: Instant,
	fetched_at: DateTime<Utc>,
	expires_at_wallclock: DateTime<Utc>,
}
impl CacheEntry {
	/// Create an entry fetched now and expiring at `expires_at`.
	pub fn new(keys: Arc<KeySet>, expires_at: Instant) -> Self {
		let now = Instant::now();
		let fetched_at = Utc::now();
		let expires_at_wallclock = match expires_at.checked_duration_since(now) {
			Some(remaining) => TimeDelta::from_std(remaining)
				.ok()
				.and_then(|delta| fetched_at.checked_add_signed(delta))
				.unwrap_or(DateTime::<Utc>::MAX_UTC),
			None => fetched_at,
		};

		Self { keys, expires_at, fetched_at, expires_at_wallclock }
	}

	/// Cached key set.
	pub fn keys(&self) -> &Arc<KeySet> {
		&self.keys
	}

	/// Monotonic expiration instant.
	pub fn expires_at(&self) -> Instant {
		self.expires_at
	}

	/// Wall-clock time the key set was installed.
	pub fn fetched_at(&self) -> DateTime<Utc> {
		self.fetched_at
	}

	/// Wall-clock approximation of [`CacheEntry::expires_at`].
	pub fn expires_at_wallclock(&self) -> DateTime<Utc> {
		self.expires_at_wallclock
	}

	/// Whether the entry has reached its expiration.
	pub fn is_expired(&self, now: Instant) -> bool {
		now >= self.expires_at
	}
}
