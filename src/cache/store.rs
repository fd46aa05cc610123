//! Holder for the single cache entry slot.

// self
use crate::{_prelude::*, cache::entry::CacheEntry, key::KeySet};

/// Last successfully fetched key set and its expiration.
///
/// A pure data holder: it never performs I/O and has no error conditions.
#[derive(Clone, Debug, Default)]
pub struct KeyStore {
	entry: Option<CacheEntry>,
}
impl KeyStore {
	/// Create an empty store.
	pub fn new() -> Self {
		Self::default()
	}

	/// True when nothing has been stored yet or the stored entry has expired.
	pub fn is_stale(&self, now: Instant) -> bool {
		self.entry.as_ref().is_none_or(|entry| entry.is_expired(now))
	}

	/// Last stored key set, stale or not.
	pub fn current(&self) -> Option<Arc<KeySet>> {
		self.entry.as_ref().map(|entry| entry.keys().clone())
	}

	/// Stored key set if it is still fresh at `now`.
	pub fn fresh(&self, now: Instant) -> Option<Arc<KeySet>> {
		self.entry.as_ref().filter(|entry| !entry.is_expired(now)).map(|entry| entry.keys().clone())
	}

	/// Install a new entry, discarding the previous one.
	pub fn replace(&mut self, keys: Arc<KeySet>, expires_at: Instant) {
		self.entry = Some(CacheEntry::new(keys, expires_at));
	}

	/// Stored entry, if any.
	pub fn entry(&self) -> Option<&CacheEntry> {
		self.entry.as_ref()
	}
}
