//! Async JWKS client that fetches a remote key set, caches it for a bounded time, and serves
//! signing keys by identifier with a single in-flight refresh.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod cache;
pub mod config;
pub mod http;
pub mod key;

mod error;
mod _prelude {
	pub use std::{sync::Arc, time::Duration};

	pub use chrono::{DateTime, TimeDelta, Utc};
	pub use tokio::time::Instant;

	pub use crate::{Error, Result};
}

pub use crate::{
	cache::{
		coordinator::{CacheSnapshot, RefreshCoordinator},
		entry::CacheEntry,
		store::KeyStore,
	},
	config::ClientConfig,
	error::{BoxError, Error, Result},
	http::transport::{HttpResponse, HttpTransport, Transport},
	key::{Key, KeySet},
};
