pub mod cache;
pub mod flush;
pub mod listener;
pub mod submit;
pub mod writer;

mod error;

pub use cache::MemoryCache;
pub use error::{Error, Result};
pub use flush::{FlushOutcome, FlushRequest, FlushResponse};
pub use listener::{ExpiryListener, ExpiryOutcome, ListenerHandle, ListenerState, ListenerStats};
pub use submit::{LogSearchRequest, SubmitOutcome};
pub use writer::PgSearchWriter;

use std::{future::Future, pin::Pin, sync::Arc, time::Duration};

use futures::Stream;

use burst_domain::Identity;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Names of expired keys, in delivery order.
pub type ExpiryStream = Pin<Box<dyn Stream<Item = String> + Send>>;

/// Keyed store with per-key expiry, used as the debounce state for every identity.
pub trait CoalescingCache
where
	Self: Send + Sync,
{
	fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, burst_storage::Result<Option<String>>>;

	fn set<'a>(
		&'a self,
		key: &'a str,
		value: &'a str,
		ttl: Duration,
	) -> BoxFuture<'a, burst_storage::Result<()>>;

	fn delete<'a>(&'a self, key: &'a str) -> BoxFuture<'a, burst_storage::Result<()>>;

	/// Subscribes to expirations of keys that start with `prefix`.
	fn subscribe_expiry<'a>(
		&'a self,
		prefix: &'a str,
	) -> BoxFuture<'a, burst_storage::Result<ExpiryStream>>;
}

/// Appends one completed search. Not idempotent: two calls write two records.
pub trait SearchWriter
where
	Self: Send + Sync,
{
	fn write<'a>(
		&'a self,
		identity: &'a Identity,
		query: &'a str,
	) -> BoxFuture<'a, burst_storage::Result<()>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ttls {
	pub head: Duration,
	pub buffer: Duration,
}
impl From<&burst_config::Coalescing> for Ttls {
	fn from(cfg: &burst_config::Coalescing) -> Self {
		Self { head: cfg.head_ttl(), buffer: cfg.buffer_ttl() }
	}
}

/// Coalesces per-identity query updates into one durable record per burst.
///
/// No in-process state is shared between calls. Concurrent submits for one identity may
/// interleave their read and write steps; the resulting duplicate or stale flush is accepted.
#[derive(Clone)]
pub struct BurstService {
	pub ttls: Ttls,
	pub cache: Arc<dyn CoalescingCache>,
	pub writer: Arc<dyn SearchWriter>,
}
impl BurstService {
	pub fn new(ttls: Ttls, cache: Arc<dyn CoalescingCache>, writer: Arc<dyn SearchWriter>) -> Self {
		Self { ttls, cache, writer }
	}

	pub fn listener(&self) -> ExpiryListener {
		ExpiryListener::new(self.cache.clone(), self.writer.clone())
	}
}
