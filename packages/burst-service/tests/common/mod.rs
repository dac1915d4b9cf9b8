#![allow(dead_code)]

use std::{
	sync::{
		Arc, Mutex,
		atomic::{AtomicBool, Ordering},
	},
	time::Duration,
};

use burst_domain::{Identity, keys};
use burst_service::{
	BoxFuture, BurstService, CoalescingCache, ExpiryStream, ListenerStats, MemoryCache,
	SearchWriter, Ttls,
};
use burst_storage::Error as StorageError;

pub const TTLS: Ttls = Ttls { head: Duration::from_secs(10), buffer: Duration::from_secs(3_600) };

#[derive(Default)]
pub struct RecordingWriter {
	records: Mutex<Vec<(Identity, String)>>,
	failing: AtomicBool,
}
impl RecordingWriter {
	pub fn records(&self) -> Vec<(Identity, String)> {
		self.records.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}

	pub fn queries(&self) -> Vec<String> {
		self.records().into_iter().map(|(_, query)| query).collect()
	}

	pub fn set_failing(&self, failing: bool) {
		self.failing.store(failing, Ordering::SeqCst);
	}
}
impl SearchWriter for RecordingWriter {
	fn write<'a>(
		&'a self,
		identity: &'a Identity,
		query: &'a str,
	) -> BoxFuture<'a, burst_storage::Result<()>> {
		let result = if self.failing.load(Ordering::SeqCst) {
			Err(StorageError::Unavailable("writer offline".to_string()))
		} else {
			self.records
				.lock()
				.unwrap_or_else(|err| err.into_inner())
				.push((identity.clone(), query.to_string()));

			Ok(())
		};

		Box::pin(async move { result })
	}
}

/// Memory cache with switchable failures per operation.
#[derive(Default)]
pub struct FlakyCache {
	pub inner: MemoryCache,
	fail_get: AtomicBool,
	fail_head_set: AtomicBool,
	fail_buffer_set: AtomicBool,
	fail_subscribe: AtomicBool,
}
impl FlakyCache {
	pub fn fail_get(&self, fail: bool) {
		self.fail_get.store(fail, Ordering::SeqCst);
	}

	pub fn fail_head_set(&self, fail: bool) {
		self.fail_head_set.store(fail, Ordering::SeqCst);
	}

	pub fn fail_buffer_set(&self, fail: bool) {
		self.fail_buffer_set.store(fail, Ordering::SeqCst);
	}

	pub fn fail_subscribe(&self, fail: bool) {
		self.fail_subscribe.store(fail, Ordering::SeqCst);
	}

	fn unavailable<T: Send + 'static>(operation: &str) -> BoxFuture<'static, burst_storage::Result<T>> {
		let err = StorageError::Unavailable(format!("{operation} refused"));

		Box::pin(async move { Err(err) })
	}
}
impl CoalescingCache for FlakyCache {
	fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, burst_storage::Result<Option<String>>> {
		if self.fail_get.load(Ordering::SeqCst) {
			return Self::unavailable("get");
		}

		self.inner.get(key)
	}

	fn set<'a>(
		&'a self,
		key: &'a str,
		value: &'a str,
		ttl: Duration,
	) -> BoxFuture<'a, burst_storage::Result<()>> {
		if key.starts_with(keys::HEAD_PREFIX) && self.fail_head_set.load(Ordering::SeqCst) {
			return Self::unavailable("head set");
		}
		if key.starts_with(keys::BUFFER_PREFIX) && self.fail_buffer_set.load(Ordering::SeqCst) {
			return Self::unavailable("buffer set");
		}

		self.inner.set(key, value, ttl)
	}

	fn delete<'a>(&'a self, key: &'a str) -> BoxFuture<'a, burst_storage::Result<()>> {
		self.inner.delete(key)
	}

	fn subscribe_expiry<'a>(
		&'a self,
		prefix: &'a str,
	) -> BoxFuture<'a, burst_storage::Result<ExpiryStream>> {
		if self.fail_subscribe.load(Ordering::SeqCst) {
			return Self::unavailable("subscribe");
		}

		self.inner.subscribe_expiry(prefix)
	}
}

pub fn memory_service() -> (BurstService, Arc<MemoryCache>, Arc<RecordingWriter>) {
	let cache = Arc::new(MemoryCache::new());
	let writer = Arc::new(RecordingWriter::default());
	let service = BurstService::new(TTLS, cache.clone(), writer.clone());

	(service, cache, writer)
}

pub fn flaky_service() -> (BurstService, Arc<FlakyCache>, Arc<RecordingWriter>) {
	let cache = Arc::new(FlakyCache::default());
	let writer = Arc::new(RecordingWriter::default());
	let service = BurstService::new(TTLS, cache.clone(), writer.clone());

	(service, cache, writer)
}

pub fn head(cache: &MemoryCache, identity: &Identity) -> Option<String> {
	cache.peek(&keys::head_key(identity.as_key()))
}

pub fn buffer(cache: &MemoryCache, identity: &Identity) -> Option<String> {
	cache.peek(&keys::buffer_key(identity.as_key()))
}

/// Yields to the runtime until the listener has processed `count` notifications.
pub async fn wait_for_processed(stats: &ListenerStats, count: u64) {
	for _ in 0..10_000 {
		if stats.processed() >= count {
			return;
		}

		tokio::task::yield_now().await;
	}

	panic!("Listener processed {} notifications, expected {count}.", stats.processed());
}
