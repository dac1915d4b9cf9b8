use std::{
	collections::HashMap,
	sync::{Arc, Mutex, MutexGuard},
	time::Duration,
};

use futures::stream;
use tokio::{
	sync::mpsc::{self, UnboundedSender},
	task::JoinHandle,
	time::{self, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::{BoxFuture, CoalescingCache, ExpiryStream};
use burst_storage::cache::RedisCache;

impl CoalescingCache for RedisCache {
	fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, burst_storage::Result<Option<String>>> {
		Box::pin(RedisCache::get(self, key))
	}

	fn set<'a>(
		&'a self,
		key: &'a str,
		value: &'a str,
		ttl: Duration,
	) -> BoxFuture<'a, burst_storage::Result<()>> {
		Box::pin(RedisCache::set(self, key, value, ttl))
	}

	fn delete<'a>(&'a self, key: &'a str) -> BoxFuture<'a, burst_storage::Result<()>> {
		Box::pin(RedisCache::delete(self, key))
	}

	fn subscribe_expiry<'a>(
		&'a self,
		prefix: &'a str,
	) -> BoxFuture<'a, burst_storage::Result<ExpiryStream>> {
		Box::pin(async move {
			let stream = self.subscribe_expired(prefix).await?;

			Ok(Box::pin(stream) as ExpiryStream)
		})
	}
}

/// In-process cache with per-key expiry and expiration notifications.
///
/// Expired entries disappear on read (lazy expiry) or on [`MemoryCache::sweep`], and either path
/// notifies subscribers. Nothing sweeps on its own: callers either sweep explicitly or run
/// [`MemoryCache::spawn_sweeper`]. Without active expiry, a head that expires while idle is only
/// noticed by the next submit, which then starts a new burst and overwrites the buffer before the
/// listener reads it. Time follows the tokio clock, so a paused runtime controls expiry
/// deterministically.
#[derive(Default)]
pub struct MemoryCache {
	state: Mutex<MemoryState>,
}
impl MemoryCache {
	pub fn new() -> Self {
		Self::default()
	}

	/// Current value without triggering expiry.
	pub fn peek(&self, key: &str) -> Option<String> {
		self.lock().entries.get(key).map(|entry| entry.value.clone())
	}

	/// TTL the key was last set with.
	pub fn ttl(&self, key: &str) -> Option<Duration> {
		self.lock().entries.get(key).map(|entry| entry.ttl)
	}

	pub fn len(&self) -> usize {
		self.lock().entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Removes every entry whose deadline has passed and notifies subscribers. Returns the count.
	pub fn sweep(&self) -> usize {
		let now = Instant::now();
		let mut state = self.lock();
		let expired = state
			.entries
			.iter()
			.filter(|(_, entry)| entry.expires_at <= now)
			.map(|(key, _)| key.clone())
			.collect::<Vec<_>>();

		for key in &expired {
			state.entries.remove(key);
			state.notify(key);
		}

		expired.len()
	}

	/// Sweeps every `period` until `cancel` fires.
	pub fn spawn_sweeper(
		self: Arc<Self>,
		period: Duration,
		cancel: CancellationToken,
	) -> JoinHandle<()> {
		let mut interval = time::interval(period.max(Duration::from_millis(1)));

		interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

		tokio::spawn(async move {
			loop {
				tokio::select! {
					biased;
					_ = cancel.cancelled() => return,
					_ = interval.tick() => {
						self.sweep();
					},
				}
			}
		})
	}

	/// Expires `key` immediately. Returns whether it existed.
	pub fn expire(&self, key: &str) -> bool {
		let mut state = self.lock();

		if state.entries.remove(key).is_none() {
			return false;
		}

		state.notify(key);

		true
	}

	/// Delivers an expiration notification for `key` without touching its entry.
	pub fn publish_expired(&self, key: &str) {
		self.lock().notify(key);
	}

	fn lock(&self) -> MutexGuard<'_, MemoryState> {
		self.state.lock().unwrap_or_else(|err| err.into_inner())
	}

	fn get_now(&self, key: &str) -> Option<String> {
		let mut state = self.lock();
		let entry = state.entries.get(key)?;

		if entry.expires_at > Instant::now() {
			return Some(entry.value.clone());
		}

		state.entries.remove(key);
		state.notify(key);

		None
	}
}
impl CoalescingCache for MemoryCache {
	fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, burst_storage::Result<Option<String>>> {
		let value = self.get_now(key);

		Box::pin(async move { Ok(value) })
	}

	fn set<'a>(
		&'a self,
		key: &'a str,
		value: &'a str,
		ttl: Duration,
	) -> BoxFuture<'a, burst_storage::Result<()>> {
		let entry = MemoryEntry { value: value.to_string(), ttl, expires_at: Instant::now() + ttl };

		self.lock().entries.insert(key.to_string(), entry);

		Box::pin(async { Ok(()) })
	}

	fn delete<'a>(&'a self, key: &'a str) -> BoxFuture<'a, burst_storage::Result<()>> {
		self.lock().entries.remove(key);

		Box::pin(async { Ok(()) })
	}

	fn subscribe_expiry<'a>(
		&'a self,
		prefix: &'a str,
	) -> BoxFuture<'a, burst_storage::Result<ExpiryStream>> {
		let (tx, rx) = mpsc::unbounded_channel();

		self.lock().subscribers.push(Subscriber { prefix: prefix.to_string(), tx });

		let stream = stream::unfold(rx, |mut rx| async move { rx.recv().await.map(|key| (key, rx)) });

		Box::pin(async move { Ok(Box::pin(stream) as ExpiryStream) })
	}
}

#[derive(Default)]
struct MemoryState {
	entries: HashMap<String, MemoryEntry>,
	subscribers: Vec<Subscriber>,
}
impl MemoryState {
	fn notify(&mut self, key: &str) {
		self.subscribers.retain(|subscriber| !subscriber.tx.is_closed());

		for subscriber in &self.subscribers {
			if key.starts_with(&subscriber.prefix) {
				let _ = subscriber.tx.send(key.to_string());
			}
		}
	}
}

struct MemoryEntry {
	value: String,
	ttl: Duration,
	expires_at: Instant,
}

struct Subscriber {
	prefix: String,
	tx: UnboundedSender<String>,
}
