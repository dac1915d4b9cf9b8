use std::sync::{
	Arc,
	atomic::{AtomicU64, Ordering},
};

use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::{CoalescingCache, Error, ExpiryStream, FlushOutcome, Result, SearchWriter, flush};
use burst_domain::{Identity, keys};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
	Running,
	Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryOutcome {
	Flushed,
	/// Foreign key, unreadable buffer, or nothing buffered.
	Skipped,
	/// The write failed; the buffer is left for a later flush.
	Failed,
}

#[derive(Debug, Default)]
pub struct ListenerStats {
	processed: AtomicU64,
	flushed: AtomicU64,
	skipped: AtomicU64,
	failed: AtomicU64,
}
impl ListenerStats {
	pub fn processed(&self) -> u64 {
		self.processed.load(Ordering::SeqCst)
	}

	pub fn flushed(&self) -> u64 {
		self.flushed.load(Ordering::SeqCst)
	}

	pub fn skipped(&self) -> u64 {
		self.skipped.load(Ordering::SeqCst)
	}

	pub fn failed(&self) -> u64 {
		self.failed.load(Ordering::SeqCst)
	}

	fn record(&self, outcome: ExpiryOutcome) {
		let counter = match outcome {
			ExpiryOutcome::Flushed => &self.flushed,
			ExpiryOutcome::Skipped => &self.skipped,
			ExpiryOutcome::Failed => &self.failed,
		};

		counter.fetch_add(1, Ordering::SeqCst);
		self.processed.fetch_add(1, Ordering::SeqCst);
	}
}

/// Flushes bursts that ended by inactivity, driven by head-key expirations.
#[derive(Clone)]
pub struct ExpiryListener {
	cache: Arc<dyn CoalescingCache>,
	writer: Arc<dyn SearchWriter>,
}
impl ExpiryListener {
	pub fn new(cache: Arc<dyn CoalescingCache>, writer: Arc<dyn SearchWriter>) -> Self {
		Self { cache, writer }
	}

	/// Subscribes to head expirations and spawns the consume loop.
	///
	/// Failing to subscribe is returned here and never retried.
	pub async fn start(self, cancel: CancellationToken) -> Result<ListenerHandle> {
		let stream = self
			.cache
			.subscribe_expiry(keys::HEAD_PREFIX)
			.await
			.map_err(|err| Error::Subscription { message: err.to_string() })?;
		let stats = Arc::new(ListenerStats::default());

		tracing::info!(prefix = keys::HEAD_PREFIX, "Expiry listener subscribed.");

		let task = tokio::spawn(self.run(stream, cancel.clone(), stats.clone()));

		Ok(ListenerHandle { cancel, task, stats })
	}

	/// Handles one expired key. Never fails; problems are logged and counted.
	pub async fn handle_expired(&self, expired_key: &str) -> ExpiryOutcome {
		let Some(key) = keys::identity_from_head_key(expired_key) else {
			tracing::debug!(key = expired_key, "Ignoring expiration outside the head namespace.");

			return ExpiryOutcome::Skipped;
		};
		let identity = Identity::from_key(key);

		match flush::flush_buffer(self.cache.as_ref(), self.writer.as_ref(), &identity).await {
			Ok(FlushOutcome::Flushed { .. }) => ExpiryOutcome::Flushed,
			Ok(FlushOutcome::Empty) => {
				tracing::debug!(identity = %identity, "No buffered search to flush.");

				ExpiryOutcome::Skipped
			},
			Err(err @ Error::Cache { .. }) => {
				tracing::warn!(identity = %identity, error = %err, "Could not read buffered search.");

				ExpiryOutcome::Skipped
			},
			Err(err) => {
				tracing::error!(identity = %identity, error = %err, "Expiry flush failed.");

				ExpiryOutcome::Failed
			},
		}
	}

	async fn run(
		self,
		mut stream: ExpiryStream,
		cancel: CancellationToken,
		stats: Arc<ListenerStats>,
	) -> Result<()> {
		loop {
			// Cancellation is only observed between notifications so an in-flight flush completes.
			let expired_key = tokio::select! {
				biased;
				_ = cancel.cancelled() => {
					tracing::info!("Stopping expiry listener.");

					return Ok(());
				},
				next = stream.next() => match next {
					Some(expired_key) => expired_key,
					None => {
						tracing::error!("Expiry notification stream closed.");

						return Err(Error::SubscriptionClosed);
					},
				},
			};
			let outcome = self.handle_expired(&expired_key).await;

			stats.record(outcome);
		}
	}
}

pub struct ListenerHandle {
	cancel: CancellationToken,
	task: JoinHandle<Result<()>>,
	stats: Arc<ListenerStats>,
}
impl ListenerHandle {
	pub fn stats(&self) -> Arc<ListenerStats> {
		self.stats.clone()
	}

	pub fn state(&self) -> ListenerState {
		if self.task.is_finished() { ListenerState::Stopped } else { ListenerState::Running }
	}

	pub fn cancel(&self) {
		self.cancel.cancel();
	}

	/// Waits for the consume loop to end on its own or through the cancellation token.
	pub async fn join(self) -> Result<()> {
		self.task.await.map_err(|err| Error::Listener { message: err.to_string() })?
	}

	pub async fn shutdown(self) -> Result<()> {
		self.cancel();
		self.join().await
	}
}
