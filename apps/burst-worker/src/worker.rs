use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use burst_service::{ExpiryListener, ListenerStats, Result};

/// Runs `listener` until `cancel` fires. Returns the final counters.
///
/// Subscription failures and a closed notification stream are returned so the process exits
/// non-zero and its supervisor can restart it.
pub async fn run_listener(
	listener: ExpiryListener,
	cancel: CancellationToken,
) -> Result<Arc<ListenerStats>> {
	let handle = listener.start(cancel).await?;
	let stats = handle.stats();

	tracing::info!("Expiry worker started.");

	let result = handle.join().await;

	tracing::info!(
		processed = stats.processed(),
		flushed = stats.flushed(),
		skipped = stats.skipped(),
		failed = stats.failed(),
		"Expiry worker stopped."
	);

	result.map(|()| stats)
}
