pub mod worker;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use burst_cli::Args;
use burst_service::{ExpiryListener, PgSearchWriter};
use burst_storage::{cache::RedisCache, db::Db};

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = burst_config::load(&args.config)?;

	burst_cli::init_tracing(&config.service.log_level);

	let db = Db::connect(&config.storage.postgres).await?;

	db.ensure_schema().await?;

	let cache = RedisCache::connect(&config.storage.redis).await?;

	if config.listener.configure_notifications {
		cache.configure_notifications().await?;

		tracing::info!("Redis expired-key notifications enabled.");
	}

	let listener = ExpiryListener::new(Arc::new(cache), Arc::new(PgSearchWriter::new(db)));
	let cancel = CancellationToken::new();

	tokio::spawn({
		let cancel = cancel.clone();

		async move {
			burst_cli::shutdown_signal().await;
			cancel.cancel();
		}
	});

	worker::run_listener(listener, cancel).await?;

	Ok(())
}
