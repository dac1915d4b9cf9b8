use std::sync::Arc;

use burst_config::Config;
use burst_service::{BurstService, PgSearchWriter, Ttls};
use burst_storage::{cache::RedisCache, db::Db};

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<BurstService>,
}
impl AppState {
	pub fn new(service: BurstService) -> Self {
		Self { service: Arc::new(service) }
	}

	/// Connects Postgres and Redis and bootstraps the schema.
	pub async fn connect(config: &Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema().await?;

		let cache = RedisCache::connect(&config.storage.redis).await?;

		if config.listener.configure_notifications {
			cache.configure_notifications().await?;

			tracing::info!("Redis expired-key notifications enabled.");
		}

		let service = BurstService::new(
			Ttls::from(&config.coalescing),
			Arc::new(cache),
			Arc::new(PgSearchWriter::new(db)),
		);

		Ok(Self::new(service))
	}
}
