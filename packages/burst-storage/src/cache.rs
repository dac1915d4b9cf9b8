use std::time::Duration;

use futures::{Stream, StreamExt, future};
use redis::{AsyncCommands, Client, aio::ConnectionManager};

use crate::Result;

/// Redis-backed key/value store with per-key expiry.
#[derive(Clone)]
pub struct RedisCache {
	client: Client,
	conn: ConnectionManager,
	database: i64,
}
impl RedisCache {
	pub async fn connect(cfg: &burst_config::Redis) -> Result<Self> {
		let client = Client::open(cfg.url.as_str())?;
		let conn = ConnectionManager::new(client.clone()).await?;
		let database = client.get_connection_info().redis.db;

		Ok(Self { client, conn, database })
	}

	pub async fn get(&self, key: &str) -> Result<Option<String>> {
		let mut conn = self.conn.clone();
		let value: Option<String> = conn.get(key).await?;

		Ok(value)
	}

	pub async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
		let mut conn = self.conn.clone();
		let millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1);
		let _: () = conn.pset_ex(key, value, millis).await?;

		Ok(())
	}

	pub async fn delete(&self, key: &str) -> Result<()> {
		let mut conn = self.conn.clone();
		let _: i64 = conn.del(key).await?;

		Ok(())
	}

	/// Enables expired-key events on the server. Replaces any previous `notify-keyspace-events`.
	pub async fn configure_notifications(&self) -> Result<()> {
		let mut conn = self.conn.clone();
		let _: () = redis::cmd("CONFIG")
			.arg("SET")
			.arg("notify-keyspace-events")
			.arg("Ex")
			.query_async(&mut conn)
			.await?;

		Ok(())
	}

	/// Keyevent channel of the database selected by the connection url.
	pub fn expired_channel(&self) -> String {
		expired_channel(self.database)
	}

	/// Streams names of expired keys that start with `prefix`.
	///
	/// Delivery is at most once per expiration. The stream ends when the connection drops.
	pub async fn subscribe_expired(
		&self,
		prefix: &str,
	) -> Result<impl Stream<Item = String> + Send + 'static> {
		let mut pubsub = self.client.get_async_pubsub().await?;

		pubsub.psubscribe(self.expired_channel()).await?;

		let prefix = prefix.to_string();
		let stream = pubsub.into_on_message().filter_map(move |msg| {
			let key = msg.get_payload::<String>().ok().filter(|key| key.starts_with(&prefix));

			future::ready(key)
		});

		Ok(stream)
	}
}
impl std::fmt::Debug for RedisCache {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RedisCache").field("database", &self.database).finish_non_exhaustive()
	}
}

fn expired_channel(database: i64) -> String {
	format!("__keyevent@{database}__:expired")
}

#[cfg(test)]
mod tests {
	use redis::Client;

	use super::expired_channel;

	#[test]
	fn channel_follows_the_url_database() {
		for (url, channel) in [
			("redis://127.0.0.1:6379/3", "__keyevent@3__:expired"),
			("redis://127.0.0.1:6379", "__keyevent@0__:expired"),
		] {
			let client = Client::open(url).expect("Url should parse.");

			assert_eq!(expired_channel(client.get_connection_info().redis.db), channel);
		}
	}
}
