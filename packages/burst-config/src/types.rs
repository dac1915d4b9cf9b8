use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	#[serde(default)]
	pub coalescing: Coalescing,
	#[serde(default)]
	pub listener: Listener,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub admin_bind: String,
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
	pub redis: Redis,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Deserialize)]
pub struct Redis {
	/// The database index in the url also selects the keyevent channel for expirations.
	pub url: String,
}

/// Debounce windows. The head TTL decides when a pause ends a burst; the buffer TTL bounds how
/// long the final value waits for the expiry listener.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Coalescing {
	pub head_ttl_ms: u64,
	pub buffer_ttl_ms: u64,
}
impl Coalescing {
	pub fn head_ttl(&self) -> Duration {
		Duration::from_millis(self.head_ttl_ms)
	}

	pub fn buffer_ttl(&self) -> Duration {
		Duration::from_millis(self.buffer_ttl_ms)
	}
}
impl Default for Coalescing {
	fn default() -> Self {
		Self { head_ttl_ms: 10_000, buffer_ttl_ms: 3_600_000 }
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Listener {
	pub enabled: bool,
	/// Issue `CONFIG SET notify-keyspace-events Ex` before subscribing.
	pub configure_notifications: bool,
}
impl Default for Listener {
	fn default() -> Self {
		Self { enabled: true, configure_notifications: false }
	}
}
