pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Cache {operation} failed for {identity}: {message}")]
	Cache { identity: String, operation: &'static str, message: String },
	#[error("Cache update failed for {identity}: {message}")]
	CacheWrite { identity: String, message: String },
	#[error("Storage error for {identity}: {message}")]
	Storage { identity: String, message: String },
	#[error("Expiry subscription failed: {message}")]
	Subscription { message: String },
	#[error("Expiry subscription closed.")]
	SubscriptionClosed,
	#[error("Expiry listener task failed: {message}")]
	Listener { message: String },
}
impl Error {
	pub(crate) fn cache(identity: &str, operation: &'static str, err: burst_storage::Error) -> Self {
		Self::Cache { identity: identity.to_string(), operation, message: err.to_string() }
	}

	pub(crate) fn storage(identity: &str, err: burst_storage::Error) -> Self {
		Self::Storage { identity: identity.to_string(), message: err.to_string() }
	}
}
