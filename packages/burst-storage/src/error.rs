#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Sqlx(#[from] sqlx::Error),
	#[error(transparent)]
	Redis(#[from] redis::RedisError),
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),
	/// For cache or writer implementations with no richer error to report, such as in-process
	/// doubles or backends that are not Redis or Postgres.
	#[error("Unavailable: {0}")]
	Unavailable(String),
}
