use serde::{Deserialize, Serialize};

use crate::{BurstService, CoalescingCache, Error, Result, SearchWriter};
use burst_domain::{Identity, keys};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FlushRequest {
	#[serde(default)]
	pub user_id: Option<String>,
	#[serde(default)]
	pub user_agent: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FlushResponse {
	pub identity: String,
	pub flushed: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FlushOutcome {
	Flushed { query: String },
	/// No buffered value: never populated or already flushed.
	Empty,
}

impl BurstService {
	pub async fn flush_request(&self, req: &FlushRequest) -> Result<FlushResponse> {
		let identity =
			Identity::resolve(req.user_id.as_deref(), req.user_agent.as_deref().unwrap_or_default());
		let flushed = match self.flush(&identity).await? {
			FlushOutcome::Flushed { query } => Some(query),
			FlushOutcome::Empty => None,
		};

		Ok(FlushResponse { identity: identity.as_key().to_string(), flushed })
	}

	/// Ends the active burst of `identity` now instead of waiting for its head to expire.
	pub async fn flush(&self, identity: &Identity) -> Result<FlushOutcome> {
		let outcome = flush_buffer(self.cache.as_ref(), self.writer.as_ref(), identity).await?;

		if matches!(outcome, FlushOutcome::Flushed { .. }) {
			let key = identity.as_key();

			// A surviving head would let the next unrelated query flush the same value again.
			self.cache
				.delete(&keys::head_key(key))
				.await
				.map_err(|err| Error::cache(key, "delete", err))?;
		}

		Ok(outcome)
	}
}

/// Persists the buffered value of `identity`, then clears the buffer.
///
/// A failed write leaves the buffer in place. A failed delete after a successful write is only
/// logged; the record is already durable and a later flush may repeat it.
pub(crate) async fn flush_buffer(
	cache: &dyn CoalescingCache,
	writer: &dyn SearchWriter,
	identity: &Identity,
) -> Result<FlushOutcome> {
	let key = identity.as_key();
	let buffer_key = keys::buffer_key(key);
	let Some(query) = cache
		.get(&buffer_key)
		.await
		.map_err(|err| Error::cache(key, "get", err))?
		.filter(|query| !query.is_empty())
	else {
		return Ok(FlushOutcome::Empty);
	};

	writer.write(identity, &query).await.map_err(|err| Error::storage(key, err))?;

	if let Err(err) = cache.delete(&buffer_key).await {
		tracing::warn!(identity = %identity, error = %err, "Failed to clear flushed buffer.");
	}

	tracing::info!(identity = %identity, query = %query, "Buffered search flushed.");

	Ok(FlushOutcome::Flushed { query })
}
