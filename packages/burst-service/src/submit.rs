use serde::{Deserialize, Serialize};

use crate::{BurstService, Error, Result};
use burst_domain::{Decision, Identity, burst, keys, query};

/// One inbound keystroke update as delivered by the ingress layer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LogSearchRequest {
	pub user_id: Option<String>,
	/// Raw fingerprint source, usually the `User-Agent` header bytes.
	pub user_agent: Vec<u8>,
	pub query: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
	/// The query normalized to nothing. Cache and storage were not touched.
	Ignored,
	Started,
	Extended,
	/// The previous burst ended and its final value was persisted.
	Reset { flushed: String },
}

impl BurstService {
	pub async fn log_search(&self, req: &LogSearchRequest) -> Result<SubmitOutcome> {
		let normalized = query::normalize(&req.query);

		if normalized.is_empty() {
			tracing::debug!(user_id = ?req.user_id, "Empty query ignored.");

			return Ok(SubmitOutcome::Ignored);
		}

		let identity = Identity::resolve(req.user_id.as_deref(), &req.user_agent);

		self.submit(&identity, &normalized).await
	}

	/// Applies one normalized query to the burst of `identity`.
	///
	/// A failed reset flush returns before the cache is touched, so a retry attempts the same
	/// flush again.
	pub async fn submit(&self, identity: &Identity, normalized: &str) -> Result<SubmitOutcome> {
		if normalized.is_empty() {
			return Ok(SubmitOutcome::Ignored);
		}

		let key = identity.as_key();
		let head = self
			.cache
			.get(&keys::head_key(key))
			.await
			.map_err(|err| Error::cache(key, "get", err))?;
		let outcome = match burst::decide(head.as_deref(), normalized) {
			Decision::Ignore => return Ok(SubmitOutcome::Ignored),
			Decision::Start => SubmitOutcome::Started,
			Decision::Extend => SubmitOutcome::Extended,
			Decision::Reset { previous } => {
				tracing::info!(
					identity = %identity,
					previous,
					query = normalized,
					"Burst reset detected."
				);

				if let Err(err) = self.writer.write(identity, previous).await {
					tracing::error!(identity = %identity, error = %err, "Reset flush failed.");

					return Err(Error::storage(key, err));
				}

				SubmitOutcome::Reset { flushed: previous.to_string() }
			},
		};

		self.store(identity, normalized).await?;

		Ok(outcome)
	}

	async fn store(&self, identity: &Identity, normalized: &str) -> Result<()> {
		let key = identity.as_key();
		let head_key = keys::head_key(key);
		let buffer_key = keys::buffer_key(key);
		let (head, buffer) = tokio::join!(
			self.cache.set(&head_key, normalized, self.ttls.head),
			self.cache.set(&buffer_key, normalized, self.ttls.buffer),
		);
		let failures = [("head", head), ("buffer", buffer)]
			.into_iter()
			.filter_map(|(label, result)| result.err().map(|err| format!("{label}: {err}")))
			.collect::<Vec<_>>();

		if !failures.is_empty() {
			let message = failures.join("; ");

			tracing::error!(identity = %identity, error = %message, "Cache update failed.");

			return Err(Error::CacheWrite { identity: key.to_string(), message });
		}

		tracing::debug!(identity = %identity, "Burst head and buffer updated.");

		Ok(())
	}
}
