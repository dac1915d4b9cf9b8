use crate::{BoxFuture, SearchWriter};
use burst_domain::Identity;
use burst_storage::{db::Db, models::NewSearch, searches};

/// Writes completed searches to Postgres, one transaction per record.
#[derive(Clone)]
pub struct PgSearchWriter {
	db: Db,
}
impl PgSearchWriter {
	pub fn new(db: Db) -> Self {
		Self { db }
	}

	pub async fn insert(&self, identity: &Identity, query: &str) -> burst_storage::Result<()> {
		if query.is_empty() {
			tracing::debug!(identity = %identity, "Empty search skipped.");

			return Ok(());
		}

		let search =
			NewSearch { user_id: identity.user_id(), anon_id: identity.anon_id(), search_text: query };
		// Dropping the transaction on any early return rolls it back.
		let mut tx = self.db.pool.begin().await?;

		searches::insert_search(&mut *tx, &search).await?;

		tx.commit().await?;

		tracing::debug!(identity = %identity, query, "Search persisted.");

		Ok(())
	}
}
impl SearchWriter for PgSearchWriter {
	fn write<'a>(
		&'a self,
		identity: &'a Identity,
		query: &'a str,
	) -> BoxFuture<'a, burst_storage::Result<()>> {
		Box::pin(self.insert(identity, query))
	}
}
