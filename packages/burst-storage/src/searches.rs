use sqlx::PgExecutor;

use crate::{
	Error, Result,
	models::{NewSearch, UserSearch},
};

pub async fn insert_search<'e, E>(executor: E, search: &NewSearch<'_>) -> Result<()>
where
	E: PgExecutor<'e>,
{
	if search.user_id.is_some() == search.anon_id.is_some() {
		return Err(Error::InvalidArgument(
			"A search record needs exactly one of user_id and anon_id.".to_string(),
		));
	}

	sqlx::query(
		"\
INSERT INTO user_searches (user_id, search_text, last_searched_at, anon_id)
VALUES ($1, $2, now(), $3)",
	)
	.bind(search.user_id)
	.bind(search.search_text)
	.bind(search.anon_id)
	.execute(executor)
	.await?;

	Ok(())
}

pub async fn list_searches_for_user<'e, E>(executor: E, user_id: &str) -> Result<Vec<UserSearch>>
where
	E: PgExecutor<'e>,
{
	let rows = sqlx::query_as::<_, UserSearch>(
		"\
SELECT user_id, search_text, last_searched_at, anon_id
FROM user_searches
WHERE user_id = $1
ORDER BY last_searched_at ASC",
	)
	.bind(user_id)
	.fetch_all(executor)
	.await?;

	Ok(rows)
}

pub async fn list_searches_for_anon<'e, E>(executor: E, anon_id: &str) -> Result<Vec<UserSearch>>
where
	E: PgExecutor<'e>,
{
	let rows = sqlx::query_as::<_, UserSearch>(
		"\
SELECT user_id, search_text, last_searched_at, anon_id
FROM user_searches
WHERE anon_id = $1
ORDER BY last_searched_at ASC",
	)
	.bind(anon_id)
	.fetch_all(executor)
	.await?;

	Ok(rows)
}
