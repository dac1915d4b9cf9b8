use time::OffsetDateTime;

#[derive(Debug, sqlx::FromRow)]
pub struct UserSearch {
	pub user_id: Option<String>,
	pub search_text: String,
	pub last_searched_at: OffsetDateTime,
	pub anon_id: Option<String>,
}

/// A completed search ready to persist. Exactly one of `user_id` and `anon_id` is set.
#[derive(Debug, Clone, Copy)]
pub struct NewSearch<'a> {
	pub user_id: Option<&'a str>,
	pub anon_id: Option<&'a str>,
	pub search_text: &'a str,
}
