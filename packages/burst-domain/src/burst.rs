/// Outcome of comparing a new normalized query against the current head of its burst.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision<'a> {
	/// Empty query. Nothing is read or written.
	Ignore,
	/// No active head. The query opens a new burst.
	Start,
	/// Same burst: typing forward or backspacing.
	Extend,
	/// Unrelated query. `previous` is the final value of the burst being closed.
	Reset { previous: &'a str },
}

pub fn decide<'a>(head: Option<&'a str>, query: &str) -> Decision<'a> {
	if query.is_empty() {
		return Decision::Ignore;
	}

	match head {
		None | Some("") => Decision::Start,
		Some(head) if same_burst(head, query) => Decision::Extend,
		Some(previous) => Decision::Reset { previous },
	}
}

/// Bidirectional prefix relation between two normalized queries.
pub fn same_burst(head: &str, query: &str) -> bool {
	query.starts_with(head) || head.starts_with(query)
}
