/// Canonical form used for prefix comparison and storage.
///
/// An empty result means the input carries no query and must be ignored.
pub fn normalize(raw: &str) -> String {
	raw.trim().to_lowercase()
}
