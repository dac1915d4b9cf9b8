pub const HEAD_PREFIX: &str = "search:last:";
pub const BUFFER_PREFIX: &str = "search:buffer:";

pub fn head_key(identity: &str) -> String {
	format!("{HEAD_PREFIX}{identity}")
}

pub fn buffer_key(identity: &str) -> String {
	format!("{BUFFER_PREFIX}{identity}")
}

pub fn identity_from_head_key(key: &str) -> Option<&str> {
	key.strip_prefix(HEAD_PREFIX).filter(|identity| !identity.is_empty())
}
