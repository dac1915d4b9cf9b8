use sha2::{Digest, Sha256};

pub const ANON_PREFIX: &str = "anon";

const FINGERPRINT_HEX_LEN: usize = 64;

/// Owner of a typing session.
///
/// Unauthenticated callers that share a fingerprint source collapse onto the same anonymous
/// identity. That merge is accepted, not corrected.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identity {
	User(String),
	Anonymous(String),
}
impl Identity {
	/// Uses `user_id` when it has any non-whitespace content, otherwise fingerprints `fingerprint`.
	///
	/// The fingerprint is hashed as raw bytes, so sources that are not valid UTF-8 stay distinct.
	pub fn resolve(user_id: Option<&str>, fingerprint: impl AsRef<[u8]>) -> Self {
		match user_id {
			Some(user_id) if !user_id.trim().is_empty() => Self::User(user_id.to_string()),
			_ => Self::Anonymous(anonymous_key(fingerprint)),
		}
	}

	/// Recovers the classification of a cache key produced by [`Identity::as_key`].
	pub fn from_key(key: &str) -> Self {
		if is_anonymous_key(key) {
			Self::Anonymous(key.to_string())
		} else {
			Self::User(key.to_string())
		}
	}

	pub fn as_key(&self) -> &str {
		match self {
			Self::User(key) | Self::Anonymous(key) => key,
		}
	}

	pub fn is_anonymous(&self) -> bool {
		matches!(self, Self::Anonymous(_))
	}

	pub fn user_id(&self) -> Option<&str> {
		match self {
			Self::User(user_id) => Some(user_id),
			Self::Anonymous(_) => None,
		}
	}

	pub fn anon_id(&self) -> Option<&str> {
		match self {
			Self::User(_) => None,
			Self::Anonymous(anon_id) => Some(anon_id),
		}
	}
}
impl std::fmt::Display for Identity {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_key())
	}
}

pub fn anonymous_key(fingerprint: impl AsRef<[u8]>) -> String {
	let digest = Sha256::digest(fingerprint.as_ref());

	format!("{ANON_PREFIX}{}", hex::encode(digest))
}

pub fn is_anonymous_key(key: &str) -> bool {
	let Some(hex) = key.strip_prefix(ANON_PREFIX) else {
		return false;
	};

	hex.len() == FINGERPRINT_HEX_LEN
		&& hex.bytes().all(|byte| byte.is_ascii_digit() || (b'a'..=b'f').contains(&byte))
}
