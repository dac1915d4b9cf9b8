use burst_domain::{
	Decision, Identity,
	burst::{self, same_burst},
	identity::{self, ANON_PREFIX},
	keys, query,
};

#[test]
fn normalize_trims_and_lowercases() {
	assert_eq!(query::normalize("  Rust Async \n"), "rust async");
	assert_eq!(query::normalize("ÉCOLE"), "école");
}

#[test]
fn normalize_whitespace_only_is_empty() {
	assert_eq!(query::normalize(" \t\n "), "");
	assert_eq!(query::normalize(""), "");
}

#[test]
fn resolve_prefers_user_id() {
	let identity = Identity::resolve(Some("user123"), "Mozilla/5.0");

	assert_eq!(identity, Identity::User("user123".to_string()));
	assert_eq!(identity.user_id(), Some("user123"));
	assert_eq!(identity.anon_id(), None);
	assert!(!identity.is_anonymous());
}

#[test]
fn resolve_blank_user_id_is_anonymous() {
	for user_id in [None, Some(""), Some("   ")] {
		let identity = Identity::resolve(user_id, "TestAgent");

		assert!(identity.is_anonymous(), "Expected anonymous identity for {user_id:?}.");
		assert_eq!(identity.user_id(), None);
		assert_eq!(identity.anon_id(), Some(identity::anonymous_key("TestAgent").as_str()));
	}
}

#[test]
fn anonymous_key_is_prefixed_sha256_hex() {
	// SHA-256 of the empty string.
	assert_eq!(
		identity::anonymous_key(""),
		"anone3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
	);

	let key = identity::anonymous_key("TestBrowser/1.0");

	assert!(key.starts_with(ANON_PREFIX));
	assert_eq!(key.len(), ANON_PREFIX.len() + 64);
}

#[test]
fn anonymous_identity_is_deterministic() {
	let first = Identity::resolve(None, "AgentX");
	let second = Identity::resolve(Some(""), "AgentX");
	let other = Identity::resolve(None, "AgentY");

	assert_eq!(first, second);
	assert_ne!(first, other);
}

#[test]
fn non_utf8_fingerprints_stay_distinct() {
	let first = Identity::resolve(None, b"Agent\xE9A");
	let second = Identity::resolve(None, b"Agent\xE9B");

	assert_ne!(first, second);
	assert_ne!(first, Identity::resolve(None, ""));
	assert_eq!(Identity::resolve(None, "TestAgent"), Identity::resolve(None, b"TestAgent"));
}

#[test]
fn from_key_round_trips_classification() {
	let anonymous = Identity::resolve(None, "AgentX");
	let user = Identity::resolve(Some("user12"), "AgentX");

	assert_eq!(Identity::from_key(anonymous.as_key()), anonymous);
	assert_eq!(Identity::from_key(user.as_key()), user);
}

#[test]
fn from_key_requires_full_fingerprint_format() {
	assert!(!Identity::from_key("anonymous-coward").is_anonymous());
	assert!(!Identity::from_key("anon").is_anonymous());
	assert!(
		!Identity::from_key("anonE3B0C44298FC1C149AFBF4C8996FB92427AE41E4649B934CA495991B7852B855")
			.is_anonymous()
	);
}

#[test]
fn decide_ignores_empty_query() {
	assert_eq!(burst::decide(Some("cat"), ""), Decision::Ignore);
	assert_eq!(burst::decide(None, ""), Decision::Ignore);
}

#[test]
fn decide_starts_without_head() {
	assert_eq!(burst::decide(None, "cat"), Decision::Start);
	assert_eq!(burst::decide(Some(""), "cat"), Decision::Start);
}

#[test]
fn decide_extends_on_typing_and_backspace() {
	assert_eq!(burst::decide(Some("tes"), "test"), Decision::Extend);
	assert_eq!(burst::decide(Some("market"), "mark"), Decision::Extend);
	assert_eq!(burst::decide(Some("same"), "same"), Decision::Extend);
}

#[test]
fn decide_resets_on_unrelated_query() {
	assert_eq!(
		burst::decide(Some("caterpillar"), "dog"),
		Decision::Reset { previous: "caterpillar" }
	);
	assert_eq!(burst::decide(Some("business"), "bus stop"), Decision::Reset { previous: "business" });
}

#[test]
fn prefix_chain_stays_in_one_burst() {
	let chain = ["t", "te", "tes", "test", "tes", "testing"];

	for pair in chain.windows(2) {
		assert!(same_burst(pair[0], pair[1]), "{:?} should extend {:?}.", pair[1], pair[0]);
	}
}

#[test]
fn head_keys_round_trip() {
	let key = keys::head_key("user123");

	assert_eq!(key, "search:last:user123");
	assert_eq!(keys::buffer_key("user123"), "search:buffer:user123");
	assert_eq!(keys::identity_from_head_key(&key), Some("user123"));
}

#[test]
fn identity_from_head_key_rejects_foreign_keys() {
	assert_eq!(keys::identity_from_head_key("search:buffer:user123"), None);
	assert_eq!(keys::identity_from_head_key("search:last:"), None);
	assert_eq!(keys::identity_from_head_key("session:abc"), None);
}
