use std::time::Duration;

use futures::StreamExt;
use tokio::time;

use burst_config::Redis;
use burst_storage::cache::RedisCache;

async fn connect(url: String) -> RedisCache {
	RedisCache::connect(&Redis { url }).await.expect("Failed to connect to Redis.")
}

#[tokio::test]
#[ignore = "Requires external Redis. Set BURST_REDIS_URL to run."]
async fn set_get_delete_round_trip() {
	let Some(url) = burst_testkit::env_redis_url() else {
		eprintln!("Skipping set_get_delete_round_trip; set BURST_REDIS_URL to run this test.");

		return;
	};
	let cache = connect(url).await;
	let key = format!("search:smoke:{}", burst_testkit::unique_user_id("redis"));

	cache.set(&key, "hello", Duration::from_secs(30)).await.expect("Failed to set key.");

	assert_eq!(cache.get(&key).await.expect("Failed to get key."), Some("hello".to_string()));

	cache.delete(&key).await.expect("Failed to delete key.");

	assert_eq!(cache.get(&key).await.expect("Failed to get key."), None);
}

#[tokio::test]
#[ignore = "Requires external Redis. Set BURST_REDIS_URL to run."]
async fn expired_keys_are_streamed_by_prefix() {
	let Some(url) = burst_testkit::env_redis_url() else {
		eprintln!(
			"Skipping expired_keys_are_streamed_by_prefix; set BURST_REDIS_URL to run this test."
		);

		return;
	};
	let cache = connect(url).await;

	cache.configure_notifications().await.expect("Failed to enable keyspace notifications.");

	let prefix = format!("search:smoke:{}:", burst_testkit::unique_user_id("expiry"));
	let expired = cache.subscribe_expired(&prefix).await.expect("Failed to subscribe.");
	let key = format!("{prefix}head");

	tokio::pin!(expired);

	cache.set("search:smoke:unrelated", "x", Duration::from_millis(50)).await.expect("Set failed.");
	cache.set(&key, "hello", Duration::from_millis(100)).await.expect("Failed to set key.");

	let received = time::timeout(Duration::from_secs(10), expired.next())
		.await
		.expect("Timed out waiting for expiry notification.");

	assert_eq!(received, Some(key));
}
