use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use toml::Value;

use mixboard_config::Error;

const SAMPLE_CONFIG_TOML: &str = include_str!("fixtures/sample_config.toml");

static COUNTER: AtomicU64 = AtomicU64::new(0);

fn write_temp_config(contents: &str) -> PathBuf {
	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("Clock went backwards.")
		.as_nanos();
	let unique = COUNTER.fetch_add(1, Ordering::Relaxed);
	let path = env::temp_dir().join(format!("mixboard_config_{nanos}_{unique}.toml"));

	fs::write(&path, contents).expect("Failed to write temp config.");

	path
}

fn sample_with<F>(mutate: F) -> String
where
	F: FnOnce(&mut toml::map::Map<String, Value>),
{
	let mut value: Value =
		toml::from_str(SAMPLE_CONFIG_TOML).expect("Failed to parse sample config.");
	let root = value.as_table_mut().expect("Sample config must be a table.");

	mutate(root);

	toml::to_string(&value).expect("Failed to render sample config.")
}

fn set_provider_key(root: &mut toml::map::Map<String, Value>, role: &str, key: &str, value: Value) {
	root.get_mut("providers")
		.and_then(Value::as_table_mut)
		.and_then(|providers| providers.get_mut(role))
		.and_then(Value::as_table_mut)
		.expect("Sample config must include the provider role.")
		.insert(key.to_string(), value);
}

#[test]
fn loads_valid_config() {
	let path = write_temp_config(SAMPLE_CONFIG_TOML);
	let cfg = mixboard_config::load(&path).expect("Sample config must load.");

	fs::remove_file(&path).ok();

	assert_eq!(cfg.service.log_level, "info");
	assert_eq!(cfg.providers.analysis.model, "google/gemini-3-flash-preview");
	assert_eq!(cfg.scheduler.settle_delay_ms, 2_000);
	assert!(cfg.media.enabled);
}

#[test]
fn scheduler_defaults_apply_when_section_is_missing() {
	let rendered = sample_with(|root| {
		root.remove("scheduler");
	});
	let path = write_temp_config(&rendered);
	let cfg = mixboard_config::load(&path).expect("Config without scheduler must load.");

	fs::remove_file(&path).ok();

	assert_eq!(cfg.scheduler.settle_delay_ms, 2_000);
	assert_eq!(cfg.scheduler.step_delay_ms, 1_000);
	assert_eq!(cfg.scheduler.poll_interval_ms, 5_000);
}

#[test]
fn rejects_empty_provider_api_key() {
	let rendered = sample_with(|root| {
		set_provider_key(root, "analysis", "api_key", Value::String(String::new()));
	});
	let path = write_temp_config(&rendered);
	let err = mixboard_config::load(&path).expect_err("Empty api_key must be rejected.");

	fs::remove_file(&path).ok();

	assert!(matches!(err, Error::Validation { message } if message.contains("api_key")));
}

#[test]
fn rejects_zero_provider_timeout() {
	let rendered = sample_with(|root| {
		set_provider_key(root, "image", "timeout_ms", Value::Integer(0));
	});
	let path = write_temp_config(&rendered);
	let err = mixboard_config::load(&path).expect_err("Zero timeout must be rejected.");

	fs::remove_file(&path).ok();

	assert!(matches!(err, Error::Validation { message } if message.contains("timeout_ms")));
}

#[test]
fn rejects_enabled_media_without_upload_url() {
	let rendered = sample_with(|root| {
		root.get_mut("media")
			.and_then(Value::as_table_mut)
			.expect("Sample config must include [media].")
			.insert("upload_url".to_string(), Value::String(String::new()));
	});
	let path = write_temp_config(&rendered);
	let err = mixboard_config::load(&path).expect_err("Enabled media needs an upload_url.");

	fs::remove_file(&path).ok();

	assert!(matches!(err, Error::Validation { message } if message.contains("upload_url")));
}

#[test]
fn normalizes_trailing_slashes() {
	let rendered = sample_with(|root| {
		root.get_mut("storage")
			.and_then(Value::as_table_mut)
			.expect("Sample config must include [storage].")
			.insert(
				"api_base".to_string(),
				Value::String("http://localhost:8787/api/".to_string()),
			);
	});
	let path = write_temp_config(&rendered);
	let cfg = mixboard_config::load(&path).expect("Config must load.");

	fs::remove_file(&path).ok();

	assert_eq!(cfg.storage.api_base, "http://localhost:8787/api");
}
