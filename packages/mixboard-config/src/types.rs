use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	pub media: Media,
	#[serde(default)]
	pub scheduler: Scheduler,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub log_level: String,
}

/// The board store the pipeline reads snapshots from and writes metadata
/// patches back to.
#[derive(Debug, Deserialize)]
pub struct Storage {
	pub api_base: String,
	#[serde(default)]
	pub api_key: String,
	pub timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub analysis: RoleConfig,
	pub image: RoleConfig,
}

/// A named provider/model binding selected per pipeline stage.
#[derive(Debug, Deserialize)]
pub struct RoleConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

/// Durable object storage for generated images. Optional; when disabled the
/// pipeline keeps provider URLs as-is.
#[derive(Debug, Deserialize)]
pub struct Media {
	#[serde(default)]
	pub enabled: bool,
	#[serde(default)]
	pub upload_url: String,
	#[serde(default)]
	pub proxy_url: String,
	#[serde(default = "default_media_folder")]
	pub folder: String,
	#[serde(default)]
	pub api_key: String,
	#[serde(default = "default_media_timeout_ms")]
	pub timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Scheduler {
	pub settle_delay_ms: u64,
	pub step_delay_ms: u64,
	pub poll_interval_ms: u64,
}
impl Default for Scheduler {
	fn default() -> Self {
		Self { settle_delay_ms: 2_000, step_delay_ms: 1_000, poll_interval_ms: 5_000 }
	}
}

fn default_media_folder() -> String {
	"backgrounds".to_string()
}

fn default_media_timeout_ms() -> u64 {
	30_000
}
