//! Scripted collaborators and fixtures shared by the service test suites.

use std::{
	collections::{HashMap, VecDeque},
	sync::{
		Mutex,
		atomic::{AtomicU32, Ordering},
	},
	time::Duration,
};

use serde_json::Value;
use uuid::Uuid;

use mixboard_config::{Config, Media, Providers, RoleConfig, Scheduler, Service, Storage};
use mixboard_domain::{ContentElement, ItemContent, MetadataPatch, WorkspaceItem};
use mixboard_service::{
	BoxFuture, ChatProvider, ImageProvider, ItemStore, MediaStore, Notice, Notifier,
};

/// A transient, retryable provider failure.
pub fn transient_error() -> mixboard_providers::Error {
	mixboard_providers::Error::Upstream { status: 503 }
}

/// A fatal, non-retryable provider failure.
pub fn fatal_error() -> mixboard_providers::Error {
	mixboard_providers::Error::InvalidResponse { message: "scripted fatal failure".to_string() }
}

fn exhausted(script: &str) -> mixboard_providers::Error {
	mixboard_providers::Error::InvalidResponse { message: format!("{script} script exhausted") }
}

/// In-memory board store. Serves fixed snapshots and records every metadata
/// patch it receives.
#[derive(Default)]
pub struct MemoryStore {
	items: Mutex<Vec<WorkspaceItem>>,
	contents: Mutex<HashMap<Uuid, ItemContent>>,
	patches: Mutex<Vec<(Uuid, MetadataPatch)>>,
}
impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert_item(&self, item: WorkspaceItem) {
		self.items.lock().unwrap_or_else(|err| err.into_inner()).push(item);
	}

	pub fn insert_content(&self, content: ItemContent) {
		self.contents
			.lock()
			.unwrap_or_else(|err| err.into_inner())
			.insert(content.id, content);
	}

	pub fn patches(&self) -> Vec<(Uuid, MetadataPatch)> {
		self.patches.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}
}
impl ItemStore for MemoryStore {
	fn list_items<'a>(
		&'a self,
		_cfg: &'a Storage,
	) -> BoxFuture<'a, mixboard_providers::Result<Vec<WorkspaceItem>>> {
		Box::pin(async move {
			Ok(self.items.lock().unwrap_or_else(|err| err.into_inner()).clone())
		})
	}

	fn load_item<'a>(
		&'a self,
		_cfg: &'a Storage,
		item_id: Uuid,
	) -> BoxFuture<'a, mixboard_providers::Result<Option<ItemContent>>> {
		Box::pin(async move {
			Ok(self
				.contents
				.lock()
				.unwrap_or_else(|err| err.into_inner())
				.get(&item_id)
				.cloned())
		})
	}

	fn update_metadata<'a>(
		&'a self,
		_cfg: &'a Storage,
		item_id: Uuid,
		patch: &'a MetadataPatch,
	) -> BoxFuture<'a, mixboard_providers::Result<()>> {
		Box::pin(async move {
			self.patches
				.lock()
				.unwrap_or_else(|err| err.into_inner())
				.push((item_id, patch.clone()));

			Ok(())
		})
	}
}

/// Chat provider that replays a fixed reply script, one entry per call.
/// Running off the end of the script is a fatal error.
#[derive(Default)]
pub struct ScriptedChat {
	replies: Mutex<VecDeque<mixboard_providers::Result<String>>>,
	calls: AtomicU32,
	delay: Option<Duration>,
}
impl ScriptedChat {
	pub fn new(
		replies: impl IntoIterator<Item = mixboard_providers::Result<String>>,
	) -> Self {
		Self {
			replies: Mutex::new(replies.into_iter().collect()),
			calls: AtomicU32::new(0),
			delay: None,
		}
	}

	/// Makes every call suspend first, to widen race windows in tests.
	pub fn with_delay(mut self, delay: Duration) -> Self {
		self.delay = Some(delay);

		self
	}

	pub fn calls(&self) -> u32 {
		self.calls.load(Ordering::SeqCst)
	}
}
impl ChatProvider for ScriptedChat {
	fn complete<'a>(
		&'a self,
		_cfg: &'a RoleConfig,
		_messages: &'a [Value],
	) -> BoxFuture<'a, mixboard_providers::Result<String>> {
		Box::pin(async move {
			self.calls.fetch_add(1, Ordering::SeqCst);

			if let Some(delay) = self.delay {
				tokio::time::sleep(delay).await;
			}

			self.replies
				.lock()
				.unwrap_or_else(|err| err.into_inner())
				.pop_front()
				.unwrap_or_else(|| Err(exhausted("chat")))
		})
	}
}

/// Image provider mirror of [`ScriptedChat`].
#[derive(Default)]
pub struct ScriptedImage {
	replies: Mutex<VecDeque<mixboard_providers::Result<String>>>,
	calls: AtomicU32,
}
impl ScriptedImage {
	pub fn new(
		replies: impl IntoIterator<Item = mixboard_providers::Result<String>>,
	) -> Self {
		Self { replies: Mutex::new(replies.into_iter().collect()), calls: AtomicU32::new(0) }
	}

	pub fn calls(&self) -> u32 {
		self.calls.load(Ordering::SeqCst)
	}
}
impl ImageProvider for ScriptedImage {
	fn generate<'a>(
		&'a self,
		_cfg: &'a RoleConfig,
		_prompt: &'a str,
	) -> BoxFuture<'a, mixboard_providers::Result<String>> {
		Box::pin(async move {
			self.calls.fetch_add(1, Ordering::SeqCst);

			self.replies
				.lock()
				.unwrap_or_else(|err| err.into_inner())
				.pop_front()
				.unwrap_or_else(|| Err(exhausted("image")))
		})
	}
}

/// Media store with scripted fetch and upload outcomes.
#[derive(Default)]
pub struct ScriptedMedia {
	fetches: Mutex<VecDeque<mixboard_providers::Result<Vec<u8>>>>,
	uploads: Mutex<VecDeque<mixboard_providers::Result<String>>>,
	uploaded_names: Mutex<Vec<String>>,
	upload_calls: AtomicU32,
}
impl ScriptedMedia {
	pub fn new(
		fetches: impl IntoIterator<Item = mixboard_providers::Result<Vec<u8>>>,
		uploads: impl IntoIterator<Item = mixboard_providers::Result<String>>,
	) -> Self {
		Self {
			fetches: Mutex::new(fetches.into_iter().collect()),
			uploads: Mutex::new(uploads.into_iter().collect()),
			uploaded_names: Mutex::new(Vec::new()),
			upload_calls: AtomicU32::new(0),
		}
	}

	pub fn upload_calls(&self) -> u32 {
		self.upload_calls.load(Ordering::SeqCst)
	}

	pub fn uploaded_names(&self) -> Vec<String> {
		self.uploaded_names.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}
}
impl MediaStore for ScriptedMedia {
	fn fetch<'a>(
		&'a self,
		_cfg: &'a Media,
		_image_url: &'a str,
	) -> BoxFuture<'a, mixboard_providers::Result<Vec<u8>>> {
		Box::pin(async move {
			self.fetches
				.lock()
				.unwrap_or_else(|err| err.into_inner())
				.pop_front()
				.unwrap_or_else(|| Err(exhausted("fetch")))
		})
	}

	fn upload<'a>(
		&'a self,
		_cfg: &'a Media,
		file_name: &'a str,
		_bytes: Vec<u8>,
	) -> BoxFuture<'a, mixboard_providers::Result<String>> {
		Box::pin(async move {
			self.upload_calls.fetch_add(1, Ordering::SeqCst);
			self.uploaded_names
				.lock()
				.unwrap_or_else(|err| err.into_inner())
				.push(file_name.to_string());

			self.uploads
				.lock()
				.unwrap_or_else(|err| err.into_inner())
				.pop_front()
				.unwrap_or_else(|| Err(exhausted("upload")))
		})
	}
}

/// Notifier that records every notice.
#[derive(Default)]
pub struct RecordingNotifier {
	notices: Mutex<Vec<(Notice, String)>>,
}
impl RecordingNotifier {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn notices(&self) -> Vec<(Notice, String)> {
		self.notices.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}
}
impl Notifier for RecordingNotifier {
	fn notify(&self, notice: Notice, message: &str) {
		self.notices
			.lock()
			.unwrap_or_else(|err| err.into_inner())
			.push((notice, message.to_string()));
	}
}

pub fn test_config() -> Config {
	Config {
		service: Service { log_level: "info".to_string() },
		storage: Storage {
			api_base: "http://storage.test".to_string(),
			api_key: String::new(),
			timeout_ms: 5_000,
		},
		providers: Providers { analysis: test_role("analysis"), image: test_role("image") },
		media: Media {
			enabled: true,
			upload_url: "http://media.test/upload".to_string(),
			proxy_url: "http://media.test/proxy".to_string(),
			folder: "backgrounds".to_string(),
			api_key: String::new(),
			timeout_ms: 5_000,
		},
		scheduler: Scheduler::default(),
	}
}

fn test_role(provider_id: &str) -> RoleConfig {
	RoleConfig {
		provider_id: provider_id.to_string(),
		api_base: format!("http://{provider_id}.test"),
		api_key: "test-key".to_string(),
		path: "/v1/chat/completions".to_string(),
		model: format!("{provider_id}-model"),
		temperature: 0.7,
		timeout_ms: 5_000,
		default_headers: serde_json::Map::new(),
	}
}

pub fn workspace_item(element_count: u32) -> WorkspaceItem {
	WorkspaceItem {
		id: Uuid::new_v4(),
		name: "Board".to_string(),
		element_count,
		background_image: None,
		summary: None,
		deleted_at: None,
	}
}

pub fn text_element(body: &str) -> ContentElement {
	ContentElement { title: None, body: Some(body.to_string()), turns: Vec::new() }
}

pub fn item_content(id: Uuid, elements: Vec<ContentElement>) -> ItemContent {
	ItemContent { id, name: "Board".to_string(), elements }
}
