//! Background enrichment service: watches workspace items and generates
//! summaries and background images for the ones that qualify.

pub mod scheduler;
pub use scheduler::{Advance, Scheduler};

pub mod retry;
pub use retry::RetryPolicy;

mod error;
pub use error::{Error, Result};

mod flight;
mod image;
mod persist;
mod prompts;
mod summary;

use std::{future::Future, pin::Pin, sync::Arc};

use serde_json::Value;
use uuid::Uuid;

use mixboard_config::{Config, Media, RoleConfig, Storage};
use mixboard_domain::{ItemContent, ItemSummary, MetadataPatch, WorkspaceItem};

use flight::FlightRegistry;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Read and patch access to the item store.
pub trait ItemStore
where
	Self: Send + Sync,
{
	fn list_items<'a>(
		&'a self,
		cfg: &'a Storage,
	) -> BoxFuture<'a, mixboard_providers::Result<Vec<WorkspaceItem>>>;

	fn load_item<'a>(
		&'a self,
		cfg: &'a Storage,
		item_id: Uuid,
	) -> BoxFuture<'a, mixboard_providers::Result<Option<ItemContent>>>;

	fn update_metadata<'a>(
		&'a self,
		cfg: &'a Storage,
		item_id: Uuid,
		patch: &'a MetadataPatch,
	) -> BoxFuture<'a, mixboard_providers::Result<()>>;
}

/// Text completion against the analysis role.
pub trait ChatProvider
where
	Self: Send + Sync,
{
	fn complete<'a>(
		&'a self,
		cfg: &'a RoleConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, mixboard_providers::Result<String>>;
}

/// Image generation against the image role.
pub trait ImageProvider
where
	Self: Send + Sync,
{
	fn generate<'a>(
		&'a self,
		cfg: &'a RoleConfig,
		prompt: &'a str,
	) -> BoxFuture<'a, mixboard_providers::Result<String>>;
}

/// Download and durable upload of image payloads.
pub trait MediaStore
where
	Self: Send + Sync,
{
	fn fetch<'a>(
		&'a self,
		cfg: &'a Media,
		image_url: &'a str,
	) -> BoxFuture<'a, mixboard_providers::Result<Vec<u8>>>;

	fn upload<'a>(
		&'a self,
		cfg: &'a Media,
		file_name: &'a str,
		bytes: Vec<u8>,
	) -> BoxFuture<'a, mixboard_providers::Result<String>>;
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Notice {
	Success,
	Failure,
}

/// Outcome surface for finished pipelines.
pub trait Notifier
where
	Self: Send + Sync,
{
	fn notify(&self, notice: Notice, message: &str);
}

/// Swappable backends for everything the service talks to.
#[derive(Clone)]
pub struct Collaborators {
	pub store: Arc<dyn ItemStore>,
	pub chat: Arc<dyn ChatProvider>,
	pub image: Arc<dyn ImageProvider>,
	pub media: Arc<dyn MediaStore>,
	pub notifier: Arc<dyn Notifier>,
}
impl Default for Collaborators {
	fn default() -> Self {
		let defaults = Arc::new(DefaultCollaborators);

		Self {
			store: defaults.clone(),
			chat: defaults.clone(),
			image: defaults.clone(),
			media: defaults,
			notifier: Arc::new(LogNotifier),
		}
	}
}

struct DefaultCollaborators;
impl ItemStore for DefaultCollaborators {
	fn list_items<'a>(
		&'a self,
		cfg: &'a Storage,
	) -> BoxFuture<'a, mixboard_providers::Result<Vec<WorkspaceItem>>> {
		Box::pin(mixboard_providers::store::list_items(cfg))
	}

	fn load_item<'a>(
		&'a self,
		cfg: &'a Storage,
		item_id: Uuid,
	) -> BoxFuture<'a, mixboard_providers::Result<Option<ItemContent>>> {
		Box::pin(mixboard_providers::store::load_item(cfg, item_id))
	}

	fn update_metadata<'a>(
		&'a self,
		cfg: &'a Storage,
		item_id: Uuid,
		patch: &'a MetadataPatch,
	) -> BoxFuture<'a, mixboard_providers::Result<()>> {
		Box::pin(mixboard_providers::store::update_metadata(cfg, item_id, patch))
	}
}
impl ChatProvider for DefaultCollaborators {
	fn complete<'a>(
		&'a self,
		cfg: &'a RoleConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, mixboard_providers::Result<String>> {
		Box::pin(mixboard_providers::chat::complete(cfg, messages))
	}
}
impl ImageProvider for DefaultCollaborators {
	fn generate<'a>(
		&'a self,
		cfg: &'a RoleConfig,
		prompt: &'a str,
	) -> BoxFuture<'a, mixboard_providers::Result<String>> {
		Box::pin(mixboard_providers::image::generate(cfg, prompt))
	}
}
impl MediaStore for DefaultCollaborators {
	fn fetch<'a>(
		&'a self,
		cfg: &'a Media,
		image_url: &'a str,
	) -> BoxFuture<'a, mixboard_providers::Result<Vec<u8>>> {
		Box::pin(mixboard_providers::media::fetch(cfg, image_url))
	}

	fn upload<'a>(
		&'a self,
		cfg: &'a Media,
		file_name: &'a str,
		bytes: Vec<u8>,
	) -> BoxFuture<'a, mixboard_providers::Result<String>> {
		Box::pin(mixboard_providers::media::upload(cfg, file_name, bytes))
	}
}

struct LogNotifier;
impl Notifier for LogNotifier {
	fn notify(&self, notice: Notice, message: &str) {
		match notice {
			Notice::Success => tracing::info!("{message}"),
			Notice::Failure => tracing::warn!("{message}"),
		}
	}
}

/// The enrichment service. Shared behind an [`Arc`]; all pipeline entry
/// points take `&self`.
pub struct EnrichService {
	cfg: Config,
	collaborators: Collaborators,
	summary_flights: FlightRegistry<Option<ItemSummary>>,
	image_flights: FlightRegistry<Option<String>>,
}
impl EnrichService {
	pub fn new(cfg: Config) -> Self {
		Self::with_collaborators(cfg, Collaborators::default())
	}

	pub fn with_collaborators(cfg: Config, collaborators: Collaborators) -> Self {
		Self {
			cfg,
			collaborators,
			summary_flights: FlightRegistry::new(),
			image_flights: FlightRegistry::new(),
		}
	}

	pub fn cfg(&self) -> &Config {
		&self.cfg
	}

	/// Current snapshot of every workspace item, as the store lists them.
	pub async fn list_items(&self) -> Result<Vec<WorkspaceItem>> {
		Ok(self.collaborators.store.list_items(&self.cfg.storage).await?)
	}

	async fn load_content(&self, item_id: Uuid) -> Result<Option<ItemContent>> {
		Ok(self.collaborators.store.load_item(&self.cfg.storage, item_id).await?)
	}
}

fn user_message(prompt: &str) -> Value {
	serde_json::json!({ "role": "user", "content": prompt })
}

fn ensure_live(token: &tokio_util::sync::CancellationToken) -> Result<()> {
	if token.is_cancelled() { Err(Error::Cancelled) } else { Ok(()) }
}
