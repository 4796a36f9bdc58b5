use std::time::Duration;

use reqwest::{Client, StatusCode};
use uuid::Uuid;

use mixboard_config::Storage;
use mixboard_domain::{ItemContent, MetadataPatch, WorkspaceItem};

use crate::Result;

/// Thin JSON client for the board store. The store owns the data; the
/// pipeline only reads snapshots and writes metadata patches back.
pub async fn list_items(cfg: &Storage) -> Result<Vec<WorkspaceItem>> {
	let client = client(cfg)?;
	let url = format!("{}/boards", cfg.api_base);
	let res = request(client.get(url), cfg).send().await?;
	let items = res.error_for_status()?.json().await?;

	Ok(items)
}

pub async fn load_item(cfg: &Storage, item_id: Uuid) -> Result<Option<ItemContent>> {
	let client = client(cfg)?;
	let url = format!("{}/boards/{item_id}", cfg.api_base);
	let res = request(client.get(url), cfg).send().await?;

	if res.status() == StatusCode::NOT_FOUND {
		return Ok(None);
	}

	let content = res.error_for_status()?.json().await?;

	Ok(Some(content))
}

pub async fn update_metadata(cfg: &Storage, item_id: Uuid, patch: &MetadataPatch) -> Result<()> {
	let client = client(cfg)?;
	let url = format!("{}/boards/{item_id}/metadata", cfg.api_base);
	let res = request(client.patch(url), cfg).json(patch).send().await?;

	res.error_for_status()?;

	Ok(())
}

fn client(cfg: &Storage) -> Result<Client> {
	Ok(Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?)
}

fn request(builder: reqwest::RequestBuilder, cfg: &Storage) -> reqwest::RequestBuilder {
	if cfg.api_key.trim().is_empty() { builder } else { builder.bearer_auth(&cfg.api_key) }
}
