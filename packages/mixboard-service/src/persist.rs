use time::OffsetDateTime;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use mixboard_providers::media;

use crate::{EnrichService, retry};

impl EnrichService {
	/// Moves a freshly generated image into durable storage and returns its
	/// public URL. Every failure falls back to the provider's own reference,
	/// so the pipeline never loses a generated image here.
	pub(crate) async fn persist_image(
		&self,
		item_id: Uuid,
		image_url: &str,
		token: &CancellationToken,
	) -> String {
		let cfg = &self.cfg.media;

		if !cfg.enabled || token.is_cancelled() {
			return image_url.to_string();
		}

		let payload = if image_url.starts_with("data:") {
			match media::decode_data_uri(image_url) {
				Ok((_, bytes)) => bytes,
				Err(err) => {
					tracing::warn!(error = %err, %item_id, "Undecodable data URI; keeping it inline.");

					return image_url.to_string();
				},
			}
		} else {
			match self.collaborators.media.fetch(cfg, image_url).await {
				Ok(bytes) => bytes,
				Err(err) => {
					tracing::warn!(error = %err, %item_id, "Proxy download failed; keeping the provider URL.");

					return image_url.to_string();
				},
			}
		};
		let file_name =
			format!("bg_{item_id}_{}.png", OffsetDateTime::now_utc().unix_timestamp());
		let uploaded = retry::with_retry("upload", retry::UPLOAD_RETRY, token, || {
			self.collaborators.media.upload(cfg, &file_name, payload.clone())
		})
		.await;

		match uploaded {
			Ok(url) => url,
			Err(err) => {
				tracing::warn!(error = %err, %item_id, "Upload failed; keeping the provider URL.");

				image_url.to_string()
			},
		}
	}
}
