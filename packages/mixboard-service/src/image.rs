use std::sync::LazyLock;

use regex::Regex;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use mixboard_domain::{MetadataPatch, extract_digest};

use crate::{EnrichService, Error, Notice, Result, ensure_live, prompts, retry, user_message};

/// Some providers wrap the generated URL in markdown: `![alt](url)`.
static MARKDOWN_IMAGE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"!\[[^\]]*\]\(([^)\s]+)\)").expect("hardcoded regex is valid"));

impl EnrichService {
	/// Generates a background image for one item and persists its URL.
	///
	/// Concurrent calls for the same item share one attempt. On failure the
	/// user is notified and the call resolves to `None`.
	pub async fn generate_image(&self, item_id: Uuid, token: &CancellationToken) -> Option<String> {
		self.image_flights
			.run(item_id, async {
				match self.run_image(item_id, token).await {
					Ok(url) => Some(url),
					Err(err) => {
						tracing::error!(error = %err, %item_id, "Image pipeline failed.");
						self.collaborators.notifier.notify(
							Notice::Failure,
							"Background generation failed. Check the image provider settings and try again.",
						);

						None
					},
				}
			})
			.await
	}

	async fn run_image(&self, item_id: Uuid, token: &CancellationToken) -> Result<String> {
		ensure_live(token)?;

		let content =
			self.load_content(item_id).await?.ok_or(Error::EmptyDigest { item_id })?;
		let digest = extract_digest(&content.elements);

		if digest.is_empty() {
			return Err(Error::EmptyDigest { item_id });
		}

		// Stage one: distill the digest into a visual concept.
		let concept_prompt = prompts::visual_concept_prompt(&digest);
		let concept_messages = [user_message(&concept_prompt)];
		let concept = retry::with_retry("visual-concept", retry::ANALYSIS_RETRY, token, || {
			self.collaborators.chat.complete(&self.cfg.providers.analysis, &concept_messages)
		})
		.await?;

		if concept.is_empty() {
			return Err(Error::EmptyStage { stage: "visual concept" });
		}

		ensure_live(token)?;

		// Stage two: turn the concept into a final image prompt.
		let draft_prompt = prompts::image_prompt(&concept);
		let draft_messages = [user_message(&draft_prompt)];
		let image_prompt = retry::with_retry("image-prompt", retry::ANALYSIS_RETRY, token, || {
			self.collaborators.chat.complete(&self.cfg.providers.analysis, &draft_messages)
		})
		.await?;

		if image_prompt.is_empty() {
			return Err(Error::EmptyStage { stage: "image prompt" });
		}

		ensure_live(token)?;

		// Stage three: render.
		let reference = retry::with_retry("image-generation", retry::IMAGE_RETRY, token, || {
			self.collaborators.image.generate(&self.cfg.providers.image, &image_prompt)
		})
		.await?;

		if reference.is_empty() {
			return Err(Error::EmptyStage { stage: "image generation" });
		}

		let image_url = unwrap_markdown_url(&reference);

		ensure_live(token)?;

		let final_url = self.persist_image(item_id, &image_url, token).await;
		let patch =
			MetadataPatch { summary: None, background_image: Some(final_url.clone()) };

		self.collaborators.store.update_metadata(&self.cfg.storage, item_id, &patch).await?;
		self.collaborators
			.notifier
			.notify(Notice::Success, &format!("Background ready for \"{}\".", content.name));

		Ok(final_url)
	}
}

fn unwrap_markdown_url(reference: &str) -> String {
	MARKDOWN_IMAGE
		.captures(reference)
		.and_then(|caps| caps.get(1))
		.map(|m| m.as_str().to_string())
		.unwrap_or_else(|| reference.to_string())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn unwraps_markdown_wrapped_urls() {
		assert_eq!(
			unwrap_markdown_url("![background](https://cdn.provider/img.png)"),
			"https://cdn.provider/img.png"
		);
	}

	#[test]
	fn passes_plain_references_through() {
		assert_eq!(unwrap_markdown_url("https://cdn.provider/img.png"), "https://cdn.provider/img.png");
		assert_eq!(unwrap_markdown_url("data:image/png;base64,aGVsbG8="), "data:image/png;base64,aGVsbG8=");
	}
}
