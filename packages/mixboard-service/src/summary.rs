use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use mixboard_domain::{ItemSummary, MetadataPatch, extract_digest};

use crate::{EnrichService, Error, Notice, Result, ensure_live, prompts, retry, user_message};

impl EnrichService {
	/// Generates and persists a short summary plus a color theme for one item.
	///
	/// Concurrent calls for the same item share one attempt. Failures are
	/// logged and resolve to `None`; they never escape to the caller.
	pub async fn generate_summary(
		&self,
		item_id: Uuid,
		token: &CancellationToken,
	) -> Option<ItemSummary> {
		self.summary_flights
			.run(item_id, async {
				match self.run_summary(item_id, token).await {
					Ok(summary) => summary,
					Err(err) => {
						tracing::error!(error = %err, %item_id, "Summary pipeline failed.");

						None
					},
				}
			})
			.await
	}

	async fn run_summary(
		&self,
		item_id: Uuid,
		token: &CancellationToken,
	) -> Result<Option<ItemSummary>> {
		ensure_live(token)?;

		let Some(content) = self.load_content(item_id).await? else {
			tracing::debug!(%item_id, "Item vanished before summarization.");

			return Ok(None);
		};
		let digest = extract_digest(&content.elements);

		if digest.is_empty() {
			tracing::debug!(%item_id, "No extractable text; skipping summary.");

			return Ok(None);
		}

		let prompt = prompts::summary_prompt(&content.name, &digest);
		let messages = [user_message(&prompt)];
		let raw = retry::with_retry("summary", retry::ANALYSIS_RETRY, token, || {
			self.collaborators.chat.complete(&self.cfg.providers.analysis, &messages)
		})
		.await?;
		let summary = parse_summary(&raw)?;
		let patch = MetadataPatch { summary: Some(summary.clone()), background_image: None };

		ensure_live(token)?;
		self.collaborators.store.update_metadata(&self.cfg.storage, item_id, &patch).await?;
		self.collaborators
			.notifier
			.notify(Notice::Success, &format!("Summary ready for \"{}\".", content.name));

		Ok(Some(summary))
	}
}

fn parse_summary(raw: &str) -> Result<ItemSummary> {
	let cleaned = strip_code_fences(raw);

	serde_json::from_str(cleaned).map_err(|err| Error::InvalidSummary { message: err.to_string() })
}

/// Models often wrap JSON output in a markdown code fence despite the
/// JSON-only instruction.
pub(crate) fn strip_code_fences(raw: &str) -> &str {
	let trimmed = raw.trim();
	let Some(opened) = trimmed.strip_prefix("```") else {
		return trimmed;
	};
	let body = opened.strip_prefix("json").unwrap_or(opened);

	body.strip_suffix("```").unwrap_or(body).trim()
}
