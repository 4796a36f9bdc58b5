//! Background candidate scheduler. Watches the item list and drives the
//! generation pipelines one item at a time.

use std::{
	collections::HashSet,
	sync::{
		Arc, Mutex,
		atomic::{AtomicBool, Ordering},
	},
	time::Duration,
};

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use mixboard_domain::WorkspaceItem;

use crate::EnrichService;

/// Items below this element count are left alone.
pub const SUMMARY_MIN_ELEMENTS: u32 = 3;
/// Items at or above this element count get a background image instead of a
/// summary.
pub const IMAGE_MIN_ELEMENTS: u32 = 10;

/// Outcome of a single [`Scheduler::advance`] step.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Advance {
	/// A candidate was selected and its pipeline ran to completion.
	Advanced,
	/// No eligible candidate remains.
	Idle,
	/// Another step is already processing; this call did nothing.
	Busy,
}

pub struct Scheduler {
	service: Arc<EnrichService>,
	token: CancellationToken,
	// Attempted item ids, kept for the whole session. Never retried, even
	// after a failed pipeline, so background AI spend stays bounded.
	processed: Mutex<HashSet<Uuid>>,
	busy: AtomicBool,
}
impl Scheduler {
	pub fn new(service: Arc<EnrichService>, token: CancellationToken) -> Self {
		Self { service, token, processed: Mutex::new(HashSet::new()), busy: AtomicBool::new(false) }
	}

	/// Entry point for list updates: waits out the settle delay, then drains
	/// every eligible candidate from the snapshot.
	pub async fn on_items_changed(&self, items: &[WorkspaceItem]) {
		let settle = Duration::from_millis(self.service.cfg().scheduler.settle_delay_ms);

		tokio::select! {
			_ = self.token.cancelled() => return,
			_ = tokio::time::sleep(settle) => {},
		}

		self.drain(items).await;
	}

	/// Advances repeatedly, pausing between candidates, until the snapshot
	/// holds no more work.
	pub async fn drain(&self, items: &[WorkspaceItem]) {
		let step = Duration::from_millis(self.service.cfg().scheduler.step_delay_ms);

		while self.advance(items).await == Advance::Advanced {
			tokio::select! {
				_ = self.token.cancelled() => return,
				_ = tokio::time::sleep(step) => {},
			}
		}
	}

	/// One scheduler step: pick the first eligible item and run its pipeline.
	///
	/// At most one step processes at a time; a call that loses the flag race
	/// returns [`Advance::Busy`] without scanning.
	pub async fn advance(&self, items: &[WorkspaceItem]) -> Advance {
		if self.token.is_cancelled() {
			return Advance::Idle;
		}
		if self.busy.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_err() {
			return Advance::Busy;
		}

		let _processing = ClearOnDrop(&self.busy);
		let Some(candidate) = self.claim_candidate(items) else {
			return Advance::Idle;
		};

		tracing::info!(
			item_id = %candidate.id,
			element_count = candidate.element_count,
			"Scheduling enrichment."
		);

		if candidate.element_count >= IMAGE_MIN_ELEMENTS {
			self.service.generate_image(candidate.id, &self.token).await;
		} else {
			self.service.generate_summary(candidate.id, &self.token).await;
		}

		Advance::Advanced
	}

	/// Scans in stored order and marks the winner as processed before any
	/// await, so a concurrent scan cannot double-select it.
	fn claim_candidate<'a>(&self, items: &'a [WorkspaceItem]) -> Option<&'a WorkspaceItem> {
		let mut processed = self.processed.lock().unwrap_or_else(|err| err.into_inner());

		items.iter().find(|item| eligible(item) && processed.insert(item.id))
	}
}

fn eligible(item: &WorkspaceItem) -> bool {
	item.deleted_at.is_none()
		&& item.element_count >= SUMMARY_MIN_ELEMENTS
		&& item.background_image.is_none()
		&& item.summary.is_none()
}

struct ClearOnDrop<'a>(&'a AtomicBool);
impl Drop for ClearOnDrop<'_> {
	fn drop(&mut self) {
		self.0.store(false, Ordering::Release);
	}
}

#[cfg(test)]
mod tests {
	use time::OffsetDateTime;

	use mixboard_domain::ItemSummary;

	use super::*;

	fn item(element_count: u32) -> WorkspaceItem {
		WorkspaceItem {
			id: Uuid::new_v4(),
			name: "Board".to_string(),
			element_count,
			background_image: None,
			summary: None,
			deleted_at: None,
		}
	}

	#[test]
	fn small_items_are_not_eligible() {
		assert!(!eligible(&item(2)));
		assert!(eligible(&item(3)));
		assert!(eligible(&item(12)));
	}

	#[test]
	fn enriched_or_deleted_items_are_not_eligible() {
		let with_image = WorkspaceItem {
			background_image: Some("https://cdn.example/bg.png".to_string()),
			..item(5)
		};
		let with_summary = WorkspaceItem {
			summary: Some(ItemSummary {
				summary: "Done.".to_string(),
				theme: "blue".to_string(),
			}),
			..item(5)
		};
		let deleted =
			WorkspaceItem { deleted_at: Some(OffsetDateTime::UNIX_EPOCH), ..item(5) };

		assert!(!eligible(&with_image));
		assert!(!eligible(&with_summary));
		assert!(!eligible(&deleted));
	}
}
