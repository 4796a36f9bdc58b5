use std::{collections::HashMap, future::Future, sync::Mutex};

use tokio::sync::watch;
use uuid::Uuid;

/// Deduplicates concurrent work per key: the first caller runs the job, every
/// caller that arrives while it is in flight awaits the same resolved value.
/// The entry is removed once the attempt settles, so later calls start fresh.
pub(crate) struct FlightRegistry<T> {
	inflight: Mutex<HashMap<Uuid, watch::Receiver<Option<T>>>>,
}

enum Role<T> {
	Leader(watch::Sender<Option<T>>),
	Follower(watch::Receiver<Option<T>>),
}

impl<T> FlightRegistry<T> {
	pub(crate) fn new() -> Self {
		Self { inflight: Mutex::new(HashMap::new()) }
	}

	fn remove(&self, key: Uuid) {
		self.inflight.lock().unwrap_or_else(|err| err.into_inner()).remove(&key);
	}
}
impl<T> FlightRegistry<T>
where
	T: Clone + Default,
{
	pub(crate) async fn run<F>(&self, key: Uuid, work: F) -> T
	where
		F: Future<Output = T>,
	{
		let role = {
			let mut inflight = self.inflight.lock().unwrap_or_else(|err| err.into_inner());

			if let Some(rx) = inflight.get(&key) {
				Role::Follower(rx.clone())
			} else {
				let (tx, rx) = watch::channel(None);

				inflight.insert(key, rx);

				Role::Leader(tx)
			}
		};

		match role {
			Role::Leader(tx) => {
				// Unregister even if the work future panics or is dropped.
				let _cleanup = RemoveOnDrop { registry: self, key };
				let value = work.await;
				let _ = tx.send(Some(value.clone()));

				value
			},
			Role::Follower(mut rx) => {
				loop {
					let published = rx.borrow_and_update().clone();

					if let Some(value) = published {
						return value;
					}
					// A dropped sender means the leader never published.
					if rx.changed().await.is_err() {
						return T::default();
					}
				}
			},
		}
	}
}

struct RemoveOnDrop<'a, T> {
	registry: &'a FlightRegistry<T>,
	key: Uuid,
}
impl<T> Drop for RemoveOnDrop<'_, T> {
	fn drop(&mut self) {
		self.registry.remove(self.key);
	}
}
