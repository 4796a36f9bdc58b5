use std::{future::Future, time::Duration};

use tokio_util::sync::CancellationToken;

use mixboard_providers::ErrorClass;

use crate::{Error, Result};

/// Bounded retry with exponential backoff. `attempts` counts the first try.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
	pub attempts: u32,
	pub base_delay: Duration,
}
impl RetryPolicy {
	pub const fn new(attempts: u32, base_delay: Duration) -> Self {
		Self { attempts, base_delay }
	}

	fn backoff(&self, attempt: u32) -> Duration {
		self.base_delay * 2_u32.saturating_pow(attempt.saturating_sub(1))
	}
}

pub const ANALYSIS_RETRY: RetryPolicy = RetryPolicy::new(3, Duration::from_millis(900));
pub const IMAGE_RETRY: RetryPolicy = RetryPolicy::new(3, Duration::from_millis(1_000));
pub const UPLOAD_RETRY: RetryPolicy = RetryPolicy::new(2, Duration::from_millis(1_000));

/// Runs `op` until it succeeds, fails fatally, runs out of attempts, or the
/// token fires. Fatal errors and cancellation cut the loop short.
pub async fn with_retry<T, F, Fut>(
	stage: &'static str,
	policy: RetryPolicy,
	token: &CancellationToken,
	mut op: F,
) -> Result<T>
where
	F: FnMut() -> Fut,
	Fut: Future<Output = mixboard_providers::Result<T>>,
{
	let mut attempt = 0;

	loop {
		attempt += 1;

		if token.is_cancelled() {
			return Err(Error::Cancelled);
		}

		match op().await {
			Ok(value) => return Ok(value),
			Err(err) if err.class() == ErrorClass::Fatal => {
				tracing::error!(error = %err, stage, attempt, "Stage failed fatally.");

				return Err(err.into());
			},
			Err(err) if attempt >= policy.attempts => {
				tracing::error!(error = %err, stage, attempt, "Stage exhausted its retries.");

				return Err(err.into());
			},
			Err(err) => {
				let delay = policy.backoff(attempt);

				tracing::warn!(
					error = %err,
					stage,
					attempt,
					delay_ms = delay.as_millis() as u64,
					"Stage failed transiently; backing off."
				);

				tokio::select! {
					_ = token.cancelled() => return Err(Error::Cancelled),
					_ = tokio::time::sleep(delay) => {},
				}
			},
		}
	}
}
