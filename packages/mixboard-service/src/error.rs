use uuid::Uuid;

use mixboard_providers::ErrorClass;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Provider(#[from] mixboard_providers::Error),
	#[error("No text content found on item {item_id}.")]
	EmptyDigest { item_id: Uuid },
	#[error("The {stage} stage returned an empty result.")]
	EmptyStage { stage: &'static str },
	#[error("Summary response is not valid JSON: {message}")]
	InvalidSummary { message: String },
	#[error("Generation was cancelled.")]
	Cancelled,
}
impl Error {
	pub fn class(&self) -> ErrorClass {
		match self {
			Self::Provider(err) => err.class(),
			_ => ErrorClass::Fatal,
		}
	}
}
