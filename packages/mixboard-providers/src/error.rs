pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Retry classification, decided by the transport layer rather than by
/// matching on error message text.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
	/// Never retried; the pipeline aborts immediately.
	Fatal,
	/// Worth retrying with backoff.
	Transient,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Provider configuration is invalid: {message}")]
	InvalidConfig { message: String },
	#[error("Missing API credentials for provider {provider_id}.")]
	MissingCredentials { provider_id: String },
	#[error("Provider returned an unusable response: {message}")]
	InvalidResponse { message: String },
	#[error("Provider request was rate limited.")]
	RateLimited,
	#[error("Upstream provider failure: HTTP {status}.")]
	Upstream { status: u16 },
	#[error(transparent)]
	Transport(reqwest::Error),
	#[error(transparent)]
	InvalidHeaderName(#[from] reqwest::header::InvalidHeaderName),
	#[error(transparent)]
	InvalidHeaderValue(#[from] reqwest::header::InvalidHeaderValue),
}
impl Error {
	pub fn class(&self) -> ErrorClass {
		match self {
			Self::RateLimited => ErrorClass::Transient,
			Self::Upstream { status } if *status >= 500 => ErrorClass::Transient,
			Self::Transport(err) if err.is_timeout() || err.is_connect() => ErrorClass::Transient,
			// Unclassified failures default to fatal.
			_ => ErrorClass::Fatal,
		}
	}
}
impl From<reqwest::Error> for Error {
	fn from(err: reqwest::Error) -> Self {
		if let Some(status) = err.status() {
			if status.as_u16() == 429 {
				return Self::RateLimited;
			}

			return Self::Upstream { status: status.as_u16() };
		}

		Self::Transport(err)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn rate_limits_and_server_errors_are_transient() {
		assert_eq!(Error::RateLimited.class(), ErrorClass::Transient);
		assert_eq!(Error::Upstream { status: 503 }.class(), ErrorClass::Transient);
	}

	#[test]
	fn config_and_client_errors_are_fatal() {
		let config = Error::InvalidConfig { message: "missing model".to_string() };
		let credentials = Error::MissingCredentials { provider_id: "gmi".to_string() };

		assert_eq!(config.class(), ErrorClass::Fatal);
		assert_eq!(credentials.class(), ErrorClass::Fatal);
		assert_eq!(Error::Upstream { status: 404 }.class(), ErrorClass::Fatal);
	}
}
