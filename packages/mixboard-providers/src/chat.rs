use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use mixboard_config::RoleConfig;

use crate::{Error, Result};

/// Single-shot text completion against an OpenAI-compatible endpoint.
pub async fn complete(cfg: &RoleConfig, messages: &[Value]) -> Result<String> {
	if cfg.api_key.trim().is_empty() {
		return Err(Error::MissingCredentials { provider_id: cfg.provider_id.clone() });
	}

	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"messages": messages,
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_completion(json)
}

fn parse_completion(json: Value) -> Result<String> {
	let content = json
		.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.and_then(|c| c.as_str())
		.ok_or_else(|| Error::InvalidResponse {
			message: "Completion response is missing message content.".to_string(),
		})?;

	Ok(content.trim().to_string())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_first_choice_content() {
		let json = serde_json::json!({
			"choices": [
				{ "message": { "content": "  a visual concept  " } }
			]
		});

		assert_eq!(parse_completion(json).expect("parse failed"), "a visual concept");
	}

	#[test]
	fn missing_content_is_an_invalid_response() {
		let json = serde_json::json!({ "choices": [] });
		let err = parse_completion(json).expect_err("expected parse failure");

		assert!(matches!(err, Error::InvalidResponse { .. }));
	}
}
