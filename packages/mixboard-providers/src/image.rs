use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use mixboard_config::RoleConfig;

use crate::{Error, Result};

/// Image generation against an OpenAI-compatible endpoint. The result is
/// whatever reference the provider hands back: a data URI, a remote URL, or
/// a markdown-wrapped URL.
pub async fn generate(cfg: &RoleConfig, prompt: &str) -> Result<String> {
	if cfg.api_key.trim().is_empty() {
		return Err(Error::MissingCredentials { provider_id: cfg.provider_id.clone() });
	}

	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"messages": [{ "role": "user", "content": prompt }],
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_generation(json)
}

fn parse_generation(json: Value) -> Result<String> {
	// Chat-completions shaped providers return the reference as content.
	if let Some(content) = json
		.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.and_then(|c| c.as_str())
	{
		return Ok(content.trim().to_string());
	}

	// Images-API shaped providers return a data array instead.
	if let Some(item) = json.get("data").and_then(|v| v.as_array()).and_then(|arr| arr.first()) {
		if let Some(url) = item.get("url").and_then(|v| v.as_str()) {
			return Ok(url.to_string());
		}
		if let Some(b64) = item.get("b64_json").and_then(|v| v.as_str()) {
			return Ok(format!("data:image/png;base64,{b64}"));
		}
	}

	Err(Error::InvalidResponse {
		message: "Image response carries neither content nor a data entry.".to_string(),
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_content_shaped_response() {
		let json = serde_json::json!({
			"choices": [
				{ "message": { "content": "https://cdn.provider/img.png" } }
			]
		});

		assert_eq!(parse_generation(json).expect("parse failed"), "https://cdn.provider/img.png");
	}

	#[test]
	fn parses_data_array_url() {
		let json = serde_json::json!({ "data": [{ "url": "https://cdn.provider/img.png" }] });

		assert_eq!(parse_generation(json).expect("parse failed"), "https://cdn.provider/img.png");
	}

	#[test]
	fn wraps_inline_base64_as_a_data_uri() {
		let json = serde_json::json!({ "data": [{ "b64_json": "aGVsbG8=" }] });

		assert_eq!(
			parse_generation(json).expect("parse failed"),
			"data:image/png;base64,aGVsbG8="
		);
	}

	#[test]
	fn empty_response_is_invalid() {
		let err = parse_generation(serde_json::json!({})).expect_err("expected parse failure");

		assert!(matches!(err, Error::InvalidResponse { .. }));
	}
}
