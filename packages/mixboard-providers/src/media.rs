use std::time::Duration;

use base64::Engine;
use reqwest::{
	Client,
	multipart::{Form, Part},
};
use serde_json::Value;

use mixboard_config::Media;

use crate::{Error, Result};

/// Downloads a remote image through the configured same-origin proxy.
pub async fn fetch(cfg: &Media, image_url: &str) -> Result<Vec<u8>> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let res = client.get(&cfg.proxy_url).query(&[("url", image_url)]).send().await?;
	let bytes = res.error_for_status()?.bytes().await?;

	Ok(bytes.to_vec())
}

/// Uploads an image payload to durable object storage; returns the public URL.
pub async fn upload(cfg: &Media, file_name: &str, bytes: Vec<u8>) -> Result<String> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let part = Part::bytes(bytes).file_name(file_name.to_string()).mime_str("image/png")?;
	let form = Form::new().text("folder", cfg.folder.clone()).part("file", part);
	let mut request = client.post(&cfg.upload_url);

	if !cfg.api_key.trim().is_empty() {
		request = request.bearer_auth(&cfg.api_key);
	}

	let res = request.multipart(form).send().await?;
	let json: Value = res.error_for_status()?.json().await?;

	json.get("url")
		.and_then(|v| v.as_str())
		.map(str::to_string)
		.ok_or_else(|| Error::InvalidResponse {
			message: "Upload response is missing the url field.".to_string(),
		})
}

/// Decodes a `data:<mime>;base64,<payload>` URI into its payload bytes.
pub fn decode_data_uri(uri: &str) -> Result<(String, Vec<u8>)> {
	let rest = uri.strip_prefix("data:").ok_or_else(|| Error::InvalidResponse {
		message: "Not a data URI.".to_string(),
	})?;
	let (meta, data) = rest.split_once(',').ok_or_else(|| Error::InvalidResponse {
		message: "Data URI is missing its payload.".to_string(),
	})?;

	if !meta.ends_with(";base64") {
		return Err(Error::InvalidResponse {
			message: "Only base64 data URIs are supported.".to_string(),
		});
	}

	let mime = meta.trim_end_matches(";base64");
	let mime =
		if mime.is_empty() { "application/octet-stream".to_string() } else { mime.to_string() };
	let bytes = base64::engine::general_purpose::STANDARD.decode(data).map_err(|err| {
		Error::InvalidResponse { message: format!("Data URI payload is not valid base64: {err}.") }
	})?;

	Ok((mime, bytes))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn decodes_a_png_data_uri() {
		let (mime, bytes) =
			decode_data_uri("data:image/png;base64,aGVsbG8=").expect("decode failed");

		assert_eq!(mime, "image/png");
		assert_eq!(bytes, b"hello");
	}

	#[test]
	fn rejects_plain_urls() {
		let err = decode_data_uri("https://cdn.provider/img.png").expect_err("expected failure");

		assert!(matches!(err, Error::InvalidResponse { .. }));
	}

	#[test]
	fn rejects_non_base64_payloads() {
		let err = decode_data_uri("data:image/png;base64,@@@").expect_err("expected failure");

		assert!(matches!(err, Error::InvalidResponse { .. }));
	}
}
