use crate::item::{ContentElement, TurnContent, TurnPart};

/// Per-element contribution cap, in characters, before the ellipsis.
pub const ELEMENT_CHAR_CAP: usize = 600;
/// Hard cap on the whole digest, in characters.
pub const DIGEST_CHAR_CAP: usize = 12_000;
/// Marker emitted for image parts inside mixed-type turn content.
pub const IMAGE_PLACEHOLDER: &str = "[Image]";

const ELLIPSIS: &str = "...";

/// Builds a bounded text digest from a board's elements, in stored order.
///
/// Each element contributes its title, free-text body, and flattened turn
/// text, whitespace-collapsed and capped at [`ELEMENT_CHAR_CAP`] characters.
/// Elements with no text are skipped. The digest never exceeds
/// [`DIGEST_CHAR_CAP`] characters; the final chunk is cut to land exactly on
/// the cap. An empty element list yields an empty digest.
pub fn extract_digest(elements: &[ContentElement]) -> String {
	let mut digest = String::new();
	let mut used = 0_usize;

	for element in elements {
		if used >= DIGEST_CHAR_CAP {
			break;
		}

		let text = element_text(element);

		if text.is_empty() {
			continue;
		}

		let chunk = cap_element(&text);
		let separator = if digest.is_empty() { "" } else { "\n" };
		let remaining = DIGEST_CHAR_CAP - used;
		let chunk_len = separator.chars().count() + chunk.chars().count();

		if chunk_len <= remaining {
			digest.push_str(separator);
			digest.push_str(&chunk);
			used += chunk_len;
		} else {
			let truncated: String =
				separator.chars().chain(chunk.chars()).take(remaining).collect();

			digest.push_str(&truncated);
			used = DIGEST_CHAR_CAP;
		}
	}

	digest
}

fn element_text(element: &ContentElement) -> String {
	let mut parts = Vec::new();

	if let Some(title) = element.title.as_deref()
		&& !title.trim().is_empty()
	{
		parts.push(title.to_string());
	}
	if let Some(body) = element.body.as_deref()
		&& !body.trim().is_empty()
	{
		parts.push(body.to_string());
	}

	for turn in &element.turns {
		let text = turn_text(&turn.content);

		if !text.trim().is_empty() {
			parts.push(format!("{}: {}", turn.role, text));
		}
	}

	normalize_whitespace(&parts.join(" "))
}

fn turn_text(content: &TurnContent) -> String {
	match content {
		TurnContent::Text(text) => text.clone(),
		TurnContent::Parts(parts) => parts
			.iter()
			.map(|part| match part {
				TurnPart::Text { text } => text.as_str(),
				TurnPart::Image { .. } => IMAGE_PLACEHOLDER,
			})
			.collect::<Vec<_>>()
			.join(" "),
	}
}

fn normalize_whitespace(text: &str) -> String {
	text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn cap_element(text: &str) -> String {
	if text.chars().count() <= ELEMENT_CHAR_CAP {
		return text.to_string();
	}

	let mut capped: String = text.chars().take(ELEMENT_CHAR_CAP).collect();

	capped.push_str(ELLIPSIS);

	capped
}
