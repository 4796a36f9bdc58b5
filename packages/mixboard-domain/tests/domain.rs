use mixboard_domain::{
	ItemSummary, MetadataPatch, TurnContent, TurnPart, WorkspaceItem,
	digest::{DIGEST_CHAR_CAP, extract_digest},
};

#[test]
fn workspace_item_deserializes_store_shape() {
	let json = serde_json::json!({
		"id": "7b2d7a4e-8f3c-4f7e-9a4d-2f5f7cf1a111",
		"name": "Roadmap",
		"elementCount": 7,
		"backgroundImage": null,
		"summary": { "summary": "Quarterly planning board.", "theme": "blue" },
		"deletedAt": null
	});
	let item: WorkspaceItem = serde_json::from_value(json).expect("Item must deserialize.");

	assert_eq!(item.element_count, 7);
	assert_eq!(
		item.summary,
		Some(ItemSummary { summary: "Quarterly planning board.".to_string(), theme: "blue".to_string() })
	);
	assert!(item.background_image.is_none());
	assert!(item.deleted_at.is_none());
}

#[test]
fn turn_content_accepts_plain_text_and_typed_parts() {
	let plain: TurnContent =
		serde_json::from_value(serde_json::json!("just text")).expect("Plain text must parse.");

	assert!(matches!(plain, TurnContent::Text(text) if text == "just text"));

	let parts: TurnContent = serde_json::from_value(serde_json::json!([
		{ "type": "text", "text": "caption" },
		{ "type": "image", "source": { "media_type": "image/png", "data": "..." } }
	]))
	.expect("Typed parts must parse.");
	let TurnContent::Parts(parts) = parts else {
		panic!("Expected typed parts.");
	};

	assert_eq!(parts.len(), 2);
	assert!(matches!(&parts[0], TurnPart::Text { text } if text == "caption"));
	assert!(matches!(&parts[1], TurnPart::Image { .. }));
}

#[test]
fn metadata_patch_skips_unset_fields() {
	let patch = MetadataPatch {
		summary: None,
		background_image: Some("https://cdn.example/bg.png".to_string()),
	};
	let json = serde_json::to_value(&patch).expect("Patch must serialize.");

	assert!(json.get("summary").is_none());
	assert_eq!(json["backgroundImage"], "https://cdn.example/bg.png");
}

#[test]
fn digest_cap_holds_for_oversized_boards() {
	let elements: Vec<_> = (0..1_000)
		.map(|i| mixboard_domain::ContentElement {
			title: Some(format!("card {i}")),
			body: Some("lorem ipsum dolor sit amet ".repeat(40)),
			turns: Vec::new(),
		})
		.collect();
	let digest = extract_digest(&elements);

	assert!(digest.chars().count() <= DIGEST_CHAR_CAP);
	assert_eq!(digest.chars().count(), DIGEST_CHAR_CAP);
}
