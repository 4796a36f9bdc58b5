use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

/// List snapshot of one board, as served by the board store. The pipeline
/// only reads these; ownership stays with the store.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceItem {
	pub id: Uuid,
	#[serde(default)]
	pub name: String,
	pub element_count: u32,
	#[serde(default)]
	pub background_image: Option<String>,
	#[serde(default)]
	pub summary: Option<ItemSummary>,
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub deleted_at: Option<OffsetDateTime>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ItemSummary {
	pub summary: String,
	pub theme: String,
}

/// Full content load for one board.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemContent {
	pub id: Uuid,
	#[serde(default)]
	pub name: String,
	#[serde(default)]
	pub elements: Vec<ContentElement>,
}

/// A single card/note on a board. Carries free text and/or an ordered list
/// of conversational turns.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentElement {
	#[serde(default)]
	pub title: Option<String>,
	#[serde(default)]
	pub body: Option<String>,
	#[serde(default)]
	pub turns: Vec<Turn>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Turn {
	pub role: String,
	pub content: TurnContent,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(untagged)]
pub enum TurnContent {
	Text(String),
	Parts(Vec<TurnPart>),
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TurnPart {
	Text {
		text: String,
	},
	Image {
		#[serde(default)]
		source: Option<Value>,
	},
}

/// Partial metadata write-back; only set fields are serialized.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataPatch {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub summary: Option<ItemSummary>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub background_image: Option<String>,
}
