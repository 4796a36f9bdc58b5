pub mod digest;
pub use digest::extract_digest;

pub mod item;

pub use item::{
	ContentElement, ItemContent, ItemSummary, MetadataPatch, Turn, TurnContent, TurnPart,
	WorkspaceItem,
};
