//! Client-submitted dataset shapes

use serde::{Deserialize, Serialize};

pub const MAX_NAME_LENGTH: usize = 128;
pub const MAX_DESCRIPTION_LENGTH: usize = 256;
pub const MAX_CATEGORY_NAME_LENGTH: usize = 128;
pub const MIN_CATEGORIES: usize = 2;
pub const MAX_CATEGORIES: usize = 20;
pub const MIN_ITEMS: usize = 1;
pub const MAX_ITEMS: usize = 1000;

/// Storage prefix for everything belonging to one game.
pub fn game_prefix(game_id: uuid::Uuid) -> String {
    format!("game/speed-sorting/{}", game_id)
}

/// Storage prefix for file items of one game.
pub fn items_prefix(game_id: uuid::Uuid) -> String {
    format!("{}/items", game_prefix(game_id))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCategory {
    pub name: String,
}

/// Declared content type of a submitted item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Text,
    File,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawItem {
    pub value: String,
    /// Zero-based index into the categories of the same request.
    pub category_index: i64,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ItemType>,
}
