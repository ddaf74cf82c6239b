//! Persisted speed-sorting dataset

use serde::{Deserialize, Serialize};

pub const CATEGORY_ID_PREFIX: &str = "cat-";
pub const ITEM_ID_PREFIX: &str = "item-";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
}

impl Category {
    /// Category at submission position `index`.
    pub fn at(index: usize, name: impl Into<String>) -> Self {
        Self {
            id: format!("{}{}", CATEGORY_ID_PREFIX, index),
            name: name.into(),
        }
    }
}

/// `text` holds either the literal text or the storage path of an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub text: String,
    pub category_id: String,
}

impl Item {
    pub fn at(index: usize, text: impl Into<String>, category_id: impl Into<String>) -> Self {
        Self {
            id: format!("{}{}", ITEM_ID_PREFIX, index),
            text: text.into(),
            category_id: category_id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeedSortingDataset {
    pub categories: Vec<Category>,
    pub items: Vec<Item>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_score_at_end: Option<bool>,
}

impl SpeedSortingDataset {
    /// Every item points at a category of this dataset.
    pub fn is_referentially_closed(&self) -> bool {
        self.items
            .iter()
            .all(|item| self.categories.iter().any(|c| c.id == item.category_id))
    }
}
