//! Dataset assembler
//!
//! Turns submitted categories and items into a [`SpeedSortingDataset`].
//! Assembly runs in two phases so every input error is reported before the
//! first byte is uploaded:
//!
//! 1. [`DatasetPlan::prepare`] checks category references and classifies
//!    each item. Pure, no I/O.
//! 2. [`DatasetPlan::resolve`] uploads file items one at a time and fills in
//!    their storage paths. The first failed upload aborts; blobs already
//!    stored are left in place.

use thiserror::Error;
use uuid::Uuid;

use super::classifier::{classify, ClassificationError, ClassifiedItem};
use super::types::{items_prefix, RawCategory, RawItem};
use crate::models::{Category, Item, SpeedSortingDataset};
use crate::storage::{BlobStore, StorageError};

#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("invalid category_index at item {position}")]
    InvalidCategoryIndex { position: usize },

    #[error(transparent)]
    Classification(#[from] ClassificationError),

    #[error("upload failed for item {position}: {source}")]
    Storage {
        position: usize,
        #[source]
        source: StorageError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PlannedItem {
    category_id: String,
    content: ClassifiedItem,
}

/// A validated dataset whose file items still need uploading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetPlan {
    categories: Vec<Category>,
    items: Vec<PlannedItem>,
}

impl DatasetPlan {
    pub fn prepare(categories: &[RawCategory], items: &[RawItem]) -> Result<Self, AssemblyError> {
        let categories: Vec<Category> = categories
            .iter()
            .enumerate()
            .map(|(i, c)| Category::at(i, c.name.trim()))
            .collect();

        let items = items
            .iter()
            .enumerate()
            .map(|(i, raw)| {
                let category = usize::try_from(raw.category_index)
                    .ok()
                    .and_then(|idx| categories.get(idx))
                    .ok_or(AssemblyError::InvalidCategoryIndex { position: i + 1 })?;
                let content = classify(i, &raw.value, raw.kind)?;
                Ok(PlannedItem {
                    category_id: category.id.clone(),
                    content,
                })
            })
            .collect::<Result<Vec<_>, AssemblyError>>()?;

        Ok(Self { categories, items })
    }

    /// Number of items that will be uploaded by [`DatasetPlan::resolve`].
    pub fn file_count(&self) -> usize {
        self.items
            .iter()
            .filter(|i| matches!(i.content, ClassifiedItem::File(_)))
            .count()
    }

    #[tracing::instrument(skip(self, store))]
    pub async fn resolve(
        self,
        game_id: Uuid,
        store: &dyn BlobStore,
        show_score_at_end: Option<bool>,
    ) -> Result<SpeedSortingDataset, AssemblyError> {
        let prefix = items_prefix(game_id);
        tracing::debug!(files = self.file_count(), "Resolving dataset plan");
        let mut items = Vec::with_capacity(self.items.len());

        for (i, planned) in self.items.into_iter().enumerate() {
            let text = match planned.content {
                ClassifiedItem::Text(text) => text,
                ClassifiedItem::File(file) => {
                    let path = store
                        .upload(&prefix, file)
                        .await
                        .map_err(|source| AssemblyError::Storage {
                            position: i + 1,
                            source,
                        })?;
                    tracing::debug!(item = i, path = %path, "Item file uploaded");
                    path
                },
            };
            items.push(Item::at(i, text, planned.category_id));
        }

        Ok(SpeedSortingDataset {
            categories: self.categories,
            items,
            show_score_at_end,
        })
    }
}

/// Prepare and resolve in one call.
pub async fn assemble(
    categories: &[RawCategory],
    items: &[RawItem],
    game_id: Uuid,
    store: &dyn BlobStore,
    show_score_at_end: Option<bool>,
) -> Result<SpeedSortingDataset, AssemblyError> {
    DatasetPlan::prepare(categories, items)?
        .resolve(game_id, store, show_score_at_end)
        .await
}
