pub mod create;
pub mod update;

pub use create::{CreateSpeedSortingCommand, CreateSpeedSortingError, CreateSpeedSortingResponse};
pub use update::{UpdateSpeedSortingCommand, UpdateSpeedSortingError, UpdateSpeedSortingResponse};

use super::types::{
    RawCategory, RawItem, MAX_CATEGORIES, MAX_CATEGORY_NAME_LENGTH, MAX_ITEMS, MIN_CATEGORIES,
    MIN_ITEMS,
};
use crate::features::shared::validation::{validate_count, validate_name, FieldValidationError};

/// Count and category-name checks shared by create and update.
///
/// Category references are checked later by the assembler, which reports the
/// offending item position.
pub(crate) fn validate_dataset_input(
    categories: &[RawCategory],
    items: &[RawItem],
) -> Result<(), FieldValidationError> {
    validate_count("categories", categories.len(), MIN_CATEGORIES, MAX_CATEGORIES)?;
    for (i, category) in categories.iter().enumerate() {
        validate_name(
            &format!("categories[{}].name", i),
            &category.name,
            MAX_CATEGORY_NAME_LENGTH,
        )?;
    }
    validate_count("items", items.len(), MIN_ITEMS, MAX_ITEMS)?;
    Ok(())
}
