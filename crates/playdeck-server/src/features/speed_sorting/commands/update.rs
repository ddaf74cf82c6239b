//! Update speed-sorting game command
//!
//! Checks run in this order: the game exists, it is a speed-sorting game,
//! the caller may edit it, then the submitted fields. Nothing is uploaded
//! or written before all four pass.
//!
//! Dataset replacement is all-or-nothing: `categories` and `items` must be
//! sent together. Without them the stored dataset is left as is, except
//! that `show_score_at_end` alone patches that single flag.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::validate_dataset_input;
use crate::db::{DbError, GameChanges, GameRecord, GameRepository};
use crate::features::shared::validation::{
    validate_max_length, validate_name, FieldValidationError,
};
use crate::features::speed_sorting::assembler::{AssemblyError, DatasetPlan};
use crate::features::speed_sorting::authorization::{authorize, ForbiddenError};
use crate::features::speed_sorting::form::{SpeedSortingForm, ThumbnailError, ThumbnailPart};
use crate::features::speed_sorting::types::{
    game_prefix, RawCategory, RawItem, MAX_DESCRIPTION_LENGTH, MAX_NAME_LENGTH,
};
use crate::middleware::ActingUser;
use crate::models::{GameDataset, GameTemplateKind};
use crate::storage::{BlobStore, StorageError};

/// Command to update an existing speed-sorting game
///
/// Every field is optional; `None` keeps the stored value.
#[derive(Debug, Clone)]
pub struct UpdateSpeedSortingCommand {
    pub game_id: Uuid,
    pub actor: ActingUser,
    pub name: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<ThumbnailPart>,
    pub is_publish: Option<bool>,
    pub show_score_at_end: Option<bool>,
    pub categories: Option<Vec<RawCategory>>,
    pub items: Option<Vec<RawItem>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateSpeedSortingResponse {
    pub id: Uuid,
    pub game_json: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum UpdateSpeedSortingError {
    #[error("Speed Sorting game not found")]
    NotFound(Uuid),

    #[error("Game is not a Speed Sorting template")]
    WrongTemplate,

    #[error("{0}")]
    Forbidden(#[from] ForbiddenError),

    #[error("No fields to update")]
    NoFieldsToUpdate,

    #[error("categories and items must both be provided when updating dataset")]
    DatasetIncomplete,

    #[error("{0}")]
    Validation(#[from] FieldValidationError),

    #[error("{0}")]
    Thumbnail(#[from] ThumbnailError),

    #[error("Game name already used")]
    DuplicateName,

    #[error("Stored dataset is malformed: {0}")]
    CorruptDataset(String),

    #[error("{0}")]
    Assembly(#[from] AssemblyError),

    #[error("Thumbnail upload failed: {0}")]
    Storage(#[from] StorageError),

    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

impl UpdateSpeedSortingCommand {
    pub fn from_form(game_id: Uuid, actor: ActingUser, form: SpeedSortingForm) -> Self {
        Self {
            game_id,
            actor,
            name: form.name,
            description: form.description,
            thumbnail: form.thumbnail,
            is_publish: form.is_publish,
            show_score_at_end: form.show_score_at_end,
            categories: form.categories,
            items: form.items,
        }
    }

    fn has_changes(&self) -> bool {
        self.name.is_some()
            || self.description.is_some()
            || self.thumbnail.is_some()
            || self.is_publish.is_some()
            || self.show_score_at_end.is_some()
            || self.categories.is_some()
            || self.items.is_some()
    }

    /// Validates the submitted fields
    ///
    /// - at least one field must be present
    /// - `categories` and `items` only together
    /// - same length and count limits as on create
    #[tracing::instrument(skip(self), fields(game_id = %self.game_id))]
    pub fn validate(&self) -> Result<(), UpdateSpeedSortingError> {
        if !self.has_changes() {
            return Err(UpdateSpeedSortingError::NoFieldsToUpdate);
        }
        if let Some(ref name) = self.name {
            validate_name("name", name, MAX_NAME_LENGTH)?;
        }
        if let Some(ref description) = self.description {
            validate_max_length("description", description, MAX_DESCRIPTION_LENGTH)?;
        }
        match (&self.categories, &self.items) {
            (Some(categories), Some(items)) => validate_dataset_input(categories, items)?,
            (None, None) => {},
            _ => return Err(UpdateSpeedSortingError::DatasetIncomplete),
        }
        Ok(())
    }
}

#[tracing::instrument(
    skip(games, store, command),
    fields(game_id = %command.game_id, user_id = %command.actor.id)
)]
pub async fn handle(
    games: &dyn GameRepository,
    store: &dyn BlobStore,
    command: UpdateSpeedSortingCommand,
) -> Result<UpdateSpeedSortingResponse, UpdateSpeedSortingError> {
    let game_id = command.game_id;
    let existing = games
        .find_by_id(game_id)
        .await?
        .ok_or(UpdateSpeedSortingError::NotFound(game_id))?;

    if existing.template_slug != GameTemplateKind::SpeedSorting.slug() {
        return Err(UpdateSpeedSortingError::WrongTemplate);
    }

    authorize(&existing, &command.actor)?;
    command.validate()?;

    let thumbnail = command.thumbnail.map(ThumbnailPart::into_upload).transpose()?;

    let name = command.name.map(|n| n.trim().to_string());
    if let Some(ref new_name) = name {
        if new_name != &existing.name {
            let holder = games
                .find_by_name_and_template(new_name, &existing.template_slug)
                .await?;
            if holder.is_some_and(|id| id != game_id) {
                return Err(UpdateSpeedSortingError::DuplicateName);
            }
        }
    }

    let plan = match (&command.categories, &command.items) {
        (Some(categories), Some(items)) => Some(DatasetPlan::prepare(categories, items)?),
        _ => None,
    };

    let thumbnail_path = match thumbnail {
        Some(file) => Some(store.upload(&game_prefix(game_id), file).await?),
        None => None,
    };

    let game_json = match plan {
        Some(plan) => {
            let show_score = command
                .show_score_at_end
                .or_else(|| stored_show_score(&existing));
            let dataset = plan.resolve(game_id, store, show_score).await?;
            Some(
                GameDataset::from(dataset)
                    .into_payload()
                    .map_err(DbError::from)?,
            )
        },
        None => match command.show_score_at_end {
            Some(flag) => Some(patch_show_score(&existing.game_json, flag)?),
            None => None,
        },
    };

    let updated = games
        .update(
            game_id,
            GameChanges {
                name,
                description: command.description,
                thumbnail_path,
                is_published: command.is_publish,
                game_json,
            },
        )
        .await
        .map_err(|e| match e {
            DbError::Duplicate(_) => UpdateSpeedSortingError::DuplicateName,
            DbError::NotFound(_) => UpdateSpeedSortingError::NotFound(game_id),
            other => UpdateSpeedSortingError::Database(other),
        })?;

    tracing::info!("Speed-sorting game updated");

    Ok(UpdateSpeedSortingResponse {
        id: updated.id,
        game_json: updated.game_json,
    })
}

fn stored_show_score(record: &GameRecord) -> Option<bool> {
    match record.dataset() {
        Ok(GameDataset::SpeedSorting(dataset)) => dataset.show_score_at_end,
        _ => None,
    }
}

/// Set `show_score_at_end` inside the stored JSON, leaving every other key as is.
fn patch_show_score(stored: &Value, flag: bool) -> Result<Value, UpdateSpeedSortingError> {
    let mut patched = stored.clone();
    let object = patched.as_object_mut().ok_or_else(|| {
        UpdateSpeedSortingError::CorruptDataset("game_json is not an object".to_string())
    })?;
    object.insert("show_score_at_end".to_string(), Value::Bool(flag));
    Ok(patched)
}
