//! Create speed-sorting game command
//!
//! # Flow
//!
//! 1. Validate the submitted fields (pure)
//! 2. Reject a name already used by another speed-sorting game
//! 3. Resolve the template id
//! 4. Check category references and classify items (pure)
//! 5. Upload the thumbnail, then each file item, under the new game id
//! 6. Insert the row
//!
//! Uploads are not rolled back when a later step fails.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validate_dataset_input;
use crate::db::{DbError, GameRepository, NewGame};
use crate::features::shared::validation::{
    validate_max_length, validate_name, FieldValidationError,
};
use crate::features::speed_sorting::assembler::{AssemblyError, DatasetPlan};
use crate::features::speed_sorting::form::{SpeedSortingForm, ThumbnailError, ThumbnailPart};
use crate::features::speed_sorting::types::{
    game_prefix, RawCategory, RawItem, MAX_DESCRIPTION_LENGTH, MAX_NAME_LENGTH,
};
use crate::models::{GameDataset, GameTemplateKind};
use crate::storage::{BlobStore, StorageError};

/// Command to create a new speed-sorting game
#[derive(Debug, Clone)]
pub struct CreateSpeedSortingCommand {
    pub creator_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub thumbnail: ThumbnailPart,
    pub is_publish_immediately: bool,
    pub show_score_at_end: Option<bool>,
    pub categories: Vec<RawCategory>,
    pub items: Vec<RawItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSpeedSortingResponse {
    pub id: Uuid,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateSpeedSortingError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("{0}")]
    Validation(#[from] FieldValidationError),

    #[error("{0}")]
    Thumbnail(#[from] ThumbnailError),

    #[error("Game name already used")]
    DuplicateName,

    #[error("Speed Sorting game template not found")]
    TemplateMissing,

    #[error("{0}")]
    Assembly(#[from] AssemblyError),

    #[error("Thumbnail upload failed: {0}")]
    Storage(#[from] StorageError),

    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

impl CreateSpeedSortingCommand {
    /// Build the command from a decoded form, checking required parts.
    pub fn from_form(
        creator_id: Uuid,
        form: SpeedSortingForm,
    ) -> Result<Self, CreateSpeedSortingError> {
        Ok(Self {
            creator_id,
            name: form.name.ok_or(CreateSpeedSortingError::MissingField("name"))?,
            description: form.description,
            thumbnail: form
                .thumbnail
                .ok_or(CreateSpeedSortingError::MissingField("thumbnail_image"))?,
            is_publish_immediately: form.is_publish_immediately.unwrap_or(false),
            show_score_at_end: form.show_score_at_end,
            categories: form
                .categories
                .ok_or(CreateSpeedSortingError::MissingField("categories"))?,
            items: form.items.ok_or(CreateSpeedSortingError::MissingField("items"))?,
        })
    }

    /// Validates the command parameters
    ///
    /// - name: 1-128 characters after trimming
    /// - description: at most 256 characters
    /// - categories: 2-20, each name 1-128 characters after trimming
    /// - items: 1-1000
    #[tracing::instrument(skip(self), fields(name = %self.name))]
    pub fn validate(&self) -> Result<(), CreateSpeedSortingError> {
        validate_name("name", &self.name, MAX_NAME_LENGTH)?;
        if let Some(ref description) = self.description {
            validate_max_length("description", description, MAX_DESCRIPTION_LENGTH)?;
        }
        validate_dataset_input(&self.categories, &self.items)?;

        tracing::debug!("Command validation passed");
        Ok(())
    }
}

#[tracing::instrument(
    skip(games, store, command),
    fields(
        creator_id = %command.creator_id,
        categories = command.categories.len(),
        items = command.items.len()
    )
)]
pub async fn handle(
    games: &dyn GameRepository,
    store: &dyn BlobStore,
    command: CreateSpeedSortingCommand,
) -> Result<CreateSpeedSortingResponse, CreateSpeedSortingError> {
    command.validate()?;
    let thumbnail = command.thumbnail.into_upload()?;
    let name = command.name.trim().to_string();
    let slug = GameTemplateKind::SpeedSorting.slug();

    if games.find_by_name_and_template(&name, slug).await?.is_some() {
        return Err(CreateSpeedSortingError::DuplicateName);
    }

    let template_id = games.find_template_id(slug).await?.ok_or_else(|| {
        tracing::error!(slug, "Game template row is missing");
        CreateSpeedSortingError::TemplateMissing
    })?;

    let plan = DatasetPlan::prepare(&command.categories, &command.items)?;

    let game_id = Uuid::new_v4();
    tracing::info!(game_id = %game_id, "Creating speed-sorting game");

    let thumbnail_path = store.upload(&game_prefix(game_id), thumbnail).await?;
    let dataset = plan
        .resolve(game_id, store, command.show_score_at_end)
        .await?;
    let game_json = GameDataset::from(dataset)
        .into_payload()
        .map_err(DbError::from)?;

    let id = games
        .create(NewGame {
            id: game_id,
            template_id,
            creator_id: command.creator_id,
            name,
            description: command.description,
            thumbnail_path,
            is_published: command.is_publish_immediately,
            game_json,
        })
        .await
        .map_err(|e| match e {
            DbError::Duplicate(_) => CreateSpeedSortingError::DuplicateName,
            other => CreateSpeedSortingError::Database(other),
        })?;

    tracing::info!(game_id = %id, "Speed-sorting game created");

    Ok(CreateSpeedSortingResponse { id })
}
