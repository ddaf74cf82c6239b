//! Play query
//!
//! Returns a published game's dataset together with the caller's validated
//! runtime settings. No identity is required.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::{DbError, GameRepository};
use crate::features::speed_sorting::play_config::{
    resolve_play_config, PlayConfig, PlayConfigError, RawPlayConfig,
};
use crate::models::{Category, GameDataset, GameTemplateKind, Item};

#[derive(Debug, Clone)]
pub struct PlaySpeedSortingQuery {
    pub game_id: Uuid,
    pub config: RawPlayConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaySpeedSortingResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub thumbnail_path: String,
    pub config: PlayConfig,
    pub categories: Vec<Category>,
    pub items: Vec<Item>,
}

#[derive(Debug, thiserror::Error)]
pub enum PlaySpeedSortingError {
    #[error("Speed Sorting game not found")]
    NotFound(Uuid),

    #[error("Game is not a Speed Sorting template")]
    WrongTemplate,

    #[error("Game is not published")]
    NotPublished,

    #[error("{0}")]
    InvalidConfig(#[from] PlayConfigError),

    #[error("Stored dataset is malformed: {0}")]
    CorruptDataset(String),

    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

#[tracing::instrument(skip(games, query), fields(game_id = %query.game_id))]
pub async fn handle(
    games: &dyn GameRepository,
    query: PlaySpeedSortingQuery,
) -> Result<PlaySpeedSortingResponse, PlaySpeedSortingError> {
    let game = games
        .find_by_id(query.game_id)
        .await?
        .ok_or(PlaySpeedSortingError::NotFound(query.game_id))?;

    if game.template_slug != GameTemplateKind::SpeedSorting.slug() {
        return Err(PlaySpeedSortingError::WrongTemplate);
    }

    if !game.is_published {
        return Err(PlaySpeedSortingError::NotPublished);
    }

    let config = resolve_play_config(&query.config)?;

    let dataset = match game.dataset() {
        Ok(GameDataset::SpeedSorting(dataset)) => dataset,
        Ok(other) => {
            return Err(PlaySpeedSortingError::CorruptDataset(format!(
                "expected speed-sorting payload, found {}",
                other.slug()
            )))
        },
        Err(e) => {
            tracing::error!(error = %e, "Stored game_json does not decode");
            return Err(PlaySpeedSortingError::CorruptDataset(e.to_string()));
        },
    };

    tracing::debug!(
        categories = dataset.categories.len(),
        items = dataset.items.len(),
        "Serving game for play"
    );

    Ok(PlaySpeedSortingResponse {
        id: game.id,
        name: game.name,
        description: game.description,
        thumbnail_path: game.thumbnail_path,
        config,
        categories: dataset.categories,
        items: dataset.items,
    })
}
