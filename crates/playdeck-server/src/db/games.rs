//! Game record gateway
//!
//! Everything the feature slices need from the `games` and `game_templates`
//! tables, behind the [`GameRepository`] trait so handlers can be exercised
//! against an in-memory implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{is_unique_violation, DbError, DbResult};
use crate::models::GameDataset;

/// A `games` row joined with its template slug.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct GameRecord {
    pub id: Uuid,
    pub template_id: Uuid,
    pub template_slug: String,
    pub creator_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    #[sqlx(rename = "thumbnail_image")]
    pub thumbnail_path: String,
    pub is_published: bool,
    pub game_json: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GameRecord {
    /// Decode `game_json` according to the record's template.
    pub fn dataset(&self) -> Result<GameDataset, serde_json::Error> {
        GameDataset::decode(&self.template_slug, self.game_json.clone())
    }
}

/// Insert payload. The id is generated by the caller before uploads start so
/// blobs and row share it.
#[derive(Debug, Clone)]
pub struct NewGame {
    pub id: Uuid,
    pub template_id: Uuid,
    pub creator_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub thumbnail_path: String,
    pub is_published: bool,
    pub game_json: Value,
}

/// Column-wise patch; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub thumbnail_path: Option<String>,
    pub is_published: Option<bool>,
    pub game_json: Option<Value>,
}

#[async_trait]
pub trait GameRepository: Send + Sync {
    /// Round-trip to the backing store.
    async fn ping(&self) -> DbResult<()>;

    async fn find_template_id(&self, slug: &str) -> DbResult<Option<Uuid>>;

    /// Id of the game named `name` under the template `slug`, if any.
    async fn find_by_name_and_template(&self, name: &str, slug: &str) -> DbResult<Option<Uuid>>;

    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<GameRecord>>;

    /// Fails with [`DbError::Duplicate`] when the name is taken under the template.
    async fn create(&self, game: NewGame) -> DbResult<Uuid>;

    /// Fails with [`DbError::NotFound`] or [`DbError::Duplicate`].
    async fn update(&self, id: Uuid, changes: GameChanges) -> DbResult<GameRecord>;
}

/// PostgreSQL-backed gateway
#[derive(Clone)]
pub struct PgGameRepository {
    pool: PgPool,
}

impl PgGameRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SELECT_GAME: &str = r#"
    SELECT g.id, g.game_template_id AS template_id, t.slug AS template_slug,
           g.creator_id, g.name, g.description, g.thumbnail_image,
           g.is_published, g.game_json, g.created_at, g.updated_at
    FROM games g
    JOIN game_templates t ON t.id = g.game_template_id
"#;

#[async_trait]
impl GameRepository for PgGameRepository {
    async fn ping(&self) -> DbResult<()> {
        super::health_check(&self.pool).await
    }

    #[tracing::instrument(skip(self))]
    async fn find_template_id(&self, slug: &str) -> DbResult<Option<Uuid>> {
        let id = sqlx::query_scalar::<_, Uuid>("SELECT id FROM game_templates WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(id)
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_name_and_template(&self, name: &str, slug: &str) -> DbResult<Option<Uuid>> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT g.id
            FROM games g
            JOIN game_templates t ON t.id = g.game_template_id
            WHERE g.name = $1 AND t.slug = $2
            LIMIT 1
            "#,
        )
        .bind(name)
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;
        Ok(id)
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<GameRecord>> {
        let record = sqlx::query_as::<_, GameRecord>(&format!("{} WHERE g.id = $1", SELECT_GAME))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(record)
    }

    #[tracing::instrument(skip(self, game), fields(game_id = %game.id, name = %game.name))]
    async fn create(&self, game: NewGame) -> DbResult<Uuid> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO games (id, game_template_id, creator_id, name, description,
                               thumbnail_image, is_published, game_json)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(game.id)
        .bind(game.template_id)
        .bind(game.creator_id)
        .bind(&game.name)
        .bind(&game.description)
        .bind(&game.thumbnail_path)
        .bind(game.is_published)
        .bind(&game.game_json)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                return DbError::duplicate("Game", &game.name);
            }
            DbError::Sqlx(e)
        })?;

        tracing::debug!("Game row inserted");
        Ok(id)
    }

    #[tracing::instrument(skip(self, changes), fields(game_id = %id))]
    async fn update(&self, id: Uuid, changes: GameChanges) -> DbResult<GameRecord> {
        let name = changes.name.clone();
        let record = sqlx::query_as::<_, GameRecord>(
            r#"
            WITH updated AS (
                UPDATE games SET
                    name = COALESCE($2, name),
                    description = COALESCE($3, description),
                    thumbnail_image = COALESCE($4, thumbnail_image),
                    is_published = COALESCE($5, is_published),
                    game_json = COALESCE($6, game_json),
                    updated_at = NOW()
                WHERE id = $1
                RETURNING *
            )
            SELECT u.id, u.game_template_id AS template_id, t.slug AS template_slug,
                   u.creator_id, u.name, u.description, u.thumbnail_image,
                   u.is_published, u.game_json, u.created_at, u.updated_at
            FROM updated u
            JOIN game_templates t ON t.id = u.game_template_id
            "#,
        )
        .bind(id)
        .bind(changes.name)
        .bind(changes.description)
        .bind(changes.thumbnail_path)
        .bind(changes.is_published)
        .bind(changes.game_json)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                return DbError::duplicate("Game", name.as_deref().unwrap_or_default());
            }
            DbError::Sqlx(e)
        })?;

        record.ok_or_else(|| DbError::not_found("Game", &id.to_string()))
    }
}
