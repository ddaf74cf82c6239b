//! Common test utilities for Playdeck server integration tests
//!
//! The router under test is the real one from [`playdeck_server::api`]; only
//! the database gateway and the upload target are swapped for in-memory
//! implementations.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::TestApp;
//!
//! #[tokio::test]
//! async fn test_health() {
//!     let app = TestApp::new();
//!     let (status, _) = app.get("/health").await;
//!     assert_eq!(status, axum::http::StatusCode::OK);
//! }
//! ```

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::Utc;
use http_body_util::BodyExt;
use playdeck_server::{
    api,
    config::Config,
    db::{DbError, DbResult, GameChanges, GameRecord, GameRepository, NewGame},
    features::FeatureState,
    middleware::{USER_ID_HEADER, USER_ROLE_HEADER},
    storage::{object_key, BlobStore, StorageError, UploadFile},
};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEMPLATE_SLUGS: [&str; 3] = ["speed-sorting", "quiz", "pair-or-no-pair"];

// ============================================================================
// In-memory game gateway
// ============================================================================

#[derive(Default)]
pub struct InMemoryGameRepository {
    templates: HashMap<String, Uuid>,
    games: Mutex<HashMap<Uuid, GameRecord>>,
    writes: Mutex<usize>,
}

impl InMemoryGameRepository {
    /// Repository with every template row seeded.
    pub fn seeded() -> Self {
        let templates = TEMPLATE_SLUGS
            .iter()
            .map(|slug| (slug.to_string(), Uuid::new_v4()))
            .collect();
        Self {
            templates,
            ..Self::default()
        }
    }

    /// Repository without a speed-sorting template row.
    pub fn without_templates() -> Self {
        Self::default()
    }

    /// Insert a record directly, bypassing the API.
    pub fn insert_game(&self, slug: &str, creator_id: Uuid, name: &str, game_json: Value) -> Uuid {
        let id = Uuid::new_v4();
        let record = GameRecord {
            id,
            template_id: self.templates.get(slug).copied().unwrap_or_else(Uuid::new_v4),
            template_slug: slug.to_string(),
            creator_id,
            name: name.to_string(),
            description: None,
            thumbnail_path: format!("game/{}/{}/thumbnail.png", slug, id),
            is_published: false,
            game_json,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.games.lock().unwrap().insert(id, record);
        id
    }

    pub fn get(&self, id: Uuid) -> Option<GameRecord> {
        self.games.lock().unwrap().get(&id).cloned()
    }

    pub fn game_count(&self) -> usize {
        self.games.lock().unwrap().len()
    }

    /// Number of successful create and update calls.
    pub fn write_count(&self) -> usize {
        *self.writes.lock().unwrap()
    }

    fn slug_of(&self, template_id: Uuid) -> Option<String> {
        self.templates
            .iter()
            .find(|(_, id)| **id == template_id)
            .map(|(slug, _)| slug.clone())
    }
}

#[async_trait]
impl GameRepository for InMemoryGameRepository {
    async fn ping(&self) -> DbResult<()> {
        Ok(())
    }

    async fn find_template_id(&self, slug: &str) -> DbResult<Option<Uuid>> {
        Ok(self.templates.get(slug).copied())
    }

    async fn find_by_name_and_template(&self, name: &str, slug: &str) -> DbResult<Option<Uuid>> {
        Ok(self
            .games
            .lock()
            .unwrap()
            .values()
            .find(|g| g.name == name && g.template_slug == slug)
            .map(|g| g.id))
    }

    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<GameRecord>> {
        Ok(self.get(id))
    }

    async fn create(&self, game: NewGame) -> DbResult<Uuid> {
        let slug = self
            .slug_of(game.template_id)
            .ok_or_else(|| DbError::not_found("Template", &game.template_id.to_string()))?;
        let mut games = self.games.lock().unwrap();
        if games
            .values()
            .any(|g| g.name == game.name && g.template_id == game.template_id)
        {
            return Err(DbError::duplicate("Game", &game.name));
        }
        let now = Utc::now();
        games.insert(
            game.id,
            GameRecord {
                id: game.id,
                template_id: game.template_id,
                template_slug: slug,
                creator_id: game.creator_id,
                name: game.name,
                description: game.description,
                thumbnail_path: game.thumbnail_path,
                is_published: game.is_published,
                game_json: game.game_json,
                created_at: now,
                updated_at: now,
            },
        );
        *self.writes.lock().unwrap() += 1;
        Ok(game.id)
    }

    async fn update(&self, id: Uuid, changes: GameChanges) -> DbResult<GameRecord> {
        let mut games = self.games.lock().unwrap();
        let template_id = games
            .get(&id)
            .map(|g| g.template_id)
            .ok_or_else(|| DbError::not_found("Game", &id.to_string()))?;
        if let Some(ref name) = changes.name {
            if games
                .values()
                .any(|g| g.id != id && &g.name == name && g.template_id == template_id)
            {
                return Err(DbError::duplicate("Game", name));
            }
        }
        let record = games
            .get_mut(&id)
            .ok_or_else(|| DbError::not_found("Game", &id.to_string()))?;
        if let Some(name) = changes.name {
            record.name = name;
        }
        if let Some(description) = changes.description {
            record.description = Some(description);
        }
        if let Some(path) = changes.thumbnail_path {
            record.thumbnail_path = path;
        }
        if let Some(published) = changes.is_published {
            record.is_published = published;
        }
        if let Some(game_json) = changes.game_json {
            record.game_json = game_json;
        }
        record.updated_at = Utc::now();
        let updated = record.clone();
        drop(games);
        *self.writes.lock().unwrap() += 1;
        Ok(updated)
    }
}

// ============================================================================
// In-memory blob stores
// ============================================================================

/// Records every upload and returns `<prefix>/<filename>`.
#[derive(Default)]
pub struct MemoryBlobStore {
    uploads: Mutex<Vec<(String, UploadFile)>>,
}

impl MemoryBlobStore {
    pub fn uploads(&self) -> Vec<(String, UploadFile)> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(&self, prefix: &str, file: UploadFile) -> Result<String, StorageError> {
        let key = object_key(prefix, &file.filename);
        self.uploads.lock().unwrap().push((key.clone(), file));
        Ok(key)
    }
}

/// Rejects every upload.
pub struct FailingBlobStore;

#[async_trait]
impl BlobStore for FailingBlobStore {
    async fn upload(&self, prefix: &str, file: UploadFile) -> Result<String, StorageError> {
        Err(StorageError::Upload {
            key: object_key(prefix, &file.filename),
            message: "bucket unreachable".to_string(),
        })
    }
}

// ============================================================================
// Multipart bodies
// ============================================================================

pub const BOUNDARY: &str = "playdeck-test-boundary";

#[derive(Default)]
pub struct MultipartBody {
    buf: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.buf.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, filename: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.buf.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                BOUNDARY, name, filename, content_type
            )
            .as_bytes(),
        );
        self.buf.extend_from_slice(bytes);
        self.buf.extend_from_slice(b"\r\n");
        self
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.buf
            .extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        self.buf
    }
}

// ============================================================================
// Test application
// ============================================================================

/// Caller identity sent with a request.
#[derive(Debug, Clone, Copy)]
pub struct Caller {
    pub id: Uuid,
    pub role: &'static str,
}

impl Caller {
    pub fn user() -> Self {
        Self {
            id: Uuid::new_v4(),
            role: "USER",
        }
    }

    pub fn admin() -> Self {
        Self {
            id: Uuid::new_v4(),
            role: "SUPER_ADMIN",
        }
    }
}

pub struct TestApp {
    pub router: Router,
    pub games: Arc<InMemoryGameRepository>,
    pub store: Arc<MemoryBlobStore>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_repository(InMemoryGameRepository::seeded())
    }

    pub fn with_repository(games: InMemoryGameRepository) -> Self {
        let games = Arc::new(games);
        let store = Arc::new(MemoryBlobStore::default());
        let state = FeatureState::new(games.clone(), store.clone());
        Self {
            router: api::create_router(state, &Config::default()),
            games,
            store,
        }
    }

    /// Router whose uploads always fail.
    pub fn with_failing_storage() -> (Router, Arc<InMemoryGameRepository>) {
        let games = Arc::new(InMemoryGameRepository::seeded());
        let state = FeatureState::new(games.clone(), Arc::new(FailingBlobStore));
        (api::create_router(state, &Config::default()), games)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        send(&self.router, request).await
    }

    pub async fn multipart(
        &self,
        method: &str,
        uri: &str,
        caller: Option<Caller>,
        body: MultipartBody,
    ) -> (StatusCode, Value) {
        send(&self.router, multipart_request(method, uri, caller, body)).await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .uri(uri)
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        send(&self.router, request).await
    }
}

pub fn multipart_request(
    method: &str,
    uri: &str,
    caller: Option<Caller>,
    body: MultipartBody,
) -> Request<Body> {
    let mut builder = Request::builder()
        .uri(uri)
        .method(method)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        );
    if let Some(caller) = caller {
        builder = builder
            .header(USER_ID_HEADER, caller.id.to_string())
            .header(USER_ROLE_HEADER, caller.role);
    }
    builder.body(Body::from(body.finish())).unwrap()
}

/// Send a request and decode the JSON body (`Value::Null` when empty).
pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).to_string())
        })
    };
    (status, body)
}
