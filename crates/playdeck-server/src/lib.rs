//! Playdeck Server Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! HTTP backend for authoring and playing educational mini-games.
//!
//! # Overview
//!
//! - **API Endpoints**: create, update and play games per template
//! - **Database Management**: PostgreSQL integration with SQLx
//! - **Storage Backend**: S3-compatible upload target for images
//! - **Configuration**: Environment-based configuration management
//! - **Middleware**: CORS, request logging and caller identity
//!
//! # Architecture
//!
//! Each game template is a feature slice under [`features`]:
//!
//! - **Commands** (write operations) validate the whole submission before any
//!   upload or database write happens.
//! - **Queries** (read operations) never mutate state.
//!
//! Slices depend on the [`db::GameRepository`] and [`storage::BlobStore`]
//! traits rather than on concrete backends.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use playdeck_server::{api, config::Config, db, features::FeatureState, storage};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let pool = db::create_pool(&config.database).await?;
//!     let store = storage::Storage::new(storage::config::StorageConfig::from_env())?;
//!     let state = FeatureState::new(
//!         Arc::new(db::PgGameRepository::new(pool)),
//!         Arc::new(store),
//!     );
//!     let app = api::create_router(state, &config);
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod features;
pub mod middleware;
pub mod models;
pub mod storage;

// Re-export commonly used types
pub use error::AppError;
