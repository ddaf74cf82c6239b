//! Feature modules implementing the Playdeck API
//!
//! Each game template is a vertical slice with its own commands, queries
//! and routes.
//!
//! # Features
//!
//! - **speed_sorting**: Create, update and play speed-sorting games
//!
//! # Architecture
//!
//! Each feature module follows the structure:
//! - `commands/` - Write operations (create, update)
//! - `queries/` - Read operations (play)
//! - `routes.rs` - HTTP route definitions
//! - `types.rs` - Shared types and limits

pub mod shared;
pub mod speed_sorting;

use std::sync::Arc;

use axum::Router;

use crate::db::GameRepository;
use crate::storage::BlobStore;

/// Shared state for all feature routes
///
/// Handlers only see the game gateway and the upload primitive, so either
/// can be swapped for an in-memory implementation in tests.
#[derive(Clone)]
pub struct FeatureState {
    /// Game record gateway
    pub games: Arc<dyn GameRepository>,
    /// Upload target for thumbnails and item images
    pub storage: Arc<dyn BlobStore>,
}

impl FeatureState {
    pub fn new(games: Arc<dyn GameRepository>, storage: Arc<dyn BlobStore>) -> Self {
        Self { games, storage }
    }
}

/// Creates the feature router with every slice mounted
///
/// - `/games/speed-sorting` - Speed-sorting games
pub fn router(state: FeatureState) -> Router<()> {
    Router::new().nest(
        "/games/speed-sorting",
        speed_sorting::speed_sorting_routes().with_state(state),
    )
}
