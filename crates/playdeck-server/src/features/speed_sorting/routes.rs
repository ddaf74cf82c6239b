//! Speed-sorting API routes
//!
//! # Route Structure
//!
//! - `POST /api/v1/games/speed-sorting` - Create a game (multipart, caller required)
//! - `PATCH /api/v1/games/speed-sorting/:game_id` - Update a game (multipart, owner or admin)
//! - `POST /api/v1/games/speed-sorting/:game_id/play` - Fetch a published game for play (JSON)

use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::{JsonRejection, PathRejection},
        Multipart, Path, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{patch, post},
    Json, Router,
};
use serde_json::json;
use uuid::Uuid;

use super::{
    assembler::AssemblyError,
    commands::{
        CreateSpeedSortingCommand, CreateSpeedSortingError, UpdateSpeedSortingCommand,
        UpdateSpeedSortingError,
    },
    form::{FormError, SpeedSortingForm},
    play_config::RawPlayConfig,
    queries::{PlaySpeedSortingError, PlaySpeedSortingQuery},
};
use crate::api::response::{ApiResponse, ErrorResponse};
use crate::features::FeatureState;
use crate::middleware::ActingUser;

// ============================================================================
// Router Configuration
// ============================================================================

pub fn speed_sorting_routes() -> Router<FeatureState> {
    Router::new()
        .route("/", post(create_speed_sorting))
        .route("/:game_id", patch(update_speed_sorting))
        .route("/:game_id/play", post(play_speed_sorting))
}

// ============================================================================
// Command Handlers (Write Operations)
// ============================================================================

/// Create a new speed-sorting game
///
/// # Endpoint
///
/// `POST /api/v1/games/speed-sorting`
///
/// # Response
///
/// - `201 Created` - `{ "id": "<uuid>" }`
/// - `400 Bad Request` - Validation error
/// - `401 Unauthorized` - Missing caller identity
/// - `500 Internal Server Error` - Storage or database error
#[tracing::instrument(skip(state, multipart), fields(user_id = %user.id))]
async fn create_speed_sorting(
    State(state): State<FeatureState>,
    user: ActingUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, SpeedSortingApiError> {
    let multipart = multipart.map_err(|e| FormError::Multipart(e.body_text()))?;
    let form = SpeedSortingForm::from_multipart(multipart).await?;
    let command = CreateSpeedSortingCommand::from_form(user.id, form)?;

    let response =
        super::commands::create::handle(state.games.as_ref(), state.storage.as_ref(), command)
            .await?;

    tracing::info!(game_id = %response.id, "Speed-sorting game created via API");

    Ok((StatusCode::CREATED, Json(ApiResponse::success(response))).into_response())
}

/// Update an existing speed-sorting game
///
/// # Endpoint
///
/// `PATCH /api/v1/games/speed-sorting/:game_id`
///
/// # Response
///
/// - `200 OK` - `{ "id": "<uuid>", "game_json": {...} }`
/// - `400 Bad Request` - Validation error or wrong template
/// - `401 Unauthorized` - Missing caller identity
/// - `403 Forbidden` - Caller is neither creator nor super admin
/// - `404 Not Found` - Game not found
/// - `500 Internal Server Error` - Storage or database error
#[tracing::instrument(skip(state, game_id, multipart), fields(user_id = %user.id))]
async fn update_speed_sorting(
    State(state): State<FeatureState>,
    game_id: Result<Path<Uuid>, PathRejection>,
    user: ActingUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, SpeedSortingApiError> {
    let Path(game_id) = game_id.map_err(|_| SpeedSortingApiError::InvalidGameId)?;
    let multipart = multipart.map_err(|e| FormError::Multipart(e.body_text()))?;
    let form = SpeedSortingForm::from_multipart(multipart).await?;
    let command = UpdateSpeedSortingCommand::from_form(game_id, user, form);

    let response =
        super::commands::update::handle(state.games.as_ref(), state.storage.as_ref(), command)
            .await?;

    tracing::info!(game_id = %response.id, "Speed-sorting game updated via API");

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

// ============================================================================
// Query Handlers (Read Operations)
// ============================================================================

/// Fetch a published game with validated play settings
///
/// # Endpoint
///
/// `POST /api/v1/games/speed-sorting/:game_id/play`
///
/// # Request Body
///
/// ```json
/// { "timer_mode": "COUNT_DOWN", "timer_duration": 90, "speed": 400, "lives": 3 }
/// ```
///
/// # Response
///
/// - `200 OK` - Game content plus resolved config
/// - `400 Bad Request` - Invalid config or wrong template
/// - `403 Forbidden` - Game is not published
/// - `404 Not Found` - Game not found
#[tracing::instrument(skip(state, game_id, body))]
async fn play_speed_sorting(
    State(state): State<FeatureState>,
    game_id: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<RawPlayConfig>, JsonRejection>,
) -> Result<Response, SpeedSortingApiError> {
    let Path(game_id) = game_id.map_err(|_| SpeedSortingApiError::InvalidGameId)?;
    let Json(config) = body.map_err(|e| SpeedSortingApiError::InvalidBody(e.body_text()))?;

    let query = PlaySpeedSortingQuery { game_id, config };
    let response = super::queries::play::handle(state.games.as_ref(), query).await?;

    tracing::debug!(game_id = %response.id, "Speed-sorting game served for play");

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Unified error type for speed-sorting endpoints
#[derive(Debug)]
enum SpeedSortingApiError {
    InvalidGameId,
    InvalidBody(String),
    FormError(FormError),
    CreateError(CreateSpeedSortingError),
    UpdateError(UpdateSpeedSortingError),
    PlayError(PlaySpeedSortingError),
}

impl From<FormError> for SpeedSortingApiError {
    fn from(err: FormError) -> Self {
        Self::FormError(err)
    }
}

impl From<CreateSpeedSortingError> for SpeedSortingApiError {
    fn from(err: CreateSpeedSortingError) -> Self {
        Self::CreateError(err)
    }
}

impl From<UpdateSpeedSortingError> for SpeedSortingApiError {
    fn from(err: UpdateSpeedSortingError) -> Self {
        Self::UpdateError(err)
    }
}

impl From<PlaySpeedSortingError> for SpeedSortingApiError {
    fn from(err: PlaySpeedSortingError) -> Self {
        Self::PlayError(err)
    }
}

fn validation(message: String) -> Response {
    ErrorResponse::new("VALIDATION_ERROR", message).into_response_with(StatusCode::BAD_REQUEST)
}

fn storage_failure(context: &str, message: String) -> Response {
    tracing::error!("Storage error during {}: {}", context, message);
    ErrorResponse::new("STORAGE_ERROR", "A storage error occurred")
        .into_response_with(StatusCode::INTERNAL_SERVER_ERROR)
}

fn internal(context: &str, message: String) -> Response {
    tracing::error!("Internal error during {}: {}", context, message);
    ErrorResponse::new("INTERNAL_ERROR", "An internal error occurred")
        .into_response_with(StatusCode::INTERNAL_SERVER_ERROR)
}

fn database(context: &str, message: String) -> Response {
    tracing::error!("Database error during {}: {}", context, message);
    ErrorResponse::new("INTERNAL_ERROR", "A database error occurred")
        .into_response_with(StatusCode::INTERNAL_SERVER_ERROR)
}

fn not_found(message: String) -> Response {
    ErrorResponse::new("NOT_FOUND", message).into_response_with(StatusCode::NOT_FOUND)
}

fn wrong_template(message: String) -> Response {
    ErrorResponse::new("WRONG_TEMPLATE", message).into_response_with(StatusCode::BAD_REQUEST)
}

fn forbidden(message: String) -> Response {
    ErrorResponse::new("FORBIDDEN", message).into_response_with(StatusCode::FORBIDDEN)
}

impl IntoResponse for SpeedSortingApiError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        match self {
            SpeedSortingApiError::InvalidGameId
            | SpeedSortingApiError::InvalidBody(_)
            | SpeedSortingApiError::FormError(_) => validation(message),

            // Create errors
            SpeedSortingApiError::CreateError(CreateSpeedSortingError::MissingField(_))
            | SpeedSortingApiError::CreateError(CreateSpeedSortingError::Validation(_))
            | SpeedSortingApiError::CreateError(CreateSpeedSortingError::Thumbnail(_))
            | SpeedSortingApiError::CreateError(CreateSpeedSortingError::DuplicateName)
            | SpeedSortingApiError::CreateError(CreateSpeedSortingError::Assembly(
                AssemblyError::InvalidCategoryIndex { .. } | AssemblyError::Classification(_),
            )) => validation(message),
            SpeedSortingApiError::CreateError(CreateSpeedSortingError::Assembly(
                AssemblyError::Storage { .. },
            ))
            | SpeedSortingApiError::CreateError(CreateSpeedSortingError::Storage(_)) => {
                storage_failure("game creation", message)
            },
            SpeedSortingApiError::CreateError(CreateSpeedSortingError::TemplateMissing) => {
                internal("game creation", message)
            },
            SpeedSortingApiError::CreateError(CreateSpeedSortingError::Database(_)) => {
                database("game creation", message)
            },

            // Update errors
            SpeedSortingApiError::UpdateError(UpdateSpeedSortingError::NotFound(_)) => {
                not_found(message)
            },
            SpeedSortingApiError::UpdateError(UpdateSpeedSortingError::WrongTemplate) => {
                wrong_template(message)
            },
            SpeedSortingApiError::UpdateError(UpdateSpeedSortingError::Forbidden(_)) => {
                forbidden(message)
            },
            SpeedSortingApiError::UpdateError(UpdateSpeedSortingError::NoFieldsToUpdate)
            | SpeedSortingApiError::UpdateError(UpdateSpeedSortingError::DatasetIncomplete)
            | SpeedSortingApiError::UpdateError(UpdateSpeedSortingError::Validation(_))
            | SpeedSortingApiError::UpdateError(UpdateSpeedSortingError::Thumbnail(_))
            | SpeedSortingApiError::UpdateError(UpdateSpeedSortingError::DuplicateName)
            | SpeedSortingApiError::UpdateError(UpdateSpeedSortingError::Assembly(
                AssemblyError::InvalidCategoryIndex { .. } | AssemblyError::Classification(_),
            )) => validation(message),
            SpeedSortingApiError::UpdateError(UpdateSpeedSortingError::Assembly(
                AssemblyError::Storage { .. },
            ))
            | SpeedSortingApiError::UpdateError(UpdateSpeedSortingError::Storage(_)) => {
                storage_failure("game update", message)
            },
            SpeedSortingApiError::UpdateError(UpdateSpeedSortingError::CorruptDataset(_)) => {
                internal("game update", message)
            },
            SpeedSortingApiError::UpdateError(UpdateSpeedSortingError::Database(_)) => {
                database("game update", message)
            },

            // Play errors
            SpeedSortingApiError::PlayError(PlaySpeedSortingError::NotFound(_)) => {
                not_found(message)
            },
            SpeedSortingApiError::PlayError(PlaySpeedSortingError::WrongTemplate) => {
                wrong_template(message)
            },
            SpeedSortingApiError::PlayError(PlaySpeedSortingError::NotPublished) => {
                forbidden(message)
            },
            SpeedSortingApiError::PlayError(PlaySpeedSortingError::InvalidConfig(ref err)) => {
                ErrorResponse::with_details("VALIDATION_ERROR", message, json!({ "field": err.field() }))
                    .into_response_with(StatusCode::BAD_REQUEST)
            },
            SpeedSortingApiError::PlayError(PlaySpeedSortingError::CorruptDataset(_)) => {
                internal("play lookup", message)
            },
            SpeedSortingApiError::PlayError(PlaySpeedSortingError::Database(_)) => {
                database("play lookup", message)
            },
        }
    }
}

impl std::fmt::Display for SpeedSortingApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidGameId => write!(f, "game_id must be a valid UUID"),
            Self::InvalidBody(e) => write!(f, "Invalid request body: {}", e),
            Self::FormError(e) => write!(f, "{}", e),
            Self::CreateError(e) => write!(f, "{}", e),
            Self::UpdateError(e) => write!(f, "{}", e),
            Self::PlayError(e) => write!(f, "{}", e),
        }
    }
}
