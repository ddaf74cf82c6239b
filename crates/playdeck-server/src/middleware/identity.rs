//! Caller identity extractor
//!
//! Authentication happens upstream; the gateway forwards the resolved caller
//! as two headers. Handlers that need a caller take [`ActingUser`] as an
//! extractor argument:
//!
//! ```ignore
//! async fn my_handler(user: ActingUser) -> Result<Response, MyError> {
//!     tracing::info!(user_id = %user.id, role = %user.role, "handling request");
//!     ...
//! }
//! ```

use std::fmt;
use std::str::FromStr;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    User,
    SuperAdmin,
}

impl Role {
    pub fn is_admin(self) -> bool {
        matches!(self, Role::SuperAdmin)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::SuperAdmin => "SUPER_ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "USER" => Ok(Role::User),
            "SUPER_ADMIN" => Ok(Role::SuperAdmin),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// Authenticated caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActingUser {
    pub id: Uuid,
    pub role: Role,
}

impl ActingUser {
    pub fn new(id: Uuid, role: Role) -> Self {
        Self { id, role }
    }
}

fn header_str<'a>(parts: &'a Parts, name: &str) -> Result<&'a str, AppError> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized(format!("Missing {} header", name)))
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for ActingUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = header_str(parts, USER_ID_HEADER)?
            .trim()
            .parse::<Uuid>()
            .map_err(|_| AppError::Unauthorized(format!("Invalid {} header", USER_ID_HEADER)))?;

        let role = header_str(parts, USER_ROLE_HEADER)?
            .parse::<Role>()
            .map_err(|e| AppError::Unauthorized(format!("Invalid {} header: {}", USER_ROLE_HEADER, e)))?;

        Ok(ActingUser { id, role })
    }
}
