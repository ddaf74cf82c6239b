use thiserror::Error;

use crate::db::GameRecord;
use crate::middleware::ActingUser;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("You are not allowed to update this game")]
pub struct ForbiddenError;

/// Only the creator or a super admin may mutate a game.
pub fn authorize(record: &GameRecord, user: &ActingUser) -> Result<(), ForbiddenError> {
    if user.id == record.creator_id || user.role.is_admin() {
        return Ok(());
    }
    tracing::warn!(
        game_id = %record.id,
        user_id = %user.id,
        role = %user.role,
        "Update rejected for non-owner"
    );
    Err(ForbiddenError)
}
