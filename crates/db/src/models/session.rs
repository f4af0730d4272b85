//! Bearer session model.

use decklab_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `sessions` table.
///
/// Not `Serialize`: the token never leaves the server.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub id: DbId,
    pub token: String,
    pub user_id: DbId,
    pub created_at: Timestamp,
    /// `None` means the session never expires on its own.
    pub expires_at: Option<Timestamp>,
}

impl Session {
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }
}

/// DTO for inserting a session. Used by the identity service's fixtures and
/// by tests; this service never issues tokens itself.
#[derive(Debug, Clone)]
pub struct CreateSession {
    pub token: String,
    pub user_id: DbId,
    pub expires_at: Option<Timestamp>,
}
