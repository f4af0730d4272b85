use crate::auth::AuthError;
use crate::types::DbId;
use crate::validation::deck::DeckValidation;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// The deck does not exist or belongs to someone else. The two cases are
    /// deliberately indistinguishable to the caller.
    #[error("Deck {id} not found or not owned by the requesting user")]
    DeckNotFound { id: DbId },

    #[error("Unauthorized: {0}")]
    Unauthorized(#[from] AuthError),

    #[error("Validation failed: {0}")]
    Validation(String),

    /// The deck breaks one or more construction rules.
    #[error("Deck is invalid: {}", .0.errors.join("; "))]
    InvalidDeck(DeckValidation),

    #[error("Internal error: {0}")]
    Internal(String),
}
