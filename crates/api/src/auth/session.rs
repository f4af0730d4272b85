//! Session Guard: bearer header -> identity.

use decklab_core::auth::{parse_bearer, AuthError, Identity};
use decklab_db::store::SessionStore;

use crate::error::AppResult;

/// Resolve a raw `Authorization` header value to the session's owner.
///
/// Header shape problems and unknown or expired tokens are
/// [`AuthError`]s (401). A failing store is a storage error (500), not an
/// authentication failure.
pub async fn resolve<S>(sessions: &S, header: Option<&str>) -> AppResult<Identity>
where
    S: SessionStore + ?Sized,
{
    let token = parse_bearer(header)?;

    let session = sessions
        .find_session_by_token(token.trim())
        .await?
        .ok_or(AuthError::UnknownToken)?;

    Ok(Identity {
        user_id: session.user_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use decklab_core::error::CoreError;
    use decklab_db::models::session::CreateSession;
    use decklab_db::store::MemoryStore;

    use crate::error::AppError;

    async fn store_with(token: &str, user_id: i64) -> MemoryStore {
        let store = MemoryStore::new();
        store
            .insert_session(CreateSession {
                token: token.into(),
                user_id,
                expires_at: None,
            })
            .await;
        store
    }

    #[tokio::test]
    async fn known_token_resolves_to_owner() {
        let store = store_with("abc", 42).await;
        let identity = resolve(&store, Some("Bearer abc")).await.unwrap();
        assert_eq!(identity, Identity { user_id: 42 });
    }

    #[tokio::test]
    async fn bare_token_is_malformed() {
        let store = store_with("abc", 42).await;
        assert_matches!(
            resolve(&store, Some("abc")).await,
            Err(AppError::Core(CoreError::Unauthorized(AuthError::MalformedToken)))
        );
    }

    #[tokio::test]
    async fn missing_header_is_rejected() {
        let store = store_with("abc", 42).await;
        assert_matches!(
            resolve(&store, None).await,
            Err(AppError::Core(CoreError::Unauthorized(AuthError::MissingToken)))
        );
    }

    #[tokio::test]
    async fn unknown_token_is_rejected() {
        let store = store_with("abc", 42).await;
        assert_matches!(
            resolve(&store, Some("Bearer unknown-token")).await,
            Err(AppError::Core(CoreError::Unauthorized(AuthError::UnknownToken)))
        );
    }
}
