//! Actor extractor.
//!
//! Requests are authenticated by an upstream identity proxy, which passes the
//! user ID in the `x-user-id` header. Handlers that write take a
//! [`RequireActor`] argument; reads do not need one.

use axum::{extract::FromRequestParts, http::request::Parts};

use wayfarer_core::{User, UserId};

use crate::db::StoreError;
use crate::error::{AppError, set_sentry_user};
use crate::state::AppState;

/// The HTTP header carrying the acting user's ID.
pub const ACTOR_HEADER: &str = "x-user-id";

/// Extractor that requires a known acting user.
///
/// Rejects with 401 if the header is missing, malformed, or names a user
/// that does not exist.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireActor(actor): RequireActor) -> String {
///     format!("Hello, {}!", actor.username)
/// }
/// ```
pub struct RequireActor(pub User);

impl FromRequestParts<AppState> for RequireActor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(ACTOR_HEADER)
            .ok_or_else(|| AppError::Unauthorized(format!("missing {ACTOR_HEADER} header")))?
            .to_str()
            .ok()
            .and_then(|value| value.trim().parse::<i32>().ok())
            .map(UserId::new)
            .ok_or_else(|| AppError::Unauthorized(format!("invalid {ACTOR_HEADER} header")))?;

        let user = match state.store().get_user(id).await {
            Ok(user) => user,
            Err(StoreError::NotFound { .. }) => {
                return Err(AppError::Unauthorized(format!("unknown user {id}")));
            }
            Err(e) => return Err(e.into()),
        };

        set_sentry_user(&user.id, Some(&user.username));
        tracing::Span::current().record("user_id", user.id.as_i32());

        Ok(Self(user))
    }
}

/// Reject unless `actor` is `owner`.
///
/// # Errors
///
/// Returns [`AppError::Forbidden`] naming `what` when the IDs differ.
pub fn ensure_owner(actor: &User, owner: UserId, what: &str) -> Result<(), AppError> {
    if actor.id == owner {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "only the {what} may change this resource"
        )))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::http::Request;
    use chrono::Utc;
    use wayfarer_core::{Email, NewUser};

    use super::*;
    use crate::db::{MemoryStore, UserStore};

    async fn state_with_user() -> (AppState, User) {
        let store = MemoryStore::new();
        let user = store
            .create_user(NewUser {
                username: "sarah_jones".to_owned(),
                email: Email::parse("sarah@example.com").unwrap(),
                first_name: "Sarah".to_owned(),
                last_name: "Jones".to_owned(),
                password_hash: String::new(),
                is_superuser: false,
            })
            .await
            .unwrap();
        (AppState::new(Arc::new(store)), user)
    }

    async fn extract(state: &AppState, header: Option<&str>) -> Result<RequireActor, AppError> {
        let mut builder = Request::builder().uri("/api/listings");
        if let Some(value) = header {
            builder = builder.header(ACTOR_HEADER, value);
        }
        let (mut parts, ()) = builder.body(()).unwrap().into_parts();
        RequireActor::from_request_parts(&mut parts, state).await
    }

    #[tokio::test]
    async fn test_known_user_is_accepted() {
        let (state, user) = state_with_user().await;
        let RequireActor(actor) = extract(&state, Some(&user.id.to_string())).await.unwrap();
        assert_eq!(actor.id, user.id);
    }

    #[tokio::test]
    async fn test_missing_malformed_or_unknown_is_unauthorized() {
        let (state, _) = state_with_user().await;
        for header in [None, Some("abc"), Some("999")] {
            let err = extract(&state, header).await.err().unwrap();
            assert!(matches!(err, AppError::Unauthorized(_)), "{header:?}");
        }
    }

    #[test]
    fn test_ensure_owner() {
        let now = Utc::now();
        let user = User {
            id: UserId::new(1),
            username: "john_doe".to_owned(),
            email: Email::parse("john@example.com").unwrap(),
            first_name: String::new(),
            last_name: String::new(),
            password_hash: String::new(),
            is_superuser: false,
            created_at: now,
            updated_at: now,
        };
        assert!(ensure_owner(&user, UserId::new(1), "host").is_ok());
        assert!(matches!(
            ensure_owner(&user, UserId::new(2), "host"),
            Err(AppError::Forbidden(_))
        ));
    }
}
