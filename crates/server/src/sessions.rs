//! Login and logout.
//!
//! A successful login hands out a remember token; clients send it back as
//! `Authorization: Bearer {user_id}.{token}`.

use api_types::session::{SessionCreated, SessionNew};
use axum::{
    Extension, Json,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::{FlashRedirect, ServerError, filters::CurrentUser, server::ServerState};

/// Only same-site paths are accepted as forwarding targets.
fn forwarding_location(return_to: Option<String>, user_id: i32) -> String {
    return_to
        .filter(|path| path.starts_with('/') && !path.starts_with("//"))
        .unwrap_or_else(|| format!("/users/{user_id}"))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<SessionNew>,
) -> Result<Response, ServerError> {
    let Some(user) = state
        .engine
        .authenticate(&payload.email, &payload.password)
        .await?
    else {
        tracing::debug!("failed login attempt");
        return Err(ServerError::Unauthorized(
            "Invalid email/password combination".to_string(),
        ));
    };

    let token = state.engine.remember(user.id).await?;
    let location = forwarding_location(payload.return_to, user.id);
    tracing::info!("user {} logged in", user.id);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location.clone())],
        Json(SessionCreated {
            user_id: user.id,
            token,
            location,
        }),
    )
        .into_response())
}

/// Logging out while anonymous is harmless.
pub async fn destroy(
    Extension(current): Extension<CurrentUser>,
    State(state): State<ServerState>,
) -> Result<FlashRedirect, ServerError> {
    if let Some(user) = current.0 {
        state.engine.forget(user.id).await?;
        tracing::info!("user {} logged out", user.id);
    }
    Ok(FlashRedirect::to("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forwarding_defaults_to_profile() {
        assert_eq!(forwarding_location(None, 4), "/users/4");
        assert_eq!(
            forwarding_location(Some("/users/4/edit".to_string()), 4),
            "/users/4/edit"
        );
    }

    #[test]
    fn forwarding_rejects_foreign_hosts() {
        assert_eq!(
            forwarding_location(Some("https://evil.example".to_string()), 4),
            "/users/4"
        );
        assert_eq!(
            forwarding_location(Some("//evil.example".to_string()), 4),
            "/users/4"
        );
    }
}
