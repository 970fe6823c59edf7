//! Password reset requests and the reset itself.
//!
//! Mail delivery is out of scope: the reset link is written to the log.

use api_types::{
    flash::{Flash, FlashKind, RedirectBody},
    password_reset::{PasswordResetNew, PasswordResetUpdate},
    session::SessionCreated,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use engine::EngineError;

use crate::{FlashRedirect, ServerError, server::ServerState, users::engine_params};

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<PasswordResetNew>,
) -> Result<(StatusCode, Json<RedirectBody>), ServerError> {
    let (user, token) = state.engine.create_reset_digest(&payload.email).await?;
    tracing::info!(
        "password reset for user {}: /password_resets/{}?email={}",
        user.id,
        token,
        urlencoding::encode(&user.email)
    );

    Ok((
        StatusCode::ACCEPTED,
        Json(RedirectBody {
            location: "/".to_string(),
            flash: Some(Flash {
                kind: FlashKind::Info,
                message: "Email sent with password reset instructions".to_string(),
            }),
        }),
    ))
}

/// A successful reset logs the user in, handing out a fresh remember token.
pub async fn update(
    State(state): State<ServerState>,
    Path(token): Path<String>,
    Json(payload): Json<PasswordResetUpdate>,
) -> Result<Response, ServerError> {
    let params = engine_params(payload.user);
    let user = match state
        .engine
        .reset_password(&payload.email, &token, &params)
        .await
    {
        Ok(user) => user,
        Err(EngineError::InvalidToken(_)) => return Ok(FlashRedirect::to("/").into_response()),
        Err(EngineError::ExpiredToken(message)) => {
            return Ok(FlashRedirect::danger("/password_resets/new", &message).into_response());
        }
        Err(err) => return Err(err.into()),
    };

    let token = state.engine.remember(user.id).await?;
    tracing::info!("user {} reset their password", user.id);

    Ok(Json(SessionCreated {
        user_id: user.id,
        token,
        location: format!("/users/{}", user.id),
    })
    .into_response())
}
