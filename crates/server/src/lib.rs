use api_types::{
    flash::{Flash, FlashKind, RedirectBody},
    user::FormErrors,
};
use axum::{
    Json,
    http::{StatusCode, header},
    response::IntoResponse,
};
use engine::EngineError;

use serde::Serialize;
pub use server::{app, run_with_listener};

mod filters;
mod microposts;
mod password_resets;
mod relationships;
mod server;
mod sessions;
mod users;

/// A `303 See Other` carrying an optional flash message in its body.
#[derive(Debug)]
pub struct FlashRedirect {
    location: String,
    flash: Option<Flash>,
}

impl FlashRedirect {
    pub fn to(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            flash: None,
        }
    }

    fn with(location: impl Into<String>, kind: FlashKind, message: &str) -> Self {
        Self {
            location: location.into(),
            flash: Some(Flash {
                kind,
                message: message.to_string(),
            }),
        }
    }

    pub fn success(location: impl Into<String>, message: &str) -> Self {
        Self::with(location, FlashKind::Success, message)
    }

    pub fn danger(location: impl Into<String>, message: &str) -> Self {
        Self::with(location, FlashKind::Danger, message)
    }
}

impl IntoResponse for FlashRedirect {
    fn into_response(self) -> axum::response::Response {
        (
            StatusCode::SEE_OTHER,
            [(header::LOCATION, self.location.clone())],
            Json(RedirectBody {
                location: self.location,
                flash: self.flash,
            }),
        )
            .into_response()
    }
}

#[derive(Debug)]
pub enum ServerError {
    Engine(EngineError),
    Redirect(FlashRedirect),
    Unauthorized(String),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::Validation(_)
        | EngineError::InvalidToken(_)
        | EngineError::ExpiredToken(_) => StatusCode::UNPROCESSABLE_ENTITY,
        EngineError::Digest(_) | EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        EngineError::Digest(digest_err) => {
            tracing::error!("digest error: {digest_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(EngineError::Validation(errors)) => {
                let body = FormErrors {
                    full_messages: errors.full_messages(),
                    errors: errors.fields().clone(),
                };
                return (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response();
            }
            ServerError::Redirect(redirect) => return redirect.into_response(),
            ServerError::Engine(err) => {
                (status_for_engine_error(&err), message_for_engine_error(err))
            }
            ServerError::Unauthorized(err) => (StatusCode::UNAUTHORIZED, err),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<FlashRedirect> for ServerError {
    fn from(value: FlashRedirect) -> Self {
        Self::Redirect(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::ValidationErrors;

    #[test]
    fn engine_forbidden_maps_to_403() {
        let res = ServerError::from(EngineError::Forbidden("forbidden".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::KeyNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_validation_maps_to_422() {
        let mut errors = ValidationErrors::new();
        errors.add("name", "can't be blank");
        let res = ServerError::from(EngineError::Validation(errors)).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn expired_token_maps_to_422() {
        let res = ServerError::from(EngineError::ExpiredToken("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn digest_failure_maps_to_500() {
        let res = ServerError::from(EngineError::Digest("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn redirect_sets_location() {
        let res = ServerError::from(FlashRedirect::danger("/login", "Please log in."))
            .into_response();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(res.headers()[header::LOCATION], "/login");
    }

    #[test]
    fn unauthorized_maps_to_401() {
        let res = ServerError::Unauthorized("nope".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
