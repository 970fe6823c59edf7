use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

use std::sync::Arc;

use crate::{filters::CurrentUser, microposts, password_resets, relationships, sessions, users};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// Split a `"{user_id}.{token}"` bearer credential.
///
/// Tokens are URL-safe base64 and never contain a dot.
fn parse_credential(credential: &str) -> Option<(i32, &str)> {
    let (user_id, token) = credential.split_once('.')?;
    let user_id = user_id.parse().ok()?;
    (!token.is_empty()).then_some((user_id, token))
}

/// Resolve the logged in user, if any, and expose it to the handlers.
///
/// A missing, malformed or stale credential is not an error: the request
/// simply continues as anonymous and the per-route filters decide.
async fn current_user(
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Response {
    let mut user = None;
    if let Some(TypedHeader(Authorization(bearer))) = bearer
        && let Some((user_id, token)) = parse_credential(bearer.token())
    {
        match state.engine.user_from_remember_token(user_id, token).await {
            Ok(found) => user = found,
            Err(err) => tracing::error!("failed to resolve remember token: {err}"),
        }
    }

    if user.is_none() {
        tracing::debug!("anonymous request to {}", request.uri().path());
    }
    request.extensions_mut().insert(CurrentUser(user));
    next.run(request).await
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route("/users", get(users::index).post(users::create))
        .route("/users/new", get(users::new))
        .route(
            "/users/{id}",
            get(users::show)
                .patch(users::update)
                .delete(users::destroy),
        )
        .route("/users/{id}/edit", get(users::edit))
        .route("/users/{id}/following", get(relationships::following))
        .route("/users/{id}/followers", get(relationships::followers))
        .route("/signup", get(users::new))
        .route("/login", post(sessions::create))
        .route("/logout", delete(sessions::destroy))
        .route("/feed", get(microposts::feed))
        .route("/microposts", post(microposts::create))
        .route("/microposts/{id}", delete(microposts::destroy))
        .route("/relationships", post(relationships::create))
        .route("/relationships/{followed_id}", delete(relationships::destroy))
        .route("/password_resets", post(password_resets::create))
        .route(
            "/password_resets/{token}",
            axum::routing::patch(password_resets::update),
        )
        .layer(middleware::from_fn_with_state(state.clone(), current_user))
        .with_state(state)
}

/// The full application router around `engine`.
pub fn app(engine: Engine) -> Router {
    router(ServerState {
        engine: Arc::new(engine),
    })
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app(engine)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_is_id_dot_token() {
        assert_eq!(parse_credential("12.abc-_D"), Some((12, "abc-_D")));
        assert_eq!(parse_credential("12."), None);
        assert_eq!(parse_credential("x.abc"), None);
        assert_eq!(parse_credential("abc"), None);
    }
}
