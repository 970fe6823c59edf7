//! Micropost endpoints and the feed.

use api_types::{
    PageQuery,
    micropost::{FeedPage, MicropostNew, MicropostView},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::{Method, Uri},
};
use engine::{EngineError, microposts};

use crate::{
    FlashRedirect, ServerError,
    filters::{CurrentUser, logged_in_user},
    server::ServerState,
};

pub(crate) fn micropost_view(micropost: &microposts::Model) -> MicropostView {
    MicropostView {
        id: micropost.id,
        content: micropost.content.clone(),
        user_id: micropost.user_id,
        created_at: micropost.created_at,
    }
}

pub async fn feed(
    Extension(current): Extension<CurrentUser>,
    State(state): State<ServerState>,
    method: Method,
    uri: Uri,
    Query(query): Query<PageQuery>,
) -> Result<Json<FeedPage>, ServerError> {
    let current = logged_in_user(&current, &method, &uri)?;

    let page = state.engine.feed(current.id, query.page).await?;
    Ok(Json(FeedPage {
        microposts: page.items.iter().map(micropost_view).collect(),
        page: page.page,
        total_pages: page.total_pages,
    }))
}

pub async fn create(
    Extension(current): Extension<CurrentUser>,
    State(state): State<ServerState>,
    method: Method,
    uri: Uri,
    Json(payload): Json<MicropostNew>,
) -> Result<FlashRedirect, ServerError> {
    let current = logged_in_user(&current, &method, &uri)?;

    let micropost = state
        .engine
        .create_micropost(current.id, &payload.content)
        .await?;
    tracing::debug!("user {} posted micropost {}", current.id, micropost.id);

    Ok(FlashRedirect::success("/", "Micropost created!"))
}

/// Somebody else's micropost sends the user home, like the profile guards.
pub async fn destroy(
    Extension(current): Extension<CurrentUser>,
    State(state): State<ServerState>,
    method: Method,
    uri: Uri,
    Path(id): Path<i32>,
) -> Result<FlashRedirect, ServerError> {
    let current = logged_in_user(&current, &method, &uri)?;

    match state.engine.delete_micropost(id, current.id).await {
        Ok(()) => Ok(FlashRedirect::success("/", "Micropost deleted")),
        Err(EngineError::Forbidden(_)) => Ok(FlashRedirect::to("/")),
        Err(err) => Err(err.into()),
    }
}
