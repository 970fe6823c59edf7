//! Follow/unfollow and the following/followers listings.

use api_types::{PageQuery, relationship::RelationshipNew, user::UsersPage};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::{Method, Uri, StatusCode},
};

use crate::{
    ServerError,
    filters::{CurrentUser, logged_in_user},
    server::ServerState,
    users::user_view,
};

pub async fn create(
    Extension(current): Extension<CurrentUser>,
    State(state): State<ServerState>,
    method: Method,
    uri: Uri,
    Json(payload): Json<RelationshipNew>,
) -> Result<StatusCode, ServerError> {
    let current = logged_in_user(&current, &method, &uri)?;
    state.engine.follow(current.id, payload.followed_id).await?;
    Ok(StatusCode::CREATED)
}

pub async fn destroy(
    Extension(current): Extension<CurrentUser>,
    State(state): State<ServerState>,
    method: Method,
    uri: Uri,
    Path(followed_id): Path<i32>,
) -> Result<StatusCode, ServerError> {
    let current = logged_in_user(&current, &method, &uri)?;
    state.engine.unfollow(current.id, followed_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn following(
    Extension(current): Extension<CurrentUser>,
    State(state): State<ServerState>,
    method: Method,
    uri: Uri,
    Path(id): Path<i32>,
    Query(query): Query<PageQuery>,
) -> Result<Json<UsersPage>, ServerError> {
    logged_in_user(&current, &method, &uri)?;
    let page = state.engine.following(id, query.page).await?;
    Ok(Json(UsersPage {
        users: page.items.iter().map(user_view).collect(),
        page: page.page,
        total_pages: page.total_pages,
    }))
}

pub async fn followers(
    Extension(current): Extension<CurrentUser>,
    State(state): State<ServerState>,
    method: Method,
    uri: Uri,
    Path(id): Path<i32>,
    Query(query): Query<PageQuery>,
) -> Result<Json<UsersPage>, ServerError> {
    logged_in_user(&current, &method, &uri)?;
    let page = state.engine.followers(id, query.page).await?;
    Ok(Json(UsersPage {
        users: page.items.iter().map(user_view).collect(),
        page: page.page,
        total_pages: page.total_pages,
    }))
}
