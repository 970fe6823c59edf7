//! User account endpoints.
//!
//! | action  | route                  | guards                                  |
//! |---------|------------------------|-----------------------------------------|
//! | index   | `GET /users`           | logged in                               |
//! | new     | `GET /users/new`       |                                         |
//! | show    | `GET /users/{id}`      |                                         |
//! | create  | `POST /users`          |                                         |
//! | edit    | `GET /users/{id}/edit` | logged in, correct user                 |
//! | update  | `PATCH /users/{id}`    | logged in, correct user                 |
//! | destroy | `DELETE /users/{id}`   | logged in, admin                        |

use api_types::{
    PageQuery,
    user::{UserForm, UserFormView, UserParams, UserProfile, UserView, UsersPage},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::{Method, Uri},
};
use engine::users;

use crate::{
    FlashRedirect, ServerError,
    filters::{CurrentUser, admin_user, correct_user, logged_in_user},
    microposts::micropost_view,
    server::ServerState,
};

pub(crate) fn user_view(user: &users::Model) -> UserView {
    UserView {
        id: user.id,
        name: user.name.clone(),
        email: user.email.clone(),
        admin: user.admin,
    }
}

pub(crate) fn engine_params(params: UserParams) -> engine::UserParams {
    engine::UserParams {
        name: params.name,
        email: params.email,
        password: params.password,
        password_confirmation: params.password_confirmation,
    }
}

pub async fn index(
    Extension(current): Extension<CurrentUser>,
    State(state): State<ServerState>,
    method: Method,
    uri: Uri,
    Query(query): Query<PageQuery>,
) -> Result<Json<UsersPage>, ServerError> {
    logged_in_user(&current, &method, &uri)?;

    let page = state.engine.users(query.page).await?;
    Ok(Json(UsersPage {
        users: page.items.iter().map(user_view).collect(),
        page: page.page,
        total_pages: page.total_pages,
    }))
}

/// Empty sign-up form.
pub async fn new() -> Json<UserFormView> {
    Json(UserFormView::default())
}

pub async fn show(
    Extension(current): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Query(query): Query<PageQuery>,
) -> Result<Json<UserProfile>, ServerError> {
    let user = state.engine.user(id).await?;
    let microposts = state.engine.microposts_for(user.id, query.page).await?;
    let micropost_count = state.engine.count_microposts_for(user.id).await?;
    let (following_count, followers_count) = state.engine.follow_counts(user.id).await?;

    let followed_by_viewer = match &current.0 {
        Some(viewer) if !current.is(&user) => {
            Some(state.engine.is_following(viewer.id, user.id).await?)
        }
        _ => None,
    };

    Ok(Json(UserProfile {
        user: user_view(&user),
        microposts: microposts.items.iter().map(micropost_view).collect(),
        micropost_count,
        following_count,
        followers_count,
        followed_by_viewer,
    }))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(form): Json<UserForm>,
) -> Result<FlashRedirect, ServerError> {
    let user = state.engine.create_user(&engine_params(form.user)).await?;
    tracing::info!("user {} signed up", user.id);

    Ok(FlashRedirect::success(
        format!("/users/{}", user.id),
        "Sign up successful, welcome to the sample app! :)",
    ))
}

/// The profile form prefilled for its owner.
pub async fn edit(
    Extension(current): Extension<CurrentUser>,
    State(state): State<ServerState>,
    method: Method,
    uri: Uri,
    Path(id): Path<i32>,
) -> Result<Json<UserFormView>, ServerError> {
    let current = logged_in_user(&current, &method, &uri)?;
    let user = state.engine.user(id).await?;
    correct_user(&current, &user)?;

    Ok(Json(UserFormView {
        name: user.name,
        email: user.email,
    }))
}

pub async fn update(
    Extension(current): Extension<CurrentUser>,
    State(state): State<ServerState>,
    method: Method,
    uri: Uri,
    Path(id): Path<i32>,
    Json(form): Json<UserForm>,
) -> Result<FlashRedirect, ServerError> {
    let current = logged_in_user(&current, &method, &uri)?;
    let user = state.engine.user(id).await?;
    correct_user(&current, &user)?;

    let user = state
        .engine
        .update_user(user.id, &engine_params(form.user))
        .await?;
    tracing::info!("user {} updated", user.id);

    Ok(FlashRedirect::success(
        format!("/users/{}", user.id),
        "Profile updated",
    ))
}

pub async fn destroy(
    Extension(current): Extension<CurrentUser>,
    State(state): State<ServerState>,
    method: Method,
    uri: Uri,
    Path(id): Path<i32>,
) -> Result<FlashRedirect, ServerError> {
    let current = logged_in_user(&current, &method, &uri)?;
    admin_user(&current)?;

    state.engine.destroy_user(id).await?;
    tracing::info!("user {id} deleted by admin {}", current.id);

    Ok(FlashRedirect::success("/users", "User deleted"))
}
