//! Guards run before the protected actions, in this order:
//! [`logged_in_user`] → [`correct_user`] / [`admin_user`].
//!
//! A failing guard short-circuits the action with a redirect.

use axum::http::{Method, Uri};
use engine::users;

use crate::{FlashRedirect, ServerError};

/// The user resolved from the request credentials, if any.
#[derive(Clone, Debug, Default)]
pub struct CurrentUser(pub Option<users::Model>);

impl CurrentUser {
    pub fn is(&self, user: &users::Model) -> bool {
        self.0.as_ref().is_some_and(|current| current.id == user.id)
    }
}

/// Login page URL remembering where to forward afterwards. Only `GET`
/// requests can be replayed, so other methods are not remembered.
fn login_location(method: &Method, uri: &Uri) -> String {
    if *method != Method::GET {
        return "/login".to_string();
    }
    let requested = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());
    format!("/login?return_to={}", urlencoding::encode(requested))
}

pub(crate) fn logged_in_user(
    current: &CurrentUser,
    method: &Method,
    uri: &Uri,
) -> Result<users::Model, ServerError> {
    match &current.0 {
        Some(user) => Ok(user.clone()),
        None => {
            tracing::debug!("login required for {method} {uri}");
            Err(FlashRedirect::danger(login_location(method, uri), "Please log in.").into())
        }
    }
}

pub(crate) fn correct_user(current: &users::Model, target: &users::Model) -> Result<(), ServerError> {
    if current.id != target.id {
        tracing::debug!("user {} may not edit user {}", current.id, target.id);
        return Err(FlashRedirect::to("/").into());
    }
    Ok(())
}

pub(crate) fn admin_user(current: &users::Model) -> Result<(), ServerError> {
    if !current.admin {
        tracing::debug!("user {} is not an admin", current.id);
        return Err(FlashRedirect::to("/").into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_requests_are_remembered() {
        let uri: Uri = "/users/3/edit?tab=1".parse().unwrap();
        assert_eq!(
            login_location(&Method::GET, &uri),
            "/login?return_to=%2Fusers%2F3%2Fedit%3Ftab%3D1"
        );
    }

    #[test]
    fn other_methods_are_not_remembered() {
        let uri: Uri = "/users/3".parse().unwrap();
        assert_eq!(login_location(&Method::PATCH, &uri), "/login");
    }
}
