use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `?page=` query of every listing. Pages are 1-based.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
}

pub mod flash {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum FlashKind {
        Success,
        Info,
        Danger,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Flash {
        pub kind: FlashKind,
        pub message: String,
    }

    /// Body sent along with a `303 See Other`.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct RedirectBody {
        pub location: String,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        pub flash: Option<Flash>,
    }
}

pub mod user {
    use super::*;

    /// Attributes a client may submit for a user. Unknown keys such as
    /// `admin` are dropped during deserialization.
    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct UserParams {
        #[serde(default)]
        pub name: Option<String>,
        #[serde(default)]
        pub email: Option<String>,
        #[serde(default)]
        pub password: Option<String>,
        #[serde(default)]
        pub password_confirmation: Option<String>,
    }

    /// Request body of `POST /users` and `PATCH /users/{id}`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserForm {
        pub user: UserParams,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct UserView {
        pub id: i32,
        pub name: String,
        pub email: String,
        pub admin: bool,
    }

    /// Blank or prefilled form for `new`/`edit`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct UserFormView {
        pub name: String,
        pub email: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UsersPage {
        pub users: Vec<UserView>,
        pub page: u64,
        pub total_pages: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserProfile {
        pub user: UserView,
        pub microposts: Vec<super::micropost::MicropostView>,
        pub micropost_count: u64,
        pub following_count: u64,
        pub followers_count: u64,
        /// Only present when the viewer is logged in and looking at
        /// somebody else.
        #[serde(skip_serializing_if = "Option::is_none", default)]
        pub followed_by_viewer: Option<bool>,
    }

    /// Field-level validation messages, the "re-rendered form".
    #[derive(Debug, Serialize, Deserialize)]
    pub struct FormErrors {
        pub errors: BTreeMap<String, Vec<String>>,
        pub full_messages: Vec<String>,
    }
}

pub mod micropost {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MicropostNew {
        pub content: String,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct MicropostView {
        pub id: i32,
        pub content: String,
        pub user_id: i32,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FeedPage {
        pub microposts: Vec<MicropostView>,
        pub page: u64,
        pub total_pages: u64,
    }
}

pub mod relationship {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RelationshipNew {
        pub followed_id: i32,
    }
}

pub mod session {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SessionNew {
        pub email: String,
        pub password: String,
        /// Page to forward to after login, as stored by the login redirect.
        #[serde(default)]
        pub return_to: Option<String>,
    }

    /// The bearer credential is `"{user_id}.{token}"`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SessionCreated {
        pub user_id: i32,
        pub token: String,
        pub location: String,
    }
}

pub mod password_reset {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PasswordResetNew {
        pub email: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PasswordResetUpdate {
        pub email: String,
        pub user: super::user::UserParams,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_form_drops_unpermitted_attributes() {
        let form: user::UserForm = serde_json::from_str(
            r#"{"user":{"name":"Jo","email":"jo@example.com","admin":true}}"#,
        )
        .unwrap();
        assert_eq!(form.user.name.as_deref(), Some("Jo"));
        assert!(form.user.password.is_none());
    }

    #[test]
    fn redirect_body_omits_missing_flash() {
        let body = flash::RedirectBody {
            location: "/".to_string(),
            flash: None,
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"location":"/"}"#
        );
    }
}
