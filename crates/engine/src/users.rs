//! Users table and the attributes accepted from sign-up/profile forms.

use sea_orm::entity::prelude::*;

use crate::{ValidationErrors, digest, validation};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password_digest: String,
    pub remember_digest: Option<String>,
    pub admin: bool,
    pub reset_digest: Option<String>,
    pub reset_sent_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::microposts::Entity")]
    Microposts,
}

impl Related<super::microposts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Microposts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Which stored digest a token is checked against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Password,
    Remember,
    Reset,
}

impl Model {
    fn digest_for(&self, kind: TokenKind) -> Option<&str> {
        match kind {
            TokenKind::Password => Some(self.password_digest.as_str()),
            TokenKind::Remember => self.remember_digest.as_deref(),
            TokenKind::Reset => self.reset_digest.as_deref(),
        }
    }

    /// Whether `token` matches the digest stored for `kind`.
    ///
    /// A missing digest is simply "not authenticated".
    pub fn authenticated(&self, kind: TokenKind, token: &str) -> bool {
        self.digest_for(kind)
            .is_some_and(|stored| digest::verify(stored, token))
    }
}

/// Attributes a client may set on a user. Anything else (`admin`, digests)
/// is not representable here and therefore never mass-assigned.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserParams {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub password_confirmation: Option<String>,
}

impl UserParams {
    pub fn new(name: &str, email: &str, password: &str, password_confirmation: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            password: Some(password.to_string()),
            password_confirmation: Some(password_confirmation.to_string()),
        }
    }

    /// Local rules for a new user (everything except email uniqueness).
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        self.errors_for_create().into_result()
    }

    pub(crate) fn errors_for_create(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        validation::check_name(&mut errors, self.name.as_deref().unwrap_or_default());
        validation::check_email(&mut errors, &self.normalized_email().unwrap_or_default());
        validation::check_password(
            &mut errors,
            self.password.as_deref().unwrap_or_default(),
            self.password_confirmation.as_deref(),
        );
        errors
    }

    /// Rules for a profile update: only supplied attributes are checked and
    /// an absent or empty password leaves the stored one untouched.
    pub(crate) fn errors_for_update(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if let Some(name) = &self.name {
            validation::check_name(&mut errors, name);
        }
        if let Some(email) = self.normalized_email() {
            validation::check_email(&mut errors, &email);
        }
        if let Some(password) = self.password_change() {
            validation::check_password(
                &mut errors,
                password,
                self.password_confirmation.as_deref(),
            );
        }
        errors
    }

    pub(crate) fn normalized_email(&self) -> Option<String> {
        self.email.as_deref().map(validation::normalize_email)
    }

    pub(crate) fn password_change(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn params() -> UserParams {
        UserParams::new(
            "Test Name",
            "test_email@email.com",
            "best_password",
            "best_password",
        )
    }

    fn stored_user() -> Model {
        Model {
            id: 1,
            name: "Test Name".to_string(),
            email: "test_email@email.com".to_string(),
            password_digest: digest::digest("best_password").unwrap(),
            remember_digest: None,
            admin: false,
            reset_digest: None,
            reset_sent_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn should_be_valid() {
        assert!(params().validate().is_ok());
    }

    #[test]
    fn name_should_be_present() {
        let mut p = params();
        p.name = Some("           ".to_string());
        assert!(p.validate().unwrap_err().contains("name"));
    }

    #[test]
    fn email_should_be_present() {
        let mut p = params();
        p.email = Some("       ".to_string());
        assert!(p.validate().unwrap_err().contains("email"));
    }

    #[test]
    fn missing_attributes_are_blank() {
        let errors = UserParams::default().validate().unwrap_err();
        assert!(errors.contains("name"));
        assert!(errors.contains("email"));
        assert!(errors.contains("password"));
    }

    #[test]
    fn email_longer_than_255_is_invalid() {
        let mut p = params();
        p.email = Some(format!("{}example.com", "a".repeat(255)));
        assert!(p.validate().is_err());
    }

    #[test]
    fn password_of_five_is_too_short() {
        let mut p = params();
        p.password = Some("b".repeat(5));
        p.password_confirmation = Some("b".repeat(5));
        assert!(p.validate().unwrap_err().contains("password"));
    }

    #[test]
    fn password_of_six_with_confirmation_is_valid() {
        let mut p = params();
        p.password = Some("b".repeat(6));
        p.password_confirmation = Some("b".repeat(6));
        assert!(p.validate().is_ok());
    }

    #[test]
    fn update_without_password_keeps_it() {
        let p = UserParams {
            name: Some("New Name".to_string()),
            password: Some(String::new()),
            password_confirmation: Some(String::new()),
            ..Default::default()
        };
        assert!(p.errors_for_update().is_empty());
        assert_eq!(p.password_change(), None);
    }

    #[test]
    fn authenticated_is_false_without_digest() {
        let user = stored_user();
        assert!(!user.authenticated(TokenKind::Remember, ""));
        assert!(!user.authenticated(TokenKind::Reset, "anything"));
    }

    #[test]
    fn authenticated_checks_password_digest() {
        let user = stored_user();
        assert!(user.authenticated(TokenKind::Password, "best_password"));
        assert!(!user.authenticated(TokenKind::Password, "wrong_password"));
    }
}
