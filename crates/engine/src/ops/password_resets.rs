//! Password reset links: a random token whose digest is stored together with
//! the time it was issued.

use chrono::{DateTime, TimeDelta, Utc};
use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, TransactionTrait, prelude::*, sea_query::Expr,
};

use crate::{
    EngineError, ResultEngine, TokenKind, UserParams, ValidationErrors, digest, users,
    validation,
};

use super::{Engine, with_tx};

/// How long a reset link stays usable.
pub const RESET_TOKEN_TTL_HOURS: i64 = 2;

/// Whether the reset issued for `user` is older than the allowed window.
/// A user without a pending reset counts as expired.
pub(crate) fn reset_expired(user: &users::Model, now: DateTime<Utc>) -> bool {
    match user.reset_sent_at {
        Some(sent_at) => now - sent_at > TimeDelta::hours(RESET_TOKEN_TTL_HOURS),
        None => true,
    }
}

/// The user owning `email` if `token` is its live reset token.
async fn live_reset_user<C: ConnectionTrait>(
    db: &C,
    email: &str,
    token: &str,
) -> ResultEngine<users::Model> {
    let user = users::Entity::find()
        .filter(users::Column::Email.eq(validation::normalize_email(email)))
        .one(db)
        .await?
        .filter(|user| user.authenticated(TokenKind::Reset, token))
        .ok_or_else(|| EngineError::InvalidToken("password reset link is invalid".to_string()))?;
    if reset_expired(&user, Utc::now()) {
        return Err(EngineError::ExpiredToken(
            "Password reset has expired.".to_string(),
        ));
    }
    Ok(user)
}

impl Engine {
    /// Start a reset for the account owning `email`; returns the user and the
    /// plaintext token to deliver.
    pub async fn create_reset_digest(&self, email: &str) -> ResultEngine<(users::Model, String)> {
        let user = self
            .find_user_by_email(email)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("Email address not found".to_string()))?;

        let token = digest::new_token();
        let mut user: users::ActiveModel = user.into();
        user.reset_digest = ActiveValue::Set(Some(digest::digest(&token)?));
        user.reset_sent_at = ActiveValue::Set(Some(Utc::now()));
        let user = user.update(&self.database).await?;
        Ok((user, token))
    }

    /// Whether `token` is a live reset token for the account owning `email`.
    pub async fn check_reset_token(&self, email: &str, token: &str) -> ResultEngine<users::Model> {
        live_reset_user(&self.database, email, token).await
    }

    /// Set a new password through a reset link. The link is single use: the
    /// digest is cleared only if it is still the one the token matched, so of
    /// two concurrent resets with the same link at most one succeeds.
    pub async fn reset_password(
        &self,
        email: &str,
        token: &str,
        params: &UserParams,
    ) -> ResultEngine<users::Model> {
        self.check_reset_token(email, token).await?;

        let password = params.password.as_deref().unwrap_or_default();
        let mut errors = ValidationErrors::new();
        if password.is_empty() {
            errors.add("password", "can't be empty");
        } else {
            validation::check_password(
                &mut errors,
                password,
                params.password_confirmation.as_deref(),
            );
        }
        errors.into_result()?;
        let password_digest = digest::digest(password)?;

        with_tx!(self, |db_tx| {
            let user = live_reset_user(&db_tx, email, token).await?;

            let updated = users::Entity::update_many()
                .col_expr(users::Column::PasswordDigest, Expr::value(password_digest))
                .col_expr(users::Column::ResetDigest, Expr::value(Option::<String>::None))
                .col_expr(
                    users::Column::ResetSentAt,
                    Expr::value(Option::<DateTimeUtc>::None),
                )
                .col_expr(users::Column::UpdatedAt, Expr::value(Utc::now()))
                .filter(users::Column::Id.eq(user.id))
                .filter(users::Column::ResetDigest.eq(user.reset_digest.clone()))
                .exec(&db_tx)
                .await?;
            if updated.rows_affected == 0 {
                return Err(EngineError::InvalidToken(
                    "password reset link is invalid".to_string(),
                ));
            }

            users::Entity::find_by_id(user.id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound(format!("user {}", user.id)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_reset_at(sent_at: Option<DateTime<Utc>>) -> users::Model {
        users::Model {
            id: 1,
            name: "Test Name".to_string(),
            email: "test@example.com".to_string(),
            password_digest: String::new(),
            remember_digest: None,
            admin: false,
            reset_digest: None,
            reset_sent_at: sent_at,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn reset_expires_after_two_hours() {
        let now = Utc::now();
        assert!(!reset_expired(&user_reset_at(Some(now - TimeDelta::minutes(119))), now));
        assert!(reset_expired(&user_reset_at(Some(now - TimeDelta::hours(3))), now));
    }

    #[test]
    fn no_pending_reset_counts_as_expired() {
        assert!(reset_expired(&user_reset_at(None), Utc::now()));
    }
}
