//! Password login and the persistent "remember me" token.

use sea_orm::{ActiveValue, prelude::*};

use crate::{ResultEngine, TokenKind, digest, users};

use super::Engine;

impl Engine {
    /// The user owning `email` when `password` matches its digest.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> ResultEngine<Option<users::Model>> {
        let user = self.find_user_by_email(email).await?;
        Ok(user.filter(|user| user.authenticated(TokenKind::Password, password)))
    }

    /// Issue a new remember token for `user_id`, replacing any previous one.
    ///
    /// Only the digest is stored; the returned plaintext is handed to the
    /// client once.
    pub async fn remember(&self, user_id: i32) -> ResultEngine<String> {
        let user = self.user(user_id).await?;
        let token = digest::new_token();
        let mut user: users::ActiveModel = user.into();
        user.remember_digest = ActiveValue::Set(Some(digest::digest(&token)?));
        user.update(&self.database).await?;
        Ok(token)
    }

    /// Invalidate the remember token of `user_id`.
    pub async fn forget(&self, user_id: i32) -> ResultEngine<()> {
        let user = self.user(user_id).await?;
        let mut user: users::ActiveModel = user.into();
        user.remember_digest = ActiveValue::Set(None);
        user.update(&self.database).await?;
        Ok(())
    }

    /// Resolve a persistent login. Unknown users and stale tokens are both
    /// `None`.
    pub async fn user_from_remember_token(
        &self,
        user_id: i32,
        token: &str,
    ) -> ResultEngine<Option<users::Model>> {
        let user = users::Entity::find_by_id(user_id)
            .one(&self.database)
            .await?;
        Ok(user.filter(|user| user.authenticated(TokenKind::Remember, token)))
    }
}
