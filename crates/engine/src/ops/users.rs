use chrono::Utc;
use sea_orm::{
    ActiveValue, ConnectionTrait, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*, sea_query::Expr,
};

use crate::{
    EngineError, ResultEngine, UserParams, digest, microposts, relationships, users,
};

use super::{Engine, Page, page_index, page_number, unique_email_violation, with_tx};

impl Engine {
    /// Look up a user by id.
    pub async fn user(&self, user_id: i32) -> ResultEngine<users::Model> {
        users::Entity::find_by_id(user_id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("user {user_id}")))
    }

    /// Look up a user by email, ignoring case and surrounding whitespace.
    pub async fn find_user_by_email(&self, email: &str) -> ResultEngine<Option<users::Model>> {
        let email = crate::validation::normalize_email(email);
        users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.database)
            .await
            .map_err(Into::into)
    }

    /// All users ordered by id.
    pub async fn users(&self, page: Option<u64>) -> ResultEngine<Page<users::Model>> {
        let page = page_number(page);
        let paginator = users::Entity::find()
            .order_by_asc(users::Column::Id)
            .paginate(&self.database, self.per_page);
        let total_pages = paginator.num_pages().await?;
        let items = match page_index(page, total_pages) {
            Some(index) => paginator.fetch_page(index).await?,
            None => Vec::new(),
        };
        Ok(Page {
            items,
            page,
            total_pages,
        })
    }

    pub async fn count_users(&self) -> ResultEngine<u64> {
        users::Entity::find()
            .count(&self.database)
            .await
            .map_err(Into::into)
    }

    async fn email_taken<C: ConnectionTrait>(
        &self,
        db: &C,
        email: &str,
        except: Option<i32>,
    ) -> ResultEngine<bool> {
        let mut query = users::Entity::find()
            .filter(Expr::expr(Expr::cust("LOWER(email)")).eq(email));
        if let Some(user_id) = except {
            query = query.filter(users::Column::Id.ne(user_id));
        }
        Ok(query.one(db).await?.is_some())
    }

    /// Full sign-up validation, uniqueness included, without saving.
    pub async fn validate_user(&self, params: &UserParams) -> ResultEngine<()> {
        let mut errors = params.errors_for_create();
        let email = params.normalized_email().unwrap_or_default();
        if !errors.contains("email") && self.email_taken(&self.database, &email, None).await? {
            errors.add("email", "has already been taken");
        }
        errors.into_result().map_err(Into::into)
    }

    /// Sign up a new, non-admin user.
    pub async fn create_user(&self, params: &UserParams) -> ResultEngine<users::Model> {
        self.insert_user(params, false).await
    }

    /// Same rules as [`Engine::create_user`] but lets trusted callers (the
    /// admin CLI) grant the admin flag.
    pub async fn create_user_with_role(
        &self,
        params: &UserParams,
        admin: bool,
    ) -> ResultEngine<users::Model> {
        self.insert_user(params, admin).await
    }

    async fn insert_user(&self, params: &UserParams, admin: bool) -> ResultEngine<users::Model> {
        let mut errors = params.errors_for_create();
        let email = params.normalized_email().unwrap_or_default();
        let password = params.password.as_deref().unwrap_or_default();
        let password_digest = if errors.contains("password") {
            String::new()
        } else {
            digest::digest(password)?
        };

        with_tx!(self, |db_tx| {
            if !errors.contains("email") && self.email_taken(&db_tx, &email, None).await? {
                errors.add("email", "has already been taken");
            }
            errors.into_result()?;

            let now = Utc::now();
            let user = users::ActiveModel {
                name: ActiveValue::Set(params.name.clone().unwrap_or_default()),
                email: ActiveValue::Set(email.clone()),
                password_digest: ActiveValue::Set(password_digest),
                remember_digest: ActiveValue::Set(None),
                admin: ActiveValue::Set(admin),
                reset_digest: ActiveValue::Set(None),
                reset_sent_at: ActiveValue::Set(None),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
                ..Default::default()
            };
            user.insert(&db_tx).await.map_err(unique_email_violation)
        })
    }

    /// Apply the supplied attributes to an existing user.
    pub async fn update_user(
        &self,
        user_id: i32,
        params: &UserParams,
    ) -> ResultEngine<users::Model> {
        let mut errors = params.errors_for_update();
        let email = params.normalized_email();
        let password_digest = match params.password_change() {
            Some(password) if !errors.contains("password") => Some(digest::digest(password)?),
            _ => None,
        };

        with_tx!(self, |db_tx| {
            let user = users::Entity::find_by_id(user_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound(format!("user {user_id}")))?;

            if let Some(email) = &email
                && !errors.contains("email")
                && self.email_taken(&db_tx, email, Some(user.id)).await?
            {
                errors.add("email", "has already been taken");
            }
            errors.into_result()?;

            let mut user: users::ActiveModel = user.into();
            if let Some(name) = &params.name {
                user.name = ActiveValue::Set(name.clone());
            }
            if let Some(email) = email {
                user.email = ActiveValue::Set(email);
            }
            if let Some(password_digest) = password_digest {
                user.password_digest = ActiveValue::Set(password_digest);
            }
            user.updated_at = ActiveValue::Set(Utc::now());
            user.update(&db_tx).await.map_err(unique_email_violation)
        })
    }

    /// Grant or revoke the admin flag.
    pub async fn set_admin(&self, user_id: i32, admin: bool) -> ResultEngine<users::Model> {
        let user = self.user(user_id).await?;
        let mut user: users::ActiveModel = user.into();
        user.admin = ActiveValue::Set(admin);
        user.updated_at = ActiveValue::Set(Utc::now());
        user.update(&self.database).await.map_err(Into::into)
    }

    /// Delete a user together with its microposts and every relationship
    /// it takes part in, in one transaction.
    pub async fn destroy_user(&self, user_id: i32) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let user = users::Entity::find_by_id(user_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound(format!("user {user_id}")))?;

            microposts::Entity::delete_many()
                .filter(microposts::Column::UserId.eq(user.id))
                .exec(&db_tx)
                .await?;
            relationships::Entity::delete_many()
                .filter(
                    relationships::Column::FollowerId
                        .eq(user.id)
                        .or(relationships::Column::FollowedId.eq(user.id)),
                )
                .exec(&db_tx)
                .await?;
            users::Entity::delete_by_id(user.id).exec(&db_tx).await?;

            Ok::<_, EngineError>(())
        })
    }
}
