use chrono::Utc;
use sea_orm::{
    ActiveValue, ConnectionTrait, JoinType, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Select, SqlErr, TransactionTrait, prelude::*,
};

use crate::{EngineError, ResultEngine, ValidationErrors, relationships, users};

use super::{Engine, Page, page_index, page_number, with_tx};

impl Engine {
    /// Make `follower_id` follow `followed_id`. Following twice is a no-op.
    pub async fn follow(&self, follower_id: i32, followed_id: i32) -> ResultEngine<()> {
        if follower_id == followed_id {
            let mut errors = ValidationErrors::new();
            errors.add("followed_id", "can't be yourself");
            return Err(errors.into());
        }

        let inserted = with_tx!(self, |db_tx| {
            for user_id in [follower_id, followed_id] {
                if users::Entity::find_by_id(user_id).one(&db_tx).await?.is_none() {
                    return Err(EngineError::KeyNotFound(format!("user {user_id}")));
                }
            }
            if self.relationship(&db_tx, follower_id, followed_id).await?.is_some() {
                return Ok(());
            }

            let relationship = relationships::ActiveModel {
                follower_id: ActiveValue::Set(follower_id),
                followed_id: ActiveValue::Set(followed_id),
                created_at: ActiveValue::Set(Utc::now()),
                ..Default::default()
            };
            relationship
                .insert(&db_tx)
                .await
                .map(|_| ())
                .map_err(EngineError::from)
        });

        match inserted {
            // A concurrent follow of the same pair won the race.
            Err(EngineError::Database(err))
                if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) =>
            {
                Ok(())
            }
            other => other,
        }
    }

    /// Remove the link if present.
    pub async fn unfollow(&self, follower_id: i32, followed_id: i32) -> ResultEngine<()> {
        relationships::Entity::delete_many()
            .filter(relationships::Column::FollowerId.eq(follower_id))
            .filter(relationships::Column::FollowedId.eq(followed_id))
            .exec(&self.database)
            .await?;
        Ok(())
    }

    pub async fn is_following(&self, follower_id: i32, followed_id: i32) -> ResultEngine<bool> {
        Ok(self
            .relationship(&self.database, follower_id, followed_id)
            .await?
            .is_some())
    }

    async fn relationship<C: ConnectionTrait>(
        &self,
        db: &C,
        follower_id: i32,
        followed_id: i32,
    ) -> ResultEngine<Option<relationships::Model>> {
        relationships::Entity::find()
            .filter(relationships::Column::FollowerId.eq(follower_id))
            .filter(relationships::Column::FollowedId.eq(followed_id))
            .one(db)
            .await
            .map_err(Into::into)
    }

    /// Users that `user_id` follows, ordered by id.
    pub async fn following(
        &self,
        user_id: i32,
        page: Option<u64>,
    ) -> ResultEngine<Page<users::Model>> {
        self.user(user_id).await?;
        let query = users::Entity::find()
            .join(JoinType::InnerJoin, relationships::Relation::Followed.def().rev())
            .filter(relationships::Column::FollowerId.eq(user_id));
        self.user_page(query, page).await
    }

    /// Users following `user_id`, ordered by id.
    pub async fn followers(
        &self,
        user_id: i32,
        page: Option<u64>,
    ) -> ResultEngine<Page<users::Model>> {
        self.user(user_id).await?;
        let query = users::Entity::find()
            .join(JoinType::InnerJoin, relationships::Relation::Follower.def().rev())
            .filter(relationships::Column::FollowedId.eq(user_id));
        self.user_page(query, page).await
    }

    /// `(following, followers)` counts for a profile.
    pub async fn follow_counts(&self, user_id: i32) -> ResultEngine<(u64, u64)> {
        let following = relationships::Entity::find()
            .filter(relationships::Column::FollowerId.eq(user_id))
            .count(&self.database)
            .await?;
        let followers = relationships::Entity::find()
            .filter(relationships::Column::FollowedId.eq(user_id))
            .count(&self.database)
            .await?;
        Ok((following, followers))
    }

    async fn user_page(
        &self,
        query: Select<users::Entity>,
        page: Option<u64>,
    ) -> ResultEngine<Page<users::Model>> {
        let page = page_number(page);
        let paginator = query
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
}
