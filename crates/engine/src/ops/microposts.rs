use chrono::Utc;
use sea_orm::{
    ActiveValue, Condition, PaginatorTrait, QueryFilter, QueryOrder, Select,
    prelude::*, sea_query::Query,
};

use crate::{
    EngineError, ResultEngine, ValidationErrors, microposts, relationships, validation,
};

use super::{Engine, Page, page_index, page_number};

impl Engine {
    /// Post `content` as `user_id`.
    pub async fn create_micropost(
        &self,
        user_id: i32,
        content: &str,
    ) -> ResultEngine<microposts::Model> {
        let mut errors = ValidationErrors::new();
        validation::check_micropost_content(&mut errors, content);
        errors.into_result()?;

        let user = self.user(user_id).await?;
        let micropost = microposts::ActiveModel {
            content: ActiveValue::Set(content.to_string()),
            user_id: ActiveValue::Set(user.id),
            created_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        };
        micropost.insert(&self.database).await.map_err(Into::into)
    }

    pub async fn micropost(&self, micropost_id: i32) -> ResultEngine<microposts::Model> {
        microposts::Entity::find_by_id(micropost_id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("micropost {micropost_id}")))
    }

    /// Delete a micropost; only its author may do so.
    pub async fn delete_micropost(&self, micropost_id: i32, user_id: i32) -> ResultEngine<()> {
        let micropost = self.micropost(micropost_id).await?;
        if micropost.user_id != user_id {
            return Err(EngineError::Forbidden(format!(
                "micropost {micropost_id} belongs to another user"
            )));
        }
        micropost.delete(&self.database).await?;
        Ok(())
    }

    /// Posts written by `user_id`, newest first.
    pub async fn microposts_for(
        &self,
        user_id: i32,
        page: Option<u64>,
    ) -> ResultEngine<Page<microposts::Model>> {
        let query = microposts::Entity::find().filter(microposts::Column::UserId.eq(user_id));
        self.micropost_page(query, page).await
    }

    pub async fn count_microposts(&self) -> ResultEngine<u64> {
        microposts::Entity::find()
            .count(&self.database)
            .await
            .map_err(Into::into)
    }

    pub async fn count_microposts_for(&self, user_id: i32) -> ResultEngine<u64> {
        microposts::Entity::find()
            .filter(microposts::Column::UserId.eq(user_id))
            .count(&self.database)
            .await
            .map_err(Into::into)
    }

    /// Posts by `user_id` and by everyone `user_id` follows, newest first.
    pub async fn feed(
        &self,
        user_id: i32,
        page: Option<u64>,
    ) -> ResultEngine<Page<microposts::Model>> {
        self.user(user_id).await?;

        let followed_ids = Query::select()
            .column(relationships::Column::FollowedId)
            .from(relationships::Entity)
            .and_where(relationships::Column::FollowerId.eq(user_id))
            .to_owned();
        let query = microposts::Entity::find().filter(
            Condition::any()
                .add(microposts::Column::UserId.in_subquery(followed_ids))
                .add(microposts::Column::UserId.eq(user_id)),
        );
        self.micropost_page(query, page).await
    }

    async fn micropost_page(
        &self,
        query: Select<microposts::Entity>,
        page: Option<u64>,
    ) -> ResultEngine<Page<microposts::Model>> {
        let page = page_number(page);
        let paginator = query
            .order_by_desc(microposts::Column::CreatedAt)
            .order_by_desc(microposts::Column::Id)
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
