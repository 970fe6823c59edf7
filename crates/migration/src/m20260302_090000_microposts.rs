use sea_orm_migration::prelude::*;

use super::m20260301_090000_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Microposts {
    Table,
    Id,
    Content,
    UserId,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Microposts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Microposts::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Microposts::Content).text().not_null())
                    .col(ColumnDef::new(Microposts::UserId).integer().not_null())
                    .col(
                        ColumnDef::new(Microposts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-microposts-user_id")
                            .from(Microposts::Table, Microposts::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-microposts-user_id-created_at")
                    .table(Microposts::Table)
                    .col(Microposts::UserId)
                    .col(Microposts::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Microposts::Table).to_owned())
            .await
    }
}
