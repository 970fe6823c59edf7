//! Adds the password reset digest and its timestamp to `users`.
//!
//! SQLite only accepts one column per `ALTER TABLE`, hence one statement per
//! column.

use sea_orm_migration::prelude::*;

use super::m20260301_090000_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum ResetColumns {
    ResetDigest,
    ResetSentAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Users::Table)
                    .add_column(ColumnDef::new(ResetColumns::ResetDigest).string())
                    .to_owned(),
            )
            .await?;
        manager
            .alter_table(
                Table::alter()
                    .table(Users::Table)
                    .add_column(
                        ColumnDef::new(ResetColumns::ResetSentAt).timestamp_with_time_zone(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Users::Table)
                    .drop_column(ResetColumns::ResetSentAt)
                    .to_owned(),
            )
            .await?;
        manager
            .alter_table(
                Table::alter()
                    .table(Users::Table)
                    .drop_column(ResetColumns::ResetDigest)
                    .to_owned(),
            )
            .await
    }
}
