pub use sea_orm_migration::prelude::*;

mod m20260301_090000_users;
mod m20260302_090000_microposts;
mod m20260303_090000_relationships;
mod m20260310_090000_password_resets;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_090000_users::Migration),
            Box::new(m20260302_090000_microposts::Migration),
            Box::new(m20260303_090000_relationships::Migration),
            Box::new(m20260310_090000_password_resets::Migration),
        ]
    }
}
