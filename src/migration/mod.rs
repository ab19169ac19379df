//! SeaORM database migrations.

pub use sea_orm_migration::prelude::*;

mod m20260129_000001_create_users;
mod m20260129_000002_create_refresh_tokens;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260129_000001_create_users::Migration),
            Box::new(m20260129_000002_create_refresh_tokens::Migration),
        ]
    }
}
