//! Migrator for the auth schema.
//! Unique indexes are created together with the table so uniqueness is
//! always enforced by the database.
pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_users;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20240101_000001_create_users::Migration)]
    }
}
