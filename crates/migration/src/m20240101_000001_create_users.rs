//! Create `users` table.
//!
//! Email and username each carry a named unique index; the service relies on
//! the resulting constraint violation to report duplicates.
use sea_orm_migration::{prelude::*, schema::*};

pub const UNIQUE_EMAIL_INDEX: &str = "uniq_users_email";
pub const UNIQUE_USERNAME_INDEX: &str = "uniq_users_username";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_auto(Users::Id))
                    .col(string_len(Users::Email, 255).not_null())
                    .col(string_len(Users::Username, 80).not_null())
                    .col(string_len(Users::PasswordHash, 255).not_null())
                    .col(boolean(Users::IsAdmin).not_null().default(false))
                    .col(timestamp_with_time_zone(Users::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Users::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(UNIQUE_EMAIL_INDEX)
                    .table(Users::Table)
                    .col(Users::Email)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(UNIQUE_USERNAME_INDEX)
                    .table(Users::Table)
                    .col(Users::Username)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Users::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Users { Table, Id, Email, Username, PasswordHash, IsAdmin, CreatedAt, UpdatedAt }
