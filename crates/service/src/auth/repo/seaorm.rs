use chrono::Utc;
use sea_orm::DatabaseConnection;

use crate::auth::domain::{AuthUser, Credentials, NewAccount, UserId};
use crate::auth::errors::AuthError;
use crate::auth::repository::AuthRepository;

pub struct SeaOrmAuthRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmAuthRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn to_auth_user(u: models::user::Model) -> AuthUser {
    AuthUser {
        id: UserId(u.id),
        email: u.email,
        username: u.username,
        is_admin: u.is_admin,
        created_at: u.created_at.with_timezone(&Utc),
        updated_at: u.updated_at.with_timezone(&Utc),
    }
}

#[async_trait::async_trait]
impl AuthRepository for SeaOrmAuthRepository {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
        let res = models::user::find_by_email(&self.db, email).await?;
        Ok(res.map(to_auth_user))
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<AuthUser>, AuthError> {
        let res = models::user::find_by_username(&self.db, username).await?;
        Ok(res.map(to_auth_user))
    }

    async fn find_user_by_id(&self, id: UserId) -> Result<Option<AuthUser>, AuthError> {
        let res = models::user::find_by_id(&self.db, id.0).await?;
        Ok(res.map(to_auth_user))
    }

    async fn create_user(&self, account: NewAccount) -> Result<AuthUser, AuthError> {
        let created = models::user::create(&self.db, models::user::NewUser {
            email: account.email,
            username: account.username,
            password_hash: account.password_hash,
            is_admin: account.is_admin,
        })
        .await?;
        Ok(to_auth_user(created))
    }

    async fn delete_user(&self, id: UserId) -> Result<bool, AuthError> {
        Ok(models::user::hard_delete(&self.db, id.0).await?)
    }

    async fn get_credentials(&self, user_id: UserId) -> Result<Option<Credentials>, AuthError> {
        let res = models::user::find_by_id(&self.db, user_id.0).await?;
        Ok(res.map(|u| Credentials { user_id, password_hash: u.password_hash }))
    }
}
