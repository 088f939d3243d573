use async_trait::async_trait;

use super::domain::{AuthUser, Credentials, NewAccount, UserId};
use super::errors::AuthError;

/// Repository abstraction for auth-related persistence.
///
/// `create_user` must enforce email and username uniqueness itself and report
/// a violation as `AuthError::Conflict`; callers treat any lookup done
/// beforehand as advisory.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<AuthUser>, AuthError>;
    async fn find_user_by_id(&self, id: UserId) -> Result<Option<AuthUser>, AuthError>;
    async fn create_user(&self, account: NewAccount) -> Result<AuthUser, AuthError>;
    async fn delete_user(&self, id: UserId) -> Result<bool, AuthError>;

    async fn get_credentials(&self, user_id: UserId) -> Result<Option<Credentials>, AuthError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use crate::auth::errors::ConflictField;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Inner {
        next_id: i32,
        users: HashMap<UserId, (AuthUser, String)>, // value: (user, password_hash)
    }

    #[derive(Default)]
    pub struct MockAuthRepository {
        inner: Mutex<Inner>,
    }

    impl MockAuthRepository {
        fn inner(&self) -> Result<std::sync::MutexGuard<'_, Inner>, AuthError> {
            self.inner.lock().map_err(|_| AuthError::Repository("mock repository lock poisoned".into()))
        }

        pub fn len(&self) -> usize {
            self.inner().map(|i| i.users.len()).unwrap_or(0)
        }

        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }
    }

    #[async_trait]
    impl AuthRepository for MockAuthRepository {
        async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
            let inner = self.inner()?;
            Ok(inner.users.values().find(|(u, _)| u.email == email).map(|(u, _)| u.clone()))
        }

        async fn find_user_by_username(&self, username: &str) -> Result<Option<AuthUser>, AuthError> {
            let inner = self.inner()?;
            Ok(inner.users.values().find(|(u, _)| u.username == username).map(|(u, _)| u.clone()))
        }

        async fn find_user_by_id(&self, id: UserId) -> Result<Option<AuthUser>, AuthError> {
            let inner = self.inner()?;
            Ok(inner.users.get(&id).map(|(u, _)| u.clone()))
        }

        async fn create_user(&self, account: NewAccount) -> Result<AuthUser, AuthError> {
            let mut inner = self.inner()?;
            if inner.users.values().any(|(u, _)| u.email == account.email) {
                return Err(AuthError::Conflict(ConflictField::Email));
            }
            if inner.users.values().any(|(u, _)| u.username == account.username) {
                return Err(AuthError::Conflict(ConflictField::Username));
            }
            inner.next_id += 1;
            let now = Utc::now();
            let user = AuthUser {
                id: UserId(inner.next_id),
                email: account.email,
                username: account.username,
                is_admin: account.is_admin,
                created_at: now,
                updated_at: now,
            };
            inner.users.insert(user.id, (user.clone(), account.password_hash));
            Ok(user)
        }

        async fn delete_user(&self, id: UserId) -> Result<bool, AuthError> {
            let mut inner = self.inner()?;
            Ok(inner.users.remove(&id).is_some())
        }

        async fn get_credentials(&self, user_id: UserId) -> Result<Option<Credentials>, AuthError> {
            let inner = self.inner()?;
            Ok(inner.users.get(&user_id).map(|(_, hash)| Credentials { user_id, password_hash: hash.clone() }))
        }
    }
}
