use sea_orm::{entity::prelude::*, ActiveValue::NotSet, DatabaseConnection, QueryFilter, Set};
use chrono::Utc;

use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub email: String,
    #[sea_orm(unique)]
    pub username: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Fields needed to insert a user. The password must already be hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub is_admin: bool,
}

pub fn validate_email(email: &str) -> Result<(), ModelError> {
    if email.trim().is_empty() { return Err(ModelError::Validation("email required".into())); }
    if !email.contains('@') { return Err(ModelError::Validation("invalid email".into())); }
    if email.len() > 255 { return Err(ModelError::Validation("email too long (<=255)".into())); }
    Ok(())
}

pub fn validate_username(username: &str) -> Result<(), ModelError> {
    if username.trim().is_empty() { return Err(ModelError::Validation("username required".into())); }
    if username.len() > 80 { return Err(ModelError::Validation("username too long (<=80)".into())); }
    Ok(())
}

pub async fn create(db: &DatabaseConnection, new: NewUser) -> Result<Model, ModelError> {
    validate_email(&new.email)?;
    validate_username(&new.username)?;
    if new.password_hash.trim().is_empty() {
        return Err(ModelError::Validation("password hash required".into()));
    }
    let now = Utc::now().into();
    let am = ActiveModel {
        id: NotSet,
        email: Set(new.email),
        username: Set(new.username),
        password_hash: Set(new.password_hash),
        is_admin: Set(new.is_admin),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(am.insert(db).await?)
}

pub async fn find_by_id(db: &DatabaseConnection, id: i32) -> Result<Option<Model>, ModelError> {
    Ok(Entity::find_by_id(id).one(db).await?)
}

pub async fn find_by_email(db: &DatabaseConnection, email: &str) -> Result<Option<Model>, ModelError> {
    Ok(Entity::find().filter(Column::Email.eq(email)).one(db).await?)
}

pub async fn find_by_username(db: &DatabaseConnection, username: &str) -> Result<Option<Model>, ModelError> {
    Ok(Entity::find().filter(Column::Username.eq(username)).one(db).await?)
}

/// Returns whether a row was removed.
pub async fn hard_delete(db: &DatabaseConnection, id: i32) -> Result<bool, ModelError> {
    let res = Entity::delete_by_id(id).exec(db).await?;
    Ok(res.rows_affected > 0)
}
