//! Users table.
//!
//! The engine only stores what the caller hands it: the password column holds
//! an already-hashed secret.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub contact: Option<String>,
    /// Free-form account labels given at sign-up.
    pub accounts: Vec<String>,
    pub country: Option<String>,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user together with the stored password hash, for login checks.
#[derive(Clone, Debug)]
pub struct Credentials {
    pub user: User,
    pub password_hash: String,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password: String,
    pub contact: Option<String>,
    pub accounts: String,
    pub country: Option<String>,
    pub currency: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::accounts::Entity")]
    Accounts,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub(crate) fn encode_labels(labels: &[String]) -> String {
    serde_json::to_string(labels).unwrap_or_else(|_| "[]".to_string())
}

impl From<Model> for Credentials {
    fn from(model: Model) -> Self {
        let accounts = serde_json::from_str(&model.accounts).unwrap_or_default();
        Self {
            password_hash: model.password,
            user: User {
                id: model.id,
                first_name: model.first_name,
                last_name: model.last_name,
                email: model.email,
                contact: model.contact,
                accounts,
                country: model.country,
                currency: model.currency,
                created_at: model.created_at,
                updated_at: model.updated_at,
            },
        }
    }
}

impl From<Model> for User {
    fn from(model: Model) -> Self {
        Credentials::from(model).user
    }
}
