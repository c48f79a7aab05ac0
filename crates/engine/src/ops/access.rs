//! Ownership checks.
//!
//! Every lookup of an account or ledger row is scoped by `(id, user_id)`. A row
//! owned by somebody else is indistinguishable from a missing one, so callers
//! get `KeyNotFound` and learn nothing about other users' data.

use sea_orm::{DatabaseTransaction, QueryFilter, prelude::*};

use crate::{EngineError, ResultEngine, accounts, transactions, users};

use super::Engine;

/// Generates a `require_*` method for an entity owned by a user through
/// `$owner_col`.
macro_rules! impl_owned_lookup {
    ($require_fn:ident, $entity:path, $model:path, $owner_col:expr, $err_msg:literal) => {
        pub(super) async fn $require_fn(
            &self,
            db: &DatabaseTransaction,
            id: i32,
            user_id: i32,
        ) -> ResultEngine<$model> {
            <$entity>::find_by_id(id)
                .filter($owner_col.eq(user_id))
                .one(db)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound($err_msg.to_string()))
        }
    };
}

impl Engine {
    impl_owned_lookup!(
        require_account,
        accounts::Entity,
        accounts::Model,
        accounts::Column::UserId,
        "account not exists"
    );

    impl_owned_lookup!(
        require_transaction,
        transactions::Entity,
        transactions::Model,
        transactions::Column::UserId,
        "transaction not exists"
    );

    pub(super) async fn require_user(
        &self,
        db: &DatabaseTransaction,
        user_id: i32,
    ) -> ResultEngine<users::Model> {
        users::Entity::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
    }
}
