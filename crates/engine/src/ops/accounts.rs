use chrono::Utc;
use sea_orm::{
    ActiveValue, Condition, DatabaseTransaction, QueryFilter, QueryOrder, SqlErr,
    TransactionTrait, prelude::*, sea_query::Expr,
};

use crate::{
    Account, EngineError, Money, NewAccountCmd, NewEntry, ResultEngine, TransactionKind,
    accounts,
};

use super::{Engine, normalize_optional_text, normalize_required_text, with_tx};

impl Engine {
    /// Return every account owned by the user, newest first.
    ///
    /// A user without accounts gets `KeyNotFound` rather than an empty list.
    pub async fn accounts(&self, user_id: i32) -> ResultEngine<Vec<Account>> {
        with_tx!(self, |db_tx| {
            let models = accounts::Entity::find()
                .filter(accounts::Column::UserId.eq(user_id))
                .order_by_desc(accounts::Column::Id)
                .all(&db_tx)
                .await?;
            if models.is_empty() {
                return Err(EngineError::KeyNotFound("no accounts found".to_string()));
            }
            Ok(models.into_iter().map(Account::from).collect())
        })
    }

    /// Return a single account snapshot scoped by owner.
    pub async fn account(&self, account_id: i32, user_id: i32) -> ResultEngine<Account> {
        with_tx!(self, |db_tx| {
            let model = self.require_account(&db_tx, account_id, user_id).await?;
            Ok(Account::from(model))
        })
    }

    /// Open a new account.
    ///
    /// The initial balance is modeled as a `deposit` ledger entry
    /// (`"<name> - Initial Deposit"`) posted in the same database transaction
    /// as the account row, so the balance is reproducible from the ledger.
    pub async fn new_account(&self, cmd: NewAccountCmd) -> ResultEngine<Account> {
        let name = normalize_required_text(&cmd.name, "account name")?;
        let number = normalize_optional_text(cmd.number.as_deref());
        if cmd.initial_balance.is_negative() {
            return Err(EngineError::InvalidArgument(
                "initial balance must be >= 0".to_string(),
            ));
        }
        let user_id = cmd.user_id;
        let now = Utc::now();

        let account = with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;

            let mut duplicate =
                Condition::any().add(Expr::cust("LOWER(name)").eq(name.to_lowercase()));
            if let Some(number) = &number {
                duplicate = duplicate.add(accounts::Column::Number.eq(number.clone()));
            }
            let exists = accounts::Entity::find()
                .filter(accounts::Column::UserId.eq(user_id))
                .filter(duplicate)
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(name));
            }

            let model = accounts::ActiveModel {
                id: ActiveValue::NotSet,
                user_id: ActiveValue::Set(user_id),
                name: ActiveValue::Set(name.clone()),
                number: ActiveValue::Set(number.clone()),
                balance_minor: ActiveValue::Set(0),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await
            .map_err(|err| match err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    EngineError::ExistingKey(name.clone())
                }
                _ => EngineError::Database(err),
            })?;

            if cmd.initial_balance.is_positive() {
                self.post_entry(
                    &db_tx,
                    NewEntry {
                        user_id,
                        account_id: Some(model.id),
                        description: format!("{name} - Initial Deposit"),
                        status: "completed".to_string(),
                        source: name.clone(),
                        amount: cmd.initial_balance,
                        kind: TransactionKind::Deposit,
                        transfer_id: None,
                        created_at: now,
                    },
                )
                .await?;
            }

            let model = self.require_account(&db_tx, model.id, user_id).await?;
            Ok(Account::from(model))
        })?;

        tracing::info!(
            user_id,
            account_id = account.id,
            balance = %account.balance,
            "account created"
        );
        Ok(account)
    }

    /// Credit an account, recording a `deposit` ledger entry.
    pub async fn add_money(
        &self,
        account_id: i32,
        user_id: i32,
        amount: Money,
    ) -> ResultEngine<Account> {
        if !amount.is_positive() {
            return Err(EngineError::InvalidArgument(
                "amount must be > 0".to_string(),
            ));
        }

        let account = with_tx!(self, |db_tx| {
            let model = self.require_account(&db_tx, account_id, user_id).await?;
            self.post_entry(
                &db_tx,
                NewEntry {
                    user_id,
                    account_id: Some(model.id),
                    description: format!("Added {amount} to account {}", model.name),
                    status: "completed".to_string(),
                    source: model.name.clone(),
                    amount,
                    kind: TransactionKind::Deposit,
                    transfer_id: None,
                    created_at: Utc::now(),
                },
            )
            .await?;
            let model = self.require_account(&db_tx, account_id, user_id).await?;
            Ok(Account::from(model))
        })?;

        tracing::info!(user_id, account_id, %amount, "money added to account");
        Ok(account)
    }

    /// Apply `delta` to the balance of an account owned by `user_id`.
    ///
    /// This is the only place where balances change, and it must run inside
    /// the database transaction that writes the matching ledger row. A debit
    /// carries its own guard (`balance >= -delta`) in the `UPDATE`, so the
    /// funds check and the decrement are one statement: two concurrent debits
    /// cannot both observe the old balance.
    pub(super) async fn adjust_balance(
        &self,
        db: &DatabaseTransaction,
        account_id: i32,
        user_id: i32,
        delta: Money,
    ) -> ResultEngine<accounts::Model> {
        let mut update = accounts::Entity::update_many()
            .col_expr(
                accounts::Column::BalanceMinor,
                Expr::col(accounts::Column::BalanceMinor).add(delta.cents()),
            )
            .col_expr(accounts::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(accounts::Column::Id.eq(account_id))
            .filter(accounts::Column::UserId.eq(user_id));
        if delta.is_negative() {
            update = update.filter(accounts::Column::BalanceMinor.gte(-delta.cents()));
        }

        let result = update.exec(db).await?;
        if result.rows_affected == 0 {
            // Either the account is not ours (KeyNotFound) or the guard failed.
            let account = self.require_account(db, account_id, user_id).await?;
            return Err(EngineError::InsufficientFunds(format!(
                "account '{}' holds {}, {} requested",
                account.name,
                Money::new(account.balance_minor),
                -delta
            )));
        }

        self.require_account(db, account_id, user_id).await
    }
}
