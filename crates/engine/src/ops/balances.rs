use std::collections::BTreeMap;

use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};

use crate::{EngineError, Money, ResultEngine, Transaction, accounts, transactions};

use super::{Engine, with_tx};

/// An account whose stored balance disagrees with its ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BalanceMismatch {
    pub account_id: i32,
    pub stored: Money,
    pub ledger: Money,
}

impl Engine {
    /// Replay the user's ledger and report every account whose stored balance
    /// differs from the sum of its signed entries.
    pub async fn verify_balances(&self, user_id: i32) -> ResultEngine<Vec<BalanceMismatch>> {
        with_tx!(self, |db_tx| self.replay_balances(&db_tx, user_id).await)
    }

    /// Rewrite stored balances from the ledger.
    ///
    /// Returns the mismatches that were corrected.
    pub async fn recompute_balances(&self, user_id: i32) -> ResultEngine<Vec<BalanceMismatch>> {
        let fixed = with_tx!(self, |db_tx| {
            let mismatches = self.replay_balances(&db_tx, user_id).await?;
            let now = Utc::now();
            for mismatch in &mismatches {
                accounts::ActiveModel {
                    id: ActiveValue::Set(mismatch.account_id),
                    balance_minor: ActiveValue::Set(mismatch.ledger.cents()),
                    updated_at: ActiveValue::Set(now),
                    ..Default::default()
                }
                .update(&db_tx)
                .await?;
            }
            Ok(mismatches)
        })?;

        for mismatch in &fixed {
            tracing::warn!(
                user_id,
                account_id = mismatch.account_id,
                stored = %mismatch.stored,
                ledger = %mismatch.ledger,
                "balance recomputed from ledger"
            );
        }
        Ok(fixed)
    }

    async fn replay_balances(
        &self,
        db: &DatabaseTransaction,
        user_id: i32,
    ) -> ResultEngine<Vec<BalanceMismatch>> {
        let account_models = accounts::Entity::find()
            .filter(accounts::Column::UserId.eq(user_id))
            .order_by_asc(accounts::Column::Id)
            .all(db)
            .await?;

        let mut replayed: BTreeMap<i32, Money> = account_models
            .iter()
            .map(|account| (account.id, Money::ZERO))
            .collect();

        let entries = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id))
            .filter(transactions::Column::AccountId.is_not_null())
            .order_by_asc(transactions::Column::Id)
            .all(db)
            .await?;
        for model in entries {
            let entry = Transaction::try_from(model)?;
            let Some(account_id) = entry.account_id else {
                continue;
            };
            let balance = replayed
                .get_mut(&account_id)
                .ok_or_else(|| EngineError::KeyNotFound("account not exists".to_string()))?;
            balance.accumulate(entry.kind.ledger_effect(entry.amount))?;
        }

        Ok(account_models
            .into_iter()
            .filter_map(|account| {
                let ledger = replayed.get(&account.id).copied().unwrap_or(Money::ZERO);
                let stored = Money::new(account.balance_minor);
                (stored != ledger).then_some(BalanceMismatch {
                    account_id: account.id,
                    stored,
                    ledger,
                })
            })
            .collect())
    }
}
