use chrono::Utc;
use sea_orm::{DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    AddTransactionCmd, EngineError, NewEntry, ResultEngine, Transaction, TransactionKind,
    TransferCmd, transactions,
};

use super::{Engine, normalize_required_text, with_tx};

const TRANSFER_SOURCE: &str = "Transfer";
const TRANSFER_STATUS: &str = "Completed";

/// The two ledger legs written by a transfer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transfer {
    /// `expense` leg on the source account.
    pub from: Transaction,
    /// `income` leg on the destination account.
    pub to: Transaction,
}

impl Engine {
    /// Record an income or an expense on one account.
    ///
    /// Expenses are debits and are rejected with `InsufficientFunds` when the
    /// account cannot cover them.
    pub async fn add_transaction(&self, cmd: AddTransactionCmd) -> ResultEngine<Transaction> {
        let description = normalize_required_text(&cmd.description, "description")?;
        let status = normalize_required_text(&cmd.status, "status")?;
        let source = normalize_required_text(&cmd.source, "source")?;
        if cmd.kind == TransactionKind::Deposit {
            return Err(EngineError::InvalidArgument(
                "invalid transaction type: deposit".to_string(),
            ));
        }
        let entry = NewEntry {
            user_id: cmd.user_id,
            account_id: Some(cmd.account_id),
            description,
            status,
            source,
            amount: cmd.amount,
            kind: cmd.kind,
            transfer_id: None,
            created_at: Utc::now(),
        };
        entry.validate()?;

        let transaction = with_tx!(self, |db_tx| self.post_entry(&db_tx, entry).await)?;

        tracing::info!(
            user_id = transaction.user_id,
            account_id = cmd.account_id,
            transaction_id = transaction.id,
            kind = transaction.kind.as_str(),
            amount = %transaction.amount,
            "transaction added"
        );
        Ok(transaction)
    }

    /// Move money between two accounts of the same user.
    ///
    /// Writes the guarded debit, the credit and both ledger legs in a single
    /// database transaction; any failure leaves all four untouched.
    pub async fn transfer(&self, cmd: TransferCmd) -> ResultEngine<Transfer> {
        if !cmd.amount.is_positive() {
            return Err(EngineError::InvalidArgument(
                "amount must be > 0".to_string(),
            ));
        }
        if cmd.from_account_id == cmd.to_account_id {
            return Err(EngineError::InvalidArgument(
                "cannot transfer to the same account".to_string(),
            ));
        }

        let now = Utc::now();
        let transfer_id = Uuid::new_v4();
        let leg = |account_id: i32, kind: TransactionKind, description: &str| NewEntry {
            user_id: cmd.user_id,
            account_id: Some(account_id),
            description: description.to_string(),
            status: TRANSFER_STATUS.to_string(),
            source: TRANSFER_SOURCE.to_string(),
            amount: cmd.amount,
            kind,
            transfer_id: Some(transfer_id),
            created_at: now,
        };

        let transfer = with_tx!(self, |db_tx| {
            // Both accounts must belong to the caller before anything is written.
            self.require_account(&db_tx, cmd.from_account_id, cmd.user_id)
                .await?;
            self.require_account(&db_tx, cmd.to_account_id, cmd.user_id)
                .await?;

            let from = self
                .post_entry(
                    &db_tx,
                    leg(
                        cmd.from_account_id,
                        TransactionKind::Expense,
                        "Transfer to Account",
                    ),
                )
                .await?;
            let to = self
                .post_entry(
                    &db_tx,
                    leg(
                        cmd.to_account_id,
                        TransactionKind::Income,
                        "Transfer from Account",
                    ),
                )
                .await?;
            Ok(Transfer { from, to })
        })?;

        tracing::info!(
            user_id = cmd.user_id,
            from_account_id = cmd.from_account_id,
            to_account_id = cmd.to_account_id,
            amount = %cmd.amount,
            %transfer_id,
            "transfer completed"
        );
        Ok(transfer)
    }

    /// Delete a ledger entry and reverse its effect on the account balance.
    ///
    /// Deleting either leg of a transfer removes both legs. Reversing a credit
    /// that has already been spent fails with `InsufficientFunds`.
    pub async fn delete_transaction(&self, id: i32, user_id: i32) -> ResultEngine<()> {
        let removed = with_tx!(self, |db_tx| {
            let model = self.require_transaction(&db_tx, id, user_id).await?;
            let entries = match model.transfer_id.clone() {
                Some(transfer_id) => {
                    transactions::Entity::find()
                        .filter(transactions::Column::UserId.eq(user_id))
                        .filter(transactions::Column::TransferId.eq(transfer_id))
                        .all(&db_tx)
                        .await?
                }
                None => vec![model],
            };

            // Undo expenses (credits) before incomes (guarded debits).
            let mut entries = entries
                .into_iter()
                .map(Transaction::try_from)
                .collect::<ResultEngine<Vec<_>>>()?;
            entries.sort_by_key(|entry| entry.kind.is_inflow());

            for entry in &entries {
                self.reverse_entry(&db_tx, entry).await?;
            }
            Ok(entries.len())
        })?;

        tracing::info!(user_id, transaction_id = id, removed, "transaction deleted");
        Ok(())
    }

    /// Apply an entry's ledger effect to its account and persist it.
    pub(super) async fn post_entry(
        &self,
        db: &DatabaseTransaction,
        entry: NewEntry,
    ) -> ResultEngine<Transaction> {
        entry.validate()?;
        if let Some(account_id) = entry.account_id {
            self.adjust_balance(
                db,
                account_id,
                entry.user_id,
                entry.kind.ledger_effect(entry.amount),
            )
            .await?;
        }
        self.append(db, &entry).await
    }

    async fn reverse_entry(
        &self,
        db: &DatabaseTransaction,
        entry: &Transaction,
    ) -> ResultEngine<()> {
        if let Some(account_id) = entry.account_id {
            self.adjust_balance(
                db,
                account_id,
                entry.user_id,
                -entry.kind.ledger_effect(entry.amount),
            )
            .await?;
        }
        self.delete_entry(db, entry.id, entry.user_id).await
    }
}
