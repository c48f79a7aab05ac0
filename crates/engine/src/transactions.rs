//! Ledger entry primitives.
//!
//! A `Transaction` records one balance effect on (at most) one account. The
//! stored amount is always positive; the direction comes from its
//! [`TransactionKind`].

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
    Deposit,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Deposit => "deposit",
        }
    }

    /// Signed balance change produced by an entry of this kind.
    ///
    /// Every path that touches a balance (add, transfer legs, deposits,
    /// deletion, replay) goes through this mapping.
    pub fn ledger_effect(self, amount: Money) -> Money {
        match self {
            Self::Income | Self::Deposit => amount,
            Self::Expense => -amount,
        }
    }

    /// Money coming in, as reported by the dashboard.
    pub fn is_inflow(self) -> bool {
        matches!(self, Self::Income | Self::Deposit)
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            "deposit" => Ok(Self::Deposit),
            other => Err(EngineError::InvalidArgument(format!(
                "invalid transaction type: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub id: i32,
    pub user_id: i32,
    pub account_id: Option<i32>,
    pub description: String,
    pub status: String,
    pub source: String,
    pub amount: Money,
    pub kind: TransactionKind,
    pub transfer_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// A ledger row that has not been persisted yet.
#[derive(Clone, Debug)]
pub struct NewEntry {
    pub user_id: i32,
    pub account_id: Option<i32>,
    pub description: String,
    pub status: String,
    pub source: String,
    pub amount: Money,
    pub kind: TransactionKind,
    pub transfer_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl NewEntry {
    pub(crate) fn validate(&self) -> ResultEngine<()> {
        if !self.amount.is_positive() {
            return Err(EngineError::InvalidArgument(
                "amount must be > 0".to_string(),
            ));
        }
        if self.amount > Money::MAX_AMOUNT {
            return Err(EngineError::InvalidArgument(
                "amount too large".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub account_id: Option<i32>,
    pub description: String,
    pub status: String,
    pub source: String,
    pub amount_minor: i64,
    pub kind: String,
    pub transfer_id: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Accounts,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&NewEntry> for ActiveModel {
    fn from(entry: &NewEntry) -> Self {
        Self {
            id: ActiveValue::NotSet,
            user_id: ActiveValue::Set(entry.user_id),
            account_id: ActiveValue::Set(entry.account_id),
            description: ActiveValue::Set(entry.description.clone()),
            status: ActiveValue::Set(entry.status.clone()),
            source: ActiveValue::Set(entry.source.clone()),
            amount_minor: ActiveValue::Set(entry.amount.cents()),
            kind: ActiveValue::Set(entry.kind.as_str().to_string()),
            transfer_id: ActiveValue::Set(entry.transfer_id.map(|id| id.to_string())),
            created_at: ActiveValue::Set(entry.created_at),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            account_id: model.account_id,
            description: model.description,
            status: model.status,
            source: model.source,
            amount: Money::new(model.amount_minor),
            kind: TransactionKind::try_from(model.kind.as_str())?,
            transfer_id: model
                .transfer_id
                .as_deref()
                .and_then(|s| Uuid::parse_str(s).ok()),
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ledger_effect_follows_kind() {
        let amount = Money::new(1250);
        assert_eq!(TransactionKind::Income.ledger_effect(amount), amount);
        assert_eq!(TransactionKind::Deposit.ledger_effect(amount), amount);
        assert_eq!(TransactionKind::Expense.ledger_effect(amount), -amount);
    }

    #[test]
    fn unknown_kind_is_invalid_argument() {
        assert_eq!(
            TransactionKind::try_from("refund"),
            Err(EngineError::InvalidArgument(
                "invalid transaction type: refund".to_string()
            ))
        );
        assert_eq!(
            TransactionKind::try_from("expense"),
            Ok(TransactionKind::Expense)
        );
    }
}
