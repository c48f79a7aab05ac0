//! Command structs for engine operations.
//!
//! These types group parameters for write operations (accounts, transactions,
//! transfers, users), keeping call sites readable and avoiding long argument
//! lists.

use crate::{Money, TransactionKind};

/// Open a new account with an initial balance.
#[derive(Clone, Debug)]
pub struct NewAccountCmd {
    pub user_id: i32,
    pub name: String,
    pub number: Option<String>,
    pub initial_balance: Money,
}

impl NewAccountCmd {
    #[must_use]
    pub fn new(user_id: i32, name: impl Into<String>, initial_balance: Money) -> Self {
        Self {
            user_id,
            name: name.into(),
            number: None,
            initial_balance,
        }
    }

    #[must_use]
    pub fn number(mut self, number: impl Into<String>) -> Self {
        self.number = Some(number.into());
        self
    }
}

/// Record an income or an expense against one account.
#[derive(Clone, Debug)]
pub struct AddTransactionCmd {
    pub user_id: i32,
    pub account_id: i32,
    pub description: String,
    pub status: String,
    pub source: String,
    pub amount: Money,
    pub kind: TransactionKind,
}

impl AddTransactionCmd {
    #[must_use]
    pub fn new(user_id: i32, account_id: i32, kind: TransactionKind, amount: Money) -> Self {
        Self {
            user_id,
            account_id,
            description: String::new(),
            status: String::new(),
            source: String::new(),
            amount,
            kind,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    #[must_use]
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }
}

/// Move money between two accounts of the same user.
#[derive(Clone, Debug)]
pub struct TransferCmd {
    pub user_id: i32,
    pub from_account_id: i32,
    pub to_account_id: i32,
    pub amount: Money,
}

impl TransferCmd {
    #[must_use]
    pub fn new(user_id: i32, from_account_id: i32, to_account_id: i32, amount: Money) -> Self {
        Self {
            user_id,
            from_account_id,
            to_account_id,
            amount,
        }
    }
}

/// Register a user. `password_hash` is stored verbatim.
#[derive(Clone, Debug, Default)]
pub struct NewUserCmd {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub contact: Option<String>,
    pub accounts: Vec<String>,
}

/// Patch a user's profile. `None` leaves the field untouched.
#[derive(Clone, Debug, Default)]
pub struct UpdateUserCmd {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub contact: Option<String>,
    pub country: Option<String>,
    pub currency: Option<String>,
    pub accounts: Option<Vec<String>>,
}
