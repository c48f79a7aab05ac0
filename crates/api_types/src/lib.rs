//! Request and response bodies of the HTTP API.
//!
//! Every body uses camelCase keys. Money is rendered as a decimal string
//! (`"12.50"`) and accepted either as a JSON number or as a string.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A money amount as sent by clients: `12.5` or `"12.50"`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Number(serde_json::Number),
    Text(String),
}

impl Amount {
    /// The amount as decimal text, ready to be parsed into integer cents.
    pub fn as_text(&self) -> String {
        match self {
            Self::Number(number) => number.to_string(),
            Self::Text(text) => text.trim().to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub mod auth {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SignUp {
        pub first_name: String,
        pub last_name: String,
        pub email: String,
        pub password: String,
        pub contact: Option<String>,
        #[serde(default)]
        pub accounts: Vec<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Login {
        pub email: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Token {
        pub token: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SignedUp {
        pub token: String,
        pub user: super::user::UserView,
    }
}

pub mod user {
    use super::*;

    /// Public profile. The password hash is never part of it.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct UserView {
        pub id: i32,
        pub first_name: String,
        pub last_name: String,
        pub email: String,
        pub contact: Option<String>,
        pub accounts: Vec<String>,
        pub country: Option<String>,
        pub currency: String,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserResponse {
        pub user: UserView,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct UserUpdate {
        pub first_name: Option<String>,
        pub last_name: Option<String>,
        pub email: Option<String>,
        pub contact: Option<String>,
        pub country: Option<String>,
        pub currency: Option<String>,
        pub accounts: Option<Vec<String>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PasswordChange {
        pub old_password: String,
        pub new_password: String,
        pub confirm_password: String,
    }
}

pub mod account {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct AccountNew {
        pub account_name: String,
        pub account_number: Option<String>,
        pub initial_balance: Amount,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AddMoney {
        pub amount: Amount,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct AccountView {
        pub id: i32,
        pub user_id: i32,
        pub account_name: String,
        pub account_number: Option<String>,
        pub account_balance: String,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountResponse {
        pub account: AccountView,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountList {
        pub accounts: Vec<AccountView>,
    }
}

pub mod transaction {
    use super::*;

    /// Query string of `GET /api/transactions`. Days are `YYYY-MM-DD`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionQuery {
        pub day_from: Option<String>,
        pub day_to: Option<String>,
        pub search: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionNew {
        pub description: String,
        pub status: String,
        pub source: String,
        pub amount: Amount,
        /// `income` or `expense`.
        #[serde(rename = "type")]
        pub kind: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransferNew {
        pub from_account_id: i32,
        pub to_account_id: i32,
        pub amount: Amount,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionView {
        pub id: i32,
        pub user_id: i32,
        pub account_id: Option<i32>,
        pub description: String,
        pub status: String,
        pub source: String,
        pub amount: String,
        #[serde(rename = "type")]
        pub kind: String,
        pub transfer_id: Option<String>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionResponse {
        pub transaction: TransactionView,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionList {
        pub transactions: Vec<TransactionView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransferResponse {
        pub transaction_from: TransactionView,
        pub transaction_to: TransactionView,
    }
}

pub mod dashboard {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ChartPoint {
        pub label: String,
        pub income: String,
        pub expense: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Dashboard {
        pub available_balance: String,
        pub total_income: String,
        pub total_expense: String,
        pub chart_data: Vec<ChartPoint>,
        pub last_transaction: Vec<super::transaction::TransactionView>,
        pub last_accounts: Vec<super::account::AccountView>,
    }
}
