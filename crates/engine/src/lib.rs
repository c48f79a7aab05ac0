//! Ledger and account bookkeeping engine.
//!
//! Every balance change happens inside one database transaction together with
//! the ledger row that explains it, so stored balances can always be rebuilt
//! by replaying the ledger.

pub use accounts::Account;
pub use commands::{AddTransactionCmd, NewAccountCmd, NewUserCmd, TransferCmd, UpdateUserCmd};
pub use error::EngineError;
pub use money::Money;
pub use ops::{
    BalanceMismatch, Dashboard, Engine, EngineBuilder, MonthlyPoint, MonthlyTotal,
    TransactionListFilter, Transfer,
};
pub use transactions::{NewEntry, Transaction, TransactionKind};
pub use users::{Credentials, User};

mod accounts;
mod commands;
mod error;
mod money;
mod ops;
mod transactions;
mod users;

type ResultEngine<T> = Result<T, EngineError>;
