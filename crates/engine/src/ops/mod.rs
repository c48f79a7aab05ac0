use sea_orm::DatabaseConnection;

use crate::{EngineError, ResultEngine};

mod access;
mod accounts;
mod balances;
mod dashboard;
mod ledger;
mod transactions;
mod users;

pub use balances::BalanceMismatch;
pub use dashboard::{Dashboard, MonthlyPoint};
pub use ledger::{MonthlyTotal, TransactionListFilter};
pub use transactions::Transfer;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
///
/// The uncommitted `DatabaseTransaction` rolls back when dropped, so an early
/// `?` inside the body never leaves partial writes behind.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result: crate::ResultEngine<_> = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Entry point of every ledger/account operation.
///
/// Holds the connection pool; each operation checks out a connection for the
/// duration of its own database transaction.
#[derive(Debug, Clone)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Close the underlying pool. Further operations fail with a database error.
    pub async fn shutdown(self) -> ResultEngine<()> {
        self.database.close().await?;
        Ok(())
    }
}

fn normalize_required_text(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidArgument(format!(
            "{label} must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}
