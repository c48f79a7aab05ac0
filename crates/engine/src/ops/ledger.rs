use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, Utc};
use sea_orm::{
    ConnectionTrait, DatabaseTransaction, QueryFilter, QueryOrder, Statement, TransactionTrait,
    prelude::*,
};

use crate::{EngineError, Money, NewEntry, ResultEngine, Transaction, TransactionKind, transactions};

use super::{Engine, with_tx};

/// Days covered by a listing when no lower bound is given.
const DEFAULT_WINDOW_DAYS: u64 = 7;

/// Filters for listing transactions.
///
/// Both bounds are calendar days in UTC and both are inclusive: `to` covers
/// the whole day up to midnight.
#[derive(Clone, Debug, Default)]
pub struct TransactionListFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    /// Case-insensitive substring matched against description, source and status.
    pub search: Option<String>,
}

impl TransactionListFilter {
    /// Resolve the half-open `[start, end)` timestamp range for `today`.
    fn bounds(&self, today: NaiveDate) -> ResultEngine<(DateTime<Utc>, DateTime<Utc>)> {
        let from = match self.from {
            Some(from) => from,
            None => today
                .checked_sub_days(Days::new(DEFAULT_WINDOW_DAYS))
                .ok_or_else(|| EngineError::InvalidArgument("invalid date range".to_string()))?,
        };
        let to = self.to.unwrap_or(today);
        if from > to {
            return Err(EngineError::InvalidArgument(
                "invalid range: dayFrom must not be after dayTo".to_string(),
            ));
        }
        let end = to
            .checked_add_days(Days::new(1))
            .ok_or_else(|| EngineError::InvalidArgument("invalid date range".to_string()))?;
        Ok((start_of_day(from), start_of_day(end)))
    }

    fn search_needle(&self) -> Option<String> {
        let needle = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        Some(needle.to_lowercase())
    }

    /// Whether `tx` matches the search needle. Folding happens in Rust because
    /// SQLite's `LOWER()` only folds ASCII.
    fn matches(needle: Option<&str>, tx: &Transaction) -> bool {
        let Some(needle) = needle else {
            return true;
        };
        [&tx.description, &tx.source, &tx.status]
            .into_iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

fn start_of_day(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(NaiveTime::MIN).and_utc()
}

/// Sum of one kind of entries within one calendar month.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MonthlyTotal {
    /// 1 = January.
    pub month: u32,
    pub kind: TransactionKind,
    pub total: Money,
}

impl Engine {
    /// List the user's transactions in the filter's day range, newest first.
    pub async fn list_transactions(
        &self,
        user_id: i32,
        filter: &TransactionListFilter,
    ) -> ResultEngine<Vec<Transaction>> {
        let (start, end) = filter.bounds(Utc::now().date_naive())?;

        with_tx!(self, |db_tx| {
            let models = transactions::Entity::find()
                .filter(transactions::Column::UserId.eq(user_id))
                .filter(transactions::Column::CreatedAt.gte(start))
                .filter(transactions::Column::CreatedAt.lt(end))
                .order_by_desc(transactions::Column::Id)
                .all(&db_tx)
                .await?;

            let needle = filter.search_needle();
            let mut listed = Vec::with_capacity(models.len());
            for model in models {
                let tx = Transaction::try_from(model)?;
                if TransactionListFilter::matches(needle.as_deref(), &tx) {
                    listed.push(tx);
                }
            }
            Ok(listed)
        })
    }

    /// Totals per kind over the user's whole ledger.
    pub async fn sum_by_type(
        &self,
        user_id: i32,
    ) -> ResultEngine<BTreeMap<TransactionKind, Money>> {
        with_tx!(self, |db_tx| self.totals_by_kind(&db_tx, user_id).await)
    }

    /// Totals per month and kind for one calendar year, ordered by month then
    /// kind. Empty buckets are omitted.
    pub async fn sum_by_month_and_type(
        &self,
        user_id: i32,
        year: i32,
    ) -> ResultEngine<Vec<MonthlyTotal>> {
        with_tx!(self, |db_tx| self.monthly_totals(&db_tx, user_id, year).await)
    }

    /// Persist a validated ledger row. Balances are not touched here.
    pub(super) async fn append(
        &self,
        db: &DatabaseTransaction,
        entry: &NewEntry,
    ) -> ResultEngine<Transaction> {
        entry.validate()?;
        let model = transactions::ActiveModel::from(entry).insert(db).await?;
        Transaction::try_from(model)
    }

    /// Remove a ledger row owned by `user_id`. Balances are not touched here.
    pub(super) async fn delete_entry(
        &self,
        db: &DatabaseTransaction,
        id: i32,
        user_id: i32,
    ) -> ResultEngine<()> {
        let result = transactions::Entity::delete_many()
            .filter(transactions::Column::Id.eq(id))
            .filter(transactions::Column::UserId.eq(user_id))
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::KeyNotFound(
                "transaction not exists".to_string(),
            ));
        }
        Ok(())
    }

    pub(super) async fn totals_by_kind(
        &self,
        db: &DatabaseTransaction,
        user_id: i32,
    ) -> ResultEngine<BTreeMap<TransactionKind, Money>> {
        let stmt = Statement::from_sql_and_values(
            db.get_database_backend(),
            "SELECT kind, COALESCE(SUM(amount_minor), 0) AS total \
             FROM transactions \
             WHERE user_id = ? \
             GROUP BY kind;",
            vec![user_id.into()],
        );
        let rows = db.query_all(stmt).await?;

        let mut totals = BTreeMap::new();
        for row in rows {
            let kind: String = row.try_get("", "kind")?;
            let total: i64 = row.try_get("", "total")?;
            totals.insert(TransactionKind::try_from(kind.as_str())?, Money::new(total));
        }
        Ok(totals)
    }

    pub(super) async fn monthly_totals(
        &self,
        db: &DatabaseTransaction,
        user_id: i32,
        year: i32,
    ) -> ResultEngine<Vec<MonthlyTotal>> {
        let (start, end) = year_bounds(year)?;
        let models = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id))
            .filter(transactions::Column::CreatedAt.gte(start))
            .filter(transactions::Column::CreatedAt.lt(end))
            .all(db)
            .await?;

        let mut buckets: BTreeMap<(u32, TransactionKind), Money> = BTreeMap::new();
        for model in models {
            let tx = Transaction::try_from(model)?;
            buckets
                .entry((tx.created_at.month(), tx.kind))
                .or_insert(Money::ZERO)
                .accumulate(tx.amount)?;
        }

        Ok(buckets
            .into_iter()
            .map(|((month, kind), total)| MonthlyTotal { month, kind, total })
            .collect())
    }
}

fn year_bounds(year: i32) -> ResultEngine<(DateTime<Utc>, DateTime<Utc>)> {
    let invalid = || EngineError::InvalidArgument(format!("invalid year: {year}"));
    let start = NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(invalid)?;
    let end = NaiveDate::from_ymd_opt(year + 1, 1, 1).ok_or_else(invalid)?;
    Ok((start_of_day(start), start_of_day(end)))
}
