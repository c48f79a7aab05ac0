use chrono::{Datelike, Utc};
use sea_orm::{QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*};

use crate::{Account, Money, ResultEngine, Transaction, accounts, money::out_of_range, transactions};

use super::{Engine, with_tx};

const RECENT_LIMIT: u64 = 5;

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// One bar of the yearly chart. Deposits count as income.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonthlyPoint {
    pub month: u32,
    pub label: &'static str,
    pub income: Money,
    pub expense: Money,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dashboard {
    /// `total_income - total_expense`.
    pub available_balance: Money,
    /// Income plus deposits.
    pub total_income: Money,
    pub total_expense: Money,
    /// Always 12 entries, January first.
    pub chart_data: Vec<MonthlyPoint>,
    pub last_transactions: Vec<Transaction>,
    pub last_accounts: Vec<Account>,
}

fn empty_chart() -> Vec<MonthlyPoint> {
    MONTH_LABELS
        .into_iter()
        .zip(1u32..)
        .map(|(label, month)| MonthlyPoint {
            month,
            label,
            income: Money::ZERO,
            expense: Money::ZERO,
        })
        .collect()
}

impl Engine {
    /// Aggregate the user's ledger for the current UTC year.
    ///
    /// All reads share one database transaction so totals, chart and recent
    /// rows come from the same snapshot.
    pub async fn dashboard(&self, user_id: i32) -> ResultEngine<Dashboard> {
        let year = Utc::now().year();

        with_tx!(self, |db_tx| {
            let mut total_income = Money::ZERO;
            let mut total_expense = Money::ZERO;
            for (kind, total) in self.totals_by_kind(&db_tx, user_id).await? {
                if kind.is_inflow() {
                    total_income.accumulate(total)?;
                } else {
                    total_expense.accumulate(total)?;
                }
            }

            let mut chart_data = empty_chart();
            for bucket in self.monthly_totals(&db_tx, user_id, year).await? {
                let Some(point) = chart_data.get_mut(bucket.month as usize - 1) else {
                    continue;
                };
                if bucket.kind.is_inflow() {
                    point.income.accumulate(bucket.total)?;
                } else {
                    point.expense.accumulate(bucket.total)?;
                }
            }

            let last_transactions = transactions::Entity::find()
                .filter(transactions::Column::UserId.eq(user_id))
                .order_by_desc(transactions::Column::Id)
                .limit(RECENT_LIMIT)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Transaction::try_from)
                .collect::<ResultEngine<Vec<_>>>()?;

            let last_accounts = accounts::Entity::find()
                .filter(accounts::Column::UserId.eq(user_id))
                .order_by_desc(accounts::Column::Id)
                .limit(RECENT_LIMIT)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Account::from)
                .collect();

            let available_balance = total_income
                .checked_sub(total_expense)
                .ok_or_else(out_of_range)?;

            Ok(Dashboard {
                available_balance,
                total_income,
                total_expense,
                chart_data,
                last_transactions,
                last_accounts,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_starts_in_january_and_is_zero_filled() {
        let chart = empty_chart();
        assert_eq!(chart.len(), 12);
        assert_eq!(chart[0].label, "Jan");
        assert_eq!(chart[11].month, 12);
        assert!(chart.iter().all(|p| p.income == Money::ZERO && p.expense == Money::ZERO));
    }
}
