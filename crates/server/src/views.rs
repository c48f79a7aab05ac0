//! Conversions from engine values to API bodies.

use api_types::{
    Amount, account::AccountView, dashboard::ChartPoint, transaction::TransactionView,
    user::UserView,
};
use engine::{Account, Money, MonthlyPoint, Transaction, User};

use crate::ServerError;

pub(crate) fn parse_amount(amount: &Amount) -> Result<Money, ServerError> {
    Ok(amount.as_text().parse::<Money>()?)
}

pub(crate) fn user_view(user: User) -> UserView {
    UserView {
        id: user.id,
        first_name: user.first_name,
        last_name: user.last_name,
        email: user.email,
        contact: user.contact,
        accounts: user.accounts,
        country: user.country,
        currency: user.currency,
        created_at: user.created_at,
        updated_at: user.updated_at,
    }
}

pub(crate) fn account_view(account: Account) -> AccountView {
    AccountView {
        id: account.id,
        user_id: account.user_id,
        account_name: account.name,
        account_number: account.number,
        account_balance: account.balance.to_string(),
        created_at: account.created_at,
    }
}

pub(crate) fn transaction_view(tx: Transaction) -> TransactionView {
    TransactionView {
        id: tx.id,
        user_id: tx.user_id,
        account_id: tx.account_id,
        description: tx.description,
        status: tx.status,
        source: tx.source,
        amount: tx.amount.to_string(),
        kind: tx.kind.as_str().to_string(),
        transfer_id: tx.transfer_id.map(|id| id.to_string()),
        created_at: tx.created_at,
    }
}

pub(crate) fn chart_point(point: MonthlyPoint) -> ChartPoint {
    ChartPoint {
        label: point.label.to_string(),
        income: point.income.to_string(),
        expense: point.expense.to_string(),
    }
}
