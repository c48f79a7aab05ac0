//! Transactions API endpoints

use api_types::{
    Message,
    dashboard::Dashboard,
    transaction::{
        TransactionList, TransactionNew, TransactionQuery, TransactionResponse, TransferNew,
        TransferResponse,
    },
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, NaiveDate};
use axum_extra::extract::WithRejection;
use engine::{AddTransactionCmd, TransactionKind, TransactionListFilter, TransferCmd};

use crate::{
    ServerError,
    extract::{JsonBody, PathParam, QueryParams},
    server::{CurrentUser, ServerState},
    views::{account_view, chart_point, parse_amount, transaction_view},
};

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp (its UTC day is used).
fn parse_day(value: Option<&str>, field: &str) -> Result<Option<NaiveDate>, ServerError> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    if let Ok(day) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(Some(day));
    }
    DateTime::parse_from_rfc3339(value)
        .map(|dt| Some(dt.to_utc().date_naive()))
        .map_err(|_| ServerError::BadRequest(format!("invalid {field}: {value}")))
}

pub async fn list(
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    State(state): State<ServerState>,
    WithRejection(Query(query), _): QueryParams<TransactionQuery>,
) -> Result<Json<TransactionList>, ServerError> {
    let filter = TransactionListFilter {
        from: parse_day(query.day_from.as_deref(), "dayFrom")?,
        to: parse_day(query.day_to.as_deref(), "dayTo")?,
        search: query.search,
    };

    let transactions = state.engine.list_transactions(user_id, &filter).await?;
    Ok(Json(TransactionList {
        transactions: transactions.into_iter().map(transaction_view).collect(),
    }))
}

pub async fn add(
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    State(state): State<ServerState>,
    WithRejection(Path(account_id), _): PathParam<i32>,
    WithRejection(Json(payload), _): JsonBody<TransactionNew>,
) -> Result<(StatusCode, Json<TransactionResponse>), ServerError> {
    let amount = parse_amount(&payload.amount)?;
    let kind = TransactionKind::try_from(payload.kind.trim())?;

    let transaction = state
        .engine
        .add_transaction(
            AddTransactionCmd::new(user_id, account_id, kind, amount)
                .description(payload.description)
                .status(payload.status)
                .source(payload.source),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(TransactionResponse {
            transaction: transaction_view(transaction),
        }),
    ))
}

pub async fn transfer(
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): JsonBody<TransferNew>,
) -> Result<(StatusCode, Json<TransferResponse>), ServerError> {
    let amount = parse_amount(&payload.amount)?;
    let transfer = state
        .engine
        .transfer(TransferCmd::new(
            user_id,
            payload.from_account_id,
            payload.to_account_id,
            amount,
        ))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(TransferResponse {
            transaction_from: transaction_view(transfer.from),
            transaction_to: transaction_view(transfer.to),
        }),
    ))
}

pub async fn delete(
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): PathParam<i32>,
) -> Result<Json<Message>, ServerError> {
    state.engine.delete_transaction(id, user_id).await?;
    Ok(Json(Message::new("Transaction deleted successfully")))
}

pub async fn dashboard(
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    State(state): State<ServerState>,
) -> Result<Json<Dashboard>, ServerError> {
    let dashboard = state.engine.dashboard(user_id).await?;
    Ok(Json(Dashboard {
        available_balance: dashboard.available_balance.to_string(),
        total_income: dashboard.total_income.to_string(),
        total_expense: dashboard.total_expense.to_string(),
        chart_data: dashboard.chart_data.into_iter().map(chart_point).collect(),
        last_transaction: dashboard
            .last_transactions
            .into_iter()
            .map(transaction_view)
            .collect(),
        last_accounts: dashboard.last_accounts.into_iter().map(account_view).collect(),
    }))
}
