//! Accounts API endpoints

use api_types::account::{AccountList, AccountNew, AccountResponse, AddMoney};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use engine::NewAccountCmd;

use crate::{
    ServerError,
    extract::{JsonBody, PathParam},
    server::{CurrentUser, ServerState},
    views::{account_view, parse_amount},
};

/// List the caller's accounts. No accounts at all is a 404.
pub async fn list(
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    State(state): State<ServerState>,
) -> Result<Json<AccountList>, ServerError> {
    let accounts = state.engine.accounts(user_id).await?;
    Ok(Json(AccountList {
        accounts: accounts.into_iter().map(account_view).collect(),
    }))
}

pub async fn create(
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): JsonBody<AccountNew>,
) -> Result<(StatusCode, Json<AccountResponse>), ServerError> {
    let initial_balance = parse_amount(&payload.initial_balance)?;
    let mut cmd = NewAccountCmd::new(user_id, payload.account_name, initial_balance);
    if let Some(number) = payload.account_number {
        cmd = cmd.number(number);
    }

    let account = state.engine.new_account(cmd).await?;
    Ok((
        StatusCode::CREATED,
        Json(AccountResponse {
            account: account_view(account),
        }),
    ))
}

pub async fn add_money(
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    State(state): State<ServerState>,
    WithRejection(Path(account_id), _): PathParam<i32>,
    WithRejection(Json(payload), _): JsonBody<AddMoney>,
) -> Result<Json<AccountResponse>, ServerError> {
    let amount = parse_amount(&payload.amount)?;
    let account = state.engine.add_money(account_id, user_id, amount).await?;
    Ok(Json(AccountResponse {
        account: account_view(account),
    }))
}
