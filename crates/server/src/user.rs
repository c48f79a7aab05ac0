//! Sign-up, login and profile endpoints

use api_types::{
    Message,
    auth::{Login, SignUp, SignedUp, Token},
    user::{PasswordChange, UserResponse, UserUpdate},
};
use axum::{Extension, Json, extract::State, http::StatusCode};
use axum_extra::extract::WithRejection;
use engine::{NewUserCmd, UpdateUserCmd};

use crate::{
    ServerError,
    extract::JsonBody,
    server::{CurrentUser, ServerState},
    views::user_view,
};

/// Register a user and log them in.
pub async fn sign_up(
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): JsonBody<SignUp>,
) -> Result<(StatusCode, Json<SignedUp>), ServerError> {
    if payload.password.is_empty() {
        return Err(ServerError::BadRequest(
            "password must not be empty".to_string(),
        ));
    }
    let password_hash = state.auth.hash_password(&payload.password).await?;

    let user = state
        .engine
        .sign_up(NewUserCmd {
            first_name: payload.first_name,
            last_name: payload.last_name,
            email: payload.email,
            password_hash,
            contact: payload.contact,
            accounts: payload.accounts,
        })
        .await?;
    let token = state.auth.issue_token(user.id)?;

    Ok((
        StatusCode::CREATED,
        Json(SignedUp {
            token,
            user: user_view(user),
        }),
    ))
}

pub async fn login(
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): JsonBody<Login>,
) -> Result<Json<Token>, ServerError> {
    let credentials = state.engine.user_by_email(&payload.email).await?;
    if !state
        .auth
        .verify_password(&payload.password, &credentials.password_hash)
        .await?
    {
        return Err(ServerError::Unauthorized("invalid credentials".to_string()));
    }

    let token = state.auth.issue_token(credentials.user.id)?;
    tracing::info!(user_id = credentials.user.id, "user logged in");
    Ok(Json(Token { token }))
}

pub async fn get(
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    State(state): State<ServerState>,
) -> Result<Json<UserResponse>, ServerError> {
    let user = state.engine.user(user_id).await?;
    Ok(Json(UserResponse {
        user: user_view(user),
    }))
}

pub async fn update(
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): JsonBody<UserUpdate>,
) -> Result<Json<UserResponse>, ServerError> {
    let user = state
        .engine
        .update_user(
            user_id,
            UpdateUserCmd {
                first_name: payload.first_name,
                last_name: payload.last_name,
                email: payload.email,
                contact: payload.contact,
                country: payload.country,
                currency: payload.currency,
                accounts: payload.accounts,
            },
        )
        .await?;
    Ok(Json(UserResponse {
        user: user_view(user),
    }))
}

pub async fn change_password(
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): JsonBody<PasswordChange>,
) -> Result<Json<Message>, ServerError> {
    if payload.new_password.is_empty() {
        return Err(ServerError::BadRequest(
            "password must not be empty".to_string(),
        ));
    }
    if payload.new_password != payload.confirm_password {
        return Err(ServerError::BadRequest(
            "new passwords do not match".to_string(),
        ));
    }

    let user = state.engine.user(user_id).await?;
    let credentials = state.engine.user_by_email(&user.email).await?;
    if !state
        .auth
        .verify_password(&payload.old_password, &credentials.password_hash)
        .await?
    {
        return Err(ServerError::BadRequest(
            "invalid current password".to_string(),
        ));
    }

    let password_hash = state.auth.hash_password(&payload.new_password).await?;
    state.engine.set_password(user_id, password_hash).await?;
    Ok(Json(Message::new("Password changed successfully")))
}
