use api_types::Message;
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::IntoResponse,
};
use engine::EngineError;

pub use auth::Auth;
pub use server::{ServerState, router, run_with_listener};

mod accounts;
mod auth;
mod extract;
mod server;
mod transactions;
mod user;
mod views;

pub mod types {
    pub mod auth {
        pub use api_types::auth::{Login, SignUp, SignedUp, Token};
    }

    pub mod user {
        pub use api_types::user::{PasswordChange, UserResponse, UserUpdate, UserView};
    }

    pub mod account {
        pub use api_types::account::{AccountList, AccountNew, AccountResponse, AccountView, AddMoney};
    }

    pub mod transaction {
        pub use api_types::transaction::{
            TransactionList, TransactionNew, TransactionQuery, TransactionResponse,
            TransactionView, TransferNew, TransferResponse,
        };
    }

    pub mod dashboard {
        pub use api_types::dashboard::{ChartPoint, Dashboard};
    }
}

#[derive(Debug)]
pub enum ServerError {
    Engine(EngineError),
    BadRequest(String),
    Unauthorized(String),
    NotFound(String),
    Internal(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::InvalidArgument(_) | EngineError::InsufficientFunds(_) => {
            StatusCode::BAD_REQUEST
        }
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::BadRequest(err) => (StatusCode::BAD_REQUEST, err),
            ServerError::Unauthorized(err) => {
                tracing::warn!("rejected request: {err}");
                (StatusCode::UNAUTHORIZED, err)
            }
            ServerError::NotFound(err) => (StatusCode::NOT_FOUND, err),
            ServerError::Internal(err) => {
                tracing::error!("internal error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(Message::new(message))).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<JsonRejection> for ServerError {
    fn from(value: JsonRejection) -> Self {
        Self::BadRequest(value.body_text())
    }
}

impl From<PathRejection> for ServerError {
    fn from(value: PathRejection) -> Self {
        Self::BadRequest(value.body_text())
    }
}

impl From<QueryRejection> for ServerError {
    fn from(value: QueryRejection) -> Self {
        Self::BadRequest(value.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::KeyNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_conflict_maps_to_409() {
        let res = ServerError::from(EngineError::ExistingKey("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn engine_validation_maps_to_400() {
        let res =
            ServerError::from(EngineError::InvalidArgument("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn insufficient_funds_maps_to_400() {
        let res =
            ServerError::from(EngineError::InsufficientFunds("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn unauthorized_maps_to_401() {
        let res = ServerError::Unauthorized("missing token".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn database_error_is_hidden() {
        let err = EngineError::Database(sea_orm::DbErr::Custom("disk on fire".to_string()));
        assert_eq!(message_for_engine_error(err), "internal server error");
    }
}
