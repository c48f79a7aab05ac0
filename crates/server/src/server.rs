use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post, put},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
    typed_header::TypedHeaderRejection,
};

use std::sync::Arc;

use crate::{Auth, ServerError, accounts, transactions, user};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub auth: Arc<Auth>,
}

/// Id of the user a verified bearer token belongs to.
#[derive(Clone, Copy, Debug)]
pub struct CurrentUser(pub i32);

async fn auth(
    State(state): State<ServerState>,
    auth_header: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Ok(TypedHeader(Authorization(bearer))) = auth_header else {
        return Err(ServerError::Unauthorized("missing bearer token".to_string()));
    };

    let user_id = state.auth.verify_token(bearer.token())?;
    request.extensions_mut().insert(CurrentUser(user_id));
    Ok(next.run(request).await)
}

pub fn router(state: ServerState) -> Router {
    let protected = Router::new()
        .route("/api/users", get(user::get).put(user::update))
        .route("/api/users/change-password", put(user::change_password))
        .route("/api/accounts", get(accounts::list))
        .route("/api/accounts/create", post(accounts::create))
        .route("/api/accounts/{id}/add-money", put(accounts::add_money))
        .route("/api/transactions", get(transactions::list))
        .route(
            "/api/transactions/add-transaction/{account_id}",
            post(transactions::add),
        )
        .route(
            "/api/transactions/transfer-money",
            put(transactions::transfer),
        )
        .route("/api/transactions/dashboard", get(transactions::dashboard))
        .route("/api/transactions/{id}", delete(transactions::delete))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth));

    Router::new()
        .route("/api/auth/sign-up", post(user::sign_up))
        .route("/api/auth/login", post(user::login))
        .merge(protected)
        .with_state(state)
}

/// Serve until `shutdown` resolves, then let in-flight requests finish.
pub async fn run_with_listener<F>(
    engine: Engine,
    auth: Auth,
    listener: tokio::net::TcpListener,
    shutdown: F,
) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        auth: Arc::new(auth),
    };

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    tracing::info!("Server stopped");
    Ok(())
}
