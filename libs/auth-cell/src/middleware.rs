use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use shared_models::auth::Role;
use shared_models::error::AppError;
use shared_utils::extractor::bearer_token;
use shared_utils::AppState;

use crate::services::AccessGate;

/// Middleware state for routes reserved to one role.
#[derive(Clone)]
pub struct RoleGate {
    pub state: AppState,
    pub role: Role,
}

impl RoleGate {
    pub fn new(state: AppState, role: Role) -> Self {
        Self { state, role }
    }
}

/// Rejects the request unless its bearer token passes the gate for the
/// configured role; the resulting `Principal` is placed in request extensions.
pub async fn require_role(
    State(gate): State<RoleGate>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers())?.to_string();

    let principal = AccessGate::new(&gate.state)
        .authorize(&token, gate.role)
        .await?;

    request.extensions_mut().insert(principal);

    Ok(next.run(request).await)
}
