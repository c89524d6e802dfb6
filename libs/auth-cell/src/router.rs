use axum::{routing::post, Router};

use shared_utils::AppState;

use crate::handlers;

pub fn auth_routes(state: AppState) -> Router {
    Router::new()
        .route("/admin/login", post(handlers::login_admin))
        .route("/doctor/login", post(handlers::login_doctor))
        .route("/patient/login", post(handlers::login_patient))
        .route("/validate/{role}", post(handlers::validate_token))
        .with_state(state)
}
