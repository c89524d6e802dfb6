use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use auth_cell::middleware::{require_role, RoleGate};
use shared_models::auth::Role;
use shared_utils::AppState;

use crate::handlers;

pub fn prescription_routes(state: AppState) -> Router {
    let doctor_routes = Router::new()
        .route("/", post(handlers::save_prescription))
        .layer(middleware::from_fn_with_state(
            RoleGate::new(state.clone(), Role::Doctor),
            require_role,
        ));

    let patient_routes = Router::new()
        .route("/{appointment_id}", get(handlers::get_prescription))
        .layer(middleware::from_fn_with_state(
            RoleGate::new(state.clone(), Role::Patient),
            require_role,
        ));

    Router::new()
        .merge(doctor_routes)
        .merge(patient_routes)
        .with_state(state)
}
