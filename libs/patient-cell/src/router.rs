use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use auth_cell::middleware::{require_role, RoleGate};
use shared_models::auth::Role;
use shared_utils::AppState;

use crate::handlers;

pub fn patient_routes(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/register", post(handlers::register_patient));

    let patient_routes = Router::new()
        .route("/me", get(handlers::get_patient_details))
        .route("/appointments", get(handlers::filter_patient_appointments))
        .route("/{patient_id}/appointments", get(handlers::get_patient_appointments))
        .layer(middleware::from_fn_with_state(
            RoleGate::new(state.clone(), Role::Patient),
            require_role,
        ));

    Router::new()
        .merge(public_routes)
        .merge(patient_routes)
        .with_state(state)
}
