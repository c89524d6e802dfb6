use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use auth_cell::middleware::{require_role, RoleGate};
use shared_models::auth::Role;
use shared_utils::AppState;

use crate::handlers;

pub fn appointment_routes(state: AppState) -> Router {
    let patient_routes = Router::new()
        .route("/", post(handlers::book_appointment))
        .route(
            "/{appointment_id}",
            put(handlers::update_appointment).delete(handlers::cancel_appointment),
        )
        .layer(middleware::from_fn_with_state(
            RoleGate::new(state.clone(), Role::Patient),
            require_role,
        ));

    let doctor_routes = Router::new()
        .route("/doctor/{date}", get(handlers::list_doctor_appointments))
        .layer(middleware::from_fn_with_state(
            RoleGate::new(state.clone(), Role::Doctor),
            require_role,
        ));

    Router::new()
        .merge(patient_routes)
        .merge(doctor_routes)
        .with_state(state)
}
