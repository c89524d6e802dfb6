use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use auth_cell::middleware::{require_role, RoleGate};
use shared_models::auth::Role;
use shared_utils::AppState;

use crate::handlers;

pub fn doctor_routes(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(handlers::list_doctors))
        .route("/filter", get(handlers::filter_doctors))
        .route("/availability/{role}/{doctor_id}/{date}", get(handlers::get_availability));

    let admin_routes = Router::new()
        .route("/", post(handlers::create_doctor))
        .route("/{doctor_id}", put(handlers::update_doctor).delete(handlers::delete_doctor))
        .layer(middleware::from_fn_with_state(
            RoleGate::new(state.clone(), Role::Admin),
            require_role,
        ));

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .with_state(state)
}
