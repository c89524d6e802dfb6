use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use axum_extra::TypedHeader;
use chrono::NaiveDate;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use auth_cell::services::AccessGate;
use shared_models::auth::{Principal, Role, UnknownRole};
use shared_models::error::AppError;
use shared_utils::AppState;

use crate::models::{AvailabilityResponse, DoctorFilter, DoctorRequest};
use crate::services::{AvailabilityService, DoctorService};

// ==============================================================================
// PUBLIC HANDLERS
// ==============================================================================

pub async fn list_doctors(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let doctors = DoctorService::new(state.store.clone()).list_doctors().await?;

    Ok(Json(json!({
        "doctors": doctors,
        "total": doctors.len()
    })))
}

pub async fn filter_doctors(
    State(state): State<AppState>,
    Query(filter): Query<DoctorFilter>,
) -> Result<Json<Value>, AppError> {
    let doctors = DoctorService::new(state.store.clone())
        .filter_doctors(&filter)
        .await?;

    Ok(Json(json!({
        "doctors": doctors,
        "total": doctors.len()
    })))
}

/// Open to any role; the role named in the path is the one the token is
/// checked against.
pub async fn get_availability(
    State(state): State<AppState>,
    Path((role, doctor_id, date)): Path<(String, Uuid, NaiveDate)>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let role: Role = role
        .parse()
        .map_err(|e: UnknownRole| AppError::BadRequest(e.to_string()))?;

    let principal = AccessGate::new(&state).authorize(auth.token(), role).await?;
    debug!("{} {} requested availability of doctor {} on {}", principal.role, principal.identifier, doctor_id, date);

    let available_times = AvailabilityService::new(state.store.clone())
        .availability(doctor_id, date)
        .await?;

    Ok(Json(AvailabilityResponse {
        doctor_id,
        date,
        available_times,
    }))
}

// ==============================================================================
// ADMIN HANDLERS
// ==============================================================================

pub async fn create_doctor(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(request): Json<DoctorRequest>,
) -> Result<Json<Value>, AppError> {
    debug!("Admin {} adding doctor {}", principal.identifier, request.email);

    let doctor = DoctorService::new(state.store.clone())
        .create_doctor(request)
        .await?;

    Ok(Json(json!({
        "message": "Doctor added to db",
        "doctor": doctor
    })))
}

pub async fn update_doctor(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(doctor_id): Path<Uuid>,
    Json(request): Json<DoctorRequest>,
) -> Result<Json<Value>, AppError> {
    debug!("Admin {} updating doctor {}", principal.identifier, doctor_id);

    let doctor = DoctorService::new(state.store.clone())
        .update_doctor(doctor_id, request)
        .await?;

    Ok(Json(json!({
        "message": "Doctor updated",
        "doctor": doctor
    })))
}

pub async fn delete_doctor(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    debug!("Admin {} deleting doctor {}", principal.identifier, doctor_id);

    DoctorService::new(state.store.clone())
        .delete_doctor(doctor_id)
        .await?;

    Ok(Json(json!({
        "message": "Doctor deleted successfully"
    })))
}
