use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_models::auth::Principal;
use shared_models::error::AppError;
use shared_utils::AppState;

use crate::models::{AppointmentFilter, RegisterPatientRequest};
use crate::services::PatientService;

pub async fn register_patient(
    State(state): State<AppState>,
    Json(request): Json<RegisterPatientRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let patient = PatientService::new(state.store.clone())
        .register(request)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Signup successful",
            "patient": patient
        })),
    ))
}

pub async fn get_patient_details(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Value>, AppError> {
    let patient = PatientService::new(state.store.clone())
        .details(&principal.identifier)
        .await?;

    Ok(Json(json!({ "patient": patient })))
}

pub async fn get_patient_appointments(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    debug!("Patient {} listing appointments of {}", principal.identifier, patient_id);

    let appointments = PatientService::new(state.store.clone())
        .appointments_for(patient_id, &principal.identifier)
        .await?;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len()
    })))
}

pub async fn filter_patient_appointments(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(filter): Query<AppointmentFilter>,
) -> Result<Json<Value>, AppError> {
    let appointments = PatientService::new(state.store.clone())
        .filter_appointments(&principal.identifier, &filter)
        .await?;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len()
    })))
}
