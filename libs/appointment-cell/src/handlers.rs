use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_models::auth::Principal;
use shared_models::error::AppError;
use shared_utils::AppState;

use crate::models::{
    AppointmentError, BookAppointmentRequest, BookingRequest, DoctorDayQuery, UpdateAppointmentRequest,
};
use crate::services::AppointmentLifecycleService;

// ==============================================================================
// PATIENT HANDLERS
// ==============================================================================

pub async fn book_appointment(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    debug!("Patient {} booking doctor {} at {}", principal.identifier, request.doctor_id, request.appointment_time);

    let patient = state
        .store
        .find_patient_by_email(&principal.identifier)
        .await?
        .ok_or(AppointmentError::PatientNotFound)?;

    let appointment = AppointmentLifecycleService::new(&state)
        .book(BookingRequest {
            doctor_id: request.doctor_id,
            patient_id: patient.id,
            appointment_time: request.appointment_time,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Appointment booked successfully",
            "appointment": appointment
        })),
    ))
}

pub async fn update_appointment(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(appointment_id): Path<Uuid>,
    Json(changes): Json<UpdateAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    debug!("Patient {} updating appointment {}", principal.identifier, appointment_id);

    let appointment = AppointmentLifecycleService::new(&state)
        .update(appointment_id, changes)
        .await?;

    Ok(Json(json!({
        "message": "Appointment updated successfully",
        "appointment": appointment
    })))
}

pub async fn cancel_appointment(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    AppointmentLifecycleService::new(&state)
        .cancel(appointment_id, &principal.identifier)
        .await?;

    Ok(Json(json!({
        "message": "Appointment cancelled successfully"
    })))
}

// ==============================================================================
// DOCTOR HANDLERS
// ==============================================================================

pub async fn list_doctor_appointments(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(date): Path<NaiveDate>,
    Query(query): Query<DoctorDayQuery>,
) -> Result<Json<Value>, AppError> {
    let appointments = AppointmentLifecycleService::new(&state)
        .list_for_doctor_on_date(&principal.identifier, date, query.patient_name.as_deref())
        .await?;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len()
    })))
}
