use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_database::StoreError;
use shared_models::clinic::AppointmentStatus;
use shared_models::error::AppError;

pub const BOOKING_REJECTED_MESSAGE: &str = "Doctor invalid or slot unavailable";

// ==============================================================================
// REQUESTS
// ==============================================================================

/// Fully resolved booking handed to the lifecycle service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub appointment_time: NaiveDateTime,
}

/// Body of `POST /appointments`; the patient comes from the bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub doctor_id: Uuid,
    pub appointment_time: NaiveDateTime,
}

/// Fields left out keep their stored values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAppointmentRequest {
    pub doctor_id: Option<Uuid>,
    pub appointment_time: Option<NaiveDateTime>,
    pub status: Option<AppointmentStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DoctorDayQuery {
    pub patient_name: Option<String>,
}

// ==============================================================================
// VALIDATION
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationOutcome {
    DoctorNotFound,
    SlotUnavailable,
    Valid,
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid)
    }
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Error, Debug)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Patient not found")]
    PatientNotFound,

    #[error("{}", BOOKING_REJECTED_MESSAGE)]
    BookingRejected,

    #[error("Invalid update: {}", BOOKING_REJECTED_MESSAGE)]
    UpdateRejected,

    #[error("Unauthorized access to appointment")]
    Unauthorized,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        match err {
            AppointmentError::NotFound | AppointmentError::PatientNotFound => AppError::NotFound(err.to_string()),
            AppointmentError::BookingRejected | AppointmentError::UpdateRejected => {
                AppError::ValidationFailed(err.to_string())
            }
            AppointmentError::Unauthorized => AppError::Unauthorized(err.to_string()),
            AppointmentError::Store(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_rejections_share_one_message() {
        let booked: AppError = AppointmentError::BookingRejected.into();
        assert_eq!(booked.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(booked.public_message(), "Doctor invalid or slot unavailable");

        let updated: AppError = AppointmentError::UpdateRejected.into();
        assert_eq!(updated.public_message(), "Invalid update: Doctor invalid or slot unavailable");
    }

    #[test]
    fn test_store_failures_stay_internal() {
        let err: AppError = AppointmentError::Store(StoreError::Backend("socket closed".to_string())).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.public_message().contains("socket"));
    }

    #[test]
    fn test_update_request_fields_are_optional() {
        let request: UpdateAppointmentRequest =
            serde_json::from_str(r#"{"appointment_time":"2024-06-01T14:00:00"}"#).unwrap();

        assert!(request.doctor_id.is_none());
        assert!(request.status.is_none());
        assert!(request.appointment_time.is_some());
    }
}
