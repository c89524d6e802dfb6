use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_database::StoreError;
use shared_models::error::AppError;

/// Body of `POST /prescriptions`; the patient name is copied from the
/// appointment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrescriptionRequest {
    pub appointment_id: Uuid,
    pub medication: String,
    pub dosage: String,
    #[serde(default)]
    pub doctor_notes: Option<String>,
}

impl PrescriptionRequest {
    pub fn validate(&self) -> Result<(), PrescriptionError> {
        if self.medication.trim().is_empty() {
            return Err(PrescriptionError::ValidationError("medication is required".to_string()));
        }
        if self.dosage.trim().is_empty() {
            return Err(PrescriptionError::ValidationError("dosage is required".to_string()));
        }
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum PrescriptionError {
    #[error("Appointment not found")]
    AppointmentNotFound,

    #[error("No prescription found for this appointment")]
    NotFound,

    #[error("Prescription already exists for this appointment")]
    AlreadyExists,

    #[error("Unauthorized access to prescription")]
    Unauthorized,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<PrescriptionError> for AppError {
    fn from(err: PrescriptionError) -> Self {
        match err {
            PrescriptionError::AppointmentNotFound | PrescriptionError::NotFound => {
                AppError::NotFound(err.to_string())
            }
            PrescriptionError::AlreadyExists => AppError::Conflict(err.to_string()),
            PrescriptionError::Unauthorized => AppError::Unauthorized(err.to_string()),
            PrescriptionError::ValidationError(_) => AppError::BadRequest(err.to_string()),
            PrescriptionError::Store(e) => e.into(),
        }
    }
}
