use serde::{Deserialize, Serialize};

use shared_database::StoreError;
use shared_models::clinic::AppointmentStatus;
use shared_models::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterPatientRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub address: String,
    pub password: String,
}

impl RegisterPatientRequest {
    pub fn validate(&self) -> Result<(), PatientError> {
        let required = [
            ("name", &self.name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("password", &self.password),
        ];

        match required.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((field, _)) => Err(PatientError::ValidationError(format!("{} is required", field))),
            None => Ok(()),
        }
    }
}

/// `condition=past` selects completed appointments; any other condition
/// selects upcoming ones.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentFilter {
    pub condition: Option<String>,
    pub doctor_name: Option<String>,
}

impl AppointmentFilter {
    pub fn status(&self) -> Option<AppointmentStatus> {
        let condition = self.condition.as_deref().map(str::trim).filter(|c| !c.is_empty())?;

        if condition.eq_ignore_ascii_case("past") {
            Some(AppointmentStatus::Completed)
        } else {
            Some(AppointmentStatus::Upcoming)
        }
    }

    pub fn doctor_name(&self) -> Option<String> {
        self.doctor_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_lowercase)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PatientError {
    #[error("Patient not found")]
    NotFound,

    #[error("Patient with email or phone number already exist")]
    AlreadyRegistered,

    #[error("Unauthorized access to patient data")]
    Unauthorized,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<PatientError> for AppError {
    fn from(err: PatientError) -> Self {
        match err {
            PatientError::NotFound => AppError::NotFound(err.to_string()),
            PatientError::AlreadyRegistered => AppError::Conflict(err.to_string()),
            PatientError::Unauthorized => AppError::Unauthorized(err.to_string()),
            PatientError::ValidationError(_) => AppError::BadRequest(err.to_string()),
            PatientError::Store(e) => e.into(),
        }
    }
}
