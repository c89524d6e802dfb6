use async_trait::async_trait;
use chrono::NaiveDateTime;
use thiserror::Error;
use uuid::Uuid;

use shared_models::clinic::{Admin, Appointment, Doctor, Patient, Prescription};
use shared_models::error::AppError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Uniqueness or reference constraint rejected the write.
    #[error("Constraint violation: {0}")]
    Conflict(String),

    #[error("Store backend error: {0}")]
    Backend(String),

    #[error("Failed to decode stored record: {0}")]
    Decode(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// Persistence boundary for scheduling records.
///
/// Implementations must reject a second appointment for the same doctor at the
/// same `appointment_time` with [`StoreError::Conflict`]; that constraint is the
/// last line of defense when two bookings race past validation.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    async fn find_admin_by_username(&self, username: &str) -> Result<Option<Admin>, StoreError>;
    async fn save_admin(&self, admin: Admin) -> Result<Admin, StoreError>;

    async fn find_doctor_by_id(&self, id: Uuid) -> Result<Option<Doctor>, StoreError>;
    async fn find_doctor_by_email(&self, email: &str) -> Result<Option<Doctor>, StoreError>;
    async fn doctor_exists(&self, id: Uuid) -> Result<bool, StoreError>;
    async fn list_doctors(&self) -> Result<Vec<Doctor>, StoreError>;
    async fn save_doctor(&self, doctor: Doctor) -> Result<Doctor, StoreError>;
    async fn delete_doctor(&self, id: Uuid) -> Result<bool, StoreError>;

    async fn find_patient_by_id(&self, id: Uuid) -> Result<Option<Patient>, StoreError>;
    async fn find_patient_by_email(&self, email: &str) -> Result<Option<Patient>, StoreError>;
    async fn find_patient_by_email_or_phone(
        &self,
        email: &str,
        phone: &str,
    ) -> Result<Option<Patient>, StoreError>;
    async fn save_patient(&self, patient: Patient) -> Result<Patient, StoreError>;
    async fn delete_patient(&self, id: Uuid) -> Result<bool, StoreError>;

    async fn find_appointment_by_id(&self, id: Uuid) -> Result<Option<Appointment>, StoreError>;
    /// Appointments of one doctor with `start <= appointment_time <= end`,
    /// ordered by appointment time.
    async fn find_appointments_by_doctor_and_time_range(
        &self,
        doctor_id: Uuid,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Appointment>, StoreError>;
    async fn find_appointments_by_patient(&self, patient_id: Uuid) -> Result<Vec<Appointment>, StoreError>;
    /// Inserts or replaces by id.
    async fn save_appointment(&self, appointment: Appointment) -> Result<Appointment, StoreError>;
    /// Removing an appointment also removes its prescription.
    async fn delete_appointment(&self, id: Uuid) -> Result<bool, StoreError>;
    async fn delete_appointments_by_doctor(&self, doctor_id: Uuid) -> Result<usize, StoreError>;

    async fn find_prescription_by_appointment(
        &self,
        appointment_id: Uuid,
    ) -> Result<Option<Prescription>, StoreError>;
    /// Rejects a second prescription for the same appointment with
    /// [`StoreError::Conflict`].
    async fn save_prescription(&self, prescription: Prescription) -> Result<Prescription, StoreError>;
}
