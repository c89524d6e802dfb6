use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_database::{ScheduleStore, StoreError};
use shared_models::clinic::{Appointment, Prescription};

use crate::models::{PrescriptionError, PrescriptionRequest};

/// Doctors write a prescription for their own appointment; the patient the
/// appointment belongs to reads it back.
pub struct PrescriptionService {
    store: Arc<dyn ScheduleStore>,
}

impl PrescriptionService {
    pub fn new(store: Arc<dyn ScheduleStore>) -> Self {
        Self { store }
    }

    async fn appointment(&self, appointment_id: Uuid) -> Result<Appointment, PrescriptionError> {
        self.store
            .find_appointment_by_id(appointment_id)
            .await?
            .ok_or(PrescriptionError::AppointmentNotFound)
    }

    pub async fn save(
        &self,
        doctor_identity: &str,
        request: PrescriptionRequest,
    ) -> Result<Prescription, PrescriptionError> {
        request.validate()?;
        let appointment = self.appointment(request.appointment_id).await?;

        let doctor = self.store.find_doctor_by_email(doctor_identity).await?;
        if doctor.map(|d| d.id) != Some(appointment.doctor_id) {
            warn!("{} tried to prescribe for appointment {}", doctor_identity, appointment.id);
            return Err(PrescriptionError::Unauthorized);
        }

        if self.store.find_prescription_by_appointment(appointment.id).await?.is_some() {
            return Err(PrescriptionError::AlreadyExists);
        }

        let patient = self
            .store
            .find_patient_by_id(appointment.patient_id)
            .await?
            .ok_or(PrescriptionError::AppointmentNotFound)?;

        let prescription = Prescription {
            id: Uuid::new_v4(),
            appointment_id: appointment.id,
            patient_name: patient.name,
            medication: request.medication,
            dosage: request.dosage,
            doctor_notes: request.doctor_notes.filter(|notes| !notes.trim().is_empty()),
        };

        let saved = self.store.save_prescription(prescription).await.map_err(|e| match e {
            StoreError::Conflict(_) => PrescriptionError::AlreadyExists,
            other => PrescriptionError::Store(other),
        })?;

        info!("Saved prescription {} for appointment {}", saved.id, saved.appointment_id);
        Ok(saved)
    }

    pub async fn get(
        &self,
        appointment_id: Uuid,
        patient_identity: &str,
    ) -> Result<Prescription, PrescriptionError> {
        let appointment = self.appointment(appointment_id).await?;

        let patient = self.store.find_patient_by_email(patient_identity).await?;
        if patient.map(|p| p.id) != Some(appointment.patient_id) {
            warn!("{} requested prescription of appointment {}", patient_identity, appointment_id);
            return Err(PrescriptionError::Unauthorized);
        }

        debug!("Fetching prescription for appointment {}", appointment_id);
        self.store
            .find_prescription_by_appointment(appointment_id)
            .await?
            .ok_or(PrescriptionError::NotFound)
    }
}
