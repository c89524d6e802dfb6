use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_database::{ScheduleStore, StoreError};
use shared_models::clinic::{Appointment, AppointmentDetails, Doctor, Patient};

use crate::models::{AppointmentFilter, PatientError, RegisterPatientRequest};

pub struct PatientService {
    store: Arc<dyn ScheduleStore>,
}

impl PatientService {
    pub fn new(store: Arc<dyn ScheduleStore>) -> Self {
        Self { store }
    }

    pub async fn register(&self, request: RegisterPatientRequest) -> Result<Patient, PatientError> {
        request.validate()?;
        debug!("Registering patient: {}", request.email);

        if self
            .store
            .find_patient_by_email_or_phone(&request.email, &request.phone)
            .await?
            .is_some()
        {
            warn!("Patient with email {} or phone {} already registered", request.email, request.phone);
            return Err(PatientError::AlreadyRegistered);
        }

        let patient = Patient {
            id: Uuid::new_v4(),
            name: request.name,
            email: request.email,
            phone: request.phone,
            address: request.address,
            password: request.password,
        };

        let saved = self.store.save_patient(patient).await.map_err(|e| match e {
            StoreError::Conflict(_) => PatientError::AlreadyRegistered,
            other => PatientError::Store(other),
        })?;

        info!("Registered patient {} ({})", saved.id, saved.email);
        Ok(saved)
    }

    pub async fn details(&self, identity: &str) -> Result<Patient, PatientError> {
        self.store
            .find_patient_by_email(identity)
            .await?
            .ok_or(PatientError::NotFound)
    }

    /// Appointments of `patient_id`, which must be the caller's own id.
    pub async fn appointments_for(
        &self,
        patient_id: Uuid,
        identity: &str,
    ) -> Result<Vec<AppointmentDetails>, PatientError> {
        let patient = self.details(identity).await?;
        if patient.id != patient_id {
            warn!("{} requested appointments of patient {}", identity, patient_id);
            return Err(PatientError::Unauthorized);
        }

        let appointments = self.store.find_appointments_by_patient(patient.id).await?;
        self.with_doctors(&patient, appointments).await
    }

    pub async fn filter_appointments(
        &self,
        identity: &str,
        filter: &AppointmentFilter,
    ) -> Result<Vec<AppointmentDetails>, PatientError> {
        let patient = self.details(identity).await?;
        let status = filter.status();
        let doctor_name = filter.doctor_name();

        let appointments: Vec<Appointment> = self
            .store
            .find_appointments_by_patient(patient.id)
            .await?
            .into_iter()
            .filter(|a| status.is_none_or(|s| a.status == s))
            .collect();

        let details = self.with_doctors(&patient, appointments).await?;

        Ok(details
            .into_iter()
            .filter(|d| {
                doctor_name
                    .as_deref()
                    .is_none_or(|name| d.doctor_name.to_lowercase().contains(name))
            })
            .collect())
    }

    async fn with_doctors(
        &self,
        patient: &Patient,
        appointments: Vec<Appointment>,
    ) -> Result<Vec<AppointmentDetails>, PatientError> {
        let mut doctors: HashMap<Uuid, Option<Doctor>> = HashMap::new();
        let mut details = Vec::with_capacity(appointments.len());

        for appointment in &appointments {
            if !doctors.contains_key(&appointment.doctor_id) {
                let doctor = self.store.find_doctor_by_id(appointment.doctor_id).await?;
                doctors.insert(appointment.doctor_id, doctor);
            }

            match doctors.get(&appointment.doctor_id) {
                Some(Some(doctor)) => details.push(AppointmentDetails::new(appointment, doctor, patient)),
                _ => warn!("Appointment {} references missing doctor {}", appointment.id, appointment.doctor_id),
            }
        }

        Ok(details)
    }
}
