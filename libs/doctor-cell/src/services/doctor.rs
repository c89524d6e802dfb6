use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_database::{ScheduleStore, StoreError};
use shared_models::clinic::Doctor;

use crate::models::{DoctorError, DoctorFilter, DoctorRequest};

pub struct DoctorService {
    store: Arc<dyn ScheduleStore>,
}

impl DoctorService {
    pub fn new(store: Arc<dyn ScheduleStore>) -> Self {
        Self { store }
    }

    pub async fn create_doctor(&self, request: DoctorRequest) -> Result<Doctor, DoctorError> {
        request.validate()?;
        debug!("Creating doctor profile for: {}", request.email);

        let password = request
            .password
            .filter(|p| !p.is_empty())
            .ok_or_else(|| DoctorError::Invalid("password is required".to_string()))?;

        if self.store.find_doctor_by_email(&request.email).await?.is_some() {
            warn!("Doctor email {} already registered", request.email);
            return Err(DoctorError::EmailTaken(request.email));
        }

        let doctor = Doctor {
            id: Uuid::new_v4(),
            name: request.name,
            email: request.email,
            password,
            specialty: request.specialty,
            available_times: request.available_times,
        };

        let saved = self.save(doctor).await?;
        info!("Created doctor {} ({})", saved.id, saved.email);
        Ok(saved)
    }

    pub async fn update_doctor(&self, doctor_id: Uuid, request: DoctorRequest) -> Result<Doctor, DoctorError> {
        request.validate()?;

        let existing = self
            .store
            .find_doctor_by_id(doctor_id)
            .await?
            .ok_or(DoctorError::NotFound)?;

        if request.email != existing.email {
            if let Some(other) = self.store.find_doctor_by_email(&request.email).await? {
                if other.id != doctor_id {
                    return Err(DoctorError::EmailTaken(request.email));
                }
            }
        }

        let doctor = Doctor {
            id: doctor_id,
            name: request.name,
            email: request.email,
            password: request
                .password
                .filter(|p| !p.is_empty())
                .unwrap_or(existing.password),
            specialty: request.specialty,
            available_times: request.available_times,
        };

        let saved = self.save(doctor).await?;
        info!("Updated doctor {}", doctor_id);
        Ok(saved)
    }

    /// Removes the doctor together with every appointment that references them.
    pub async fn delete_doctor(&self, doctor_id: Uuid) -> Result<(), DoctorError> {
        if !self.store.doctor_exists(doctor_id).await? {
            return Err(DoctorError::NotFound);
        }

        let removed = self.store.delete_appointments_by_doctor(doctor_id).await?;
        if !self.store.delete_doctor(doctor_id).await? {
            return Err(DoctorError::NotFound);
        }

        info!("Deleted doctor {} and {} appointments", doctor_id, removed);
        Ok(())
    }

    pub async fn list_doctors(&self) -> Result<Vec<Doctor>, DoctorError> {
        Ok(self.store.list_doctors().await?)
    }

    pub async fn filter_doctors(&self, filter: &DoctorFilter) -> Result<Vec<Doctor>, DoctorError> {
        debug!("Filtering doctors with {:?}", filter);

        let doctors = self.store.list_doctors().await?;
        Ok(doctors.into_iter().filter(|d| filter.matches(d)).collect())
    }

    async fn save(&self, doctor: Doctor) -> Result<Doctor, DoctorError> {
        let email = doctor.email.clone();
        self.store.save_doctor(doctor).await.map_err(|e| match e {
            StoreError::Conflict(_) => DoctorError::EmailTaken(email),
            other => DoctorError::Store(other),
        })
    }
}
