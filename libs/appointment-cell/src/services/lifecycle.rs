use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_database::{DoctorGuard, DoctorLocks, ScheduleStore, StoreError};
use shared_models::clinic::{day_window, Appointment, AppointmentDetails, AppointmentStatus};
use shared_utils::AppState;

use crate::models::{AppointmentError, BookingRequest, UpdateAppointmentRequest};
use crate::services::validator::BookingValidator;

/// Books, moves, cancels and lists appointments. Validation and the write that
/// follows it run inside the doctor's lock; the store's one-booking-per-start
/// constraint backs that up across processes.
pub struct AppointmentLifecycleService {
    store: Arc<dyn ScheduleStore>,
    validator: BookingValidator,
    locks: Arc<DoctorLocks>,
}

impl AppointmentLifecycleService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: Arc::clone(&state.store),
            validator: BookingValidator::new(Arc::clone(&state.store)),
            locks: Arc::clone(&state.doctor_locks),
        }
    }

    pub async fn get(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        self.store
            .find_appointment_by_id(appointment_id)
            .await?
            .ok_or(AppointmentError::NotFound)
    }

    pub async fn book(&self, request: BookingRequest) -> Result<Appointment, AppointmentError> {
        if !self.store.doctor_exists(request.doctor_id).await? {
            warn!("Rejected booking for unknown doctor {}", request.doctor_id);
            return Err(AppointmentError::BookingRejected);
        }

        let _guard = self.locks.acquire(request.doctor_id).await;

        let outcome = self
            .validator
            .validate(request.doctor_id, request.appointment_time, None)
            .await?;
        if !outcome.is_valid() {
            warn!(
                "Rejected booking for doctor {} at {}: {:?}",
                request.doctor_id, request.appointment_time, outcome
            );
            return Err(AppointmentError::BookingRejected);
        }

        let appointment = Appointment {
            id: Uuid::new_v4(),
            doctor_id: request.doctor_id,
            patient_id: request.patient_id,
            appointment_time: request.appointment_time,
            status: AppointmentStatus::Upcoming,
        };

        match self.store.save_appointment(appointment).await {
            Ok(saved) => {
                info!(
                    "Booked appointment {} with doctor {} at {}",
                    saved.id, saved.doctor_id, saved.appointment_time
                );
                Ok(saved)
            }
            Err(StoreError::Conflict(detail)) => {
                warn!("Booking lost at commit: {}", detail);
                Err(AppointmentError::BookingRejected)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Applies the given fields and re-validates the result. A rejected update
    /// leaves the stored record untouched.
    pub async fn update(
        &self,
        appointment_id: Uuid,
        changes: UpdateAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        let (_guard, existing) = self.lock_for_update(appointment_id, changes.doctor_id).await?;
        let updated = Appointment {
            doctor_id: changes.doctor_id.unwrap_or(existing.doctor_id),
            appointment_time: changes.appointment_time.unwrap_or(existing.appointment_time),
            status: changes.status.unwrap_or(existing.status),
            ..existing
        };

        let outcome = self
            .validator
            .validate(updated.doctor_id, updated.appointment_time, Some(appointment_id))
            .await?;
        if !outcome.is_valid() {
            warn!("Rejected update of appointment {}: {:?}", appointment_id, outcome);
            return Err(AppointmentError::UpdateRejected);
        }

        match self.store.save_appointment(updated).await {
            Ok(saved) => {
                info!("Updated appointment {} to {}", saved.id, saved.appointment_time);
                Ok(saved)
            }
            Err(StoreError::Conflict(detail)) => {
                warn!("Update of appointment {} lost at commit: {}", appointment_id, detail);
                Err(AppointmentError::UpdateRejected)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Locks the doctor the updated appointment will belong to and returns the
    /// record as read under that lock. Retries when a concurrent update moved
    /// the appointment to another doctor in between.
    async fn lock_for_update(
        &self,
        appointment_id: Uuid,
        new_doctor: Option<Uuid>,
    ) -> Result<(DoctorGuard, Appointment), AppointmentError> {
        let mut target = new_doctor.unwrap_or(self.get(appointment_id).await?.doctor_id);

        loop {
            let guard = self.locks.acquire(target).await;
            let existing = self.get(appointment_id).await?;
            let current = new_doctor.unwrap_or(existing.doctor_id);

            if current == guard.doctor_id() {
                return Ok((guard, existing));
            }

            debug!("Appointment {} moved to doctor {} while waiting", appointment_id, current);
            target = current;
        }
    }

    /// Only the patient the appointment belongs to may cancel it.
    pub async fn cancel(&self, appointment_id: Uuid, requesting_identity: &str) -> Result<(), AppointmentError> {
        let appointment = self.get(appointment_id).await?;

        let owner = self.store.find_patient_by_id(appointment.patient_id).await?;
        if owner.as_ref().map(|p| p.email.as_str()) != Some(requesting_identity) {
            warn!("{} tried to cancel appointment {} they do not own", requesting_identity, appointment_id);
            return Err(AppointmentError::Unauthorized);
        }

        if !self.store.delete_appointment(appointment_id).await? {
            return Err(AppointmentError::NotFound);
        }

        info!("Cancelled appointment {}", appointment_id);
        Ok(())
    }

    /// Appointments of the doctor on one date, ordered by time. A non-empty
    /// `patient_name` keeps only patients whose name contains it, ignoring case.
    pub async fn list_for_doctor_on_date(
        &self,
        doctor_identity: &str,
        date: NaiveDate,
        patient_name: Option<&str>,
    ) -> Result<Vec<AppointmentDetails>, AppointmentError> {
        let Some(doctor) = self.store.find_doctor_by_email(doctor_identity).await? else {
            debug!("No doctor found for {}", doctor_identity);
            return Ok(Vec::new());
        };

        let needle = patient_name
            .filter(|name| !name.is_empty())
            .map(str::to_lowercase);

        let (start, end) = day_window(date);
        let appointments = self
            .store
            .find_appointments_by_doctor_and_time_range(doctor.id, start, end)
            .await?;

        let mut details = Vec::with_capacity(appointments.len());
        for appointment in &appointments {
            let Some(patient) = self.store.find_patient_by_id(appointment.patient_id).await? else {
                warn!("Appointment {} references missing patient {}", appointment.id, appointment.patient_id);
                continue;
            };

            if let Some(needle) = &needle {
                if !patient.name.to_lowercase().contains(needle.as_str()) {
                    continue;
                }
            }

            details.push(AppointmentDetails::new(appointment, &doctor, &patient));
        }

        debug!("Doctor {} has {} appointments on {}", doctor_identity, details.len(), date);
        Ok(details)
    }
}
