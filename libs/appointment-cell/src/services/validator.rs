use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::debug;
use uuid::Uuid;

use doctor_cell::services::AvailabilityService;
use shared_database::{ScheduleStore, StoreError};
use shared_models::clinic::time_of_day_label;

use crate::models::ValidationOutcome;

/// Checks a requested start time against the doctor's free slots. Shared by
/// booking and update.
pub struct BookingValidator {
    store: Arc<dyn ScheduleStore>,
    availability: AvailabilityService,
}

impl BookingValidator {
    pub fn new(store: Arc<dyn ScheduleStore>) -> Self {
        Self {
            availability: AvailabilityService::new(Arc::clone(&store)),
            store,
        }
    }

    /// `exclude` names an appointment whose own booking is ignored, so an
    /// update may keep its current slot.
    pub async fn validate(
        &self,
        doctor_id: Uuid,
        appointment_time: NaiveDateTime,
        exclude: Option<Uuid>,
    ) -> Result<ValidationOutcome, StoreError> {
        if !self.store.doctor_exists(doctor_id).await? {
            debug!("Validation failed: doctor {} does not exist", doctor_id);
            return Ok(ValidationOutcome::DoctorNotFound);
        }

        let free = self
            .availability
            .availability_excluding(doctor_id, appointment_time.date(), exclude)
            .await?;

        let requested = time_of_day_label(appointment_time.time());
        if free.iter().any(|slot| slot.starts_with(requested.as_str())) {
            Ok(ValidationOutcome::Valid)
        } else {
            debug!("Validation failed: {} not free for doctor {} on {}", requested, doctor_id, appointment_time.date());
            Ok(ValidationOutcome::SlotUnavailable)
        }
    }
}
