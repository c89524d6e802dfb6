use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use tracing::debug;
use uuid::Uuid;

use shared_database::{ScheduleStore, StoreError};
use shared_models::clinic::{day_window, time_of_day_label};

/// Removes every template slot whose label begins with the rendered start time
/// of a booked appointment. Template order is kept.
pub fn free_slots<I>(template: &[String], booked: I) -> Vec<String>
where
    I: IntoIterator<Item = NaiveTime>,
{
    let booked_labels: Vec<String> = booked.into_iter().map(time_of_day_label).collect();

    template
        .iter()
        .filter(|slot| !booked_labels.iter().any(|label| slot.starts_with(label.as_str())))
        .cloned()
        .collect()
}

pub struct AvailabilityService {
    store: Arc<dyn ScheduleStore>,
}

impl AvailabilityService {
    pub fn new(store: Arc<dyn ScheduleStore>) -> Self {
        Self { store }
    }

    /// Free slots of a doctor on one date. Unknown doctors have none.
    pub async fn availability(&self, doctor_id: Uuid, date: NaiveDate) -> Result<Vec<String>, StoreError> {
        self.availability_excluding(doctor_id, date, None).await
    }

    /// Same as [`availability`](Self::availability) but ignoring one
    /// appointment, so a booking can be checked against its own slot.
    pub async fn availability_excluding(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        exclude: Option<Uuid>,
    ) -> Result<Vec<String>, StoreError> {
        let Some(doctor) = self.store.find_doctor_by_id(doctor_id).await? else {
            debug!("Availability requested for unknown doctor {}", doctor_id);
            return Ok(Vec::new());
        };

        let (start, end) = day_window(date);
        let booked = self
            .store
            .find_appointments_by_doctor_and_time_range(doctor_id, start, end)
            .await?;

        let free = free_slots(
            &doctor.available_times,
            booked
                .iter()
                .filter(|appointment| Some(appointment.id) != exclude)
                .map(|appointment| appointment.appointment_time.time()),
        );

        debug!(
            "Doctor {} on {}: {} booked, {} of {} slots free",
            doctor_id,
            date,
            booked.len(),
            free.len(),
            doctor.available_times.len()
        );

        Ok(free)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template() -> Vec<String> {
        ["09:00-10:00", "10:00-11:00", "14:00-15:00"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_no_bookings_keeps_template() {
        assert_eq!(free_slots(&template(), []), template());
    }

    #[test]
    fn test_booked_start_removes_slot() {
        assert_eq!(free_slots(&template(), [hm(10, 0)]), vec!["09:00-10:00", "14:00-15:00"]);
    }

    #[test]
    fn test_booking_off_slot_start_removes_nothing() {
        assert_eq!(free_slots(&template(), [hm(10, 30)]), template());
    }

    #[test]
    fn test_prefix_match_can_remove_several_slots() {
        let template: Vec<String> = vec!["10:00-10:30".to_string(), "10:00-11:00".to_string()];
        assert!(free_slots(&template, [hm(10, 0)]).is_empty());
    }

    #[test]
    fn test_seconds_render_into_label() {
        let with_seconds = NaiveTime::from_hms_opt(10, 0, 30).unwrap();
        assert_eq!(free_slots(&template(), [with_seconds]), template());
    }
}
