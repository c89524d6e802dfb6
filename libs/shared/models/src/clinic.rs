use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==============================================================================
// PRINCIPAL RECORDS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Admin {
    pub id: Uuid,
    pub username: String,
    #[serde(default, skip_serializing)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing)]
    pub password: String,
    pub specialty: String,
    /// Weekly template of `"HH:MM-HH:MM"` slot labels, in display order.
    #[serde(default)]
    pub available_times: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    #[serde(default, skip_serializing)]
    pub password: String,
}

// ==============================================================================
// APPOINTMENTS
// ==============================================================================

/// Stored as the integer flag `0` (upcoming) / `1` (completed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum AppointmentStatus {
    #[default]
    Upcoming,
    Completed,
}

impl AppointmentStatus {
    pub fn as_flag(&self) -> i32 {
        match self {
            AppointmentStatus::Upcoming => 0,
            AppointmentStatus::Completed => 1,
        }
    }
}

impl From<AppointmentStatus> for i32 {
    fn from(status: AppointmentStatus) -> Self {
        status.as_flag()
    }
}

impl TryFrom<i32> for AppointmentStatus {
    type Error = String;

    fn try_from(flag: i32) -> Result<Self, Self::Error> {
        match flag {
            0 => Ok(AppointmentStatus::Upcoming),
            1 => Ok(AppointmentStatus::Completed),
            other => Err(format!("invalid appointment status flag: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    /// Local date and slot start time.
    pub appointment_time: NaiveDateTime,
    #[serde(default)]
    pub status: AppointmentStatus,
}

impl Appointment {
    pub fn time_label(&self) -> String {
        time_of_day_label(self.appointment_time.time())
    }
}

/// Appointment joined with the names and contact details shown in listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentDetails {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub doctor_name: String,
    pub patient_id: Uuid,
    pub patient_name: String,
    pub patient_email: String,
    pub patient_phone: String,
    pub patient_address: String,
    pub appointment_time: NaiveDateTime,
    pub status: AppointmentStatus,
}

impl AppointmentDetails {
    pub fn new(appointment: &Appointment, doctor: &Doctor, patient: &Patient) -> Self {
        Self {
            id: appointment.id,
            doctor_id: doctor.id,
            doctor_name: doctor.name.clone(),
            patient_id: patient.id,
            patient_name: patient.name.clone(),
            patient_email: patient.email.clone(),
            patient_phone: patient.phone.clone(),
            patient_address: patient.address.clone(),
            appointment_time: appointment.appointment_time,
            status: appointment.status,
        }
    }
}

// ==============================================================================
// PRESCRIPTIONS
// ==============================================================================

/// Written by the treating doctor; at most one per appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prescription {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub patient_name: String,
    pub medication: String,
    pub dosage: String,
    #[serde(default)]
    pub doctor_notes: Option<String>,
}

// ==============================================================================
// TIME HELPERS
// ==============================================================================

/// ISO local-time rendering used to match a booked time against slot labels:
/// `HH:MM`, `HH:MM:SS`, or `HH:MM:SS.fff` with 3, 6 or 9 fraction digits,
/// always the shortest form that loses nothing.
pub fn time_of_day_label(time: NaiveTime) -> String {
    let mut label = format!("{:02}:{:02}", time.hour(), time.minute());
    let nanos = time.nanosecond() % 1_000_000_000;

    if time.second() > 0 || nanos > 0 {
        label.push_str(&format!(":{:02}", time.second()));
        if nanos > 0 {
            if nanos % 1_000_000 == 0 {
                label.push_str(&format!(".{:03}", nanos / 1_000_000));
            } else if nanos % 1_000 == 0 {
                label.push_str(&format!(".{:06}", nanos / 1_000));
            } else {
                label.push_str(&format!(".{:09}", nanos));
            }
        }
    }

    label
}

/// Inclusive `[00:00:00, 23:59:59.999999999]` bounds of a calendar day.
/// Built from time-of-day values only, so it holds for every representable date.
pub fn day_window(date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let midnight = NaiveTime::default();
    // NaiveTime arithmetic wraps around midnight instead of overflowing.
    let last_instant = midnight - Duration::nanoseconds(1);
    (date.and_time(midnight), date.and_time(last_instant))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(h: u32, m: u32, s: u32, nano: u32) -> NaiveTime {
        NaiveTime::from_hms_nano_opt(h, m, s, nano).unwrap()
    }

    #[test]
    fn test_time_label_omits_zero_seconds() {
        assert_eq!(time_of_day_label(time(10, 0, 0, 0)), "10:00");
        assert_eq!(time_of_day_label(time(9, 5, 0, 0)), "09:05");
    }

    #[test]
    fn test_time_label_keeps_seconds_and_fraction() {
        assert_eq!(time_of_day_label(time(10, 0, 30, 0)), "10:00:30");
        assert_eq!(time_of_day_label(time(10, 0, 0, 500_000_000)), "10:00:00.500");
        assert_eq!(time_of_day_label(time(10, 0, 0, 1_000)), "10:00:00.000001");
        assert_eq!(time_of_day_label(time(10, 0, 0, 7)), "10:00:00.000000007");
    }

    #[test]
    fn test_day_window_is_inclusive() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let (start, end) = day_window(date);

        assert_eq!(start, date.and_hms_opt(0, 0, 0).unwrap());
        assert_eq!(end, date.and_hms_nano_opt(23, 59, 59, 999_999_999).unwrap());
    }

    #[test]
    fn test_day_window_covers_last_representable_date() {
        let (start, end) = day_window(NaiveDate::MAX);

        assert_eq!(start.date(), NaiveDate::MAX);
        assert_eq!(end.date(), NaiveDate::MAX);
        assert_eq!(end.time(), time(23, 59, 59, 999_999_999));
    }

    #[test]
    fn test_status_serializes_as_flag() {
        assert_eq!(serde_json::to_string(&AppointmentStatus::Completed).unwrap(), "1");
        let status: AppointmentStatus = serde_json::from_str("0").unwrap();
        assert_eq!(status, AppointmentStatus::Upcoming);
        assert!(serde_json::from_str::<AppointmentStatus>("2").is_err());
    }

    #[test]
    fn test_password_is_never_serialized() {
        let patient = Patient {
            id: Uuid::new_v4(),
            name: "Anna".to_string(),
            email: "anna@example.com".to_string(),
            phone: "555-0100".to_string(),
            address: "1 Main St".to_string(),
            password: "secret".to_string(),
        };

        let value = serde_json::to_value(&patient).unwrap();
        assert!(value.get("password").is_none());
    }
}
