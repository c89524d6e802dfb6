use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_database::StoreError;
use shared_models::clinic::Doctor;
use shared_models::error::AppError;

// ==============================================================================
// REQUEST DTOs
// ==============================================================================

/// Body of both create and update. On update a missing password keeps the
/// stored one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub password: Option<String>,
    pub specialty: String,
    #[serde(default)]
    pub available_times: Vec<String>,
}

impl DoctorRequest {
    pub fn validate(&self) -> Result<(), DoctorError> {
        if self.name.trim().is_empty() {
            return Err(DoctorError::Invalid("name is required".to_string()));
        }
        if self.email.trim().is_empty() {
            return Err(DoctorError::Invalid("email is required".to_string()));
        }
        if self.specialty.trim().is_empty() {
            return Err(DoctorError::Invalid("specialty is required".to_string()));
        }
        Ok(())
    }
}

// ==============================================================================
// FILTERING
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayPeriod {
    #[serde(rename = "AM", alias = "am")]
    Am,
    #[serde(rename = "PM", alias = "pm")]
    Pm,
}

impl DayPeriod {
    fn contains_hour(&self, hour: u32) -> bool {
        match self {
            DayPeriod::Am => hour < 12,
            DayPeriod::Pm => hour >= 12,
        }
    }

    /// True if any slot starts in this half of the day. Slots whose leading
    /// hour is not a number are skipped.
    pub fn matches_any(&self, slots: &[String]) -> bool {
        slots.iter().any(|slot| {
            slot.split(':')
                .next()
                .and_then(|hour| hour.trim().parse::<u32>().ok())
                .is_some_and(|hour| self.contains_hour(hour))
        })
    }
}

/// Optional criteria; absent or blank ones match everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DoctorFilter {
    pub name: Option<String>,
    pub specialty: Option<String>,
    pub period: Option<DayPeriod>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl DoctorFilter {
    pub fn matches(&self, doctor: &Doctor) -> bool {
        let name_ok = present(&self.name)
            .is_none_or(|name| doctor.name.to_lowercase().contains(&name.to_lowercase()));

        let specialty_ok = present(&self.specialty)
            .is_none_or(|specialty| doctor.specialty.eq_ignore_ascii_case(specialty));

        let period_ok = self
            .period
            .is_none_or(|period| period.matches_any(&doctor.available_times));

        name_ok && specialty_ok && period_ok
    }
}

// ==============================================================================
// RESPONSES
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    pub available_times: Vec<String>,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Error, Debug)]
pub enum DoctorError {
    #[error("Doctor not found")]
    NotFound,

    #[error("Doctor with email {0} already exists")]
    EmailTaken(String),

    #[error("Invalid doctor: {0}")]
    Invalid(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<DoctorError> for AppError {
    fn from(err: DoctorError) -> Self {
        match err {
            DoctorError::NotFound => AppError::NotFound(err.to_string()),
            DoctorError::EmailTaken(_) => AppError::Conflict(err.to_string()),
            DoctorError::Invalid(_) => AppError::BadRequest(err.to_string()),
            DoctorError::Store(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doctor(name: &str, specialty: &str, slots: &[&str]) -> Doctor {
        Doctor {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: format!("{}@clinic.com", name.to_lowercase().replace(' ', ".")),
            password: String::new(),
            specialty: specialty.to_string(),
            available_times: slots.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = DoctorFilter::default();
        assert!(filter.matches(&doctor("Dr. Grey", "Surgery", &[])));
    }

    #[test]
    fn test_blank_criteria_are_ignored() {
        let filter = DoctorFilter {
            name: Some("  ".to_string()),
            specialty: Some(String::new()),
            period: None,
        };
        assert!(filter.matches(&doctor("Dr. Grey", "Surgery", &[])));
    }

    #[test]
    fn test_period_uses_leading_hour() {
        let slots = vec!["09:00-10:00".to_string()];
        assert!(DayPeriod::Am.matches_any(&slots));
        assert!(!DayPeriod::Pm.matches_any(&slots));

        let slots = vec!["12:00-13:00".to_string()];
        assert!(DayPeriod::Pm.matches_any(&slots));
    }

    #[test]
    fn test_period_skips_non_numeric_hours() {
        let slots = vec!["noon-13:00".to_string(), "14:00-15:00".to_string()];
        assert!(DayPeriod::Pm.matches_any(&slots));
        assert!(!DayPeriod::Am.matches_any(&slots));
    }

    #[test]
    fn test_period_deserializes_from_upper_and_lower_case() {
        let period: DayPeriod = serde_json::from_str("\"AM\"").unwrap();
        assert_eq!(period, DayPeriod::Am);
        let period: DayPeriod = serde_json::from_str("\"pm\"").unwrap();
        assert_eq!(period, DayPeriod::Pm);
    }
}
