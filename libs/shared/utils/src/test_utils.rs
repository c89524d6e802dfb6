use std::sync::Arc;

use base64::{engine::general_purpose, Engine as _};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::ScheduleStore;
use shared_models::clinic::{Admin, Appointment, AppointmentStatus, Doctor, Patient};

use crate::state::AppState;

pub const TEST_JWT_SECRET: &str = "test-secret-key-for-jwt-validation-must-be-long-enough";
pub const TEST_PASSWORD: &str = "password123";

pub struct TestConfig {
    pub jwt_secret: String,
    pub token_expiry_days: i64,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: TEST_JWT_SECRET.to_string(),
            token_expiry_days: 7,
        }
    }
}

impl TestConfig {
    pub fn to_app_config(&self) -> AppConfig {
        let mut config = AppConfig::with_secret(self.jwt_secret.clone());
        config.token_expiry_days = self.token_expiry_days;
        config
    }
}

/// `at("2024-06-01", "10:00")`
pub fn at(date: &str, time: &str) -> NaiveDateTime {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").expect("date in YYYY-MM-DD form");
    let time = NaiveTime::parse_from_str(time, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M:%S"))
        .expect("time in HH:MM or HH:MM:SS form");
    date.and_time(time)
}

/// In-memory clinic with helpers for seeding principals and appointments.
#[derive(Clone)]
pub struct TestClinic {
    pub state: AppState,
}

impl Default for TestClinic {
    fn default() -> Self {
        Self::new()
    }
}

impl TestClinic {
    pub fn new() -> Self {
        Self {
            state: AppState::in_memory(TestConfig::default().to_app_config()),
        }
    }

    pub fn store(&self) -> &Arc<dyn ScheduleStore> {
        &self.state.store
    }

    pub async fn add_admin(&self, username: &str) -> Admin {
        let admin = Admin {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password: TEST_PASSWORD.to_string(),
        };
        self.store().save_admin(admin).await.expect("seed admin")
    }

    pub async fn add_doctor(&self, name: &str, email: &str, specialty: &str, slots: &[&str]) -> Doctor {
        let doctor = Doctor {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            password: TEST_PASSWORD.to_string(),
            specialty: specialty.to_string(),
            available_times: slots.iter().map(|s| s.to_string()).collect(),
        };
        self.store().save_doctor(doctor).await.expect("seed doctor")
    }

    pub async fn add_patient(&self, name: &str, email: &str, phone: &str) -> Patient {
        let patient = Patient {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            address: "1 Main St".to_string(),
            password: TEST_PASSWORD.to_string(),
        };
        self.store().save_patient(patient).await.expect("seed patient")
    }

    pub async fn add_appointment(&self, doctor: &Doctor, patient: &Patient, time: NaiveDateTime) -> Appointment {
        let appointment = Appointment {
            id: Uuid::new_v4(),
            doctor_id: doctor.id,
            patient_id: patient.id,
            appointment_time: time,
            status: AppointmentStatus::Upcoming,
        };
        self.store().save_appointment(appointment).await.expect("seed appointment")
    }

    pub fn token_for(&self, identifier: &str) -> String {
        self.state.tokens.issue(identifier).expect("issue test token")
    }
}

/// Hand-signed tokens for exercising rejection paths.
pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(subject: &str, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(24));

        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let payload = json!({
            "sub": subject,
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());

        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature_encoded = general_purpose::URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        format!("{}.{}", signing_input, signature_encoded)
    }

    pub fn create_expired_token(subject: &str, secret: &str) -> String {
        Self::create_test_token(subject, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(subject: &str) -> String {
        Self::create_test_token(subject, "wrong-secret", Some(24))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}
