use assert_matches::assert_matches;
use uuid::Uuid;

use doctor_cell::models::{DayPeriod, DoctorError, DoctorFilter, DoctorRequest};
use doctor_cell::services::DoctorService;
use shared_utils::test_utils::{at, TestClinic};

fn request(name: &str, email: &str, specialty: &str, slots: &[&str]) -> DoctorRequest {
    DoctorRequest {
        name: name.to_string(),
        email: email.to_string(),
        password: Some("s3cret".to_string()),
        specialty: specialty.to_string(),
        available_times: slots.iter().map(|s| s.to_string()).collect(),
    }
}

fn names(doctors: &[shared_models::clinic::Doctor]) -> Vec<&str> {
    doctors.iter().map(|d| d.name.as_str()).collect()
}

async fn seeded_directory() -> TestClinic {
    let clinic = TestClinic::new();
    clinic.add_doctor("Dr. Adams", "adams@clinic.com", "Cardiology", &["09:00-10:00"]).await;
    clinic.add_doctor("Dr. Baker", "baker@clinic.com", "cardiology", &["14:00-15:00"]).await;
    clinic.add_doctor("Dr. Clark", "clark@clinic.com", "Dermatology", &["late-slot", "08:00-09:00"]).await;
    clinic
}

#[tokio::test]
async fn test_create_doctor_rejects_duplicate_email() {
    let clinic = TestClinic::new();
    let service = DoctorService::new(clinic.store().clone());

    let created = service
        .create_doctor(request("Dr. Adams", "adams@clinic.com", "Cardiology", &[]))
        .await
        .unwrap();
    assert_eq!(created.password, "s3cret");

    let result = service
        .create_doctor(request("Dr. Other", "adams@clinic.com", "Surgery", &[]))
        .await;
    assert_matches!(result, Err(DoctorError::EmailTaken(email)) if email == "adams@clinic.com");
}

#[tokio::test]
async fn test_create_doctor_requires_password() {
    let clinic = TestClinic::new();
    let service = DoctorService::new(clinic.store().clone());

    let mut without_password = request("Dr. Adams", "adams@clinic.com", "Cardiology", &[]);
    without_password.password = None;

    assert_matches!(service.create_doctor(without_password).await, Err(DoctorError::Invalid(_)));
}

#[tokio::test]
async fn test_update_doctor_replaces_template_and_keeps_password() {
    let clinic = TestClinic::new();
    let doctor = clinic.add_doctor("Dr. Adams", "adams@clinic.com", "Cardiology", &["09:00-10:00"]).await;
    let service = DoctorService::new(clinic.store().clone());

    let mut changes = request("Dr. Adams", "adams@clinic.com", "Cardiology", &["16:00-17:00"]);
    changes.password = None;

    let updated = service.update_doctor(doctor.id, changes).await.unwrap();

    assert_eq!(updated.available_times, vec!["16:00-17:00"]);
    assert_eq!(updated.password, doctor.password);
}

#[tokio::test]
async fn test_update_unknown_doctor_is_not_found() {
    let clinic = TestClinic::new();
    let service = DoctorService::new(clinic.store().clone());

    let result = service
        .update_doctor(Uuid::new_v4(), request("Dr. X", "x@clinic.com", "Surgery", &[]))
        .await;

    assert_matches!(result, Err(DoctorError::NotFound));
}

#[tokio::test]
async fn test_delete_doctor_removes_their_appointments() {
    let clinic = TestClinic::new();
    let doctor = clinic.add_doctor("Dr. Adams", "adams@clinic.com", "Cardiology", &["09:00-10:00"]).await;
    let patient = clinic.add_patient("Anna", "anna@x.com", "555-0100").await;
    clinic.add_appointment(&doctor, &patient, at("2024-06-01", "09:00")).await;
    let service = DoctorService::new(clinic.store().clone());

    service.delete_doctor(doctor.id).await.unwrap();

    assert!(clinic.store().find_doctor_by_id(doctor.id).await.unwrap().is_none());
    assert!(clinic.store().find_appointments_by_patient(patient.id).await.unwrap().is_empty());
    assert_matches!(service.delete_doctor(doctor.id).await, Err(DoctorError::NotFound));
}

#[tokio::test]
async fn test_filter_by_name_is_case_insensitive() {
    let clinic = seeded_directory().await;
    let service = DoctorService::new(clinic.store().clone());

    let filter = DoctorFilter { name: Some("BAK".to_string()), ..Default::default() };
    let doctors = service.filter_doctors(&filter).await.unwrap();

    assert_eq!(names(&doctors), vec!["Dr. Baker"]);
}

#[tokio::test]
async fn test_filter_by_specialty_ignores_case() {
    let clinic = seeded_directory().await;
    let service = DoctorService::new(clinic.store().clone());

    let filter = DoctorFilter { specialty: Some("CARDIOLOGY".to_string()), ..Default::default() };
    let doctors = service.filter_doctors(&filter).await.unwrap();

    assert_eq!(names(&doctors), vec!["Dr. Adams", "Dr. Baker"]);
}

#[tokio::test]
async fn test_filter_by_period_skips_malformed_hours() {
    let clinic = seeded_directory().await;
    let service = DoctorService::new(clinic.store().clone());

    let morning = DoctorFilter { period: Some(DayPeriod::Am), ..Default::default() };
    assert_eq!(
        names(&service.filter_doctors(&morning).await.unwrap()),
        vec!["Dr. Adams", "Dr. Clark"]
    );

    let afternoon = DoctorFilter { period: Some(DayPeriod::Pm), ..Default::default() };
    assert_eq!(names(&service.filter_doctors(&afternoon).await.unwrap()), vec!["Dr. Baker"]);
}

#[tokio::test]
async fn test_filter_criteria_combine() {
    let clinic = seeded_directory().await;
    let service = DoctorService::new(clinic.store().clone());

    let filter = DoctorFilter {
        name: Some("dr.".to_string()),
        specialty: Some("cardiology".to_string()),
        period: Some(DayPeriod::Pm),
    };

    assert_eq!(names(&service.filter_doctors(&filter).await.unwrap()), vec!["Dr. Baker"]);
}
