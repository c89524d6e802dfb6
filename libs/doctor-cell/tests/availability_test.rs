use chrono::NaiveDate;
use uuid::Uuid;

use doctor_cell::services::AvailabilityService;
use shared_utils::test_utils::{at, TestClinic};

const TEMPLATE: [&str; 3] = ["09:00-10:00", "10:00-11:00", "14:00-15:00"];

fn june_first() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

fn is_subsequence(candidate: &[String], template: &[&str]) -> bool {
    let mut remaining = template.iter();
    candidate.iter().all(|slot| remaining.any(|t| *t == slot.as_str()))
}

#[tokio::test]
async fn test_empty_day_returns_full_template() {
    let clinic = TestClinic::new();
    let doctor = clinic.add_doctor("Dr. One", "d1@clinic.com", "Cardiology", &TEMPLATE).await;
    let service = AvailabilityService::new(clinic.store().clone());

    let free = service.availability(doctor.id, june_first()).await.unwrap();

    assert_eq!(free, TEMPLATE);
}

#[tokio::test]
async fn test_booked_slot_disappears_only_on_that_date() {
    let clinic = TestClinic::new();
    let doctor = clinic.add_doctor("Dr. One", "d1@clinic.com", "Cardiology", &TEMPLATE).await;
    let patient = clinic.add_patient("Anna", "anna@x.com", "555-0100").await;
    clinic.add_appointment(&doctor, &patient, at("2024-06-01", "10:00")).await;
    let service = AvailabilityService::new(clinic.store().clone());

    let free = service.availability(doctor.id, june_first()).await.unwrap();
    assert_eq!(free, vec!["09:00-10:00", "14:00-15:00"]);

    let next_day = service
        .availability(doctor.id, NaiveDate::from_ymd_opt(2024, 6, 2).unwrap())
        .await
        .unwrap();
    assert_eq!(next_day, TEMPLATE);
}

#[tokio::test]
async fn test_day_window_includes_midnight_and_last_instant() {
    let clinic = TestClinic::new();
    let doctor = clinic
        .add_doctor("Dr. Night", "night@clinic.com", "Emergency", &["00:00-01:00", "23:59-00:00"])
        .await;
    let patient = clinic.add_patient("Anna", "anna@x.com", "555-0100").await;
    clinic.add_appointment(&doctor, &patient, at("2024-06-01", "00:00")).await;
    clinic.add_appointment(&doctor, &patient, at("2024-06-01", "23:59")).await;
    let service = AvailabilityService::new(clinic.store().clone());

    let free = service.availability(doctor.id, june_first()).await.unwrap();

    assert!(free.is_empty());
}

#[tokio::test]
async fn test_unknown_doctor_has_no_availability() {
    let clinic = TestClinic::new();
    let service = AvailabilityService::new(clinic.store().clone());

    let free = service.availability(Uuid::new_v4(), june_first()).await.unwrap();

    assert!(free.is_empty());
}

#[tokio::test]
async fn test_result_is_ordered_subsequence_and_idempotent() {
    let clinic = TestClinic::new();
    let doctor = clinic.add_doctor("Dr. One", "d1@clinic.com", "Cardiology", &TEMPLATE).await;
    let patient = clinic.add_patient("Anna", "anna@x.com", "555-0100").await;
    clinic.add_appointment(&doctor, &patient, at("2024-06-01", "09:00")).await;
    clinic.add_appointment(&doctor, &patient, at("2024-06-01", "14:00")).await;
    let service = AvailabilityService::new(clinic.store().clone());

    let first = service.availability(doctor.id, june_first()).await.unwrap();
    let second = service.availability(doctor.id, june_first()).await.unwrap();

    assert_eq!(first, vec!["10:00-11:00"]);
    assert_eq!(first, second);
    assert!(is_subsequence(&first, &TEMPLATE));
}

#[tokio::test]
async fn test_excluded_appointment_keeps_its_slot() {
    let clinic = TestClinic::new();
    let doctor = clinic.add_doctor("Dr. One", "d1@clinic.com", "Cardiology", &TEMPLATE).await;
    let patient = clinic.add_patient("Anna", "anna@x.com", "555-0100").await;
    let booked = clinic.add_appointment(&doctor, &patient, at("2024-06-01", "10:00")).await;
    let service = AvailabilityService::new(clinic.store().clone());

    let free = service
        .availability_excluding(doctor.id, june_first(), Some(booked.id))
        .await
        .unwrap();

    assert_eq!(free, TEMPLATE);
}
