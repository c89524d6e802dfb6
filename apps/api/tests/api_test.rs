use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt;

use clinic_scheduler_api::{bootstrap::seed_admin, create_router};
use shared_utils::test_utils::{TestClinic, TestConfig};
use shared_utils::AppState;

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_seed_admin_is_idempotent_and_can_log_in() {
    let mut config = TestConfig::default().to_app_config();
    config.admin_username = Some("root".to_string());
    config.admin_password = Some("changeme".to_string());
    let state = AppState::in_memory(config);

    seed_admin(&state).await.unwrap();
    seed_admin(&state).await.unwrap();

    let response = create_router(state)
        .oneshot(post_json(
            "/auth/admin/login",
            None,
            json!({ "identifier": "root", "password": "changeme" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_full_booking_flow_across_cells() {
    let clinic = TestClinic::new();
    clinic.add_admin("root").await;
    let app = create_router(clinic.state.clone());

    let response = app
        .clone()
        .oneshot(post_json(
            "/doctors",
            Some(&clinic.token_for("root")),
            json!({
                "name": "Dr. One",
                "email": "d1@clinic.com",
                "password": "docpw",
                "specialty": "Cardiology",
                "available_times": ["09:00-10:00", "10:00-11:00", "14:00-15:00"]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let doctor_id = body_json(response).await["doctor"]["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(post_json(
            "/patients/register",
            None,
            json!({
                "name": "Anna",
                "email": "p1@x.com",
                "phone": "555-0101",
                "address": "1 Main St",
                "password": "patientpw"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(post_json(
            "/auth/patient/login",
            None,
            json!({ "identifier": "p1@x.com", "password": "patientpw" }),
        ))
        .await
        .unwrap();
    let patient_token = body_json(response).await["token"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(post_json(
            "/appointments",
            Some(&patient_token),
            json!({ "doctor_id": doctor_id, "appointment_time": "2024-06-01T10:00:00" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(get(
            &format!("/doctors/availability/patient/{}/2024-06-01", doctor_id),
            &patient_token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["available_times"],
        json!(["09:00-10:00", "14:00-15:00"])
    );

    let doctor_token = clinic.token_for("d1@clinic.com");
    let response = app
        .clone()
        .oneshot(get("/appointments/doctor/2024-06-01", &doctor_token))
        .await
        .unwrap();
    let listing = body_json(response).await;
    assert_eq!(listing["total"], 1);
    assert_eq!(listing["appointments"][0]["patient_name"], "Anna");
    let appointment_id = listing["appointments"][0]["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(post_json(
            "/prescriptions",
            Some(&doctor_token),
            json!({
                "appointment_id": appointment_id,
                "medication": "Amoxicillin",
                "dosage": "500mg twice daily"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(get(&format!("/prescriptions/{}", appointment_id), &patient_token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["prescription"]["medication"], "Amoxicillin");
}

#[tokio::test]
async fn test_token_of_deleted_patient_is_rejected() {
    let clinic = TestClinic::new();
    let patient = clinic.add_patient("Anna", "patient@x.com", "555-0100").await;
    let token = clinic.token_for("patient@x.com");
    let app = create_router(clinic.state.clone());

    let response = app.clone().oneshot(get("/patients/me", &token)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    clinic.store().delete_patient(patient.id).await.unwrap();

    let response = app.oneshot(get("/patients/me", &token)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
