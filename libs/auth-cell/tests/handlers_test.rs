use axum::extract::{Json, Path, State};
use axum::http::{HeaderMap, HeaderValue};
use assert_matches::assert_matches;

use auth_cell::handlers::{login_admin, login_doctor, login_patient, validate_token};
use auth_cell::services::AccessGate;
use shared_models::auth::{LoginRequest, Principal, Role};
use shared_models::error::AppError;
use shared_utils::test_utils::{JwtTestUtils, TestClinic, TEST_JWT_SECRET, TEST_PASSWORD};

fn credentials(identifier: &str, password: &str) -> Json<LoginRequest> {
    Json(LoginRequest {
        identifier: identifier.to_string(),
        password: password.to_string(),
    })
}

fn create_auth_header(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        "authorization",
        HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    );
    headers
}

#[tokio::test]
async fn test_admin_login_issues_token_for_username() {
    let clinic = TestClinic::new();
    clinic.add_admin("root").await;

    let response = login_admin(State(clinic.state.clone()), credentials("root", TEST_PASSWORD))
        .await
        .unwrap()
        .0;

    assert_eq!(clinic.state.tokens.verify(&response.token).unwrap(), "root");
}

#[tokio::test]
async fn test_doctor_login_wrong_password_is_unauthorized() {
    let clinic = TestClinic::new();
    clinic.add_doctor("Dr. House", "house@clinic.com", "Diagnostics", &[]).await;

    let result = login_doctor(State(clinic.state.clone()), credentials("house@clinic.com", "nope")).await;

    assert_matches!(result, Err(AppError::Unauthorized(msg)) if msg == "Invalid credentials");
}

#[tokio::test]
async fn test_patient_login_unknown_email_is_unauthorized() {
    let clinic = TestClinic::new();

    let result = login_patient(State(clinic.state.clone()), credentials("ghost@x.com", TEST_PASSWORD)).await;

    assert_matches!(result, Err(AppError::Unauthorized(_)));
}

#[tokio::test]
async fn test_login_does_not_cross_roles() {
    let clinic = TestClinic::new();
    clinic.add_patient("Anna", "anna@x.com", "555-0100").await;

    let result = login_doctor(State(clinic.state.clone()), credentials("anna@x.com", TEST_PASSWORD)).await;

    assert_matches!(result, Err(AppError::Unauthorized(_)));
}

#[tokio::test]
async fn test_validate_token_success() {
    let clinic = TestClinic::new();
    clinic.add_patient("Anna", "anna@x.com", "555-0100").await;
    let headers = create_auth_header(&clinic.token_for("anna@x.com"));

    let response = validate_token(State(clinic.state.clone()), Path("patient".to_string()), headers)
        .await
        .unwrap()
        .0;

    assert!(response.valid);
    assert_eq!(response.role, Role::Patient);
    assert_eq!(response.identifier, "anna@x.com");
}

#[tokio::test]
async fn test_validate_token_missing_header() {
    let clinic = TestClinic::new();

    let result = validate_token(State(clinic.state.clone()), Path("patient".to_string()), HeaderMap::new()).await;

    assert_matches!(result, Err(AppError::Unauthorized(msg)) if msg == "Missing authorization header");
}

#[tokio::test]
async fn test_validate_token_unknown_role_is_bad_request() {
    let clinic = TestClinic::new();
    let headers = create_auth_header(&clinic.token_for("anna@x.com"));

    let result = validate_token(State(clinic.state.clone()), Path("Patient".to_string()), headers).await;

    assert_matches!(result, Err(AppError::BadRequest(_)));
}

#[tokio::test]
async fn test_gate_rejects_expired_forged_and_malformed_tokens() {
    let clinic = TestClinic::new();
    clinic.add_doctor("Dr. House", "house@clinic.com", "Diagnostics", &[]).await;
    let gate = AccessGate::new(&clinic.state);

    let expired = JwtTestUtils::create_expired_token("house@clinic.com", TEST_JWT_SECRET);
    let forged = JwtTestUtils::create_invalid_signature_token("house@clinic.com");
    let malformed = JwtTestUtils::create_malformed_token();

    for token in [expired, forged, malformed] {
        assert_matches!(gate.authorize(&token, Role::Doctor).await, Err(AppError::Unauthorized(_)));
    }
}

#[tokio::test]
async fn test_gate_requires_principal_in_the_requested_role() {
    let clinic = TestClinic::new();
    clinic.add_doctor("Dr. House", "house@clinic.com", "Diagnostics", &[]).await;
    let gate = AccessGate::new(&clinic.state);
    let token = clinic.token_for("house@clinic.com");

    assert_eq!(
        gate.authorize(&token, Role::Doctor).await.unwrap(),
        Principal { role: Role::Doctor, identifier: "house@clinic.com".to_string() }
    );
    assert_matches!(gate.authorize(&token, Role::Patient).await, Err(AppError::Unauthorized(_)));
    assert_matches!(gate.authorize(&token, Role::Admin).await, Err(AppError::Unauthorized(_)));
}

#[tokio::test]
async fn test_gate_rejects_token_of_deleted_patient() {
    let clinic = TestClinic::new();
    let patient = clinic.add_patient("Anna", "anna@x.com", "555-0100").await;
    let token = clinic.token_for("anna@x.com");
    let gate = AccessGate::new(&clinic.state);

    assert!(gate.authorize(&token, Role::Patient).await.is_ok());

    assert!(clinic.store().delete_patient(patient.id).await.unwrap());

    assert_matches!(gate.authorize(&token, Role::Patient).await, Err(AppError::Unauthorized(_)));
}
