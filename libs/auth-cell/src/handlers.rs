use axum::{
    extract::{Json, Path, State},
    http::HeaderMap,
};
use tracing::debug;

use shared_models::auth::{LoginRequest, Role, TokenResponse, UnknownRole, ValidationResponse};
use shared_models::error::AppError;
use shared_utils::extractor::bearer_token;
use shared_utils::AppState;

use crate::services::{AccessGate, LoginService};

pub async fn login_admin(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    debug!("Admin login attempt for {}", request.identifier);
    let response = LoginService::new(&state).login_admin(&request).await?;
    Ok(Json(response))
}

pub async fn login_doctor(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    debug!("Doctor login attempt for {}", request.identifier);
    let response = LoginService::new(&state).login_doctor(&request).await?;
    Ok(Json(response))
}

pub async fn login_patient(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    debug!("Patient login attempt for {}", request.identifier);
    let response = LoginService::new(&state).login_patient(&request).await?;
    Ok(Json(response))
}

pub async fn validate_token(
    State(state): State<AppState>,
    Path(role): Path<String>,
    headers: HeaderMap,
) -> Result<Json<ValidationResponse>, AppError> {
    let role: Role = role
        .parse()
        .map_err(|e: UnknownRole| AppError::BadRequest(e.to_string()))?;

    debug!("Validating token for role {}", role);

    let token = bearer_token(&headers)?;
    let principal = AccessGate::new(&state).authorize(token, role).await?;

    Ok(Json(ValidationResponse {
        valid: true,
        role: principal.role,
        identifier: principal.identifier,
    }))
}
