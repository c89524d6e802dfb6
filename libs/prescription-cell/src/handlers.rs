use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::auth::Principal;
use shared_models::error::AppError;
use shared_utils::AppState;

use crate::models::PrescriptionRequest;
use crate::services::PrescriptionService;

pub async fn save_prescription(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(request): Json<PrescriptionRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let prescription = PrescriptionService::new(state.store.clone())
        .save(&principal.identifier, request)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Prescription saved",
            "prescription": prescription
        })),
    ))
}

pub async fn get_prescription(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let prescription = PrescriptionService::new(state.store.clone())
        .get(appointment_id, &principal.identifier)
        .await?;

    Ok(Json(json!({ "prescription": prescription })))
}
