use std::sync::Arc;

use tracing::{error, info, warn};

use shared_database::ScheduleStore;
use shared_models::auth::{LoginRequest, Role, TokenResponse};
use shared_models::error::AppError;
use shared_utils::{AppState, TokenService};

pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid credentials";

pub struct LoginService {
    store: Arc<dyn ScheduleStore>,
    tokens: Arc<TokenService>,
}

impl LoginService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: Arc::clone(&state.store),
            tokens: Arc::clone(&state.tokens),
        }
    }

    pub async fn login_admin(&self, request: &LoginRequest) -> Result<TokenResponse, AppError> {
        self.login(Role::Admin, request).await
    }

    pub async fn login_doctor(&self, request: &LoginRequest) -> Result<TokenResponse, AppError> {
        self.login(Role::Doctor, request).await
    }

    pub async fn login_patient(&self, request: &LoginRequest) -> Result<TokenResponse, AppError> {
        self.login(Role::Patient, request).await
    }

    async fn login(&self, role: Role, request: &LoginRequest) -> Result<TokenResponse, AppError> {
        let identifier = request.identifier.as_str();

        let stored_password = match role {
            Role::Admin => self.store.find_admin_by_username(identifier).await?.map(|a| a.password),
            Role::Doctor => self.store.find_doctor_by_email(identifier).await?.map(|d| d.password),
            Role::Patient => self.store.find_patient_by_email(identifier).await?.map(|p| p.password),
        };

        match stored_password {
            Some(password) if password == request.password => {}
            _ => {
                warn!("Failed {} login for {}", role, identifier);
                return Err(AppError::Unauthorized(INVALID_CREDENTIALS_MESSAGE.to_string()));
            }
        }

        let token = self.tokens.issue(identifier).map_err(|e| {
            error!("Failed to issue token for {}: {}", identifier, e);
            AppError::Internal(e.to_string())
        })?;

        info!("{} {} logged in", role, identifier);
        Ok(TokenResponse {
            token,
            message: "Login successful".to_string(),
        })
    }
}
