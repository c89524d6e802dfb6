use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::{debug, warn};

use shared_database::{ScheduleStore, StoreError};
use shared_models::auth::{Principal, Role};
use shared_models::error::AppError;
use shared_utils::{AppState, TokenService};

pub const INVALID_TOKEN_MESSAGE: &str = "Invalid or expired token, please try again";

type PrincipalLookup = for<'a> fn(&'a dyn ScheduleStore, &'a str) -> BoxFuture<'a, Result<bool, StoreError>>;

fn admin_exists<'a>(store: &'a dyn ScheduleStore, username: &'a str) -> BoxFuture<'a, Result<bool, StoreError>> {
    Box::pin(async move { Ok(store.find_admin_by_username(username).await?.is_some()) })
}

fn doctor_exists<'a>(store: &'a dyn ScheduleStore, email: &'a str) -> BoxFuture<'a, Result<bool, StoreError>> {
    Box::pin(async move { Ok(store.find_doctor_by_email(email).await?.is_some()) })
}

fn patient_exists<'a>(store: &'a dyn ScheduleStore, email: &'a str) -> BoxFuture<'a, Result<bool, StoreError>> {
    Box::pin(async move { Ok(store.find_patient_by_email(email).await?.is_some()) })
}

/// Admins are keyed by username, doctors and patients by email.
fn principal_lookup(role: Role) -> PrincipalLookup {
    match role {
        Role::Admin => admin_exists,
        Role::Doctor => doctor_exists,
        Role::Patient => patient_exists,
    }
}

/// Decides whether a bearer token may act in a given role right now.
pub struct AccessGate {
    store: Arc<dyn ScheduleStore>,
    tokens: Arc<TokenService>,
}

impl AccessGate {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: Arc::clone(&state.store),
            tokens: Arc::clone(&state.tokens),
        }
    }

    pub async fn authorize(&self, token: &str, role: Role) -> Result<Principal, AppError> {
        let identifier = self.tokens.verify(token).map_err(|e| {
            debug!("Token rejected for {} route: {}", role, e);
            AppError::Unauthorized(INVALID_TOKEN_MESSAGE.to_string())
        })?;

        let lookup = principal_lookup(role);
        if !lookup(self.store.as_ref(), identifier.as_str()).await? {
            warn!("No {} found for token subject {}", role, identifier);
            return Err(AppError::Unauthorized(INVALID_TOKEN_MESSAGE.to_string()));
        }

        debug!("Authorized {} {}", role, identifier);
        Ok(Principal { role, identifier })
    }
}
