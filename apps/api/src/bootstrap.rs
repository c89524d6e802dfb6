use tracing::{info, warn};
use uuid::Uuid;

use shared_database::StoreError;
use shared_models::clinic::Admin;
use shared_utils::AppState;

/// Creates the admin named by `ADMIN_USERNAME`/`ADMIN_PASSWORD` unless one
/// with that username already exists.
pub async fn seed_admin(state: &AppState) -> Result<(), StoreError> {
    let (Some(username), Some(password)) = (&state.config.admin_username, &state.config.admin_password) else {
        warn!("ADMIN_USERNAME/ADMIN_PASSWORD not set, no admin account seeded");
        return Ok(());
    };

    if state.store.find_admin_by_username(username).await?.is_some() {
        info!("Admin {} already present", username);
        return Ok(());
    }

    state
        .store
        .save_admin(Admin {
            id: Uuid::new_v4(),
            username: username.clone(),
            password: password.clone(),
        })
        .await?;

    info!("Seeded admin {}", username);
    Ok(())
}
