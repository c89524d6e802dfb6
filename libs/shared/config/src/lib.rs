use std::env;
use tracing::warn;

pub const DEFAULT_TOKEN_EXPIRY_DAYS: i64 = 7;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Supabase,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub jwt_secret: String,
    pub token_expiry_days: i64,
    pub store_backend: StoreBackend,
    pub supabase_url: String,
    pub supabase_service_key: String,
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
    pub bind_addr: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            jwt_secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("JWT_SECRET not set, using empty value");
                    String::new()
                }),
            token_expiry_days: env::var("TOKEN_EXPIRY_DAYS")
                .ok()
                .and_then(|days| match days.parse::<i64>() {
                    Ok(days) if days > 0 => Some(days),
                    _ => {
                        warn!("TOKEN_EXPIRY_DAYS is not a positive integer, using default");
                        None
                    }
                })
                .unwrap_or(DEFAULT_TOKEN_EXPIRY_DAYS),
            store_backend: match env::var("STORE_BACKEND").as_deref() {
                Ok("supabase") => StoreBackend::Supabase,
                Ok("memory") => StoreBackend::Memory,
                Ok(other) => {
                    warn!("Unknown STORE_BACKEND '{}', using in-memory store", other);
                    StoreBackend::Memory
                }
                Err(_) => StoreBackend::Memory,
            },
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| String::new()),
            supabase_service_key: env::var("SUPABASE_SERVICE_KEY")
                .unwrap_or_else(|_| String::new()),
            admin_username: env::var("ADMIN_USERNAME").ok(),
            admin_password: env::var("ADMIN_PASSWORD").ok(),
            bind_addr: env::var("BIND_ADDR")
                .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    /// Config with a fixed secret and in-memory storage.
    pub fn with_secret(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            token_expiry_days: DEFAULT_TOKEN_EXPIRY_DAYS,
            store_backend: StoreBackend::Memory,
            supabase_url: String::new(),
            supabase_service_key: String::new(),
            admin_username: None,
            admin_password: None,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }

    pub fn is_configured(&self) -> bool {
        if self.jwt_secret.is_empty() {
            return false;
        }

        match self.store_backend {
            StoreBackend::Memory => true,
            StoreBackend::Supabase => self.is_supabase_configured(),
        }
    }

    pub fn is_supabase_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_service_key.is_empty()
    }
}
