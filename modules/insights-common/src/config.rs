use std::env;

use crate::error::DashboardError;

/// Which record store the server runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Storage
    pub store: StoreBackend,
    pub database_url: String,

    // Web server
    pub web_host: String,
    pub web_port: u16,
    pub cors_origins: Vec<String>,

    // Auth
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub require_auth: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, DashboardError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary lookup, so tests don't have
    /// to mutate the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DashboardError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let store = match lookup("STORE").as_deref().map(str::trim) {
            None | Some("") | Some("postgres") => StoreBackend::Postgres,
            Some("memory") => StoreBackend::Memory,
            Some(other) => {
                return Err(DashboardError::Config(format!(
                    "STORE must be `postgres` or `memory`, got `{other}`"
                )))
            }
        };

        let database_url = match store {
            StoreBackend::Postgres => required(&lookup, "DATABASE_URL")?,
            StoreBackend::Memory => lookup("DATABASE_URL").unwrap_or_default(),
        };

        let web_port = lookup("WEB_PORT")
            .or_else(|| lookup("PORT"))
            .map(|p| {
                p.parse::<u16>()
                    .map_err(|_| DashboardError::Config(format!("WEB_PORT must be a number, got `{p}`")))
            })
            .transpose()?
            .unwrap_or(5000);

        let cors_origins = lookup("CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        let jwt_ttl_hours = lookup("JWT_TTL_HOURS")
            .map(|h| {
                h.parse::<i64>()
                    .ok()
                    .filter(|h| *h > 0)
                    .ok_or_else(|| DashboardError::Config(format!("JWT_TTL_HOURS must be a positive number, got `{h}`")))
            })
            .transpose()?
            .unwrap_or(24);

        let require_auth = match lookup("REQUIRE_AUTH").as_deref().map(str::trim) {
            None | Some("") | Some("false") | Some("0") => false,
            Some("true") | Some("1") => true,
            Some(other) => {
                return Err(DashboardError::Config(format!(
                    "REQUIRE_AUTH must be true or false, got `{other}`"
                )))
            }
        };

        Ok(Self {
            store,
            database_url,
            web_host: lookup("WEB_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            web_port,
            cors_origins,
            jwt_secret: required(&lookup, "JWT_SECRET")?,
            jwt_ttl_hours,
            require_auth,
        })
    }
}

fn required<F>(lookup: &F, key: &str) -> Result<String, DashboardError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| DashboardError::Config(format!("{key} environment variable is required")))
}
