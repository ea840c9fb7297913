use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use axum::http::HeaderName;
use porta_core::AppError;
use tracing_subscriber::EnvFilter;

/// Backing store for action configurations and contact roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionStoreConfig {
    Memory,
    Postgres { database_url: String },
}

/// Downstream custom API settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomApiConfig {
    pub base_url: Option<String>,
    pub max_attempts: u8,
    pub retry_backoff_ms: u64,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub frontend_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub action_store: ActionStoreConfig,
    pub contact_header: HeaderName,
    pub custom_api: CustomApiConfig,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");
        Self::from_lookup(migrate_only, |name| env::var(name).ok())
    }

    pub(crate) fn from_lookup(
        migrate_only: bool,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AppError> {
        let optional = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let frontend_url =
            optional("FRONTEND_URL").unwrap_or_else(|| "http://localhost:3000".to_owned());
        let api_host = optional("API_HOST").unwrap_or_else(|| "127.0.0.1".to_owned());
        let api_port = parse_or("API_PORT", optional("API_PORT"), 3001_u16)?;

        let action_store = match optional("ACTION_STORE")
            .unwrap_or_else(|| "memory".to_owned())
            .to_ascii_lowercase()
            .as_str()
        {
            "memory" => ActionStoreConfig::Memory,
            "postgres" => ActionStoreConfig::Postgres {
                database_url: optional("DATABASE_URL").ok_or_else(|| {
                    AppError::Validation(
                        "DATABASE_URL is required when ACTION_STORE=postgres".to_owned(),
                    )
                })?,
            },
            other => {
                return Err(AppError::Validation(format!(
                    "ACTION_STORE must be either 'memory' or 'postgres', got '{other}'"
                )));
            }
        };

        let contact_header_name = optional("PORTAL_CONTACT_HEADER")
            .unwrap_or_else(|| "x-portal-contact-id".to_owned());
        let contact_header =
            HeaderName::from_str(contact_header_name.trim()).map_err(|error| {
                AppError::Validation(format!(
                    "invalid PORTAL_CONTACT_HEADER '{contact_header_name}': {error}"
                ))
            })?;

        let custom_api = CustomApiConfig {
            base_url: optional("CUSTOM_API_BASE_URL"),
            max_attempts: parse_or(
                "CUSTOM_API_MAX_ATTEMPTS",
                optional("CUSTOM_API_MAX_ATTEMPTS"),
                3_u8,
            )?,
            retry_backoff_ms: parse_or(
                "CUSTOM_API_RETRY_BACKOFF_MS",
                optional("CUSTOM_API_RETRY_BACKOFF_MS"),
                250_u64,
            )?,
            timeout_seconds: parse_or(
                "CUSTOM_API_TIMEOUT_SECONDS",
                optional("CUSTOM_API_TIMEOUT_SECONDS"),
                30_u64,
            )?,
        };

        if migrate_only && action_store == ActionStoreConfig::Memory {
            return Err(AppError::Validation(
                "migrate requires ACTION_STORE=postgres".to_owned(),
            ));
        }

        Ok(Self {
            migrate_only,
            frontend_url,
            api_host,
            api_port,
            action_store,
            contact_header,
            custom_api,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn parse_or<T>(name: &str, value: Option<String>, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.map_or(Ok(default), |value| {
        value
            .trim()
            .parse::<T>()
            .map_err(|error| AppError::Validation(format!("invalid {name} '{value}': {error}")))
    })
}
