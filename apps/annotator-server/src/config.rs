//! Configuration management for the PDF Annotator server

use serde::Deserialize;
use std::env;
use thiserror::Error;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins; empty means any origin
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub provider: StorageProvider,
    pub endpoint: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageProvider {
    Minio,
    R2,
    S3,
    B2,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret used to sign session tokens
    pub jwt_secret: String,
    /// Session token lifetime in hours
    pub token_ttl_hours: u64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set to a non-empty value")]
    MissingJwtSecret,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 5050,
            cors_origins: Vec::new(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            provider: StorageProvider::Minio,
            endpoint: "http://localhost:9000".to_string(),
            bucket: "pdfs".to_string(),
            access_key: "admin".to_string(),
            secret_key: "password123".to_string(),
            region: Some("us-east-1".to_string()),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            url: "sqlite:./annotator.db".to_string(),
        }
    }
}

/// Local development and tests only; [`Config::from_env`] never uses it
impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            database: DatabaseConfig::default(),
            auth: AuthConfig {
                jwt_secret: "change-me-in-production".to_string(),
                token_ttl_hours: 24,
            },
        }
    }
}

impl Config {
    /// Load from the process environment.
    ///
    /// `JWT_SECRET` is required. Incomplete storage settings fall back to the
    /// local MinIO defaults with a warning.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let auth = AuthConfig {
            jwt_secret: var("JWT_SECRET")
                .filter(|s| !s.trim().is_empty())
                .ok_or(ConfigError::MissingJwtSecret)?,
            token_ttl_hours: var("JWT_TTL_HOURS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(24),
        };

        let server = ServerConfig {
            host: var("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: var("SERVER_PORT")
                .or_else(|| var("PORT"))
                .and_then(|v| v.parse().ok())
                .unwrap_or(5050),
            cors_origins: var("CORS_ORIGINS")
                .map(|v| parse_origins(&v))
                .unwrap_or_default(),
        };

        let storage = storage_from_vars(&var).unwrap_or_else(|missing| {
            tracing::warn!("{} is not set, using default storage settings", missing);
            StorageConfig::default()
        });

        let database = DatabaseConfig {
            url: var("DATABASE_URL").unwrap_or_else(|| DatabaseConfig::default().url),
        };

        Ok(Config {
            server,
            storage,
            database,
            auth,
        })
    }
}

/// All-or-nothing storage settings; `Err` names the first missing variable
fn storage_from_vars(var: &impl Fn(&str) -> Option<String>) -> Result<StorageConfig, &'static str> {
    let required = |key: &'static str| var(key).ok_or(key);

    Ok(StorageConfig {
        provider: match var("S3_PROVIDER").as_deref() {
            Some("r2") => StorageProvider::R2,
            Some("s3") => StorageProvider::S3,
            Some("b2") => StorageProvider::B2,
            _ => StorageProvider::Minio,
        },
        endpoint: required("S3_ENDPOINT")?,
        bucket: required("S3_BUCKET")?,
        access_key: required("S3_ACCESS_KEY")?,
        secret_key: required("S3_SECRET_KEY")?,
        region: var("S3_REGION"),
    })
}

/// Split a comma-separated origin list; `*` means any origin
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty() && *o != "*")
        .map(|o| o.trim_end_matches('/').to_string())
        .collect()
}
