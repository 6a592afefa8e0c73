use std::env;
use std::path::PathBuf;

use crate::shared::constants::DEFAULT_MAX_PHOTO_SIZE;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub swagger: SwaggerConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

/// Where uploaded photos are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoBackend {
    /// Local directory served by this application
    Local,
    /// S3-compatible bucket (MinIO, AWS S3, ...)
    ObjectStorage,
}

/// Photo storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: PhotoBackend,
    /// Photos larger than this many bytes are rejected
    pub max_photo_size: usize,
    pub local: LocalStorageConfig,
    /// Only read when `backend` is `ObjectStorage`
    pub object: Option<ObjectStorageConfig>,
}

#[derive(Debug, Clone)]
pub struct LocalStorageConfig {
    /// Directory photos are written to
    pub dir: PathBuf,
    /// URL path the directory is served under (e.g. "/uploads")
    pub url_prefix: String,
}

/// S3-compatible storage configuration for photo uploads
#[derive(Debug, Clone)]
pub struct ObjectStorageConfig {
    /// S3 endpoint URL
    pub endpoint: String,
    /// Public endpoint URL used in photo URLs (defaults to endpoint)
    pub public_endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    /// Bucket name for storing photos
    pub bucket: String,
    /// AWS region (for S3 compatibility)
    pub region: String,
    /// Key prefix photos are stored under (e.g., "locations")
    pub key_prefix: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
            storage: StorageConfig::from_env()?,
        })
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        let cors_allowed_origins = parse_origins(
            &env::var("CORS_ALLOWED_ORIGINS").unwrap_or_else(|_| "*".to_string()),
        );

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl DatabaseConfig {
    const DEFAULT_URL: &'static str = "sqlite://data/rosemary.db";
    const DEFAULT_MAX_CONNECTIONS: u32 = 5;
    const DEFAULT_MIN_CONNECTIONS: u32 = 1;
    const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
    const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600; // 10 minutes
    const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800; // 30 minutes

    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL").unwrap_or_else(|_| Self::DEFAULT_URL.to_string());

        Ok(Self {
            url,
            max_connections: parse_env("DB_MAX_CONNECTIONS", Self::DEFAULT_MAX_CONNECTIONS)?,
            min_connections: parse_env("DB_MIN_CONNECTIONS", Self::DEFAULT_MIN_CONNECTIONS)?,
            acquire_timeout_secs: parse_env(
                "DB_ACQUIRE_TIMEOUT_SECS",
                Self::DEFAULT_ACQUIRE_TIMEOUT_SECS,
            )?,
            idle_timeout_secs: parse_env("DB_IDLE_TIMEOUT_SECS", Self::DEFAULT_IDLE_TIMEOUT_SECS)?,
            max_lifetime_secs: parse_env("DB_MAX_LIFETIME_SECS", Self::DEFAULT_MAX_LIFETIME_SECS)?,
        })
    }

    pub fn is_postgres(&self) -> bool {
        self.url.starts_with("postgres://") || self.url.starts_with("postgresql://")
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T, String> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| format!("{} must be a valid number", key)),
        Err(_) => Ok(default),
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title = env::var("SWAGGER_TITLE").unwrap_or_else(|_| "Rosemary Map API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "Community map of rosemary spots".to_string());

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}

impl PhotoBackend {
    pub fn parse(raw: &str) -> Result<Self, String> {
        match raw.trim().to_lowercase().as_str() {
            "local" | "fs" | "filesystem" => Ok(PhotoBackend::Local),
            "s3" | "minio" | "object" => Ok(PhotoBackend::ObjectStorage),
            other => Err(format!(
                "PHOTO_STORAGE must be 'local' or 's3', got '{}'",
                other
            )),
        }
    }
}

impl StorageConfig {
    pub fn from_env() -> Result<Self, String> {
        let backend =
            PhotoBackend::parse(&env::var("PHOTO_STORAGE").unwrap_or_else(|_| "local".to_string()))?;

        let max_photo_size = parse_env("MAX_PHOTO_SIZE", DEFAULT_MAX_PHOTO_SIZE)?;

        let local = LocalStorageConfig {
            dir: PathBuf::from(
                env::var("PHOTO_DIR").unwrap_or_else(|_| "public/uploads".to_string()),
            ),
            url_prefix: normalize_url_prefix(
                &env::var("PHOTO_URL_PREFIX").unwrap_or_else(|_| "/uploads".to_string()),
            )?,
        };

        let object = match backend {
            PhotoBackend::ObjectStorage => Some(ObjectStorageConfig::from_env()?),
            PhotoBackend::Local => None,
        };

        Ok(Self {
            backend,
            max_photo_size,
            local,
            object,
        })
    }
}

/// Ensure a URL prefix has exactly one leading slash and no trailing slash.
///
/// Photos cannot be served from the root, so `/` and empty values are rejected.
fn normalize_url_prefix(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        return Err("PHOTO_URL_PREFIX must not be '/'".to_string());
    }
    Ok(format!("/{}", trimmed))
}

impl ObjectStorageConfig {
    pub fn from_env() -> Result<Self, String> {
        let endpoint =
            env::var("S3_ENDPOINT").map_err(|_| "S3_ENDPOINT must be set when PHOTO_STORAGE=s3")?;
        let endpoint = endpoint.trim_end_matches('/').to_string();

        // Public endpoint defaults to the main endpoint if not specified
        let public_endpoint = env::var("S3_PUBLIC_ENDPOINT")
            .map(|e| e.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| endpoint.clone());

        let access_key = env::var("S3_ACCESS_KEY")
            .map_err(|_| "S3_ACCESS_KEY must be set when PHOTO_STORAGE=s3")?;
        let secret_key = env::var("S3_SECRET_KEY")
            .map_err(|_| "S3_SECRET_KEY must be set when PHOTO_STORAGE=s3")?;

        let bucket = env::var("S3_BUCKET").unwrap_or_else(|_| "rosemary-photos".to_string());
        let region = env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".to_string());
        let key_prefix = env::var("S3_KEY_PREFIX")
            .map(|p| p.trim_matches('/').to_string())
            .unwrap_or_else(|_| "locations".to_string());

        Ok(Self {
            endpoint,
            public_endpoint,
            access_key,
            secret_key,
            bucket,
            region,
            key_prefix,
        })
    }
}
