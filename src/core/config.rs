use std::env;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub swagger: SwaggerConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
}

/// Deployment environment, read from `APP_ENV`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Production,
    Development,
    Local,
    Test,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Environment::Production),
            "development" | "dev" => Ok(Environment::Development),
            "local" => Ok(Environment::Local),
            "test" => Ok(Environment::Test),
            other => Err(format!("Invalid APP_ENV: {}", other)),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Environment::Production => "production",
            Environment::Development => "development",
            Environment::Local => "local",
            Environment::Test => "test",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub cors_allowed_origins: Vec<String>,
    pub max_request_body_size: usize,
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
    pub title: String,
    pub version: String,
    pub description: String,
}

/// Bearer-token verification. Tokens are issued elsewhere and signed with a
/// shared HS256 secret.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Expected `iss`; not checked when unset
    pub issuer: Option<String>,
    /// Expected `aud`; not checked when unset
    pub audience: Option<String>,
    pub leeway_secs: u64,
}

/// Object storage configuration.
///
/// Credential fields stay optional here; each adapter checks the ones it
/// needs, in its own order, when it is constructed.
#[derive(Debug, Clone, Default)]
pub struct StorageConfig {
    pub bucket_name: Option<String>,
    /// Prefix applied to every object key
    pub base_path: String,
    /// `GCP`, `AWS` or `Azure`; picks the backend when none is requested
    pub infra_provider: Option<String>,
    /// Overrides each backend's native download URL lifetime
    pub download_url_expiry_secs: Option<u64>,
    /// Overrides each backend's native upload URL lifetime
    pub upload_url_expiry_secs: Option<u64>,
    pub s3: S3Config,
    pub azure: AzureConfig,
    pub gcs: GcsConfig,
}

#[derive(Debug, Clone, Default)]
pub struct S3Config {
    pub region: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    /// S3-compatible endpoint, addressed path-style
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AzureConfig {
    pub account_name: Option<String>,
    pub client_id: Option<String>,
    pub tenant_id: Option<String>,
    pub client_secret: Option<String>,
    /// Blob service endpoint; defaults to `https://{account}.blob.core.windows.net`
    pub endpoint: Option<String>,
    /// Entra ID authority; defaults to `https://login.microsoftonline.com`
    pub authority_host: Option<String>,
    /// Allow plain-HTTP endpoints (local emulators)
    pub allow_http: bool,
}

#[derive(Debug, Clone, Default)]
pub struct GcsConfig {
    /// Service-account key, as JSON text
    pub credentials_json: Option<String>,
    /// JSON API endpoint; defaults to `https://storage.googleapis.com`
    pub endpoint: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        let app = AppConfig::from_env()?;
        let storage = StorageConfig::from_env(app.environment)?;

        Ok(Config {
            app,
            database: DatabaseConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
            storage,
            auth: AuthConfig::from_env()?,
        })
    }
}

impl AppConfig {
    const DEFAULT_MAX_REQUEST_BODY_SIZE: usize = 10 * 1024 * 1024; // 10MB

    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        let environment = env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .parse::<Environment>()?;

        // Parse CORS allowed origins from comma-separated string
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_request_body_size = env::var("MAX_REQUEST_BODY_SIZE")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_REQUEST_BODY_SIZE.to_string())
            .parse::<usize>()
            .map_err(|_| "MAX_REQUEST_BODY_SIZE must be a valid number".to_string())?;

        Ok(Self {
            host,
            port,
            environment,
            cors_allowed_origins,
            max_request_body_size,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    const DEFAULT_MAX_CONNECTIONS: u32 = 10;
    const DEFAULT_MIN_CONNECTIONS: u32 = 1;
    const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
    const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600; // 10 minutes
    const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800; // 30 minutes

    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;

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
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        let title = env::var("SWAGGER_TITLE").unwrap_or_else(|_| "Wellnest API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "API documentation for Wellnest".to_string());

        Ok(Self {
            title,
            version,
            description,
        })
    }
}

impl AuthConfig {
    const DEFAULT_LEEWAY_SECS: u64 = 60;
    const MIN_SECRET_LEN: usize = 32;

    pub fn from_env() -> Result<Self, String> {
        let jwt_secret =
            env::var("AUTH_JWT_SECRET").map_err(|_| "AUTH_JWT_SECRET must be set".to_string())?;
        if jwt_secret.len() < Self::MIN_SECRET_LEN {
            return Err(format!(
                "AUTH_JWT_SECRET must be at least {} bytes",
                Self::MIN_SECRET_LEN
            ));
        }

        Ok(Self {
            jwt_secret,
            issuer: optional_env("AUTH_JWT_ISSUER").filter(|v| !v.trim().is_empty()),
            audience: optional_env("AUTH_JWT_AUDIENCE").filter(|v| !v.trim().is_empty()),
            leeway_secs: parse_env("AUTH_JWT_LEEWAY_SECS", Self::DEFAULT_LEEWAY_SECS)?,
        })
    }
}

impl StorageConfig {
    pub fn from_env(environment: Environment) -> Result<Self, String> {
        Ok(Self {
            bucket_name: optional_env("BUCKET_NAME"),
            base_path: env::var("STORAGE_BASE_PATH").unwrap_or_default(),
            infra_provider: optional_env("INFRA_PROVIDER"),
            download_url_expiry_secs: parse_optional_env("SIGNED_DOWNLOAD_URL_EXPIRY_SECS")?,
            upload_url_expiry_secs: parse_optional_env("SIGNED_UPLOAD_URL_EXPIRY_SECS")?,
            s3: S3Config {
                region: optional_env("AWS_REGION"),
                access_key_id: optional_env("AWS_ACCESS_KEY_ID"),
                secret_access_key: optional_env("AWS_SECRET_ACCESS_KEY"),
                endpoint: optional_env("AWS_ENDPOINT_URL"),
            },
            azure: AzureConfig {
                account_name: optional_env("AZURE_STORAGE_ACCOUNT_NAME"),
                client_id: optional_env("AZURE_CLIENT_ID"),
                tenant_id: optional_env("AZURE_TENANT_ID"),
                client_secret: optional_env("AZURE_CLIENT_SECRET"),
                endpoint: optional_env("AZURE_STORAGE_ENDPOINT"),
                authority_host: optional_env("AZURE_AUTHORITY_HOST"),
                allow_http: environment == Environment::Local,
            },
            gcs: GcsConfig {
                credentials_json: optional_env("GOOGLE_CLOUD_APPLICATION_CREDENTIALS"),
                endpoint: optional_env("GCS_ENDPOINT"),
            },
        })
    }
}

fn optional_env(name: &str) -> Option<String> {
    env::var(name).ok()
}

fn parse_env<T: FromStr>(name: &str, default: T) -> Result<T, String> {
    match env::var(name) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|_| format!("{} must be a valid number", name)),
        Err(_) => Ok(default),
    }
}

fn parse_optional_env<T: FromStr>(name: &str) -> Result<Option<T>, String> {
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| format!("{} must be a valid number", name)),
        _ => Ok(None),
    }
}
