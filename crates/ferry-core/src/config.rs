//! Configuration module
//!
//! Ferry is configured entirely from the environment (a `.env` file is loaded
//! first when present). The values are parsed once at startup into an
//! immutable [`Config`] and validated before any listener is bound.

use std::env;
use std::path::PathBuf;

const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const MAX_UPLOAD_SIZE_MB: usize = 100;
const CRAWL_TIMEOUT_SECS: u64 = 60;
const CRAWL_MAX_SIZE_MB: usize = 100;
const TRUSTED_PROXY_COUNT: usize = 1;

/// Server-level settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub jwt_secret: String,
    pub environment: String,
    /// Number of reverse proxies in front of the server, used when reading X-Forwarded-For
    pub trusted_proxy_count: usize,
}

/// Full Ferry configuration
#[derive(Clone, Debug)]
pub struct FerryConfig {
    pub base: BaseConfig,
    pub database_url: String,
    /// Root directory under which every stored file and cached artifact lives
    pub storage_root: PathBuf,
    pub max_upload_size_bytes: usize,
    pub crawl_timeout_secs: u64,
    pub crawl_max_size_bytes: usize,
    // Optional host allowlist for crawl sources; None allows any public host
    pub url_upload_allowlist: Option<Vec<String>>,
    pub crawl_allow_private_ips: bool,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<FerryConfig>);

impl Config {
    fn inner(&self) -> &FerryConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_env(&self.inner().base.environment)
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = FerryConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.inner().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.inner().base.server_port
    }

    pub fn jwt_secret(&self) -> &str {
        &self.inner().base.jwt_secret
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.inner().base.cors_origins
    }

    pub fn db_max_connections(&self) -> u32 {
        self.inner().base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.inner().base.db_timeout_seconds
    }

    pub fn environment(&self) -> &str {
        &self.inner().base.environment
    }

    pub fn trusted_proxy_count(&self) -> usize {
        self.inner().base.trusted_proxy_count
    }

    pub fn database_url(&self) -> &str {
        &self.inner().database_url
    }

    pub fn storage_root(&self) -> &PathBuf {
        &self.inner().storage_root
    }

    pub fn max_upload_size_bytes(&self) -> usize {
        self.inner().max_upload_size_bytes
    }

    pub fn crawl_timeout_secs(&self) -> u64 {
        self.inner().crawl_timeout_secs
    }

    pub fn crawl_max_size_bytes(&self) -> usize {
        self.inner().crawl_max_size_bytes
    }

    pub fn url_upload_allowlist(&self) -> Option<&[String]> {
        self.inner().url_upload_allowlist.as_deref()
    }

    pub fn crawl_allow_private_ips(&self) -> bool {
        self.inner().crawl_allow_private_ips
    }
}

fn is_production_env(environment: &str) -> bool {
    let env = environment.to_lowercase();
    env == "production" || env == "prod"
}

impl FerryConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        if is_production_env(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let base = BaseConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| "4000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set for authentication"))?,
            environment,
            trusted_proxy_count: env::var("TRUSTED_PROXY_COUNT")
                .unwrap_or_else(|_| TRUSTED_PROXY_COUNT.to_string())
                .parse()
                .unwrap_or(TRUSTED_PROXY_COUNT),
        };

        let max_upload_size_mb = env::var("MAX_UPLOAD_SIZE_MB")
            .unwrap_or_else(|_| MAX_UPLOAD_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_UPLOAD_SIZE_MB);

        let crawl_max_size_mb = env::var("CRAWL_MAX_SIZE_MB")
            .unwrap_or_else(|_| CRAWL_MAX_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(CRAWL_MAX_SIZE_MB);

        let url_upload_allowlist = env::var("URL_UPLOAD_ALLOWLIST").ok().map(|s| {
            s.split(',')
                .map(|d| d.trim().to_lowercase())
                .filter(|d| !d.is_empty())
                .collect::<Vec<_>>()
        });

        Ok(FerryConfig {
            base,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            storage_root: env::var("STORAGE_ROOT")
                .map(PathBuf::from)
                .map_err(|_| anyhow::anyhow!("STORAGE_ROOT must be set"))?,
            max_upload_size_bytes: max_upload_size_mb * 1024 * 1024,
            crawl_timeout_secs: env::var("CRAWL_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CRAWL_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CRAWL_TIMEOUT_SECS),
            crawl_max_size_bytes: crawl_max_size_mb * 1024 * 1024,
            url_upload_allowlist,
            crawl_allow_private_ips: env::var("CRAWL_ALLOW_PRIVATE_IPS")
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.base.jwt_secret.len() < 32 {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least 32 characters long"
            ));
        }

        if !(self.database_url.starts_with("postgresql://")
            || self.database_url.starts_with("postgres://"))
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if self.storage_root.as_os_str().is_empty() {
            return Err(anyhow::anyhow!("STORAGE_ROOT must not be empty"));
        }

        if self.max_upload_size_bytes == 0 || self.crawl_max_size_bytes == 0 {
            return Err(anyhow::anyhow!(
                "MAX_UPLOAD_SIZE_MB and CRAWL_MAX_SIZE_MB must be greater than zero"
            ));
        }

        if self.crawl_timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "CRAWL_TIMEOUT_SECONDS must be greater than zero"
            ));
        }

        Ok(())
    }
}
