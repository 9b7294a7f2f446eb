//! Back-office service configuration

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::BoxError;

/// Service configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// `development` relaxes secret checks
    pub environment: String,
    pub http_port: u16,
    /// Working directory (preferences file)
    pub work_dir: PathBuf,
    /// Optional directory for daily rolling log files
    pub log_dir: Option<PathBuf>,
    /// Hosted backend base URL; unset selects the in-memory backend
    pub backend_url: Option<String>,
    /// Service key for the hosted backend
    pub backend_service_key: String,
    /// Object storage bucket for product images
    pub storage_bucket: String,
    /// Timeout for backend requests
    pub request_timeout: Duration,
    /// Credentials accepted by the in-memory backend
    pub dev_admin_email: String,
    pub dev_admin_password: String,
    /// Load the fallback data set into the in-memory backend
    pub seed_fallback_data: bool,
    /// Reject order quantities above available stock instead of flooring at zero
    pub reject_oversell: bool,
}

fn env_flag(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(v) => matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.trim().is_empty())
}

fn env_parse<T: FromStr>(name: &str, default: T) -> T {
    env_opt(name)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Secret that only development may leave unset (empty value)
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        match env_opt(name) {
            Some(value) => Ok(value),
            None if environment == "development" => Ok(String::new()),
            None => Err(format!("{name} must be set when ENVIRONMENT={environment}").into()),
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = env_opt("ENVIRONMENT").unwrap_or_else(|| "development".into());
        let backend_url = env_opt("BACKEND_URL");

        let backend_service_key = if backend_url.is_some() {
            Self::require_secret("BACKEND_SERVICE_KEY", &environment)?
        } else {
            String::new()
        };

        Ok(Self {
            environment,
            http_port: env_parse("HTTP_PORT", 8080),
            work_dir: env_opt("WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./data")),
            log_dir: env_opt("LOG_DIR").map(PathBuf::from),
            backend_url,
            backend_service_key,
            storage_bucket: env_opt("STORAGE_BUCKET").unwrap_or_else(|| "product-images".into()),
            request_timeout: Duration::from_millis(env_parse("REQUEST_TIMEOUT_MS", 30_000)),
            dev_admin_email: env_opt("DEV_ADMIN_EMAIL").unwrap_or_else(|| "admin@localhost".into()),
            dev_admin_password: env_opt("DEV_ADMIN_PASSWORD").unwrap_or_else(|| "admin".into()),
            seed_fallback_data: env_flag("SEED_FALLBACK_DATA", true),
            reject_oversell: env_flag("REJECT_OVERSELL", false),
        })
    }

    /// Development defaults rooted at `work_dir`, in-memory backend
    pub fn for_work_dir(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            environment: "development".into(),
            http_port: 8080,
            work_dir: work_dir.into(),
            log_dir: None,
            backend_url: None,
            backend_service_key: String::new(),
            storage_bucket: "product-images".into(),
            request_timeout: Duration::from_secs(30),
            dev_admin_email: "admin@localhost".into(),
            dev_admin_password: "admin".into(),
            seed_fallback_data: true,
            reject_oversell: false,
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Hosted backend configured without a service key (development only)
    pub fn missing_service_key(&self) -> bool {
        self.is_development() && self.backend_url.is_some() && self.backend_service_key.is_empty()
    }

    pub fn preferences_path(&self) -> PathBuf {
        self.work_dir.join("preferences.json")
    }
}
