use reqwest::Url;
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_EMAILJS_URL: &str = "https://api.emailjs.com/api/v1.0/email/send";
pub const DEFAULT_ATTRIBUTION: &str = "Built on the TOPSIS multi-criteria scoring service";

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration, resolved once at process start.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub backend: BackendConfig,
    pub email: Option<EmailJsConfig>,
    pub footer: FooterConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let backend = BackendConfig::from_env()?;
        let email = EmailJsConfig::from_env()?;
        let attribution = env::var("TOPSIS_FOOTER_ATTRIBUTION")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ATTRIBUTION.to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            backend,
            email,
            footer: FooterConfig { attribution },
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where the scoring backend lives and how long to wait for it.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub base_url: Url,
    /// `None` leaves the HTTP client's default behavior in place.
    pub timeout: Option<Duration>,
}

impl BackendConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let raw = env::var("TOPSIS_API_URL").unwrap_or_else(|_| DEFAULT_BACKEND_URL.to_string());
        let base_url = Url::parse(raw.trim()).map_err(|err| ConfigError::InvalidBackendUrl {
            value: raw.clone(),
            reason: err.to_string(),
        })?;

        let timeout = match env::var("TOPSIS_API_TIMEOUT_SECS") {
            Ok(value) if !value.trim().is_empty() => {
                let secs = value
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidTimeout)?;
                Some(Duration::from_secs(secs))
            }
            _ => None,
        };

        Ok(Self { base_url, timeout })
    }
}

/// Identifiers for the transactional e-mail API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailJsConfig {
    pub service_id: String,
    pub template_id: String,
    pub public_key: String,
    pub api_url: String,
}

impl EmailJsConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let lookup = |key: &'static str| {
            env::var(key)
                .ok()
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let service_id = lookup("EMAILJS_SERVICE_ID");
        let template_id = lookup("EMAILJS_TEMPLATE_ID");
        let public_key = lookup("EMAILJS_PUBLIC_KEY");

        match (service_id, template_id, public_key) {
            (None, None, None) => Ok(None),
            (Some(service_id), Some(template_id), Some(public_key)) => Ok(Some(Self {
                service_id,
                template_id,
                public_key,
                api_url: lookup("EMAILJS_API_URL")
                    .unwrap_or_else(|| DEFAULT_EMAILJS_URL.to_string()),
            })),
            (service_id, template_id, public_key) => {
                let mut missing = Vec::new();
                if service_id.is_none() {
                    missing.push("EMAILJS_SERVICE_ID");
                }
                if template_id.is_none() {
                    missing.push("EMAILJS_TEMPLATE_ID");
                }
                if public_key.is_none() {
                    missing.push("EMAILJS_PUBLIC_KEY");
                }
                Err(ConfigError::IncompleteEmailConfig { missing })
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct FooterConfig {
    pub attribution: String,
}

impl Default for FooterConfig {
    fn default() -> Self {
        Self {
            attribution: DEFAULT_ATTRIBUTION.to_string(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost {
        source: std::net::AddrParseError,
    },
    InvalidBackendUrl {
        value: String,
        reason: String,
    },
    InvalidTimeout,
    IncompleteEmailConfig {
        missing: Vec<&'static str>,
    },
    EmailNotConfigured,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidBackendUrl { value, reason } => {
                write!(f, "TOPSIS_API_URL '{value}' is not a valid URL ({reason})")
            }
            ConfigError::InvalidTimeout => {
                write!(f, "TOPSIS_API_TIMEOUT_SECS must be a whole number of seconds")
            }
            ConfigError::IncompleteEmailConfig { missing } => write!(
                f,
                "e-mail delivery is partially configured; missing {}",
                missing.join(", ")
            ),
            ConfigError::EmailNotConfigured => write!(
                f,
                "e-mail delivery requires EMAILJS_SERVICE_ID, EMAILJS_TEMPLATE_ID and EMAILJS_PUBLIC_KEY"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidBackendUrl { .. }
            | ConfigError::InvalidTimeout
            | ConfigError::IncompleteEmailConfig { .. }
            | ConfigError::EmailNotConfigured => None,
        }
    }
}
