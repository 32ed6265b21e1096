use serde::Deserialize;
use std::path::PathBuf;

/// Longest accepted session lifetime (one year).
pub const MAX_SESSION_TTL_MINUTES: u64 = 60 * 24 * 365;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the SQLite database
    pub database_path: PathBuf,
    /// Port the HTTP server listens on
    pub port: u16,
    /// Minutes a session stays valid after sign-in
    pub session_ttl_minutes: u64,
    /// Mark the session cookie `Secure` (HTTPS only)
    pub cookie_secure: bool,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("cabinstay");
        Self {
            database_path: data_dir.join("cabinstay.db"),
            port: 8080,
            session_ttl_minutes: 60 * 24 * 30,
            cookie_secure: false,
        }
    }
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            config = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;
        }

        if let Ok(db_path) = std::env::var("CABINSTAY_DATABASE_PATH") {
            config.database_path = PathBuf::from(db_path);
        }
        if let Ok(port) = std::env::var("CABINSTAY_PORT") {
            config.port = port
                .parse()
                .map_err(|_| ConfigError::InvalidEnv("CABINSTAY_PORT", port))?;
        }
        if let Ok(ttl) = std::env::var("CABINSTAY_SESSION_TTL") {
            config.session_ttl_minutes = parse_session_ttl(ttl)?;
        }
        if let Ok(secure) = std::env::var("CABINSTAY_COOKIE_SECURE") {
            config.cookie_secure = matches!(secure.as_str(), "1" | "true" | "yes");
        }

        if config.session_ttl_minutes > MAX_SESSION_TTL_MINUTES {
            return Err(ConfigError::InvalidValue(
                "session_ttl_minutes",
                config.session_ttl_minutes.to_string(),
            ));
        }

        Ok(config)
    }

    /// Default config file path: ~/.config/cabinstay/config.yaml
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("cabinstay")
            .join("config.yaml")
    }
}

/// Parses `CABINSTAY_SESSION_TTL`, rejecting values above [`MAX_SESSION_TTL_MINUTES`].
fn parse_session_ttl(value: String) -> Result<u64, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(minutes) if minutes <= MAX_SESSION_TTL_MINUTES => Ok(minutes),
        _ => Err(ConfigError::InvalidEnv("CABINSTAY_SESSION_TTL", value)),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
    InvalidEnv(&'static str, String),
    InvalidValue(&'static str, String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(
                    f,
                    "Failed to parse config file '{}': {}",
                    path.display(),
                    e
                )
            }
            ConfigError::InvalidEnv(var, value) => {
                write!(f, "Invalid value '{}' for {}", value, var)
            }
            ConfigError::InvalidValue(key, value) => {
                write!(
                    f,
                    "Invalid value '{}' for {} (at most {} minutes)",
                    value, key, MAX_SESSION_TTL_MINUTES
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}
