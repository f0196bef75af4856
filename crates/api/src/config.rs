use serde::Deserialize;
use std::net::SocketAddr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Dispatch-core tunables (see §6 of the design document).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    pub offer_timeout_secs: u64,
    pub max_search_radius_km: f64,
    pub max_offers_per_booking: u32,
    pub sweep_interval_secs: u64,
    pub weight_distance: f64,
    pub weight_rating: f64,
    pub weight_acceptance: f64,
    pub weight_idle: f64,
    pub default_rating: f64,
    pub default_acceptance_rate: f64,
    pub default_idle_score: f64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            offer_timeout_secs: 20,
            max_search_radius_km: 15.0,
            max_offers_per_booking: 10,
            sweep_interval_secs: 5,
            weight_distance: 0.50,
            weight_rating: 0.25,
            weight_acceptance: 0.15,
            weight_idle: 0.10,
            default_rating: 4.5,
            default_acceptance_rate: 80.0,
            default_idle_score: 50.0,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_idle_timeout() -> u64 {
    600
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

/// Configuration validation error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with DISPATCH__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("DISPATCH").separator("__"))
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration for testing with custom overrides, without
    /// touching the filesystem. Also used by integration tests under
    /// `tests/`, so it is not `#[cfg(test)]`-gated.
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [server]
            host = "0.0.0.0"
            port = 8080
            request_timeout_secs = 30

            [database]
            url = ""
            max_connections = 20
            min_connections = 5
            connect_timeout_secs = 10
            idle_timeout_secs = 600

            [logging]
            level = "info"
            format = "json"

            [dispatch]
            offer_timeout_secs = 20
            max_search_radius_km = 15.0
            max_offers_per_booking = 10
            sweep_interval_secs = 5
            weight_distance = 0.50
            weight_rating = 0.25
            weight_acceptance = 0.15
            weight_idle = 0.10
            default_rating = 4.5
            default_acceptance_rate = 80.0
            default_idle_score = 50.0
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        Ok(cfg)
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.database.url.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "DISPATCH__DATABASE__URL environment variable must be set".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Server port cannot be 0".to_string(),
            ));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigValidationError::InvalidValue(
                "min_connections cannot exceed max_connections".to_string(),
            ));
        }

        if self.dispatch.sweep_interval_secs * 4 > self.dispatch.offer_timeout_secs {
            return Err(ConfigValidationError::InvalidValue(
                "sweep_interval_secs must be at most offer_timeout_secs / 4".to_string(),
            ));
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> SocketAddr {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .expect("Invalid socket address")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_load_with_defaults() {
        let config = Config::load_for_test(&[("database.url", "postgres://test")]).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.dispatch.offer_timeout_secs, 20);
        assert_eq!(config.dispatch.max_search_radius_km, 15.0);
    }

    #[test]
    fn test_config_overrides_apply() {
        let config = Config::load_for_test(&[
            ("database.url", "postgres://test"),
            ("server.port", "9090"),
        ])
        .unwrap();
        assert_eq!(config.server.port, 9090);
    }

    #[test]
    fn test_validate_rejects_missing_database_url() {
        let config = Config::load_for_test(&[]).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_port() {
        let config = Config::load_for_test(&[
            ("database.url", "postgres://test"),
            ("server.port", "0"),
        ])
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_min_exceeding_max_connections() {
        let config = Config::load_for_test(&[
            ("database.url", "postgres://test"),
            ("database.min_connections", "50"),
            ("database.max_connections", "10"),
        ])
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_sweep_interval_too_long() {
        let config = Config::load_for_test(&[
            ("database.url", "postgres://test"),
            ("dispatch.sweep_interval_secs", "30"),
            ("dispatch.offer_timeout_secs", "20"),
        ])
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_socket_addr() {
        let config = Config::load_for_test(&[("database.url", "postgres://test")]).unwrap();
        assert_eq!(config.socket_addr().port(), 8080);
    }
}
