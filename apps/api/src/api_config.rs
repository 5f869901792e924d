use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use logkeep_application::DEFAULT_ENTRY_TIMEOUT;
use logkeep_core::AppError;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_DIR: &str = "./logs";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub log_dir: PathBuf,
    pub host: String,
    pub port: u16,
    pub entry_timeout: Duration,
    pub run_maintenance_on_start: bool,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from any variable source; unset and blank
    /// values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let log_dir =
            read("LOGKEEP_LOG_DIR").map_or_else(|| PathBuf::from(DEFAULT_LOG_DIR), PathBuf::from);
        let host = read("LOGKEEP_HOST").unwrap_or_else(|| DEFAULT_HOST.to_owned());
        let port = match read("LOGKEEP_PORT") {
            Some(value) => value.trim().parse::<u16>().map_err(|error| {
                AppError::Validation(format!("invalid LOGKEEP_PORT '{value}': {error}"))
            })?,
            None => DEFAULT_PORT,
        };
        let entry_timeout = match read("LOGKEEP_ENTRY_TIMEOUT_SECS") {
            Some(value) => parse_positive_secs("LOGKEEP_ENTRY_TIMEOUT_SECS", &value)?,
            None => DEFAULT_ENTRY_TIMEOUT,
        };
        let run_maintenance_on_start = match read("LOGKEEP_RUN_MAINTENANCE_ON_START") {
            Some(value) => parse_bool("LOGKEEP_RUN_MAINTENANCE_ON_START", &value)?,
            None => false,
        };

        Ok(Self {
            log_dir,
            host,
            port,
            entry_timeout,
            run_maintenance_on_start,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(self.host.trim()).map_err(|error| {
            AppError::Validation(format!("invalid LOGKEEP_HOST '{}': {error}", self.host))
        })?;
        Ok(SocketAddr::from((host, self.port)))
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

fn parse_positive_secs(name: &str, value: &str) -> Result<Duration, AppError> {
    let seconds = value
        .trim()
        .parse::<u64>()
        .map_err(|error| AppError::Validation(format!("invalid {name} '{value}': {error}")))?;
    if seconds == 0 {
        return Err(AppError::Validation(format!("{name} must be greater than zero")));
    }

    Ok(Duration::from_secs(seconds))
}

fn parse_bool(name: &str, value: &str) -> Result<bool, AppError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(AppError::Validation(format!(
            "{name} must be 'true' or 'false', got '{value}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::net::SocketAddr;
    use std::path::PathBuf;
    use std::time::Duration;

    use logkeep_core::AppError;

    use super::ApiConfig;

    fn load(pairs: &[(&str, &str)]) -> Result<ApiConfig, AppError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
            .collect();
        ApiConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = load(&[]);
        assert!(config.is_ok());
        let config = config.unwrap_or_else(|_| unreachable!());

        assert_eq!(config.log_dir, PathBuf::from("./logs"));
        assert_eq!(config.entry_timeout, Duration::from_secs(30));
        assert!(!config.run_maintenance_on_start);
        assert_eq!(
            config.socket_address().ok(),
            Some(SocketAddr::from(([0, 0, 0, 0], 8080)))
        );
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = load(&[
            ("LOGKEEP_LOG_DIR", "/var/log/logkeep"),
            ("LOGKEEP_HOST", "127.0.0.1"),
            ("LOGKEEP_PORT", "9000"),
            ("LOGKEEP_ENTRY_TIMEOUT_SECS", "5"),
            ("LOGKEEP_RUN_MAINTENANCE_ON_START", "TRUE"),
        ]);
        assert!(config.is_ok());
        let config = config.unwrap_or_else(|_| unreachable!());

        assert_eq!(config.log_dir, PathBuf::from("/var/log/logkeep"));
        assert_eq!(config.entry_timeout, Duration::from_secs(5));
        assert!(config.run_maintenance_on_start);
        assert_eq!(
            config.socket_address().ok(),
            Some(SocketAddr::from(([127, 0, 0, 1], 9000)))
        );
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = load(&[("LOGKEEP_PORT", "  "), ("LOGKEEP_LOG_DIR", "")]);
        assert!(config.is_ok());
        let config = config.unwrap_or_else(|_| unreachable!());

        assert_eq!(config.port, 8080);
        assert_eq!(config.log_dir, PathBuf::from("./logs"));
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            load(&[("LOGKEEP_PORT", "http")]),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            load(&[("LOGKEEP_PORT", "70000")]),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            load(&[("LOGKEEP_ENTRY_TIMEOUT_SECS", "0")]),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            load(&[("LOGKEEP_RUN_MAINTENANCE_ON_START", "maybe")]),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn unparsable_host_fails_at_bind_time() {
        let config = load(&[("LOGKEEP_HOST", "localhost:80")]);
        assert!(config.is_ok());
        let config = config.unwrap_or_else(|_| unreachable!());

        assert!(matches!(
            config.socket_address(),
            Err(AppError::Validation(_))
        ));
    }
}
