use std::time::Duration;

use herald_events::config::split_csv;
use herald_events::delivery::{EmailConfig, EmailConfigError};

/// Start-up configuration could not be parsed.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} must be a valid {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error(transparent)]
    Email(#[from] EmailConfigError),
}

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    /// Shared secret for event ingress. Empty disables the check.
    pub service_token: String,
    pub org_settings_ttl: Duration,
    pub log_format: LogFormat,
    /// SMTP settings; `None` leaves email delivery unconfigured.
    pub email: Option<EmailConfig>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                      | Default                 |
    /// |------------------------------|-------------------------|
    /// | `DATABASE_URL`               | required (or `POSTGRES_DSN`) |
    /// | `HOST`                       | `0.0.0.0`               |
    /// | `PORT`                       | `8006` (or `NOTIFICATION_SERVICE_PORT`) |
    /// | `CORS_ORIGINS`               | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`       | `30`                    |
    /// | `NOTIFICATION_SERVICE_TOKEN` | empty                   |
    /// | `ORG_SETTINGS_TTL_SECS`      | `300`                   |
    /// | `LOG_FORMAT`                 | `text` (`json`)         |
    ///
    /// SMTP variables are read by [`EmailConfig::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |keys: &[&str]| {
            keys.iter()
                .find_map(|key| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty()))
        };

        let database_url = var(&["DATABASE_URL", "POSTGRES_DSN"])
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let port = parse_or(var(&["PORT", "NOTIFICATION_SERVICE_PORT"]), "PORT", "u16", 8006)?;
        let request_timeout_secs =
            parse_or(var(&["REQUEST_TIMEOUT_SECS"]), "REQUEST_TIMEOUT_SECS", "u64", 30)?;
        let ttl_secs: u64 =
            parse_or(var(&["ORG_SETTINGS_TTL_SECS"]), "ORG_SETTINGS_TTL_SECS", "u64", 300)?;

        let log_format = match var(&["LOG_FORMAT"]).as_deref() {
            None | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "LOG_FORMAT",
                    expected: "format (text or json)",
                    value: other.to_string(),
                })
            }
        };

        let email = EmailConfig::from_lookup(&lookup)?;

        Ok(Self {
            host: var(&["HOST"]).unwrap_or_else(|| "0.0.0.0".into()),
            port,
            database_url,
            cors_origins: split_csv(
                &var(&["CORS_ORIGINS"]).unwrap_or_else(|| "http://localhost:5173".into()),
            ),
            request_timeout_secs,
            service_token: var(&["NOTIFICATION_SERVICE_TOKEN"]).unwrap_or_default(),
            org_settings_ttl: Duration::from_secs(ttl_secs),
            log_format,
            email,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    value: Option<String>,
    name: &'static str,
    expected: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
            name,
            expected,
            value: raw,
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = load(&[("DATABASE_URL", "postgres://localhost/herald")]).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8006);
        assert_eq!(config.cors_origins, vec!["http://localhost:5173"]);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.service_token, "");
        assert_eq!(config.org_settings_ttl, Duration::from_secs(300));
        assert_eq!(config.log_format, LogFormat::Text);
        assert!(config.email.is_none());
    }

    #[test]
    fn database_url_is_required() {
        assert_matches!(load(&[]), Err(ConfigError::Missing("DATABASE_URL")));
    }

    #[test]
    fn aliases_are_honoured() {
        let config = load(&[
            ("POSTGRES_DSN", "postgres://db/herald"),
            ("NOTIFICATION_SERVICE_PORT", "9100"),
        ])
        .unwrap();
        assert_eq!(config.database_url, "postgres://db/herald");
        assert_eq!(config.port, 9100);
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        assert_matches!(
            load(&[("DATABASE_URL", "postgres://x"), ("PORT", "eighty")]),
            Err(ConfigError::Invalid { name: "PORT", .. })
        );
        assert_matches!(
            load(&[("DATABASE_URL", "postgres://x"), ("ORG_SETTINGS_TTL_SECS", "-1")]),
            Err(ConfigError::Invalid { name: "ORG_SETTINGS_TTL_SECS", .. })
        );
    }

    #[test]
    fn smtp_settings_are_validated_at_startup() {
        let config = load(&[
            ("DATABASE_URL", "postgres://x"),
            ("SMTP_HOST", "smtp.example.com"),
            ("SMTP_PORT", "2525"),
        ])
        .unwrap();
        assert_eq!(config.email.map(|e| e.smtp_port), Some(2525));

        assert_matches!(
            load(&[
                ("DATABASE_URL", "postgres://x"),
                ("SMTP_HOST", "smtp.example.com"),
                ("SMTP_PORT", "not-a-port"),
            ]),
            Err(ConfigError::Email(EmailConfigError::InvalidPort(_)))
        );
    }

    #[test]
    fn json_log_format() {
        let config = load(&[("DATABASE_URL", "postgres://x"), ("LOG_FORMAT", "json")]).unwrap();
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(load(&[("DATABASE_URL", "postgres://x"), ("LOG_FORMAT", "xml")]).is_err());
    }
}
