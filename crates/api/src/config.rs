use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::auth::jwt::JwtConfig;

/// A configuration variable is present but unusable, or required and absent.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set in the environment")]
    Missing(&'static str),

    #[error("{var} has an invalid value '{value}'")]
    Invalid { var: &'static str, value: String },
}

/// Which spreadsheet backend the server talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetsBackendKind {
    /// The Google spreadsheet named in the secrets file.
    Google,
    /// An in-process spreadsheet that starts empty; for local runs.
    Memory,
}

impl SheetsBackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SheetsBackendKind::Google => "google",
            SheetsBackendKind::Memory => "memory",
        }
    }
}

impl fmt::Display for SheetsBackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SheetsBackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "google" => Ok(SheetsBackendKind::Google),
            "memory" => Ok(SheetsBackendKind::Memory),
            _ => Err(ConfigError::Invalid {
                var: "SHEETS_BACKEND",
                value: s.to_string(),
            }),
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// TOML file holding the admin, mail and spreadsheet credentials.
    pub secrets_path: PathBuf,
    pub sheets_backend: SheetsBackendKind,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `SECRETS_PATH`         | `secrets.toml`             |
    /// | `SHEETS_BACKEND`       | `google`                   |
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = parse_var("PORT", "3000")?;

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = parse_var("REQUEST_TIMEOUT_SECS", "30")?;

        let secrets_path = std::env::var("SECRETS_PATH")
            .unwrap_or_else(|_| "secrets.toml".into())
            .into();

        let sheets_backend = std::env::var("SHEETS_BACKEND")
            .unwrap_or_else(|_| "google".into())
            .parse()?;

        let jwt = JwtConfig::from_env()?;

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            secrets_path,
            sheets_backend,
            jwt,
        })
    }
}

/// Parse `var` from the environment, falling back to `default` when unset.
pub(crate) fn parse_var<T: FromStr>(var: &'static str, default: &str) -> Result<T, ConfigError> {
    let value = std::env::var(var).unwrap_or_else(|_| default.to_string());
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { var, value })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn backend_kind_parses_case_insensitively() {
        assert_eq!(
            "Memory".parse::<SheetsBackendKind>().unwrap(),
            SheetsBackendKind::Memory
        );
        assert_eq!(
            " google ".parse::<SheetsBackendKind>().unwrap(),
            SheetsBackendKind::Google
        );
    }

    #[test]
    fn unknown_backend_is_rejected() {
        assert_matches!(
            "excel".parse::<SheetsBackendKind>(),
            Err(ConfigError::Invalid { var: "SHEETS_BACKEND", .. })
        );
    }
}
