//! Broker connection configuration for rabbitsync.
//!
//! TOML file plus `RABBITSYNC_*` environment overrides, validated and
//! translated into a `rabbitsync_api::ManagementClient`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use rabbitsync_api::{ManagementClient, TlsMode, TransportConfig};

pub const ENV_PREFIX: &str = "RABBITSYNC_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("failed to build management client: {0}")]
    Gateway(#[from] rabbitsync_api::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Config struct ───────────────────────────────────────────────────

/// Connection settings for one RabbitMQ management endpoint.
#[derive(Debug, Deserialize, Serialize)]
pub struct BrokerConfig {
    /// Management listener root, e.g. `http://localhost:15672`.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Admin username.
    #[serde(default = "default_username")]
    pub username: String,

    /// Admin password (plaintext in the file — prefer the
    /// `RABBITSYNC_PASSWORD` env var).
    #[serde(default = "default_password")]
    pub password: String,

    /// Skip TLS certificate verification (self-signed brokers).
    #[serde(default)]
    pub insecure: bool,

    /// Path to a custom CA certificate in PEM format.
    pub cacert_file: Option<PathBuf>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            username: default_username(),
            password: default_password(),
            insecure: false,
            cacert_file: None,
            timeout_secs: default_timeout(),
        }
    }
}

fn default_endpoint() -> String {
    "http://localhost:15672".into()
}
fn default_username() -> String {
    "guest".into()
}
fn default_password() -> String {
    "guest".into()
}
fn default_timeout() -> u64 {
    30
}

// ── Loading ─────────────────────────────────────────────────────────

/// Load broker config from an optional TOML file plus `RABBITSYNC_*`
/// environment overrides. Env wins over file wins over defaults.
pub fn load_config(path: Option<&Path>) -> Result<BrokerConfig, ConfigError> {
    let mut figment = Figment::new().merge(Serialized::defaults(BrokerConfig::default()));
    if let Some(path) = path {
        figment = figment.merge(Toml::file(path));
    }
    let config: BrokerConfig = figment.merge(Env::prefixed(ENV_PREFIX)).extract()?;
    config.validate()?;
    Ok(config)
}

impl BrokerConfig {
    /// Check the settings that fail fast rather than at request time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let endpoint: url::Url =
            self.endpoint
                .parse()
                .map_err(|_| ConfigError::Validation {
                    field: "endpoint".into(),
                    reason: format!("invalid URL: {}", self.endpoint),
                })?;
        match endpoint.scheme() {
            "http" | "https" => {}
            other => {
                return Err(ConfigError::Validation {
                    field: "endpoint".into(),
                    reason: format!("expected http or https, got '{other}'"),
                });
            }
        }
        if self.username.is_empty() {
            return Err(ConfigError::Validation {
                field: "username".into(),
                reason: "must not be empty".into(),
            });
        }
        if self.insecure && self.cacert_file.is_some() {
            return Err(ConfigError::Validation {
                field: "insecure".into(),
                reason: "mutually exclusive with cacert_file".into(),
            });
        }
        Ok(())
    }

    /// Translate the TLS and timeout settings for the gateway.
    pub fn transport(&self) -> TransportConfig {
        let tls = if self.insecure {
            TlsMode::DangerAcceptInvalid
        } else if let Some(ref ca_path) = self.cacert_file {
            TlsMode::CustomCa(ca_path.clone())
        } else {
            TlsMode::System
        };
        TransportConfig {
            tls,
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }

    /// Build a ready-to-use management client from this config.
    pub fn connect(&self) -> Result<ManagementClient, ConfigError> {
        self.validate()?;
        let client = ManagementClient::new(
            &self.endpoint,
            self.username.clone(),
            SecretString::from(self.password.clone()),
            &self.transport(),
        )?;
        Ok(client)
    }
}
