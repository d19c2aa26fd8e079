use serde::{Deserialize, Serialize};
use std::path::Path;

use super::cache::CacheConfig;
use super::dispatch::DispatchConfig;
use super::errors::ConfigError;
use super::local_records::LocalDnsRecord;
use super::logging::LoggingConfig;
use super::server::ServerConfig;

const LOCAL_CONFIG_PATH: &str = "splitroute.toml";
const SYSTEM_CONFIG_PATH: &str = "/etc/splitroute/config.toml";

/// Main configuration structure for splitroute
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub dispatch: DispatchConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub local_records: Vec<LocalDnsRecord>,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. splitroute.toml in current directory
    /// 3. /etc/splitroute/config.toml
    /// 4. Default configuration
    ///
    /// Upstream descriptors come back normalized.
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if Path::new(LOCAL_CONFIG_PATH).exists() {
            Self::from_file(LOCAL_CONFIG_PATH)?
        } else if Path::new(SYSTEM_CONFIG_PATH).exists() {
            Self::from_file(SYSTEM_CONFIG_PATH)?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides);
        config.normalize();
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(port) = overrides.dns_port {
            self.server.dns_port = port;
        }
        if let Some(bind) = overrides.bind_address {
            self.server.bind_address = bind;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    /// Fills upstream descriptor defaults. Idempotent.
    pub fn normalize(&mut self) {
        for descriptor in self.dispatch.descriptors_mut() {
            descriptor.normalize();
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.dns_port == 0 {
            return Err(ConfigError::Validation("DNS port cannot be 0".to_string()));
        }

        if self.dispatch.primary_dns.is_empty() {
            return Err(ConfigError::Validation(
                "No primary upstream servers configured".to_string(),
            ));
        }

        for descriptor in self
            .dispatch
            .primary_dns
            .iter()
            .chain(self.dispatch.alternative_dns.iter())
        {
            descriptor.endpoint().map_err(|e| {
                ConfigError::Validation(format!("Upstream '{}': {}", descriptor.name, e))
            })?;
        }

        for cidr in self
            .dispatch
            .ip_network_primary
            .iter()
            .chain(self.dispatch.ip_network_alternative.iter())
        {
            if cidr.trim().parse::<ipnetwork::IpNetwork>().is_err() {
                return Err(ConfigError::Validation(format!(
                    "Invalid IP network '{}'",
                    cidr
                )));
            }
        }

        if !self.dispatch.when_primary_dns_answer_none_use.is_empty()
            && !self.dispatch.falls_back_to_alternative()
            && self.dispatch.when_primary_dns_answer_none_use != "primaryDNS"
            && self.dispatch.when_primary_dns_answer_none_use != "PrimaryDNS"
        {
            tracing::warn!(
                value = %self.dispatch.when_primary_dns_answer_none_use,
                "Unrecognized when_primary_dns_answer_none_use, keeping primary answers"
            );
        }

        Ok(())
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub dns_port: Option<u16>,
    pub bind_address: Option<String>,
    pub log_level: Option<String>,
}
