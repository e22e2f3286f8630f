//! Configuration for the status module
//!
//! The only option the module itself reads is `status.resource`, the resource
//! part of a JID that the module answers for. Leaving it unset (or empty)
//! turns the external resource handler off; session tracking keeps working.

use std::path::Path;

use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

use crate::error::Result;
use crate::logging::{parse_log_level, LoggingConfig};

/// Environment variable prefix, e.g. `SM__STATUS__RESOURCE`.
pub const ENV_PREFIX: &str = "SM";

/// Main configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusConfig {
    #[serde(default)]
    pub status: StatusSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// `[status]` table
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusSection {
    #[serde(default)]
    pub resource: Option<String>,
}

/// `[logging]` table
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSection {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
    #[serde(default)]
    pub file_info: bool,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
            file_info: false,
        }
    }
}

impl StatusConfig {
    /// Configuration watching the given resource.
    pub fn with_resource(resource: impl Into<String>) -> Self {
        Self {
            status: StatusSection {
                resource: Some(resource.into()),
            },
            ..Default::default()
        }
    }

    /// Load configuration from an optional TOML file, then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
        }
        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Parse configuration from a TOML document.
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        Ok(Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()?)
    }

    /// The watched resource, if one is configured.
    pub fn resource(&self) -> Option<&str> {
        self.status
            .resource
            .as_deref()
            .filter(|resource| !resource.is_empty())
    }

    /// Logging settings resolved into a subscriber configuration.
    pub fn logging_config(&self) -> Result<LoggingConfig> {
        Ok(LoggingConfig {
            level: parse_log_level(&self.logging.level)?,
            json: self.logging.json,
            file_info: self.logging.file_info,
        })
    }
}
