//! Configuration types for threedi-settings.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};
use crate::mapping::ResourceGroup;
use crate::sources::ini::IniSourceConfig;
use crate::sources::sqlite::SqliteSourceConfig;

/// Host used when neither the config file nor the command line names one.
pub const DEFAULT_API_HOST: &str = "https://api.3di.live";

/// Main import configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Connection to the settings API.
    #[serde(default)]
    pub api: ApiConfig,
    /// Import options.
    #[serde(default)]
    pub options: ImportOptions,
}

/// Settings API connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API host, with or without the `/v3` suffix.
    #[serde(default = "default_host")]
    pub host: String,
    /// Bearer token; takes precedence over basic auth.
    #[serde(default)]
    pub token: Option<String>,
    /// Username for basic auth.
    #[serde(default)]
    pub username: Option<String>,
    /// Password for basic auth.
    #[serde(default)]
    pub password: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            token: None,
            username: None,
            password: None,
        }
    }
}

fn default_host() -> String {
    DEFAULT_API_HOST.to_string()
}

/// Legacy settings source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SourceConfig {
    /// Model INI file with optional aggregation file.
    #[serde(rename = "ini")]
    Ini(IniSourceConfig),
    /// SQLite model database.
    #[serde(rename = "sqlite")]
    Sqlite(SqliteSourceConfig),
}

impl SourceConfig {
    /// The same source, told not to read aggregation records when `skip` is set.
    #[must_use]
    pub fn skipping_aggregation(mut self, skip: bool) -> Self {
        match &mut self {
            SourceConfig::Ini(cfg) => cfg.skip_aggregation |= skip,
            SourceConfig::Sqlite(cfg) => cfg.skip_aggregation |= skip,
        }
        self
    }
}

/// Import options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportOptions {
    /// Convert and report payloads without creating resources.
    #[serde(default)]
    pub dry_run: bool,
    /// Do not import aggregation settings.
    #[serde(default)]
    pub skip_aggregation: bool,
    /// Groups to import; empty means all.
    #[serde(default)]
    pub groups: Vec<ResourceGroup>,
}

impl ImportOptions {
    /// Groups this run imports, in import order.
    #[must_use]
    pub fn selected_groups(&self) -> Vec<ResourceGroup> {
        ResourceGroup::ALL
            .into_iter()
            .filter(|group| self.groups.is_empty() || self.groups.contains(group))
            .filter(|group| !(self.skip_aggregation && *group == ResourceGroup::Aggregation))
            .collect()
    }
}

impl ImportConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<()> {
        crate::api::validate_url(&self.api.host)?;
        if self.api.token.is_none() && self.api.username.is_some() != self.api.password.is_some() {
            return Err(Error::Config(
                "basic auth needs both username and password".to_string(),
            ));
        }
        if self.options.selected_groups().is_empty() {
            return Err(Error::Config("no settings group selected".to_string()));
        }
        Ok(())
    }
}

/// Example configuration written by `threedi-settings init`.
pub const EXAMPLE_CONFIG: &str = r#"# threedi-settings configuration
api:
  host: https://api.3di.live
  # token: <personal API token>
  # or basic auth:
  # username: jdoe
  # password: secret

options:
  dry_run: false
  skip_aggregation: false
  # restrict the import to some groups (general, time_step, numerical, aggregation)
  groups: []
"#;
