//! Legacy model INI source.
//!
//! The model INI file is read with `configparser` and all of its sections are
//! flattened into one namespace. The optional aggregation file named by
//! `[output] aggregation_settings` holds one aggregation record per section.

use async_trait::async_trait;
use configparser::ini::Ini;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::mapping::SourceOrigin;
use crate::sources::{ExtractedSettings, RawSourceData, SettingsSource};

/// Sections every model INI file must contain.
pub const REQUIRED_SECTIONS: [&str; 4] = ["output", "simulation", "numerics", "physics"];

/// Option of the `[output]` section naming the aggregation file.
pub const AGGREGATION_OPTION: &str = "aggregation_settings";

/// Section holding the `[DEFAULT]` options (section names are lower-cased).
const DEFAULT_SECTION: &str = "default";

/// Configuration for INI import.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IniSourceConfig {
    /// Path to the model INI file.
    pub path: PathBuf,
    /// Aggregation file overriding `[output] aggregation_settings`.
    #[serde(default)]
    pub aggregation_path: Option<PathBuf>,
    /// Do not read the aggregation file.
    #[serde(default)]
    pub skip_aggregation: bool,
}

/// A loaded INI document.
///
/// Section and option names are lower-cased and sections keep file order.
/// Options of `[DEFAULT]`, and options before the first section header, are
/// inherited by every section.
pub struct IniDocument {
    ini: Ini,
}

impl IniDocument {
    fn parser() -> Ini {
        let mut ini = Ini::new();
        ini.set_multiline(true);
        ini
    }

    /// Parses INI text. `origin` is only used in error messages.
    pub fn parse(text: &str, origin: &str) -> Result<Self> {
        let mut ini = Self::parser();
        ini.read(text.to_string())
            .map_err(|e| Error::SourceMalformed(format!("{}: {}", origin, e)))?;
        Ok(Self { ini })
    }

    /// Loads an INI file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::SourceNotFound(format!(
                "{} does not exist or is a directory",
                path.display()
            )));
        }
        let mut ini = Self::parser();
        ini.load(path)
            .map_err(|e| Error::SourceMalformed(format!("{}: {}", path.display(), e)))?;
        Ok(Self { ini })
    }

    /// Section names in file order, without the default section.
    #[must_use]
    pub fn sections(&self) -> Vec<&str> {
        self.ini
            .get_map_ref()
            .keys()
            .map(String::as_str)
            .filter(|name| *name != DEFAULT_SECTION)
            .collect()
    }

    /// Whether the document has the section.
    #[must_use]
    pub fn has_section(&self, name: &str) -> bool {
        name != DEFAULT_SECTION && self.ini.get_map_ref().contains_key(name)
    }

    /// Options of one section without the defaults; an option without a
    /// value reads as empty text.
    fn options(&self, section: &str) -> Vec<(&str, &str)> {
        self.ini
            .get_map_ref()
            .get(section)
            .map(|options| {
                options
                    .iter()
                    .map(|(name, value)| (name.as_str(), value.as_deref().unwrap_or("")))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Option value of a section, falling back to `[DEFAULT]`.
    #[must_use]
    pub fn get(&self, section: &str, option: &str) -> Option<&str> {
        if !self.has_section(section) {
            return None;
        }
        [section, DEFAULT_SECTION].into_iter().find_map(|name| {
            self.options(name)
                .into_iter()
                .find(|(key, _)| *key == option)
                .map(|(_, value)| value)
        })
    }

    /// Options of one section merged over the defaults.
    #[must_use]
    pub fn section_data(&self, section: &str) -> RawSourceData {
        self.options(DEFAULT_SECTION)
            .into_iter()
            .chain(self.options(section))
            .collect()
    }

    /// One record per section, in file order.
    #[must_use]
    pub fn records(&self) -> Vec<RawSourceData> {
        self.sections()
            .into_iter()
            .map(|section| self.section_data(section))
            .collect()
    }

    /// All sections flattened into one namespace.
    ///
    /// Sections are applied in file order, so when several sections define the
    /// same option the value of the last section wins.
    #[must_use]
    pub fn flatten(&self) -> RawSourceData {
        let mut data = RawSourceData::new();
        for record in self.records() {
            for (name, value) in record.iter() {
                data.insert(name, value.clone());
            }
        }
        data
    }
}

/// Legacy model INI source.
pub struct IniSource {
    config: IniSourceConfig,
    extracted: Option<ExtractedSettings>,
}

impl IniSource {
    /// Creates a new INI source.
    #[must_use]
    pub fn new(config: IniSourceConfig) -> Self {
        Self {
            config,
            extracted: None,
        }
    }

    /// Directory the model INI file lives in.
    #[must_use]
    pub fn model_root(&self) -> &Path {
        self.config.path.parent().unwrap_or_else(|| Path::new("."))
    }

    /// Aggregation file to import, if any.
    ///
    /// An explicitly configured path wins. Otherwise the `[output]` option is
    /// resolved relative to the model root; a missing or empty option means
    /// no aggregation import.
    #[must_use]
    pub fn aggregation_path(&self, doc: &IniDocument) -> Option<PathBuf> {
        if let Some(path) = &self.config.aggregation_path {
            return Some(path.clone());
        }
        doc.get("output", AGGREGATION_OPTION)
            .filter(|value| !value.is_empty())
            .map(|value| self.model_root().join(value))
    }

    fn read_aggregations(path: &Path) -> Result<Vec<RawSourceData>> {
        Ok(IniDocument::load(path)?.records())
    }
}

#[async_trait]
impl SettingsSource for IniSource {
    fn source_type(&self) -> &'static str {
        "ini"
    }

    fn origin(&self) -> SourceOrigin {
        SourceOrigin::Ini
    }

    async fn connect(&mut self) -> Result<()> {
        let doc = IniDocument::load(&self.config.path)?;

        let missing: Vec<_> = REQUIRED_SECTIONS
            .iter()
            .filter(|name| !doc.has_section(name))
            .copied()
            .collect();
        if !missing.is_empty() {
            return Err(Error::SourceMalformed(format!(
                "{} lacks required section(s): {}",
                self.config.path.display(),
                missing.join(", ")
            )));
        }

        let aggregations = if self.config.skip_aggregation {
            info!("Skipping aggregation settings");
            Vec::new()
        } else if let Some(path) = self.aggregation_path(&doc) {
            info!("Reading aggregation settings from {}", path.display());
            Self::read_aggregations(&path)?
        } else {
            info!("No aggregation settings file configured");
            Vec::new()
        };

        let settings = doc.flatten();
        debug!(
            "Read {} options from {} sections, {} aggregation records",
            settings.len(),
            doc.sections().len(),
            aggregations.len()
        );

        self.extracted = Some(ExtractedSettings {
            origin: SourceOrigin::Ini,
            settings,
            aggregations,
        });
        Ok(())
    }

    async fn extract(&self) -> Result<ExtractedSettings> {
        self.extracted
            .clone()
            .ok_or_else(|| Error::SourceNotFound("INI source not connected".to_string()))
    }

    async fn close(&mut self) -> Result<()> {
        self.extracted = None;
        Ok(())
    }
}

#[cfg(test)]
#[path = "ini_tests.rs"]
mod tests;
