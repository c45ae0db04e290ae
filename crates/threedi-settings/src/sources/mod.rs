//! Source adapters for the legacy model settings representations.

pub mod ini;
pub mod sqlite;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::error::Result;
use crate::mapping::SourceOrigin;

/// A value as read from the legacy source, before any coercion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    /// SQL NULL.
    Null,
    /// SQLite INTEGER.
    Int(i64),
    /// SQLite REAL.
    Float(f64),
    /// INI option value or SQLite TEXT.
    Text(String),
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Null => f.write_str("NULL"),
            RawValue::Int(v) => write!(f, "{v}"),
            RawValue::Float(v) => write!(f, "{v}"),
            RawValue::Text(v) => write!(f, "{v:?}"),
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        RawValue::Int(value)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Float(value)
    }
}

/// Flat mapping of legacy field name to raw value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSourceData {
    values: HashMap<String, RawValue>,
}

impl RawSourceData {
    /// Creates an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value, replacing any previous value under the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<RawValue>) {
        self.values.insert(name.into(), value.into());
    }

    /// Raw value of a legacy field.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RawValue> {
        self.values.get(name)
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the mapping holds no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over all fields in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<RawValue>> FromIterator<(K, V)> for RawSourceData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut data = Self::new();
        for (name, value) in iter {
            data.insert(name, value);
        }
        data
    }
}

/// Everything a source yields for one import run.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedSettings {
    /// Which source descriptors apply.
    pub origin: SourceOrigin,
    /// Flat mapping feeding the general, time step and numerical groups.
    pub settings: RawSourceData,
    /// One raw mapping per aggregation record, in source order.
    pub aggregations: Vec<RawSourceData>,
}

/// Trait for legacy settings sources.
///
/// Sources read everything in [`SettingsSource::connect`]; extraction is then a
/// cheap read of the parsed data.
#[async_trait]
pub trait SettingsSource: Send + Sync {
    /// Get the source type name.
    fn source_type(&self) -> &'static str;

    /// Origin whose source descriptors apply to the extracted data.
    fn origin(&self) -> SourceOrigin;

    /// Read and validate the source.
    async fn connect(&mut self) -> Result<()>;

    /// Return the parsed settings and aggregation records.
    async fn extract(&self) -> Result<ExtractedSettings>;

    /// Release resources.
    async fn close(&mut self) -> Result<()>;
}

/// Create a settings source from configuration.
pub fn create_source(config: &crate::config::SourceConfig) -> Box<dyn SettingsSource> {
    match config {
        crate::config::SourceConfig::Ini(cfg) => Box::new(ini::IniSource::new(cfg.clone())),
        crate::config::SourceConfig::Sqlite(cfg) => {
            Box::new(sqlite::SqliteSource::new(cfg.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_source_data_last_insert_wins() {
        let mut data = RawSourceData::new();
        data.insert("timestep", "30");
        data.insert("timestep", "60");
        assert_eq!(data.len(), 1);
        assert_eq!(data.get("timestep"), Some(&RawValue::Text("60".to_string())));
    }

    #[test]
    fn test_raw_source_data_from_iter() {
        let data: RawSourceData = [("advection_1d", RawValue::Int(1)), ("precon_cg", RawValue::Null)]
            .into_iter()
            .collect();
        assert_eq!(data.get("advection_1d"), Some(&RawValue::Int(1)));
        assert_eq!(data.get("precon_cg"), Some(&RawValue::Null));
        assert!(data.get("missing").is_none());
    }

    #[test]
    fn test_raw_value_display() {
        assert_eq!(RawValue::Text("abc".to_string()).to_string(), "\"abc\"");
        assert_eq!(RawValue::Int(3).to_string(), "3");
        assert_eq!(RawValue::Null.to_string(), "NULL");
    }
}
