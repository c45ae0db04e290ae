//! Field descriptors and the static mapping table.
//!
//! Every settable field of the four API settings resources has exactly one
//! [`MappingEntry`]. An entry joins the legacy INI field, the legacy SQLite
//! column and the API field under the API's canonical field name.

mod catalog;

pub(crate) use catalog::{
    AGGREGATION_SETTINGS_TABLE, GLOBAL_SETTINGS_TABLE, NUMERICAL_SETTINGS_TABLE,
};

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Settings resource group of the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceGroup {
    /// General simulation settings.
    General,
    /// Time step settings.
    TimeStep,
    /// Numerical solver settings.
    Numerical,
    /// Aggregation settings (one resource per aggregated variable).
    Aggregation,
}

impl ResourceGroup {
    /// All groups in import order.
    pub const ALL: [ResourceGroup; 4] = [
        ResourceGroup::General,
        ResourceGroup::TimeStep,
        ResourceGroup::Numerical,
        ResourceGroup::Aggregation,
    ];

    /// Snake-case name used on the command line and in API paths.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceGroup::General => "general",
            ResourceGroup::TimeStep => "time_step",
            ResourceGroup::Numerical => "numerical",
            ResourceGroup::Aggregation => "aggregation",
        }
    }

    /// Name of the API model for this group.
    #[must_use]
    pub fn model_name(self) -> &'static str {
        match self {
            ResourceGroup::General => "GeneralSettings",
            ResourceGroup::TimeStep => "TimeStepSettings",
            ResourceGroup::Numerical => "NumericalSettings",
            ResourceGroup::Aggregation => "AggregationSettings",
        }
    }

    /// Fields filled in by the caller instead of being looked up in the source.
    #[must_use]
    pub fn structural_fields(self) -> &'static [&'static str] {
        match self {
            ResourceGroup::Aggregation => &[],
            _ => &["simulation_id"],
        }
    }

    /// Whether the group converts to a list of resources.
    #[must_use]
    pub fn is_multi_row(self) -> bool {
        matches!(self, ResourceGroup::Aggregation)
    }
}

impl fmt::Display for ResourceGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceGroup {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        match normalized.as_str() {
            "general" | "generalsettings" => Ok(ResourceGroup::General),
            "time_step" | "timestep" | "timestepsettings" => Ok(ResourceGroup::TimeStep),
            "numerical" | "numericalsettings" => Ok(ResourceGroup::Numerical),
            "aggregation" | "aggregationsettings" => Ok(ResourceGroup::Aggregation),
            _ => Err(Error::UnknownGroup(s.to_string())),
        }
    }
}

/// Declared type of a source or target field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Signed integer.
    Int,
    /// Floating point number.
    Float,
    /// Boolean.
    Bool,
    /// Text.
    Str,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FieldType::Int => "int",
            FieldType::Float => "float",
            FieldType::Bool => "bool",
            FieldType::Str => "str",
        })
    }
}

/// A typed field value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// Boolean value.
    Bool(bool),
    /// Text value.
    Str(Cow<'static, str>),
}

impl FieldValue {
    /// Type of the value.
    #[must_use]
    pub fn field_type(&self) -> FieldType {
        match self {
            FieldValue::Int(_) => FieldType::Int,
            FieldValue::Float(_) => FieldType::Float,
            FieldValue::Bool(_) => FieldType::Bool,
            FieldValue::Str(_) => FieldType::Str,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Int(v) => write!(f, "{v}"),
            FieldValue::Float(v) => write!(f, "{v}"),
            FieldValue::Bool(v) => write!(f, "{v}"),
            FieldValue::Str(v) => f.write_str(v),
        }
    }
}

/// Which legacy representation a run reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceOrigin {
    /// Model INI file plus optional aggregation INI file.
    Ini,
    /// Legacy SQLite model database.
    Sqlite,
}

impl fmt::Display for SourceOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SourceOrigin::Ini => "ini",
            SourceOrigin::Sqlite => "sqlite",
        })
    }
}

/// Where a legacy field lives in its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceLocator {
    /// Section of the model INI file.
    IniSection(&'static str),
    /// Table of the SQLite model database.
    SqliteTable(&'static str),
    /// Legacy aggregation file; every section is one record.
    Legacy,
}

impl fmt::Display for SourceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceLocator::IniSection(section) => write!(f, "[{section}]"),
            SourceLocator::SqliteTable(table) => f.write_str(table),
            SourceLocator::Legacy => f.write_str("aggregation file"),
        }
    }
}

/// Legacy side of a mapping entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceField {
    /// Legacy option or column name.
    pub name: &'static str,
    /// Type the raw value is parsed as.
    pub field_type: FieldType,
    /// Section, table or legacy origin.
    pub locator: SourceLocator,
}

/// API side of a mapping entry.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetField {
    /// Canonical API field name.
    pub name: &'static str,
    /// API field type.
    pub field_type: FieldType,
    /// Value used when the legacy value cannot be coerced.
    pub default: Option<FieldValue>,
    /// Owning resource group.
    pub group: ResourceGroup,
}

/// One logical field: its INI and SQLite sources and its API target.
#[derive(Debug, Clone, PartialEq)]
pub struct MappingEntry {
    /// Source descriptor for INI imports.
    pub ini: SourceField,
    /// Source descriptor for SQLite imports.
    pub sqlite: SourceField,
    /// Target descriptor.
    pub target: TargetField,
}

impl MappingEntry {
    /// Source descriptor for the given origin.
    #[must_use]
    pub fn source(&self, origin: SourceOrigin) -> &SourceField {
        match origin {
            SourceOrigin::Ini => &self.ini,
            SourceOrigin::Sqlite => &self.sqlite,
        }
    }

    /// Canonical field name.
    #[must_use]
    pub fn canonical_name(&self) -> &'static str {
        self.target.name
    }
}

/// Static, read-only catalog of mapping entries.
pub struct MappingTable;

impl MappingTable {
    /// Entries of a group, in declaration order.
    #[must_use]
    pub fn entries_for_group(group: ResourceGroup) -> &'static [MappingEntry] {
        match group {
            ResourceGroup::General => catalog::GENERAL,
            ResourceGroup::TimeStep => catalog::TIME_STEP,
            ResourceGroup::Numerical => catalog::NUMERICAL,
            ResourceGroup::Aggregation => catalog::AGGREGATION,
        }
    }

    /// Entry for a canonical field name within a group.
    #[must_use]
    pub fn lookup(group: ResourceGroup, canonical_name: &str) -> Option<&'static MappingEntry> {
        Self::entries_for_group(group)
            .iter()
            .find(|entry| entry.canonical_name() == canonical_name)
    }

    /// The resource groups, in import order.
    #[must_use]
    pub fn groups() -> &'static [ResourceGroup] {
        &ResourceGroup::ALL
    }

    /// All entries of all groups, in import order.
    pub fn iter() -> impl Iterator<Item = &'static MappingEntry> {
        ResourceGroup::ALL
            .into_iter()
            .flat_map(Self::entries_for_group)
    }

    /// SQLite columns the table locates in `table`.
    pub fn sqlite_columns(table: &str) -> impl Iterator<Item = &'static str> + '_ {
        Self::iter().filter_map(move |entry| match entry.sqlite.locator {
            SourceLocator::SqliteTable(t) if t == table => Some(entry.sqlite.name),
            _ => None,
        })
    }
}

#[cfg(test)]
#[path = "mapping_tests.rs"]
mod tests;
