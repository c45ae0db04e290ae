//! Conversion of raw legacy data into typed settings resources.
//!
//! Each target field is converted on its own: the raw value is looked up by
//! its legacy name, coerced to the legacy type and then to the API type. A
//! value that fails either coercion is replaced by the field's default and
//! logged; a legacy field that is absent altogether fails the whole group.

pub mod coerce;

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::mapping::{FieldValue, MappingEntry, MappingTable, ResourceGroup, SourceOrigin};
use crate::sources::{ExtractedSettings, RawSourceData};

pub use coerce::{coerce_raw, coerce_value, CoercionError};

/// A field that fell back to its default value.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFallback {
    /// Canonical field name.
    pub field: &'static str,
    /// Legacy field name the value was read from.
    pub source_field: &'static str,
    /// Offending raw value, as displayed in the warning.
    pub raw: String,
    /// Coercion failure.
    pub reason: String,
}

/// A fully typed record for one settings resource.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedResource {
    group: ResourceGroup,
    fields: Vec<(&'static str, Option<FieldValue>)>,
    fallbacks: Vec<FieldFallback>,
}

impl ConvertedResource {
    /// Resource group of the record.
    #[must_use]
    pub fn group(&self) -> ResourceGroup {
        self.group
    }

    /// Value of a field; `None` when absent or null.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .and_then(|(_, value)| value.as_ref())
    }

    /// Whether the record has a field of that name (null or not).
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|(field, _)| *field == name)
    }

    /// Field names in record order.
    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|(name, _)| *name)
    }

    /// Fields that fell back to their default.
    #[must_use]
    pub fn fallbacks(&self) -> &[FieldFallback] {
        &self.fallbacks
    }

    /// JSON object with one member per field.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .fields
            .iter()
            .map(|(name, value)| {
                let value = value
                    .as_ref()
                    .and_then(|v| serde_json::to_value(v).ok())
                    .unwrap_or(serde_json::Value::Null);
                ((*name).to_string(), value)
            })
            .collect();
        serde_json::Value::Object(map)
    }
}

/// Converts raw source data using the mapping table.
#[derive(Debug, Clone, Copy)]
pub struct Converter {
    origin: SourceOrigin,
    simulation_id: i64,
}

impl Converter {
    /// Creates a converter for data of the given origin.
    #[must_use]
    pub fn new(origin: SourceOrigin, simulation_id: i64) -> Self {
        Self {
            origin,
            simulation_id,
        }
    }

    /// Converts one raw mapping into one resource of `group`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingField`] if a mapped legacy field is absent.
    pub fn convert(&self, group: ResourceGroup, raw: &RawSourceData) -> Result<ConvertedResource> {
        let entries = MappingTable::entries_for_group(group);
        let structural = group.structural_fields();
        let mut fields = Vec::with_capacity(structural.len() + entries.len());
        let mut fallbacks = Vec::new();

        if structural.contains(&"simulation_id") {
            fields.push(("simulation_id", Some(FieldValue::Int(self.simulation_id))));
        }

        for entry in entries {
            let (value, fallback) = self.convert_field(entry, raw)?;
            fields.push((entry.canonical_name(), value));
            fallbacks.extend(fallback);
        }

        Ok(ConvertedResource {
            group,
            fields,
            fallbacks,
        })
    }

    /// Converts every aggregation record independently.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingField`] if any record lacks a mapped field.
    pub fn convert_aggregations(&self, items: &[RawSourceData]) -> Result<Vec<ConvertedResource>> {
        items
            .iter()
            .map(|raw| self.convert(ResourceGroup::Aggregation, raw))
            .collect()
    }

    /// Converts the part of the extracted data that feeds `group`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingField`] if a mapped legacy field is absent.
    pub fn convert_group(
        &self,
        group: ResourceGroup,
        extracted: &ExtractedSettings,
    ) -> Result<Vec<ConvertedResource>> {
        if group.is_multi_row() {
            self.convert_aggregations(&extracted.aggregations)
        } else {
            Ok(vec![self.convert(group, &extracted.settings)?])
        }
    }

    /// Converts one field; the fallback is `Some` when the default was used.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingField`] if the legacy field is absent.
    pub fn convert_field(
        &self,
        entry: &MappingEntry,
        raw: &RawSourceData,
    ) -> Result<(Option<FieldValue>, Option<FieldFallback>)> {
        let source = entry.source(self.origin);
        let target = &entry.target;

        let raw_value = raw.get(source.name).ok_or_else(|| Error::MissingField {
            group: target.group,
            field: source.name.to_string(),
        })?;

        let converted = coerce_raw(raw_value, source.field_type).and_then(|value| {
            if source.field_type == target.field_type {
                Ok(value)
            } else {
                coerce_value(value, target.field_type)
            }
        });

        match converted {
            Ok(value) => {
                debug!("{}.{} = {}", target.group, target.name, value);
                Ok((Some(value), None))
            }
            Err(err) => {
                let default = target.default.clone();
                warn!(
                    "Invalid value {} for '{}' ({} {}): {}; using default {}",
                    raw_value,
                    source.name,
                    target.group,
                    target.name,
                    err,
                    default
                        .as_ref()
                        .map_or_else(|| "null".to_string(), ToString::to_string)
                );
                Ok((
                    default,
                    Some(FieldFallback {
                        field: target.name,
                        source_field: source.name,
                        raw: raw_value.to_string(),
                        reason: err.reason,
                    }),
                ))
            }
        }
    }
}

#[cfg(test)]
#[path = "convert_tests.rs"]
mod tests;
