//! Field documentation taken from the API's OpenAPI document.

use serde_yaml::Value;
use tracing::warn;

use crate::error::{Error, Result};
use crate::mapping::{MappingTable, ResourceGroup};

/// Documented attributes of one API field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldHelp {
    /// Canonical field name.
    pub name: &'static str,
    /// Help text of the field.
    pub description: Option<String>,
    /// Schema type, e.g. `number` or `integer`.
    pub field_type: Option<String>,
    /// Inclusive lower bound.
    pub minimum: Option<String>,
    /// Inclusive upper bound.
    pub maximum: Option<String>,
}

/// Documented fields of one settings model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelHelp {
    /// Group the model belongs to.
    pub group: ResourceGroup,
    /// Documented fields in mapping order.
    pub fields: Vec<FieldHelp>,
}

/// Extracts the documentation of every mapped field from an OpenAPI
/// document (Swagger 2 `definitions` or OpenAPI 3 `components.schemas`).
///
/// Fields the document does not describe are logged and left out.
///
/// # Errors
///
/// Returns [`Error::Yaml`] if the text is not YAML and [`Error::Config`] if it
/// has no schema definitions.
pub fn settings_help(document: &str, groups: &[ResourceGroup]) -> Result<Vec<ModelHelp>> {
    let doc: Value = serde_yaml::from_str(document)?;
    let definitions = doc
        .get("definitions")
        .or_else(|| doc.get("components").and_then(|c| c.get("schemas")))
        .ok_or_else(|| Error::Config("OpenAPI document has no schema definitions".to_string()))?;

    let mut models = Vec::with_capacity(groups.len());
    for &group in groups {
        let properties = definitions
            .get(group.model_name())
            .and_then(|model| model.get("properties"));

        let mut fields = Vec::new();
        for entry in MappingTable::entries_for_group(group) {
            let name = entry.canonical_name();
            match properties.and_then(|p| p.get(name)) {
                Some(property) => fields.push(FieldHelp {
                    name,
                    description: attribute(property, "description"),
                    field_type: attribute(property, "type"),
                    minimum: attribute(property, "minimum"),
                    maximum: attribute(property, "maximum"),
                }),
                None => warn!("{} has no documented field {}", group.model_name(), name),
            }
        }
        models.push(ModelHelp { group, fields });
    }
    Ok(models)
}

fn attribute(property: &Value, key: &str) -> Option<String> {
    match property.get(key)? {
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
