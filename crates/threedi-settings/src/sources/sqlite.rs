//! Legacy SQLite model database source.
//!
//! One `v2_global_settings` row (addressed by the caller) plus the
//! `v2_numerical_settings` row it references feed the general, time step and
//! numerical groups. Every `v2_aggregation_settings` row of the global
//! settings row becomes one aggregation record.

use async_trait::async_trait;
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::mapping::{
    MappingTable, SourceOrigin, AGGREGATION_SETTINGS_TABLE, GLOBAL_SETTINGS_TABLE,
    NUMERICAL_SETTINGS_TABLE,
};
use crate::sources::{ExtractedSettings, RawSourceData, RawValue, SettingsSource};

/// Column of the global settings row referencing the numerical settings row.
pub const NUMERICAL_SETTINGS_FK: &str = "numerical_settings_id";

/// Column of the aggregation rows referencing the global settings row.
pub const GLOBAL_SETTINGS_FK: &str = "global_settings_id";

/// Configuration for SQLite import.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqliteSourceConfig {
    /// Path to the SQLite model database.
    pub path: PathBuf,
    /// Id of the `v2_global_settings` row to import.
    pub settings_id: i64,
    /// Do not read aggregation rows.
    #[serde(default)]
    pub skip_aggregation: bool,
}

type Row = HashMap<String, RawValue>;

/// Legacy SQLite model database source.
pub struct SqliteSource {
    config: SqliteSourceConfig,
    extracted: Option<ExtractedSettings>,
}

impl SqliteSource {
    /// Creates a new SQLite source.
    #[must_use]
    pub fn new(config: SqliteSourceConfig) -> Self {
        Self {
            config,
            extracted: None,
        }
    }

    fn open(&self) -> Result<Connection> {
        if !self.config.path.is_file() {
            return Err(Error::SourceNotFound(format!(
                "{} does not exist or is a directory",
                self.config.path.display()
            )));
        }
        let conn = Connection::open_with_flags(&self.config.path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        Ok(conn)
    }

    fn read(&self, conn: &Connection) -> Result<ExtractedSettings> {
        let id = self.config.settings_id;

        let global = read_one(conn, GLOBAL_SETTINGS_TABLE, id)?;
        let numerical_id = match global.get(NUMERICAL_SETTINGS_FK) {
            Some(RawValue::Int(v)) => *v,
            other => {
                return Err(Error::SourceMalformed(format!(
                    "{} row {} has no usable {} (found {})",
                    GLOBAL_SETTINGS_TABLE,
                    id,
                    NUMERICAL_SETTINGS_FK,
                    other.map_or_else(|| "nothing".to_string(), ToString::to_string)
                )));
            }
        };
        let numerical = read_one(conn, NUMERICAL_SETTINGS_TABLE, numerical_id)?;

        let mut settings = RawSourceData::new();
        copy_mapped(&mut settings, GLOBAL_SETTINGS_TABLE, &global);
        copy_mapped(&mut settings, NUMERICAL_SETTINGS_TABLE, &numerical);

        let aggregations = if self.config.skip_aggregation {
            info!("Skipping aggregation settings");
            Vec::new()
        } else {
            read_rows(conn, AGGREGATION_SETTINGS_TABLE, GLOBAL_SETTINGS_FK, id)?
                .iter()
                .map(|row| {
                    let mut data = RawSourceData::new();
                    copy_mapped(&mut data, AGGREGATION_SETTINGS_TABLE, row);
                    data
                })
                .collect()
        };

        debug!(
            "Read global settings {} (numerical settings {}), {} aggregation rows",
            id,
            numerical_id,
            aggregations.len()
        );

        Ok(ExtractedSettings {
            origin: SourceOrigin::Sqlite,
            settings,
            aggregations,
        })
    }
}

/// Copies the columns the mapping table locates in `table`; `read_rows` has
/// already checked that they exist.
fn copy_mapped(data: &mut RawSourceData, table: &str, row: &Row) {
    for column in MappingTable::sqlite_columns(table) {
        if let Some(value) = row.get(column) {
            data.insert(column, value.clone());
        }
    }
}

/// Bytes that are not UTF-8 text read as NULL, so the field falls back to
/// its default.
fn raw_value(column: &str, value: ValueRef<'_>) -> RawValue {
    match value {
        ValueRef::Null => RawValue::Null,
        ValueRef::Integer(v) => RawValue::Int(v),
        ValueRef::Real(v) => RawValue::Float(v),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => match std::str::from_utf8(bytes) {
            Ok(text) => RawValue::Text(text.to_string()),
            Err(_) => {
                warn!(
                    "Column {} holds {} bytes that are not UTF-8 text, read as NULL",
                    column,
                    bytes.len()
                );
                RawValue::Null
            }
        },
    }
}

fn table_columns(conn: &Connection, table: &str) -> Result<Vec<String>> {
    let exists = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name=?1 LIMIT 1",
            params![table],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);
    if !exists {
        return Err(Error::SourceMalformed(format!("table {} does not exist", table)));
    }

    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(columns)
}

fn read_rows(conn: &Connection, table: &str, key: &str, id: i64) -> Result<Vec<Row>> {
    let columns = table_columns(conn, table)?;
    let missing: Vec<String> = ["id", key]
        .into_iter()
        .map(str::to_string)
        .chain(MappingTable::sqlite_columns(table).map(str::to_string))
        .filter(|required| !columns.contains(required))
        .collect();
    if !missing.is_empty() {
        return Err(Error::SourceMalformed(format!(
            "table {} lacks column(s): {}",
            table,
            missing.join(", ")
        )));
    }

    // table and key names come from the static catalog, never from user input
    let mut stmt = conn.prepare(&format!(
        "SELECT * FROM {table} WHERE {key} = ?1 ORDER BY id"
    ))?;
    let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let rows = stmt
        .query_map(params![id], |row| {
            names
                .iter()
                .enumerate()
                .map(|(idx, name)| Ok((name.clone(), raw_value(name, row.get_ref(idx)?))))
                .collect::<rusqlite::Result<Row>>()
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

fn read_one(conn: &Connection, table: &str, id: i64) -> Result<Row> {
    read_rows(conn, table, "id", id)?
        .into_iter()
        .next()
        .ok_or_else(|| Error::SourceNotFound(format!("{} has no row with id {}", table, id)))
}

#[async_trait]
impl SettingsSource for SqliteSource {
    fn source_type(&self) -> &'static str {
        "sqlite"
    }

    fn origin(&self) -> SourceOrigin {
        SourceOrigin::Sqlite
    }

    async fn connect(&mut self) -> Result<()> {
        let conn = self.open()?;
        let extracted = self.read(&conn)?;
        self.extracted = Some(extracted);
        Ok(())
    }

    async fn extract(&self) -> Result<ExtractedSettings> {
        self.extracted
            .clone()
            .ok_or_else(|| Error::SourceNotFound("SQLite source not connected".to_string()))
    }

    async fn close(&mut self) -> Result<()> {
        self.extracted = None;
        Ok(())
    }
}

#[cfg(test)]
#[path = "sqlite_tests.rs"]
mod tests;
