// Import tool - pedantic lints relaxed for CLI ergonomics
#![allow(clippy::pedantic)]

//! # threedi-settings
//!
//! `threedi-settings` is a CLI tool and library that imports the settings of
//! a legacy 3Di model into the settings resources of the 3Di API v3.
//!
//! ## Supported Sources
//!
//! | Source | Notes |
//! |--------|-------|
//! | Model INI | Plus the optional aggregation INI named in `[output]` |
//! | SQLite | `v2_global_settings` row, its numerical settings and aggregation rows |
//!
//! ## Resource Groups
//!
//! Settings are imported per group, in this order: general, time step,
//! numerical and aggregation (one resource per aggregation record). A field
//! whose legacy value cannot be converted falls back to the API default; a
//! group or item that fails does not stop the others.
//!
//! ## Quick Start
//!
//! ```bash
//! # From a model INI file
//! threedi-settings ini 1234 ./model/default.ini
//!
//! # From a SQLite model database, global settings row 1
//! threedi-settings sqlite 1234 ./model/model.sqlite 1
//!
//! # Preview the payloads only
//! threedi-settings --dry-run ini 1234 ./model/default.ini
//! ```
//!
//! ## Configuration Example
//!
//! ```yaml
//! api:
//!   host: https://api.3di.live
//!   token: <personal API token>
//!
//! options:
//!   dry_run: false
//!   skip_aggregation: false
//!   groups: [general, numerical]
//! ```

#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod convert;
pub mod dispatch;
pub mod error;
pub mod mapping;
pub mod pipeline;
pub mod report;
pub mod sources;

pub use api::{ApiClient, SettingsApi};
pub use config::{ApiConfig, ImportConfig, ImportOptions, SourceConfig};
pub use convert::{ConvertedResource, Converter};
pub use error::{Error, Result};
pub use mapping::{MappingTable, ResourceGroup};
pub use pipeline::{GroupOutcome, ImportReport, Importer, ItemOutcome};
pub use sources::{create_source, SettingsSource};
