//! Tests for the INI source.

use super::*;
use crate::sources::RawValue;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

const MODEL_INI: &str = r#"
[output]
output_timestep = 60
aggregation_settings = aggregation.ini

[simulation]
timestep = 30
minimum_timestep = 0.1
maximum_timestep = 1.0

[numerics]
timestep_plus = 1
nested_newton = 1

[physics]
advection_1d = 1
advection_2d = 1
"#;

const AGGREGATION_INI: &str = r#"
[discharge_cum]
flow_variable = discharge
aggregation_method = cum
timestep = 300

[rain]
flow_variable = rain
aggregation_method = cum
timestep = 300
"#;

fn text(value: &str) -> RawValue {
    RawValue::Text(value.to_string())
}

fn write_model(dir: &TempDir, model: &str) -> PathBuf {
    let path = dir.path().join("model.ini");
    std::fs::write(&path, model).unwrap();
    path
}

#[test]
fn test_parse_sections_and_options() {
    let doc = IniDocument::parse(MODEL_INI, "model.ini").unwrap();
    assert_eq!(doc.sections(), vec!["output", "simulation", "numerics", "physics"]);
    assert_eq!(doc.get("simulation", "timestep"), Some("30"));
    assert_eq!(doc.get("output", "aggregation_settings"), Some("aggregation.ini"));
    assert_eq!(doc.get("physics", "missing"), None);
    assert_eq!(doc.get("boundaries", "timestep"), None);
}

#[test]
fn test_parse_lowercases_names_and_trims_values() {
    let doc = IniDocument::parse("[Physics]\n  Advection_1D :   1  \n", "t.ini").unwrap();
    assert!(doc.has_section("physics"));
    assert_eq!(doc.get("physics", "advection_1d"), Some("1"));
}

#[test]
fn test_parse_skips_comments() {
    let doc = IniDocument::parse("# header\n[numerics]\n; old value\nprecon_cg = 1\n", "t.ini")
        .unwrap();
    assert_eq!(doc.section_data("numerics").len(), 1);
}

#[test]
fn test_parse_continuation_lines() {
    let doc = IniDocument::parse("[output]\ndescription = first\n  second\n", "t.ini").unwrap();
    let value = doc.get("output", "description").unwrap();
    assert!(value.starts_with("first"));
    assert!(value.ends_with("second"));
}

#[test]
fn test_parse_default_section_is_inherited() {
    let doc = IniDocument::parse(
        "[DEFAULT]\nprecon_cg = 1\n[numerics]\nuse_of_cg = 20\n",
        "t.ini",
    )
    .unwrap();
    assert_eq!(doc.sections(), vec!["numerics"]);
    assert_eq!(doc.get("numerics", "precon_cg"), Some("1"));
    let flat = doc.flatten();
    assert_eq!(flat.get("precon_cg"), Some(&text("1")));
    assert_eq!(flat.get("use_of_cg"), Some(&text("20")));
}

#[test]
fn test_parse_section_value_overrides_default() {
    let doc = IniDocument::parse(
        "[DEFAULT]\nprecon_cg = 1\n[numerics]\nprecon_cg = 0\n",
        "t.ini",
    )
    .unwrap();
    assert_eq!(doc.get("numerics", "precon_cg"), Some("0"));
    assert_eq!(doc.flatten().get("precon_cg"), Some(&text("0")));
}

#[test]
fn test_records_follow_section_order() {
    let doc = IniDocument::parse(AGGREGATION_INI, "aggregation.ini").unwrap();
    let records = doc.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].get("flow_variable"), Some(&text("discharge")));
    assert_eq!(records[1].get("flow_variable"), Some(&text("rain")));
}

#[test]
fn test_flatten_last_section_wins() {
    let doc = IniDocument::parse(
        "[simulation]\ntimestep = 30\n[numerics]\nflag = a\n[output]\ntimestep = 99\n",
        "t.ini",
    )
    .unwrap();
    let flat = doc.flatten();
    assert_eq!(flat.get("timestep"), Some(&text("99")));

    // same document, reversed section order
    let doc = IniDocument::parse(
        "[output]\ntimestep = 99\n[numerics]\nflag = a\n[simulation]\ntimestep = 30\n",
        "t.ini",
    )
    .unwrap();
    assert_eq!(doc.flatten().get("timestep"), Some(&text("30")));
}

#[tokio::test]
async fn test_ini_source_with_aggregation_file() {
    let dir = TempDir::new().unwrap();
    let path = write_model(&dir, MODEL_INI);
    std::fs::write(dir.path().join("aggregation.ini"), AGGREGATION_INI).unwrap();

    let mut source = IniSource::new(IniSourceConfig {
        path,
        aggregation_path: None,
        skip_aggregation: false,
    });
    source.connect().await.unwrap();
    let extracted = source.extract().await.unwrap();

    assert_eq!(extracted.origin, SourceOrigin::Ini);
    assert_eq!(extracted.settings.get("advection_1d"), Some(&text("1")));
    assert_eq!(extracted.aggregations.len(), 2);
    assert_eq!(
        extracted.aggregations[0].get("flow_variable"),
        Some(&text("discharge"))
    );
    assert_eq!(extracted.aggregations[1].get("flow_variable"), Some(&text("rain")));

    source.close().await.unwrap();
    assert!(source.extract().await.is_err());
}

#[tokio::test]
async fn test_ini_source_without_aggregation_option() {
    let dir = TempDir::new().unwrap();
    let model = MODEL_INI.replace("aggregation_settings = aggregation.ini\n", "");
    let path = write_model(&dir, &model);

    let mut source = IniSource::new(IniSourceConfig {
        path,
        aggregation_path: None,
        skip_aggregation: false,
    });
    source.connect().await.unwrap();
    let extracted = source.extract().await.unwrap();

    assert!(extracted.aggregations.is_empty());
    assert_eq!(extracted.settings.get("timestep"), Some(&text("30")));
}

#[tokio::test]
async fn test_ini_source_empty_aggregation_option() {
    let dir = TempDir::new().unwrap();
    let model = MODEL_INI.replace("aggregation.ini", "");
    let path = write_model(&dir, &model);

    let mut source = IniSource::new(IniSourceConfig {
        path,
        aggregation_path: None,
        skip_aggregation: false,
    });
    source.connect().await.unwrap();
    assert!(source.extract().await.unwrap().aggregations.is_empty());
}

#[tokio::test]
async fn test_ini_source_explicit_aggregation_path_wins() {
    let dir = TempDir::new().unwrap();
    let path = write_model(&dir, MODEL_INI);
    let mut aggregation = NamedTempFile::new().unwrap();
    aggregation
        .write_all(b"[one]\nflow_variable = volume\naggregation_method = current\ntimestep = 60\n")
        .unwrap();

    let mut source = IniSource::new(IniSourceConfig {
        path,
        aggregation_path: Some(aggregation.path().to_path_buf()),
        skip_aggregation: false,
    });
    source.connect().await.unwrap();
    let extracted = source.extract().await.unwrap();

    assert_eq!(extracted.aggregations.len(), 1);
    assert_eq!(extracted.aggregations[0].get("flow_variable"), Some(&text("volume")));
}

#[tokio::test]
async fn test_ini_source_missing_aggregation_file() {
    let dir = TempDir::new().unwrap();
    let path = write_model(&dir, MODEL_INI);

    let mut source = IniSource::new(IniSourceConfig {
        path,
        aggregation_path: None,
        skip_aggregation: false,
    });
    let result = source.connect().await;
    assert!(matches!(result, Err(Error::SourceNotFound(_))));
}

#[tokio::test]
async fn test_ini_source_missing_file() {
    let mut source = IniSource::new(IniSourceConfig {
        path: PathBuf::from("/nonexistent/model.ini"),
        aggregation_path: None,
        skip_aggregation: false,
    });
    let result = source.connect().await;
    assert!(matches!(result, Err(Error::SourceNotFound(_))));
}

#[tokio::test]
async fn test_ini_source_missing_required_section() {
    let dir = TempDir::new().unwrap();
    let path = write_model(&dir, "[output]\noutput_timestep = 60\n[simulation]\ntimestep = 30\n");

    let mut source = IniSource::new(IniSourceConfig {
        path,
        aggregation_path: None,
        skip_aggregation: false,
    });
    let result = source.connect().await;
    assert!(
        matches!(result, Err(Error::SourceMalformed(msg)) if msg.contains("numerics") && msg.contains("physics"))
    );
}

#[tokio::test]
async fn test_ini_source_skip_aggregation_ignores_missing_file() {
    let dir = TempDir::new().unwrap();
    let path = write_model(&dir, MODEL_INI);

    let mut source = IniSource::new(IniSourceConfig {
        path,
        aggregation_path: None,
        skip_aggregation: true,
    });
    source.connect().await.unwrap();
    let extracted = source.extract().await.unwrap();

    assert!(extracted.aggregations.is_empty());
    assert_eq!(extracted.settings.get("advection_1d"), Some(&text("1")));
}
