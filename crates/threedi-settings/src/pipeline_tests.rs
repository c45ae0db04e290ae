//! Tests for the import pipeline.

use super::*;
use crate::api::mock::MockSettingsApi;
use crate::error::Error;
use crate::mapping::{FieldType, MappingTable, SourceLocator, SourceOrigin};
use crate::sources::ini::IniSourceConfig;
use crate::sources::{ExtractedSettings, RawSourceData, RawValue};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SIMULATION_ID: i64 = 5;

/// Model INI holding every mapped option, with `extra_output` appended to
/// the `[output]` section.
fn model_ini(extra_output: &str) -> String {
    let mut sections: Vec<(&str, Vec<String>)> = Vec::new();
    for entry in MappingTable::iter() {
        let SourceLocator::IniSection(section) = entry.ini.locator else {
            continue;
        };
        let value = match entry.ini.field_type {
            FieldType::Float => "0.5",
            _ => "1",
        };
        let line = format!("{} = {}", entry.ini.name, value);
        match sections.iter_mut().find(|(name, _)| *name == section) {
            Some((_, lines)) => lines.push(line),
            None => sections.push((section, vec![line])),
        }
    }
    if !sections.iter().any(|(name, _)| *name == "output") {
        sections.push(("output", Vec::new()));
    }

    let mut text = String::new();
    for (name, lines) in sections {
        text.push_str(&format!("[{name}]\n"));
        for line in lines {
            text.push_str(&line);
            text.push('\n');
        }
        if name == "output" {
            text.push_str(extra_output);
            text.push('\n');
        }
    }
    text
}

const AGGREGATION_INI: &str = "\
[rain]
flow_variable = rain
aggregation_method = avg
timestep = 300

[discharge]
flow_variable = discharge
aggregation_method = cum
timestep = 300
";

fn write_model(dir: &TempDir, text: &str) -> PathBuf {
    let path = dir.path().join("model.ini");
    std::fs::write(&path, text).unwrap();
    path
}

fn ini_importer(path: &Path, options: ImportOptions) -> Importer {
    let source = SourceConfig::Ini(IniSourceConfig {
        path: path.to_path_buf(),
        aggregation_path: None,
        skip_aggregation: false,
    });
    Importer::new(SIMULATION_ID, &source, options)
}

/// Source handing out fixed data.
struct StaticSource(ExtractedSettings);

#[async_trait]
impl SettingsSource for StaticSource {
    fn source_type(&self) -> &'static str {
        "static"
    }

    fn origin(&self) -> SourceOrigin {
        self.0.origin
    }

    async fn connect(&mut self) -> Result<()> {
        Ok(())
    }

    async fn extract(&self) -> Result<ExtractedSettings> {
        Ok(self.0.clone())
    }

    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// SQLite-origin data with three aggregation rows.
fn sqlite_settings() -> ExtractedSettings {
    let settings: RawSourceData = MappingTable::iter()
        .filter(|entry| entry.target.group != ResourceGroup::Aggregation)
        .map(|entry| {
            let value = match entry.sqlite.field_type {
                FieldType::Float => RawValue::Float(0.5),
                _ => RawValue::Int(1),
            };
            (entry.sqlite.name, value)
        })
        .collect();
    let aggregations: Vec<RawSourceData> = ["discharge", "rain", "volume"]
        .into_iter()
        .map(|variable| {
            [
                ("flow_variable", variable),
                ("aggregation_method", "cum"),
                ("timestep", "300"),
            ]
            .into_iter()
            .collect()
        })
        .collect();
    ExtractedSettings {
        origin: SourceOrigin::Sqlite,
        settings,
        aggregations,
    }
}

#[tokio::test]
async fn test_import_creates_groups_in_order() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("aggregation.ini"), AGGREGATION_INI).unwrap();
    let path = write_model(&dir, &model_ini("aggregation_settings = aggregation.ini"));
    let api = MockSettingsApi::new();

    let report = ini_importer(&path, ImportOptions::default())
        .run(&api)
        .await
        .unwrap();

    assert_eq!(
        api.calls(),
        vec![
            ResourceGroup::General,
            ResourceGroup::TimeStep,
            ResourceGroup::Numerical,
            ResourceGroup::Aggregation,
            ResourceGroup::Aggregation,
        ]
    );
    assert!(report.is_success());
    assert_eq!(report.created(), 5);
    assert_eq!(report.groups.len(), 4);

    let overview = api.settings_overview(SIMULATION_ID).await.unwrap();
    assert!(report.missing_from(&overview).is_empty());
    assert_eq!(overview.aggregation_settings[0].flow_variable, "rain");
}

#[tokio::test]
async fn test_import_without_aggregation_option() {
    let dir = TempDir::new().unwrap();
    let path = write_model(&dir, &model_ini(""));
    let api = MockSettingsApi::new();

    let report = ini_importer(&path, ImportOptions::default())
        .run(&api)
        .await
        .unwrap();

    let aggregation = report.group(ResourceGroup::Aggregation).unwrap();
    assert_eq!(aggregation.outcome, GroupOutcome::Converted(Vec::new()));
    assert_eq!(api.calls().len(), 3);
    assert_eq!(report.created(), 3);
    assert!(report.is_success());
}

#[tokio::test]
async fn test_deselected_aggregation_file_is_not_read() {
    let dir = TempDir::new().unwrap();
    let path = write_model(&dir, &model_ini("aggregation_settings = missing.ini"));

    for options in [
        ImportOptions {
            skip_aggregation: true,
            ..Default::default()
        },
        ImportOptions {
            groups: vec![ResourceGroup::General, ResourceGroup::Numerical],
            ..Default::default()
        },
    ] {
        let api = MockSettingsApi::new();
        let report = ini_importer(&path, options).run(&api).await.unwrap();

        assert_eq!(
            report.group(ResourceGroup::Aggregation).unwrap().outcome,
            GroupOutcome::Skipped
        );
        assert!(report.is_success());
    }

    // with aggregation selected the missing file ends the run
    let api = MockSettingsApi::new();
    let result = ini_importer(&path, ImportOptions::default()).run(&api).await;
    assert!(matches!(result, Err(Error::SourceNotFound(_))));
}

#[tokio::test]
async fn test_failed_aggregation_item_does_not_stop_the_run() {
    let api = MockSettingsApi::new().failing(ResourceGroup::Aggregation, 2);
    let mut importer = Importer::with_source(
        SIMULATION_ID,
        Box::new(StaticSource(sqlite_settings())),
        ImportOptions::default(),
    );

    let report = importer.run(&api).await.unwrap();

    let aggregation = report.group(ResourceGroup::Aggregation).unwrap();
    match &aggregation.outcome {
        GroupOutcome::Converted(items) => {
            assert_eq!(items.len(), 3);
            assert!(matches!(items[0], ItemOutcome::Created(_)));
            assert_eq!(items[1], ItemOutcome::Failed);
            assert!(matches!(items[2], ItemOutcome::Created(_)));
        }
        other => panic!("unexpected outcome {:?}", other),
    }
    assert!(!report.is_success());
    assert_eq!(report.failed(), 1);

    let overview = api.settings_overview(SIMULATION_ID).await.unwrap();
    let variables: Vec<_> = overview
        .aggregation_settings
        .iter()
        .map(|a| a.flow_variable.as_str())
        .collect();
    assert_eq!(variables, vec!["discharge", "volume"]);
    assert_eq!(overview.aggregation_settings[0].interval, 300.0);
    assert!(report.missing_from(&overview).is_empty());
}

#[tokio::test]
async fn test_failed_group_does_not_stop_later_groups() {
    let api = MockSettingsApi::new().failing(ResourceGroup::General, 1);
    let mut importer = Importer::with_source(
        SIMULATION_ID,
        Box::new(StaticSource(sqlite_settings())),
        ImportOptions::default(),
    );

    let report = importer.run(&api).await.unwrap();

    assert_eq!(report.group(ResourceGroup::General).unwrap().failed(), 1);
    assert_eq!(report.group(ResourceGroup::TimeStep).unwrap().created(), 1);
    assert_eq!(report.group(ResourceGroup::Numerical).unwrap().created(), 1);
    assert_eq!(report.group(ResourceGroup::Aggregation).unwrap().created(), 3);
    assert_eq!(api.calls().len(), 6);
}

#[tokio::test]
async fn test_conversion_failure_is_recorded() {
    let dir = TempDir::new().unwrap();
    let text = model_ini("").replace("minimum_timestep = 0.5\n", "");
    let path = write_model(&dir, &text);
    let api = MockSettingsApi::new();

    let report = ini_importer(&path, ImportOptions::default())
        .run(&api)
        .await
        .unwrap();

    match &report.group(ResourceGroup::TimeStep).unwrap().outcome {
        GroupOutcome::ConversionFailed(message) => assert!(message.contains("minimum_timestep")),
        other => panic!("unexpected outcome {:?}", other),
    }
    assert_eq!(
        api.calls(),
        vec![ResourceGroup::General, ResourceGroup::Numerical]
    );
    assert!(!report.is_success());
}

#[tokio::test]
async fn test_fallbacks_are_reported() {
    let dir = TempDir::new().unwrap();
    let text = model_ini("").replace("nested_newton = 1", "nested_newton = abc");
    let path = write_model(&dir, &text);
    let api = MockSettingsApi::new();

    let report = ini_importer(&path, ImportOptions::default())
        .run(&api)
        .await
        .unwrap();

    let numerical = report.group(ResourceGroup::Numerical).unwrap();
    assert_eq!(numerical.created(), 1);
    assert_eq!(numerical.fallbacks.len(), 1);
    assert_eq!(numerical.fallbacks[0].source_field, "nested_newton");

    let overview = api.settings_overview(SIMULATION_ID).await.unwrap();
    assert!(overview.numerical_settings.unwrap().use_nested_newton);
}

#[tokio::test]
async fn test_dry_run_sends_nothing() {
    let api = MockSettingsApi::new();
    let mut importer = Importer::with_source(
        SIMULATION_ID,
        Box::new(StaticSource(sqlite_settings())),
        ImportOptions {
            dry_run: true,
            ..Default::default()
        },
    );

    let report = importer.run(&api).await.unwrap();

    assert!(api.calls().is_empty());
    assert!(report.dry_run);
    assert_eq!(report.created(), 0);
    match &report.group(ResourceGroup::General).unwrap().outcome {
        GroupOutcome::Converted(items) => assert_eq!(
            items[0],
            ItemOutcome::DryRun(serde_json::json!({
                "simulation_id": SIMULATION_ID,
                "use_advection_1d": 1,
                "use_advection_2d": 1
            }))
        ),
        other => panic!("unexpected outcome {:?}", other),
    }
}

#[tokio::test]
async fn test_group_selection() {
    let api = MockSettingsApi::new();
    let mut importer = Importer::with_source(
        SIMULATION_ID,
        Box::new(StaticSource(sqlite_settings())),
        ImportOptions {
            groups: vec![ResourceGroup::Numerical, ResourceGroup::Aggregation],
            skip_aggregation: true,
            ..Default::default()
        },
    );

    let report = importer.run(&api).await.unwrap();

    assert_eq!(api.calls(), vec![ResourceGroup::Numerical]);
    assert_eq!(
        report.group(ResourceGroup::General).unwrap().outcome,
        GroupOutcome::Skipped
    );
    assert_eq!(
        report.group(ResourceGroup::Aggregation).unwrap().outcome,
        GroupOutcome::Skipped
    );
    assert!(report.is_success());
}

#[tokio::test]
async fn test_missing_source_is_fatal() {
    let api = MockSettingsApi::new();
    let result = ini_importer(Path::new("/nonexistent/model.ini"), ImportOptions::default())
        .run(&api)
        .await;

    assert!(matches!(result, Err(Error::SourceNotFound(_))));
    assert!(api.calls().is_empty());
}

#[test]
fn test_missing_from_overview() {
    let report = ImportReport {
        simulation_id: SIMULATION_ID,
        dry_run: false,
        groups: vec![
            GroupReport {
                group: ResourceGroup::General,
                outcome: GroupOutcome::Converted(vec![ItemOutcome::Created(Value::Null)]),
                fallbacks: Vec::new(),
            },
            GroupReport {
                group: ResourceGroup::TimeStep,
                outcome: GroupOutcome::Converted(vec![ItemOutcome::Failed]),
                fallbacks: Vec::new(),
            },
            GroupReport {
                group: ResourceGroup::Aggregation,
                outcome: GroupOutcome::Converted(vec![
                    ItemOutcome::Created(Value::Null),
                    ItemOutcome::Created(Value::Null),
                ]),
                fallbacks: Vec::new(),
            },
        ],
    };

    let overview = SimulationSettingsOverview::default();
    assert_eq!(
        report.missing_from(&overview),
        vec![ResourceGroup::General, ResourceGroup::Aggregation]
    );
}
