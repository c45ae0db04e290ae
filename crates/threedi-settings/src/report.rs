//! Console rendering of import reports, overviews and the mapping table.

use console::{style, Style};
use std::fmt::Write;

use crate::api::openapi::ModelHelp;
use crate::api::SimulationSettingsOverview;
use crate::mapping::{MappingTable, ResourceGroup};
use crate::pipeline::{GroupOutcome, ImportReport, ItemOutcome};

/// Renders the per-group outcome of an import run.
#[must_use]
pub fn render_report(report: &ImportReport) -> String {
    let green = Style::new().green().bold();
    let bold = Style::new().bold();
    let mut out = String::new();

    let title = if report.dry_run {
        "Dry run"
    } else {
        "Import"
    };
    let _ = writeln!(
        out,
        "{} for simulation {}",
        bold.apply_to(title),
        report.simulation_id
    );

    for group in &report.groups {
        let name = group.group.model_name();
        match &group.outcome {
            GroupOutcome::Skipped => {
                let _ = writeln!(out, "  {} {} skipped", style("-").dim(), name);
            }
            GroupOutcome::ConversionFailed(message) => {
                let _ = writeln!(
                    out,
                    "  {} {} not converted: {}",
                    style("✗").red().bold(),
                    name,
                    message
                );
            }
            GroupOutcome::Converted(items) if items.is_empty() => {
                let _ = writeln!(out, "  {} {} nothing to import", style("-").dim(), name);
            }
            GroupOutcome::Converted(items) => {
                let marker = if group.failed() == 0 {
                    green.apply_to("✓")
                } else {
                    Style::new().yellow().bold().apply_to("!")
                };
                let _ = writeln!(
                    out,
                    "  {} {} {}/{} created",
                    marker,
                    name,
                    group.created(),
                    items.len()
                );
                for (idx, item) in items.iter().enumerate() {
                    match item {
                        ItemOutcome::Failed => {
                            let _ = writeln!(
                                out,
                                "      {} item {} rejected",
                                style("Failed:").yellow(),
                                idx + 1
                            );
                        }
                        ItemOutcome::DryRun(payload) => {
                            let _ = writeln!(out, "      {}", style(payload).dim());
                        }
                        ItemOutcome::Created(_) => {}
                    }
                }
            }
        }
        for fallback in &group.fallbacks {
            let _ = writeln!(
                out,
                "      {} {} = {} ({}), default used",
                style("Default:").cyan(),
                fallback.source_field,
                fallback.raw,
                fallback.reason
            );
        }
    }

    let _ = writeln!(
        out,
        "{} created, {} failed",
        bold.apply_to(report.created()),
        bold.apply_to(report.failed())
    );
    out
}

/// Renders the settings of a simulation as read back from the API.
#[must_use]
pub fn render_overview(overview: &SimulationSettingsOverview) -> String {
    let bold = Style::new().bold();
    let mut out = String::new();
    let _ = writeln!(out, "{}", bold.apply_to("Simulation settings"));

    let sections = [
        (
            ResourceGroup::General,
            overview
                .general_settings
                .as_ref()
                .and_then(|s| serde_json::to_value(s).ok()),
        ),
        (
            ResourceGroup::TimeStep,
            overview
                .time_step_settings
                .as_ref()
                .and_then(|s| serde_json::to_value(s).ok()),
        ),
        (
            ResourceGroup::Numerical,
            overview
                .numerical_settings
                .as_ref()
                .and_then(|s| serde_json::to_value(s).ok()),
        ),
    ];
    for (group, value) in sections {
        match value {
            Some(serde_json::Value::Object(fields)) => {
                let _ = writeln!(out, "┌ {}", style(group.model_name()).green().bold());
                for entry in MappingTable::entries_for_group(group) {
                    let name = entry.canonical_name();
                    if let Some(value) = fields.get(name) {
                        let _ = writeln!(out, "│ {:<40} {}", name, value);
                    }
                }
            }
            _ => {
                let _ = writeln!(out, "┌ {} {}", group.model_name(), style("missing").red());
            }
        }
    }

    let _ = writeln!(
        out,
        "┌ {} ({})",
        style(ResourceGroup::Aggregation.model_name()).green().bold(),
        overview.aggregation_settings.len()
    );
    for aggregation in &overview.aggregation_settings {
        let _ = writeln!(
            out,
            "│ {:<20} {:<12} {}s",
            aggregation.flow_variable, aggregation.method, aggregation.interval
        );
    }
    out
}

/// Renders the mapping table of the given groups; all groups when empty.
#[must_use]
pub fn render_mapping(groups: &[ResourceGroup]) -> String {
    let mut out = String::new();
    for &current in MappingTable::groups() {
        if !groups.is_empty() && !groups.contains(&current) {
            continue;
        }
        let _ = writeln!(out, "{}", style(current.model_name()).green().bold());
        for entry in MappingTable::entries_for_group(current) {
            let default = entry
                .target
                .default
                .as_ref()
                .map_or_else(|| "-".to_string(), ToString::to_string);
            let _ = writeln!(
                out,
                "  {:<40} {:<6} default {:<8} ini {} [{}] ({})  sqlite {} [{}] ({})",
                entry.canonical_name(),
                entry.target.field_type,
                default,
                entry.ini.name,
                entry.ini.locator,
                entry.ini.field_type,
                entry.sqlite.name,
                entry.sqlite.locator,
                entry.sqlite.field_type,
            );
        }
    }
    out
}

/// Renders the field documentation of the settings models.
#[must_use]
pub fn render_settings_help(models: &[ModelHelp]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", style("Settings Description").bold());
    for model in models {
        let _ = writeln!(
            out,
            "┌ {} {}",
            style(model.group.model_name()).green().bold(),
            style(format!("(settings/{}/)", model.group.as_str())).dim()
        );
        for field in &model.fields {
            let _ = writeln!(out, "│ {}", style(field.name).green());
            let attributes = [
                ("description", field.description.as_ref(), Style::new().cyan().bold()),
                ("type", field.field_type.as_ref(), Style::new().yellow().italic()),
                ("minimum", field.minimum.as_ref(), Style::new().magenta().italic()),
                ("maximum", field.maximum.as_ref(), Style::new().magenta().italic()),
            ];
            for (label, value, value_style) in attributes {
                if let Some(value) = value {
                    let _ = writeln!(out, "│   {}: {}", label, value_style.apply_to(value));
                }
            }
        }
    }
    out
}
