//! Import run orchestration.
//!
//! A run reads the source once, converts every selected group and then
//! creates the resources one after another in import order: general, time
//! step, numerical and the aggregation records in source order. A group that
//! fails to convert, or an item the API rejects, is recorded in the
//! [`ImportReport`] and the run carries on.

use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use tracing::{info, warn};

use crate::api::{SettingsApi, SimulationSettingsOverview};
use crate::config::{ImportOptions, SourceConfig};
use crate::convert::{ConvertedResource, Converter, FieldFallback};
use crate::dispatch::dispatch;
use crate::error::Result;
use crate::mapping::ResourceGroup;
use crate::sources::{create_source, SettingsSource};

/// Outcome of one resource of a group.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemOutcome {
    /// Created; holds the server representation.
    Created(Value),
    /// The API rejected the resource or could not be reached.
    Failed,
    /// Dry run; holds the payload that would have been sent.
    DryRun(Value),
}

/// Outcome of one resource group.
#[derive(Debug, Clone, PartialEq)]
pub enum GroupOutcome {
    /// Converted; one outcome per resource, in dispatch order.
    Converted(Vec<ItemOutcome>),
    /// Conversion failed; nothing was sent.
    ConversionFailed(String),
    /// Not selected for this run.
    Skipped,
}

/// Report entry of one resource group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupReport {
    /// Group the entry reports on.
    pub group: ResourceGroup,
    /// What happened to the group.
    pub outcome: GroupOutcome,
    /// Fields that fell back to their default, over all resources.
    pub fallbacks: Vec<FieldFallback>,
}

impl GroupReport {
    fn count(&self, pred: impl Fn(&ItemOutcome) -> bool) -> usize {
        match &self.outcome {
            GroupOutcome::Converted(items) => items.iter().filter(|item| pred(item)).count(),
            _ => 0,
        }
    }

    /// Number of resources the API created.
    #[must_use]
    pub fn created(&self) -> usize {
        self.count(|item| matches!(item, ItemOutcome::Created(_)))
    }

    /// Number of resources the API did not create.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|item| matches!(item, ItemOutcome::Failed))
    }
}

/// Result of one import run.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportReport {
    /// Simulation the settings were imported into.
    pub simulation_id: i64,
    /// Whether create calls were left out.
    pub dry_run: bool,
    /// One entry per resource group, in import order.
    pub groups: Vec<GroupReport>,
}

impl ImportReport {
    /// Report entry of a group.
    #[must_use]
    pub fn group(&self, group: ResourceGroup) -> Option<&GroupReport> {
        self.groups.iter().find(|report| report.group == group)
    }

    /// Total number of created resources.
    #[must_use]
    pub fn created(&self) -> usize {
        self.groups.iter().map(GroupReport::created).sum()
    }

    /// Total number of rejected resources.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.groups.iter().map(GroupReport::failed).sum()
    }

    /// Whether every selected group converted and every resource was created.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.groups.iter().all(|report| match &report.outcome {
            GroupOutcome::Converted(_) => report.failed() == 0,
            GroupOutcome::ConversionFailed(_) => false,
            GroupOutcome::Skipped => true,
        })
    }

    /// Groups with created resources that the overview does not (fully) show.
    #[must_use]
    pub fn missing_from(&self, overview: &SimulationSettingsOverview) -> Vec<ResourceGroup> {
        self.groups
            .iter()
            .filter(|report| report.created() > overview.count(report.group))
            .map(|report| report.group)
            .collect()
    }
}

/// Conversion result per group, in import order; `None` for groups not
/// selected.
pub type ConvertedGroups = Vec<(ResourceGroup, Option<Result<Vec<ConvertedResource>>>)>;

/// Runs one import from a legacy source into a simulation.
pub struct Importer {
    simulation_id: i64,
    options: ImportOptions,
    source: Box<dyn SettingsSource>,
}

impl Importer {
    /// Creates an importer for a configured source.
    ///
    /// When the options deselect the aggregation group the source does not
    /// read aggregation records at all.
    #[must_use]
    pub fn new(simulation_id: i64, source: &SourceConfig, options: ImportOptions) -> Self {
        let skip = !options
            .selected_groups()
            .contains(&ResourceGroup::Aggregation);
        let source = source.clone().skipping_aggregation(skip);
        Self::with_source(simulation_id, create_source(&source), options)
    }

    /// Creates an importer for an already constructed source.
    #[must_use]
    pub fn with_source(
        simulation_id: i64,
        source: Box<dyn SettingsSource>,
        options: ImportOptions,
    ) -> Self {
        Self {
            simulation_id,
            options,
            source,
        }
    }

    /// Reads the source and converts every selected group.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read; conversion failures are
    /// returned per group.
    pub async fn convert(&mut self) -> Result<ConvertedGroups> {
        self.source.connect().await?;
        let extracted = self.source.extract().await;
        self.source.close().await?;
        let extracted = extracted?;

        info!(
            "Read {} settings and {} aggregation records from {} source",
            extracted.settings.len(),
            extracted.aggregations.len(),
            self.source.source_type()
        );

        let converter = Converter::new(extracted.origin, self.simulation_id);
        let selected = self.options.selected_groups();
        let converted = ResourceGroup::ALL
            .into_iter()
            .map(|group| {
                if selected.contains(&group) {
                    (group, Some(converter.convert_group(group, &extracted)))
                } else {
                    (group, None)
                }
            })
            .collect();
        Ok(converted)
    }

    /// Runs the import.
    ///
    /// # Errors
    ///
    /// Returns an error only if the source cannot be read.
    pub async fn run(&mut self, api: &dyn SettingsApi) -> Result<ImportReport> {
        info!(
            "Starting settings import for simulation {}",
            self.simulation_id
        );
        if self.options.dry_run {
            info!("Dry run mode - no resources are created");
        }

        let converted = self.convert().await?;

        let total = converted
            .iter()
            .filter_map(|(_, result)| result.as_ref())
            .filter_map(|result| result.as_ref().ok())
            .map(Vec::len)
            .sum::<usize>();
        let progress = create_progress_bar(total as u64);

        let mut groups = Vec::with_capacity(converted.len());
        for (group, result) in converted {
            let report = match result {
                None => {
                    info!("Skipping {} settings", group);
                    GroupReport {
                        group,
                        outcome: GroupOutcome::Skipped,
                        fallbacks: Vec::new(),
                    }
                }
                Some(Err(err)) => {
                    warn!("Could not convert {} settings: {}", group, err);
                    GroupReport {
                        group,
                        outcome: GroupOutcome::ConversionFailed(err.to_string()),
                        fallbacks: Vec::new(),
                    }
                }
                Some(Ok(resources)) => {
                    if resources.is_empty() {
                        info!("No {} settings to import", group);
                    }
                    let mut items = Vec::with_capacity(resources.len());
                    for resource in &resources {
                        items.push(self.dispatch_one(api, resource).await);
                        progress.inc(1);
                    }
                    GroupReport {
                        group,
                        outcome: GroupOutcome::Converted(items),
                        fallbacks: resources
                            .iter()
                            .flat_map(|resource| resource.fallbacks().iter().cloned())
                            .collect(),
                    }
                }
            };
            groups.push(report);
        }

        progress.finish_and_clear();

        let report = ImportReport {
            simulation_id: self.simulation_id,
            dry_run: self.options.dry_run,
            groups,
        };
        info!(
            "Import complete: {} created, {} failed",
            report.created(),
            report.failed()
        );
        Ok(report)
    }

    async fn dispatch_one(
        &self,
        api: &dyn SettingsApi,
        resource: &ConvertedResource,
    ) -> ItemOutcome {
        if self.options.dry_run {
            return ItemOutcome::DryRun(resource.to_json());
        }
        match dispatch(api, self.simulation_id, resource).await {
            Some(created) => ItemOutcome::Created(created),
            None => ItemOutcome::Failed,
        }
    }
}

fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);

    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} resources",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    pb
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
