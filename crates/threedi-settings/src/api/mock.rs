//! In-memory [`SettingsApi`] for unit tests.

use async_trait::async_trait;
use std::sync::Mutex;

use super::*;

#[derive(Default)]
struct State {
    overview: SimulationSettingsOverview,
    calls: Vec<ResourceGroup>,
    next_id: i64,
}

/// Records create calls and answers with the stored resources.
#[derive(Default)]
pub(crate) struct MockSettingsApi {
    state: Mutex<State>,
    /// `(group, n)`: the n-th create call of the group (1-based) fails.
    failures: Vec<(ResourceGroup, usize)>,
}

impl MockSettingsApi {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn failing(mut self, group: ResourceGroup, nth_call: usize) -> Self {
        self.failures.push((group, nth_call));
        self
    }

    /// Groups of all create calls, in call order.
    pub(crate) fn calls(&self) -> Vec<ResourceGroup> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Registers a call; returns the new id or the injected failure.
    fn record(&self, simulation_id: i64, group: ResourceGroup) -> Result<i64> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(group);
        let nth = state.calls.iter().filter(|g| **g == group).count();
        if self.failures.contains(&(group, nth)) {
            return Err(Error::Api {
                status: 400,
                body: format!("{group} call {nth} for simulation {simulation_id} rejected"),
            });
        }
        state.next_id += 1;
        Ok(state.next_id)
    }
}

#[async_trait]
impl SettingsApi for MockSettingsApi {
    async fn create_general_settings(
        &self,
        simulation_id: i64,
        settings: &GeneralSettings,
    ) -> Result<GeneralSettings> {
        let id = self.record(simulation_id, ResourceGroup::General)?;
        let created = GeneralSettings {
            id: Some(id),
            ..settings.clone()
        };
        self.state.lock().unwrap().overview.general_settings = Some(created.clone());
        Ok(created)
    }

    async fn create_time_step_settings(
        &self,
        simulation_id: i64,
        settings: &TimeStepSettings,
    ) -> Result<TimeStepSettings> {
        let id = self.record(simulation_id, ResourceGroup::TimeStep)?;
        let created = TimeStepSettings {
            id: Some(id),
            ..settings.clone()
        };
        self.state.lock().unwrap().overview.time_step_settings = Some(created.clone());
        Ok(created)
    }

    async fn create_numerical_settings(
        &self,
        simulation_id: i64,
        settings: &NumericalSettings,
    ) -> Result<NumericalSettings> {
        let id = self.record(simulation_id, ResourceGroup::Numerical)?;
        let created = NumericalSettings {
            id: Some(id),
            ..settings.clone()
        };
        self.state.lock().unwrap().overview.numerical_settings = Some(created.clone());
        Ok(created)
    }

    async fn create_aggregation_settings(
        &self,
        simulation_id: i64,
        settings: &AggregationSettings,
    ) -> Result<AggregationSettings> {
        let id = self.record(simulation_id, ResourceGroup::Aggregation)?;
        let created = AggregationSettings {
            id: Some(id),
            ..settings.clone()
        };
        self.state
            .lock()
            .unwrap()
            .overview
            .aggregation_settings
            .push(created.clone());
        Ok(created)
    }

    async fn settings_overview(&self, _simulation_id: i64) -> Result<SimulationSettingsOverview> {
        Ok(self.state.lock().unwrap().overview.clone())
    }
}
