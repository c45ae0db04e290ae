//! Settings resource models of the 3Di API v3.
//!
//! Field names are the API's canonical names. Request payloads leave the
//! read-only `id` and `url` fields out; responses carry them.

use serde::{Deserialize, Serialize};

/// `GeneralSettings` resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralSettings {
    /// Server-assigned id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Server-assigned resource URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Simulation the settings belong to.
    pub simulation_id: i64,
    /// Advection scheme for 1D flow (0 disables advection).
    pub use_advection_1d: i64,
    /// Advection scheme for 2D flow (0 disables advection).
    pub use_advection_2d: i64,
}

/// `TimeStepSettings` resource.
///
/// All durations are in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeStepSettings {
    /// Server-assigned id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Server-assigned resource URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Simulation the settings belong to.
    pub simulation_id: i64,
    /// Computational time step.
    pub time_step: f64,
    /// Lower bound when the time step is reduced.
    pub min_time_step: f64,
    /// Upper bound when the time step is stretched.
    pub max_time_step: f64,
    /// Let the time step grow up to `max_time_step`.
    pub use_time_step_stretch: bool,
    /// Interval between result snapshots.
    pub output_time_step: f64,
}

/// `NumericalSettings` resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericalSettings {
    /// Server-assigned id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Server-assigned resource URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Simulation the settings belong to.
    pub simulation_id: i64,
    /// CFL strictness of 1D flow.
    pub cfl_strictness_factor_1d: f64,
    /// CFL strictness of 2D flow.
    pub cfl_strictness_factor_2d: f64,
    /// Water level difference below which the flow direction is considered undetermined.
    pub flow_direction_threshold: f64,
    /// Convergence criterion of the conjugate gradient solver.
    pub convergence_cg: f64,
    /// Correction method of friction in shallow water.
    pub friction_shallow_water_depth_correction: i64,
    /// Threshold below which values count as zero.
    pub general_numerical_threshold: f64,
    /// Time integration scheme.
    pub time_integration_method: i64,
    /// Water level gradient limiter for 1D flow.
    pub limiter_waterlevel_gradient_1d: i64,
    /// Water level gradient limiter for 2D flow.
    pub limiter_waterlevel_gradient_2d: i64,
    /// Cross-sectional area limiter on 2D slopes.
    pub limiter_slope_crossectional_area_2d: i64,
    /// Friction limiter on 2D slopes.
    pub limiter_slope_friction_2d: i64,
    /// Maximum number of Newton iterations per time step.
    pub max_non_linear_newton_iterations: i64,
    /// Maximum degree of the Gauss-Seidel preconditioner.
    pub max_degree_gauss_seidel: i64,
    /// Lower bound of the friction velocity.
    pub min_friction_velocity: f64,
    /// Lower bound of the wet surface area of a cell.
    pub min_surface_area: f64,
    /// Preconditioner of the conjugate gradient solver.
    pub use_preconditioner_cg: i64,
    /// Width of the Preissmann slot of closed profiles.
    pub preissmann_slot: f64,
    /// Implicitness of pump discharges.
    pub pump_implicit_ratio: f64,
    /// Depth below which the water layer counts as thin.
    pub limiter_slope_thin_water_layer: f64,
    /// Number of inner iterations using the conjugate gradient solver.
    pub use_of_cg: i64,
    /// Nested Newton iterations for closed 1D profiles.
    pub use_nested_newton: bool,
    /// Depth above which a cell counts as wet.
    pub flooding_threshold: f64,
}

/// `AggregationSettings` resource, one per aggregated flow variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationSettings {
    /// Server-assigned id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Server-assigned resource URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Optional label; legacy sources have none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Aggregated variable, e.g. `discharge` or `rain`.
    pub flow_variable: String,
    /// Aggregation method, e.g. `avg`, `cum` or `max`.
    pub method: String,
    /// Aggregation interval in seconds.
    pub interval: f64,
}

/// Consolidated read-back of all settings of a simulation.
///
/// Groups the simulation does not have yet are absent or null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationSettingsOverview {
    /// General settings, if created.
    #[serde(default)]
    pub general_settings: Option<GeneralSettings>,
    /// Time step settings, if created.
    #[serde(default)]
    pub time_step_settings: Option<TimeStepSettings>,
    /// Numerical settings, if created.
    #[serde(default)]
    pub numerical_settings: Option<NumericalSettings>,
    /// All aggregation settings, in creation order.
    #[serde(default)]
    pub aggregation_settings: Vec<AggregationSettings>,
}

impl SimulationSettingsOverview {
    /// Number of resources present for a group.
    #[must_use]
    pub fn count(&self, group: crate::mapping::ResourceGroup) -> usize {
        use crate::mapping::ResourceGroup;
        match group {
            ResourceGroup::General => usize::from(self.general_settings.is_some()),
            ResourceGroup::TimeStep => usize::from(self.time_step_settings.is_some()),
            ResourceGroup::Numerical => usize::from(self.numerical_settings.is_some()),
            ResourceGroup::Aggregation => self.aggregation_settings.len(),
        }
    }
}
