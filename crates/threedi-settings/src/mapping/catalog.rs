//! The hand-curated field list, one entry per API settings field.

use super::{
    FieldType, FieldValue, MappingEntry, ResourceGroup, SourceField, SourceLocator, TargetField,
};

use FieldType::{Bool, Float, Int, Str};
use ResourceGroup::{Aggregation, General, Numerical, TimeStep};

const GLOBAL_SETTINGS: &str = "v2_global_settings";
const NUMERICAL_SETTINGS: &str = "v2_numerical_settings";
const AGGREGATION_SETTINGS: &str = "v2_aggregation_settings";

const fn ini(name: &'static str, field_type: FieldType, section: &'static str) -> SourceField {
    SourceField {
        name,
        field_type,
        locator: SourceLocator::IniSection(section),
    }
}

const fn legacy(name: &'static str, field_type: FieldType) -> SourceField {
    SourceField {
        name,
        field_type,
        locator: SourceLocator::Legacy,
    }
}

const fn sqlite(name: &'static str, field_type: FieldType, table: &'static str) -> SourceField {
    SourceField {
        name,
        field_type,
        locator: SourceLocator::SqliteTable(table),
    }
}

const fn api(
    name: &'static str,
    field_type: FieldType,
    default: Option<FieldValue>,
    group: ResourceGroup,
) -> TargetField {
    TargetField {
        name,
        field_type,
        default,
        group,
    }
}

const fn int(v: i64) -> Option<FieldValue> {
    Some(FieldValue::Int(v))
}

const fn float(v: f64) -> Option<FieldValue> {
    Some(FieldValue::Float(v))
}

const fn boolean(v: bool) -> Option<FieldValue> {
    Some(FieldValue::Bool(v))
}

const fn entry(ini: SourceField, sqlite: SourceField, target: TargetField) -> MappingEntry {
    MappingEntry {
        ini,
        sqlite,
        target,
    }
}

pub(super) static GENERAL: &[MappingEntry] = &[
    entry(
        ini("advection_1d", Int, "physics"),
        sqlite("advection_1d", Int, GLOBAL_SETTINGS),
        api("use_advection_1d", Int, int(1), General),
    ),
    entry(
        ini("advection_2d", Int, "physics"),
        sqlite("advection_2d", Int, GLOBAL_SETTINGS),
        api("use_advection_2d", Int, int(1), General),
    ),
];

pub(super) static TIME_STEP: &[MappingEntry] = &[
    entry(
        ini("timestep", Float, "simulation"),
        sqlite("sim_time_step", Float, GLOBAL_SETTINGS),
        api("time_step", Float, float(1.0), TimeStep),
    ),
    entry(
        ini("minimum_timestep", Float, "simulation"),
        sqlite("minimum_sim_time_step", Float, GLOBAL_SETTINGS),
        api("min_time_step", Float, float(0.1), TimeStep),
    ),
    entry(
        ini("maximum_timestep", Float, "simulation"),
        sqlite("maximum_sim_time_step", Float, GLOBAL_SETTINGS),
        api("max_time_step", Float, float(1.0), TimeStep),
    ),
    entry(
        ini("timestep_plus", Bool, "numerics"),
        sqlite("timestep_plus", Bool, GLOBAL_SETTINGS),
        api("use_time_step_stretch", Bool, boolean(false), TimeStep),
    ),
    entry(
        ini("output_timestep", Float, "output"),
        sqlite("output_time_step", Float, GLOBAL_SETTINGS),
        api("output_time_step", Float, float(1.0), TimeStep),
    ),
];

pub(super) static NUMERICAL: &[MappingEntry] = &[
    entry(
        ini("cfl_strictness_factor_1d", Float, "numerics"),
        sqlite("cfl_strictness_factor_1d", Float, NUMERICAL_SETTINGS),
        api("cfl_strictness_factor_1d", Float, float(1.0), Numerical),
    ),
    entry(
        ini("cfl_strictness_factor_2d", Float, "numerics"),
        sqlite("cfl_strictness_factor_2d", Float, NUMERICAL_SETTINGS),
        api("cfl_strictness_factor_2d", Float, float(1.0), Numerical),
    ),
    entry(
        ini("flow_direction_threshold", Float, "numerics"),
        sqlite("flow_direction_threshold", Float, NUMERICAL_SETTINGS),
        api("flow_direction_threshold", Float, float(1e-5), Numerical),
    ),
    entry(
        ini("convergence_cg", Float, "numerics"),
        sqlite("convergence_cg", Float, NUMERICAL_SETTINGS),
        api("convergence_cg", Float, float(1e-9), Numerical),
    ),
    entry(
        ini("friction_shallow_water_correction", Int, "physical_attributes"),
        sqlite("frict_shallow_water_correction", Int, NUMERICAL_SETTINGS),
        api("friction_shallow_water_depth_correction", Int, int(0), Numerical),
    ),
    entry(
        ini("general_numerical_threshold", Float, "numerics"),
        sqlite("general_numerical_threshold", Float, NUMERICAL_SETTINGS),
        api("general_numerical_threshold", Float, float(1e-8), Numerical),
    ),
    entry(
        ini("integration_method", Int, "numerics"),
        sqlite("integration_method", Int, NUMERICAL_SETTINGS),
        api("time_integration_method", Int, int(0), Numerical),
    ),
    entry(
        ini("limiter_grad_1d", Int, "numerics"),
        sqlite("limiter_grad_1d", Int, NUMERICAL_SETTINGS),
        api("limiter_waterlevel_gradient_1d", Int, int(1), Numerical),
    ),
    entry(
        ini("limiter_grad_2d", Int, "numerics"),
        sqlite("limiter_grad_2d", Int, NUMERICAL_SETTINGS),
        api("limiter_waterlevel_gradient_2d", Int, int(1), Numerical),
    ),
    entry(
        ini("limiter_slope_crossectional_area_2d", Int, "numerics"),
        sqlite("limiter_slope_crossectional_area_2d", Int, NUMERICAL_SETTINGS),
        api("limiter_slope_crossectional_area_2d", Int, int(0), Numerical),
    ),
    entry(
        ini("limiter_slope_friction_2d", Int, "numerics"),
        sqlite("limiter_slope_friction_2d", Int, NUMERICAL_SETTINGS),
        api("limiter_slope_friction_2d", Int, int(0), Numerical),
    ),
    entry(
        ini("max_nonlinear_iteration", Int, "numerics"),
        sqlite("max_nonlin_iterations", Int, NUMERICAL_SETTINGS),
        api("max_non_linear_newton_iterations", Int, int(20), Numerical),
    ),
    entry(
        ini("maximum_degree", Int, "numerics"),
        sqlite("max_degree", Int, NUMERICAL_SETTINGS),
        api("max_degree_gauss_seidel", Int, int(20), Numerical),
    ),
    entry(
        ini("minimum_friction_velocity", Float, "numerics"),
        sqlite("minimum_friction_velocity", Float, NUMERICAL_SETTINGS),
        api("min_friction_velocity", Float, float(0.01), Numerical),
    ),
    entry(
        ini("minimum_surface_area", Float, "numerics"),
        sqlite("minimum_surface_area", Float, NUMERICAL_SETTINGS),
        api("min_surface_area", Float, float(1e-8), Numerical),
    ),
    entry(
        ini("precon_cg", Int, "numerics"),
        sqlite("precon_cg", Int, NUMERICAL_SETTINGS),
        api("use_preconditioner_cg", Int, int(1), Numerical),
    ),
    entry(
        ini("preissmann_slot", Float, "numerics"),
        sqlite("preissmann_slot", Float, NUMERICAL_SETTINGS),
        api("preissmann_slot", Float, float(0.0), Numerical),
    ),
    entry(
        ini("pump_implicit_ratio", Float, "numerics"),
        sqlite("pump_implicit_ratio", Float, NUMERICAL_SETTINGS),
        api("pump_implicit_ratio", Float, float(1.0), Numerical),
    ),
    entry(
        ini("thin_water_layer_definition", Float, "numerics"),
        sqlite("thin_water_layer_definition", Float, NUMERICAL_SETTINGS),
        api("limiter_slope_thin_water_layer", Float, float(0.01), Numerical),
    ),
    entry(
        ini("use_of_cg", Int, "numerics"),
        sqlite("use_of_cg", Int, NUMERICAL_SETTINGS),
        api("use_of_cg", Int, int(20), Numerical),
    ),
    entry(
        ini("nested_newton", Int, "numerics"),
        sqlite("use_of_nested_newton", Int, NUMERICAL_SETTINGS),
        api("use_nested_newton", Bool, boolean(true), Numerical),
    ),
    // flooding_threshold lives in the global settings table of the sqlite schema
    entry(
        ini("flooding_threshold", Float, "numerics"),
        sqlite("flooding_threshold", Float, GLOBAL_SETTINGS),
        api("flooding_threshold", Float, float(1e-6), Numerical),
    ),
];

pub(super) static AGGREGATION: &[MappingEntry] = &[
    entry(
        legacy("flow_variable", Str),
        sqlite("flow_variable", Str, AGGREGATION_SETTINGS),
        api("flow_variable", Str, None, Aggregation),
    ),
    entry(
        legacy("aggregation_method", Str),
        sqlite("aggregation_method", Str, AGGREGATION_SETTINGS),
        api("method", Str, None, Aggregation),
    ),
    entry(
        legacy("timestep", Float),
        sqlite("timestep", Str, AGGREGATION_SETTINGS),
        api("interval", Float, None, Aggregation),
    ),
];

/// Name of the SQLite table holding the global settings rows.
pub(crate) const GLOBAL_SETTINGS_TABLE: &str = GLOBAL_SETTINGS;
/// Name of the SQLite table holding the numerical settings rows.
pub(crate) const NUMERICAL_SETTINGS_TABLE: &str = NUMERICAL_SETTINGS;
/// Name of the SQLite table holding the aggregation rows.
pub(crate) const AGGREGATION_SETTINGS_TABLE: &str = AGGREGATION_SETTINGS;
