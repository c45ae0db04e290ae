//! Dispatch of converted resources to the API create operations.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{error, info};

use crate::api::SettingsApi;
use crate::convert::ConvertedResource;
use crate::error::{Error, Result};
use crate::mapping::ResourceGroup;

/// Builds the API payload of a converted resource.
///
/// # Errors
///
/// Returns [`Error::Payload`] if the record does not fit the model, e.g. a
/// null value for a required field.
pub fn build_payload<T: DeserializeOwned>(resource: &ConvertedResource) -> Result<T> {
    serde_json::from_value(resource.to_json()).map_err(|e| Error::Payload {
        model: resource.group().model_name(),
        message: e.to_string(),
    })
}

async fn create(
    api: &dyn SettingsApi,
    simulation_id: i64,
    resource: &ConvertedResource,
) -> Result<Value> {
    let created = match resource.group() {
        ResourceGroup::General => serde_json::to_value(
            api.create_general_settings(simulation_id, &build_payload(resource)?)
                .await?,
        )?,
        ResourceGroup::TimeStep => serde_json::to_value(
            api.create_time_step_settings(simulation_id, &build_payload(resource)?)
                .await?,
        )?,
        ResourceGroup::Numerical => serde_json::to_value(
            api.create_numerical_settings(simulation_id, &build_payload(resource)?)
                .await?,
        )?,
        ResourceGroup::Aggregation => serde_json::to_value(
            api.create_aggregation_settings(simulation_id, &build_payload(resource)?)
                .await?,
        )?,
    };
    Ok(created)
}

/// Creates the resource through the create operation of its group.
///
/// Returns the server representation, or `None` after logging the failure.
pub async fn dispatch(
    api: &dyn SettingsApi,
    simulation_id: i64,
    resource: &ConvertedResource,
) -> Option<Value> {
    let model = resource.group().model_name();
    match create(api, simulation_id, resource).await {
        Ok(created) => {
            info!(
                "Successfully created resource {}. Server response: {}",
                model, created
            );
            Some(created)
        }
        Err(err) => {
            error!(
                "Could not create resource {}. Server response: {}",
                model, err
            );
            None
        }
    }
}
