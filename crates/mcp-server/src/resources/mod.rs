//! Built-in resources

mod info;
mod sensor;

pub use info::ServerInfoResource;
pub use sensor::LastMeasurementResource;

use std::sync::Arc;
use tracing::{info, warn};

use crate::protocol::ServerInfo;
use crate::registry::{RegistryError, ResourceRegistry, ToolRegistry};
use crate::server::Collaborators;

/// Register `server://info` and one `sensor://{deviceId}/last` per known sensor
pub async fn register_builtin_resources(
    registry: &Arc<ResourceRegistry>,
    collaborators: &Collaborators,
    server_info: &ServerInfo,
    tools: Option<Arc<ToolRegistry>>,
) -> Result<(), RegistryError> {
    let mut info = ServerInfoResource::new(server_info.clone()).with_resources(registry);
    if let Some(tools) = tools {
        info = info.with_tools(tools);
    }
    registry
        .register(ServerInfoResource::definition(), Arc::new(info))
        .await?;

    let sensors = collaborators.accounts.sensors().await?;
    for sensor in sensors {
        let resource = LastMeasurementResource::definition(&sensor);
        match registry
            .register(
                resource,
                Arc::new(LastMeasurementResource::new(
                    sensor.device_id.clone(),
                    collaborators.measurements.clone(),
                )),
            )
            .await
        {
            // Several sensors may share a device; one resource is enough
            Err(RegistryError::DuplicateResource(uri)) => {
                info!("Skipping duplicate resource {}", uri);
            }
            Err(e @ RegistryError::InvalidUri { .. }) => {
                warn!("Skipping sensor {}: {}", sensor.id, e);
            }
            other => other?,
        }
    }

    Ok(())
}
