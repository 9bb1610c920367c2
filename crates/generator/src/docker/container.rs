//! Container domain — list, inspect, kill-by-signal.

use super::client::{DockerClient, DockerError};

use bollard::models::ContainerInspectResponse;
use bollard::query_parameters::{KillContainerOptionsBuilder, ListContainersOptions};

impl DockerClient {
    /// List container IDs, honoring the `all` flag from the coordinator's
    /// construction-time configuration (§4.1 — "`All` flag that selects
    /// whether stopped containers are included").
    pub async fn list_containers(
        &self,
        all: bool,
    ) -> Result<Vec<bollard::models::ContainerSummary>, DockerError> {
        let options = Some(ListContainersOptions {
            all,
            ..Default::default()
        });
        self.client
            .list_containers(options)
            .await
            .map_err(DockerError::from)
    }

    pub async fn inspect_container(
        &self,
        id: &str,
    ) -> Result<ContainerInspectResponse, DockerError> {
        self.client
            .inspect_container(id, None)
            .await
            .map_err(|e| match e {
                bollard::errors::Error::DockerResponseServerError {
                    status_code: 404, ..
                } => DockerError::ContainerNotFound(id.to_string()),
                other => DockerError::BollardError(other),
            })
    }

    /// Send a named POSIX signal to a container (Notifier §4.3 steps 5/6).
    pub async fn kill_container(&self, id: &str, signal: &str) -> Result<(), DockerError> {
        let options = KillContainerOptionsBuilder::default()
            .signal(signal)
            .build();
        self.client
            .kill_container(id, Some(options))
            .await
            .map_err(|e| match e {
                bollard::errors::Error::DockerResponseServerError {
                    status_code: 404, ..
                } => DockerError::ContainerNotFound(id.to_string()),
                other => DockerError::BollardError(other),
            })
    }
}
