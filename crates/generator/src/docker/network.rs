//! Network domain — just enough to resolve a Swarm service's virtual IPs (§4.9).

use super::client::{DockerClient, DockerError};

impl DockerClient {
    /// Inspect a specific network.
    pub async fn inspect_network(
        &self,
        network_id: &str,
    ) -> Result<bollard::models::NetworkInspect, DockerError> {
        self.client
            .inspect_network(
                network_id,
                None::<bollard::query_parameters::InspectNetworkOptions>,
            )
            .await
            .map_err(DockerError::from)
    }
}
