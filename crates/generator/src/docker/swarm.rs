//! Swarm domain — just the reads the Context Builder and Notifier need:
//! services, tasks, and node inspection. Swarm administration (init/join/
//! leave, secrets, configs, service CRUD) has no counterpart in this crate.

use super::client::{DockerClient, DockerError};

impl DockerClient {
    /// List all swarm services.
    pub async fn list_services(&self) -> Result<Vec<bollard::models::Service>, DockerError> {
        match self
            .client
            .list_services(None::<bollard::query_parameters::ListServicesOptions>)
            .await
        {
            Ok(services) => Ok(services),
            Err(bollard::errors::Error::DockerResponseServerError {
                status_code: 503, ..
            }) => Err(DockerError::NotSwarmManager),
            Err(e) => Err(DockerError::from(e)),
        }
    }

    /// List the running tasks belonging to one swarm service.
    pub async fn list_tasks_for_service(
        &self,
        service_id: &str,
    ) -> Result<Vec<bollard::models::Task>, DockerError> {
        use bollard::query_parameters::ListTasksOptionsBuilder;
        use std::collections::HashMap;

        let mut filters = HashMap::new();
        filters.insert("service", vec![service_id]);
        let options = ListTasksOptionsBuilder::default().filters(&filters).build();

        match self.client.list_tasks(Some(options)).await {
            Ok(tasks) => Ok(tasks),
            Err(bollard::errors::Error::DockerResponseServerError {
                status_code: 503, ..
            }) => Err(DockerError::NotSwarmManager),
            Err(e) => Err(DockerError::from(e)),
        }
    }

    /// Inspect a single node by ID. `Ok(None)` means the node is gone or this
    /// daemon isn't a swarm manager — both are non-fatal for the caller.
    pub async fn inspect_node(
        &self,
        node_id: &str,
    ) -> Result<Option<bollard::models::Node>, DockerError> {
        match self.client.inspect_node(node_id).await {
            Ok(node) => Ok(Some(node)),
            Err(bollard::errors::Error::DockerResponseServerError {
                status_code: 503, ..
            }) => Ok(None),
            Err(bollard::errors::Error::DockerResponseServerError {
                status_code: 404, ..
            }) => Ok(None),
            Err(e) => Err(DockerError::from(e)),
        }
    }
}
