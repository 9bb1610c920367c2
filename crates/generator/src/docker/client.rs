//! Docker client — core struct, constructor, error types.
//!
//! Domain methods live in sibling modules (`container`, `network`, `swarm`,
//! `event`) which add `impl DockerClient` blocks.

use bollard::Docker;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DockerError {
    #[error("Docker connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Container not found: {0}")]
    ContainerNotFound(String),
    #[error("This node is not a swarm manager")]
    NotSwarmManager,
    #[error("Bollard error: {0}")]
    BollardError(#[from] bollard::errors::Error),
}

#[derive(Debug, Clone)]
pub struct DockerClient {
    /// The bollard Docker client. `pub(super)` so sibling domain modules
    /// can call bollard APIs directly.
    pub(super) client: Docker,
}

impl DockerClient {
    pub fn new(endpoint: &str) -> Result<Self, DockerError> {
        let client = if endpoint.is_empty() {
            Docker::connect_with_local_defaults()
                .map_err(|e| DockerError::ConnectionFailed(e.to_string()))?
        } else if let Some(path) = endpoint.strip_prefix("unix://") {
            Docker::connect_with_socket(path, 120, &bollard::API_DEFAULT_VERSION)
                .map_err(|e| DockerError::ConnectionFailed(e.to_string()))?
        } else if endpoint.starts_with("tcp://") || endpoint.starts_with("http://") {
            Docker::connect_with_http(endpoint, 120, &bollard::API_DEFAULT_VERSION)
                .map_err(|e| DockerError::ConnectionFailed(e.to_string()))?
        } else {
            Docker::connect_with_socket(endpoint, 120, &bollard::API_DEFAULT_VERSION)
                .map_err(|e| DockerError::ConnectionFailed(e.to_string()))?
        };

        Ok(DockerClient { client })
    }

    /// Get Docker system information (includes swarm node_id, node_addr, etc.)
    pub async fn info(&self) -> Result<bollard::models::SystemInfo, DockerError> {
        self.client.info().await.map_err(DockerError::from)
    }

    /// Get the daemon version.
    pub async fn version(&self) -> Result<bollard::models::SystemVersion, DockerError> {
        self.client.version().await.map_err(DockerError::from)
    }

    /// Liveness probe used by the event multiplexer's idle timer.
    pub async fn ping(&self) -> Result<String, DockerError> {
        self.client.ping().await.map_err(DockerError::from)
    }
}
