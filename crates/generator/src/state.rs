//! Ambient process-wide state (§5): the latest daemon `Info` and the
//! `Services` map, both refreshed by the Context Builder and read by
//! whatever needs them across regenerations. `Services` uses a `DashMap`
//! for the same reason the teacher's inventory cache does: a concurrently
//! read, occasionally rewritten id-keyed map.

use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::context::services::Service;
use crate::docker::DockerClient;

#[derive(Debug, Clone, Default, Serialize)]
pub struct DaemonInfo {
    pub name: Option<String>,
    pub server_version: Option<String>,
    pub swarm_node_id: Option<String>,
    /// From the construction-time `Version` probe (§4.1), not `Info`.
    pub api_version: Option<String>,
}

pub struct AmbientState {
    info: RwLock<Option<DaemonInfo>>,
    pub services: DashMap<String, Service>,
}

impl AmbientState {
    pub fn new() -> Self {
        Self {
            info: RwLock::new(None),
            services: DashMap::new(),
        }
    }

    /// Refresh daemon info. Failures are logged, not fatal (§4.8 step 1).
    /// Preserves whatever `api_version` the construction-time `Version`
    /// probe (`refresh_version`) already cached, since `Info` carries no
    /// equivalent field.
    pub async fn refresh_info(&self, docker: &DockerClient) {
        match docker.info().await {
            Ok(info) => {
                let swarm_node_id = info.swarm.as_ref().and_then(|s| s.node_id.clone());
                let mut guard = self.info.write().await;
                let api_version = guard.as_ref().and_then(|d| d.api_version.clone());
                *guard = Some(DaemonInfo {
                    name: info.name,
                    server_version: info.server_version,
                    swarm_node_id,
                    api_version,
                });
            }
            Err(e) => tracing::warn!(error = %e, "failed to refresh daemon info"),
        }
    }

    /// Construction-time `Version` probe (§4.1): caches the server's API
    /// version. Failures are logged, not fatal.
    pub async fn refresh_version(&self, docker: &DockerClient) {
        match docker.version().await {
            Ok(version) => {
                let mut guard = self.info.write().await;
                guard.get_or_insert_with(DaemonInfo::default).api_version = version.api_version;
            }
            Err(e) => tracing::warn!(error = %e, "failed to probe daemon version"),
        }
    }

    pub async fn snapshot_info(&self) -> Option<DaemonInfo> {
        self.info.read().await.clone()
    }

    pub fn snapshot_services(&self) -> std::collections::HashMap<String, Service> {
        self.services
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }
}

impl Default for AmbientState {
    fn default() -> Self {
        Self::new()
    }
}

pub type SharedState = Arc<AmbientState>;
