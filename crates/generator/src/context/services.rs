//! Services Builder (§4.9) — refreshes the ambient `Services` map from the
//! daemon's swarm service list, resolving each service's virtual IPs against
//! network inspection.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::docker::{DockerClient, DockerError};
use crate::state::AmbientState;

#[derive(Debug, Clone, Serialize)]
pub struct ServiceNetwork {
    pub ip: String,
    pub name: String,
    pub scope: String,
    pub driver: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Service {
    pub id: String,
    pub name: String,
    pub labels: HashMap<String, String>,
    pub networks: Vec<ServiceNetwork>,
}

/// Refresh `state.services` in place. Builds the new set locally first so a
/// mid-refresh network-inspect failure leaves the previous (stale) map
/// untouched — "the entire services refresh fails" per §4.9 means the
/// caller's existing snapshot survives, not that it's torn down.
pub async fn refresh_services(
    docker: &DockerClient,
    state: &AmbientState,
) -> Result<(), DockerError> {
    let services = docker.list_services().await?;
    let mut built = Vec::with_capacity(services.len());

    for svc in services {
        let id = svc.id.clone().unwrap_or_default();
        let spec = svc.spec.clone().unwrap_or_default();
        let name = spec.name.clone().unwrap_or_default();
        let labels = spec.labels.clone().unwrap_or_default();

        let mut networks = Vec::new();
        if let Some(vips) = svc
            .endpoint
            .as_ref()
            .and_then(|e| e.virtual_ips.as_ref())
        {
            for vip in vips {
                let network_id = vip.network_id.clone().unwrap_or_default();
                if network_id.is_empty() {
                    continue;
                }
                let ip = strip_cidr(vip.addr.as_deref().unwrap_or_default());
                let inspect = docker.inspect_network(&network_id).await?;
                networks.push(ServiceNetwork {
                    ip,
                    name: inspect.name.clone().unwrap_or_default(),
                    scope: inspect
                        .scope
                        .map(|s| format!("{s:?}").to_lowercase())
                        .unwrap_or_default(),
                    driver: inspect.driver.clone().unwrap_or_default(),
                });
            }
        }

        built.push((id.clone(), Service { id, name, labels, networks }));
    }

    let fresh_ids: HashSet<String> = built.iter().map(|(id, _)| id.clone()).collect();
    state.services.retain(|id, _| fresh_ids.contains(id));
    for (id, service) in built {
        state.services.insert(id, service);
    }

    Ok(())
}

fn strip_cidr(addr: &str) -> String {
    addr.split('/').next().unwrap_or(addr).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_cidr_removes_suffix() {
        assert_eq!(strip_cidr("10.0.0.5/24"), "10.0.0.5");
    }

    #[test]
    fn strip_cidr_passes_through_bare_ip() {
        assert_eq!(strip_cidr("10.0.0.5"), "10.0.0.5");
    }
}
