//! Context Builder (§3, §4.8) — turns one snapshot of the daemon into the
//! immutable [`Context`] the renderer consumes.

pub mod services;

use std::collections::HashMap;

use serde::Serialize;

use crate::docker::{DockerClient, DockerError};
use crate::state::{AmbientState, DaemonInfo};

pub use services::{Service, ServiceNetwork};

const LABEL_NODE_ID: &str = "com.docker.swarm.node.id";
const LABEL_SERVICE_ID: &str = "com.docker.swarm.service.id";

#[derive(Debug, Clone, Default, Serialize)]
pub struct Image {
    pub registry: String,
    pub repository: String,
    pub tag: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Address {
    pub ip: String,
    pub ip6_link_local: String,
    pub ip6_global: String,
    pub port: String,
    pub proto: String,
    pub host_ip: Option<String>,
    pub host_port: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NetworkRecord {
    pub name: String,
    pub ip: String,
    pub gateway: String,
    pub endpoint_id: String,
    pub ipv6_gateway: String,
    pub global_ipv6_address: String,
    pub mac_address: String,
    pub global_ipv6_prefix_len: i64,
    pub ip_prefix_len: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Volume {
    pub path: String,
    pub host_path: String,
    pub read_write: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Mount {
    pub name: String,
    pub source: String,
    pub destination: String,
    pub driver: String,
    pub mode: String,
    pub rw: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeRef {
    pub id: String,
    pub name: String,
    pub address_ip: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RuntimeContainer {
    pub id: String,
    pub name: String,
    pub hostname: String,
    pub image: Image,
    pub running: bool,
    pub gateway: String,
    pub ip: String,
    pub ip6_link_local: String,
    pub ip6_global: String,
    pub addresses: Vec<Address>,
    pub networks: Vec<NetworkRecord>,
    pub volumes: HashMap<String, Volume>,
    pub mounts: Vec<Mount>,
    pub env: HashMap<String, String>,
    pub labels: HashMap<String, String>,
    pub node: Option<NodeRef>,
    pub service: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Context {
    pub containers: Vec<RuntimeContainer>,
    pub services: HashMap<String, Service>,
    pub info: Option<DaemonInfo>,
}

/// `generate_context()` (§4.8). Fatal only if the container list call itself
/// fails; everything downstream of that is best-effort and logged.
pub async fn generate_context(
    docker: &DockerClient,
    state: &AmbientState,
    all: bool,
) -> Result<Context, DockerError> {
    state.refresh_info(docker).await;

    if let Err(e) = services::refresh_services(docker, state).await {
        tracing::warn!(error = %e, "failed to refresh services, using stale data");
    }

    let summaries = docker.list_containers(all).await?;
    let services = state.snapshot_services();

    let mut containers = Vec::with_capacity(summaries.len());
    for summary in summaries {
        let Some(id) = summary.id.clone() else {
            continue;
        };
        let inspect = match docker.inspect_container(&id).await {
            Ok(inspect) => inspect,
            Err(e) => {
                tracing::warn!(container_id = %id, error = %e, "failed to inspect container, skipping");
                continue;
            }
        };
        match build_runtime_container(docker, inspect, &services).await {
            Ok(container) => containers.push(container),
            Err(e) => {
                tracing::warn!(container_id = %id, error = %e, "failed to build container context, skipping")
            }
        }
    }

    Ok(Context {
        containers,
        services,
        info: state.snapshot_info().await,
    })
}

async fn build_runtime_container(
    docker: &DockerClient,
    inspect: bollard::models::ContainerInspectResponse,
    services: &HashMap<String, Service>,
) -> Result<RuntimeContainer, DockerError> {
    let id = inspect.id.unwrap_or_default();
    let name = inspect
        .name
        .map(|n| n.trim_start_matches('/').to_string())
        .unwrap_or_default();

    let config = inspect.config.unwrap_or_default();
    let hostname = config.hostname.clone().unwrap_or_default();
    let labels = config.labels.clone().unwrap_or_default();
    let env = config
        .env
        .clone()
        .unwrap_or_default()
        .into_iter()
        .filter_map(|entry| entry.split_once('=').map(|(k, v)| (k.to_string(), v.to_string())))
        .collect::<HashMap<_, _>>();
    let image = parse_image(config.image.as_deref().unwrap_or_default());

    let running = inspect
        .state
        .as_ref()
        .and_then(|s| s.running)
        .unwrap_or(false);

    let network_settings = inspect.network_settings.unwrap_or_default();
    let gateway = network_settings.gateway.clone().unwrap_or_default();
    let ip = network_settings.ip_address.clone().unwrap_or_default();
    let ip6_global = network_settings
        .global_ipv6_address
        .clone()
        .unwrap_or_default();
    // Docker's container-inspect API has no link-local IPv6 field distinct
    // from the per-network endpoint settings below; left empty here.
    let ip6_link_local = String::new();

    let mut addresses = Vec::new();
    if let Some(ports) = network_settings.ports.as_ref() {
        for (port_proto, bindings) in ports {
            let (port, proto) = port_proto
                .split_once('/')
                .unwrap_or((port_proto.as_str(), "tcp"));
            let binding = bindings.as_ref().and_then(|b| b.first());
            addresses.push(Address {
                ip: ip.clone(),
                ip6_link_local: ip6_link_local.clone(),
                ip6_global: ip6_global.clone(),
                port: port.to_string(),
                proto: proto.to_string(),
                host_ip: binding.and_then(|b| b.host_ip.clone()),
                host_port: binding.and_then(|b| b.host_port.clone()),
            });
        }
    }

    let mut networks = Vec::new();
    if let Some(nets) = network_settings.networks.as_ref() {
        for (net_name, endpoint) in nets {
            networks.push(NetworkRecord {
                name: net_name.clone(),
                ip: endpoint.ip_address.clone().unwrap_or_default(),
                gateway: endpoint.gateway.clone().unwrap_or_default(),
                endpoint_id: endpoint.endpoint_id.clone().unwrap_or_default(),
                ipv6_gateway: endpoint.ipv6_gateway.clone().unwrap_or_default(),
                global_ipv6_address: endpoint.global_ipv6_address.clone().unwrap_or_default(),
                mac_address: endpoint.mac_address.clone().unwrap_or_default(),
                global_ipv6_prefix_len: endpoint.global_ipv6_prefix_len.unwrap_or_default(),
                ip_prefix_len: endpoint.ip_prefix_len.unwrap_or_default(),
            });
        }
    }

    let mut mounts = Vec::new();
    let mut volumes = HashMap::new();
    for mp in inspect.mounts.unwrap_or_default() {
        let name = mp.name.clone().unwrap_or_default();
        let source = mp.source.clone().unwrap_or_default();
        let destination = mp.destination.clone().unwrap_or_default();
        let driver = mp.driver.clone().unwrap_or_default();
        let mode = mp.mode.clone().unwrap_or_default();
        let rw = mp.rw.unwrap_or(false);

        volumes.insert(
            destination.clone(),
            Volume {
                path: destination.clone(),
                host_path: source.clone(),
                read_write: rw,
            },
        );
        mounts.push(Mount {
            name,
            source,
            destination,
            driver,
            mode,
            rw,
        });
    }

    // bollard's `ContainerInspectResponse` doesn't expose the classic-swarm
    // embedded `Node` field (Docker removed it from the modern engine API);
    // node attribution always goes through the label below.
    let node = match labels.get(LABEL_NODE_ID) {
        Some(node_id) => match docker.inspect_node(node_id).await {
            Ok(Some(node)) => Some(NodeRef {
                id: node.id.clone().unwrap_or_default(),
                name: node
                    .description
                    .as_ref()
                    .and_then(|d| d.hostname.clone())
                    .unwrap_or_default(),
                address_ip: node
                    .status
                    .as_ref()
                    .and_then(|s| s.addr.clone())
                    .unwrap_or_default(),
            }),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(node_id = %node_id, error = %e, "failed to inspect node");
                None
            }
        },
        None => None,
    };

    let service = labels.get(LABEL_SERVICE_ID).and_then(|service_id| {
        if services.contains_key(service_id) {
            Some(service_id.clone())
        } else {
            tracing::warn!(service_id = %service_id, "container references unknown service");
            None
        }
    });

    Ok(RuntimeContainer {
        id,
        name,
        hostname,
        image,
        running,
        gateway,
        ip,
        ip6_link_local,
        ip6_global,
        addresses,
        networks,
        volumes,
        mounts,
        env,
        labels,
        node,
        service,
    })
}

/// Split an image reference into `(registry, repository, tag)` per the
/// standard Docker convention: a registry is present only when the first
/// path segment looks like a host (contains `.` or `:`, or is `localhost`);
/// the tag is whatever follows the last `:` after the last `/`, defaulting
/// to `latest`. A trailing `@digest` is stripped before tag splitting.
pub fn parse_image(image_ref: &str) -> Image {
    let without_digest = image_ref.split('@').next().unwrap_or(image_ref);

    let last_slash = without_digest.rfind('/');
    let tag_search_start = last_slash.map(|i| i + 1).unwrap_or(0);
    let (name_part, tag) = match without_digest[tag_search_start..].rfind(':') {
        Some(rel_colon) => {
            let colon = tag_search_start + rel_colon;
            (&without_digest[..colon], without_digest[colon + 1..].to_string())
        }
        None => (without_digest, "latest".to_string()),
    };

    let first_segment_end = name_part.find('/');
    let (registry, repository) = match first_segment_end {
        Some(idx) => {
            let first = &name_part[..idx];
            if first.contains('.') || first.contains(':') || first == "localhost" {
                (first.to_string(), name_part[idx + 1..].to_string())
            } else {
                (String::new(), name_part.to_string())
            }
        }
        None => (String::new(), name_part.to_string()),
    };

    Image {
        registry,
        repository,
        tag,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_image_bare_name_defaults_tag_latest() {
        let image = parse_image("nginx");
        assert_eq!(image.registry, "");
        assert_eq!(image.repository, "nginx");
        assert_eq!(image.tag, "latest");
    }

    #[test]
    fn parse_image_with_explicit_tag() {
        let image = parse_image("nginx:1.25");
        assert_eq!(image.registry, "");
        assert_eq!(image.repository, "nginx");
        assert_eq!(image.tag, "1.25");
    }

    #[test]
    fn parse_image_with_user_namespace_no_registry() {
        let image = parse_image("library/nginx:1.25");
        assert_eq!(image.registry, "");
        assert_eq!(image.repository, "library/nginx");
        assert_eq!(image.tag, "1.25");
    }

    #[test]
    fn parse_image_with_registry_host() {
        let image = parse_image("registry.example.com/library/nginx:1.25");
        assert_eq!(image.registry, "registry.example.com");
        assert_eq!(image.repository, "library/nginx");
        assert_eq!(image.tag, "1.25");
    }

    #[test]
    fn parse_image_with_registry_and_port() {
        let image = parse_image("localhost:5000/myapp:latest");
        assert_eq!(image.registry, "localhost:5000");
        assert_eq!(image.repository, "myapp");
        assert_eq!(image.tag, "latest");
    }

    #[test]
    fn parse_image_strips_digest_before_tag_split() {
        let image = parse_image(
            "nginx@sha256:e9954c1fc875017be1c3e36eca16be2d9e9bccc4bf072163515467d6a823c7b",
        );
        assert_eq!(image.repository, "nginx");
        assert_eq!(image.tag, "latest");
    }

    #[test]
    fn parse_image_registry_without_namespace() {
        let image = parse_image("registry.example.com/nginx");
        assert_eq!(image.registry, "registry.example.com");
        assert_eq!(image.repository, "nginx");
        assert_eq!(image.tag, "latest");
    }
}
