//! Event Multiplexer (§4.5). Single task owning the daemon event
//! subscription: filters relevant events, fans out to per-config watcher
//! buffers, reconnects on failure, and probes liveness when idle.

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::sync::mpsc;

use crate::config::Config;
use crate::docker::DockerClient;
use crate::generator::{full_resync, signal};
use crate::render::Renderer;
use crate::state::AmbientState;

const IDLE_TIMEOUT: Duration = Duration::from_secs(10);
const RECONNECT_DELAY: Duration = Duration::from_secs(10);

/// Whether a closed event channel should be followed by a reconnect attempt
/// or a clean shutdown (§9 open question: retry must stay enabled unless a
/// terminal signal is also expected to arrive). Fixed at `true` for this
/// crate — not exposed as a runtime toggle.
const RETRY_ON_CLOSE: bool = true;

#[allow(clippy::too_many_arguments)]
pub async fn run(
    endpoint: String,
    docker: Arc<DockerClient>,
    state: Arc<AmbientState>,
    renderer: Arc<dyn Renderer>,
    configs: Arc<Vec<Config>>,
    all: bool,
    watchers: Vec<mpsc::Sender<()>>,
) {
    'reconnect: loop {
        let event_client = match DockerClient::new(&endpoint) {
            Ok(client) => client,
            Err(e) => {
                tracing::warn!(error = %e, "event multiplexer failed to build docker client, retrying");
                if shutdown_or_sleep(RECONNECT_DELAY).await {
                    return;
                }
                continue 'reconnect;
            }
        };

        full_resync(&docker, &state, renderer.as_ref(), &configs, all).await;

        let events = event_client.stream_events();
        tokio::pin!(events);

        loop {
            tokio::select! {
                biased;

                _ = signal::await_shutdown() => {
                    tracing::info!("event multiplexer shutting down");
                    return;
                }

                next = tokio::time::timeout(IDLE_TIMEOUT, events.next()) => {
                    match next {
                        Ok(Some(Ok(message))) => {
                            if is_relevant(&message) {
                                for tx in &watchers {
                                    if tx.send(()).await.is_err() {
                                        tracing::warn!("watcher channel closed while broadcasting event");
                                    }
                                }
                            }
                        }
                        Ok(Some(Err(e))) => {
                            tracing::warn!(error = %e, "event stream error, reconnecting");
                            break;
                        }
                        Ok(None) => {
                            tracing::warn!("event stream closed by daemon");
                            if !RETRY_ON_CLOSE {
                                return;
                            }
                            break;
                        }
                        Err(_elapsed) => {
                            if let Err(e) = event_client.ping().await {
                                tracing::warn!(error = %e, "liveness ping failed, reconnecting");
                                break;
                            }
                        }
                    }
                }
            }
        }

        if shutdown_or_sleep(RECONNECT_DELAY).await {
            return;
        }
    }
}

/// Sleeps for `delay`, but returns `true` immediately (without finishing the
/// sleep) if a shutdown signal arrives first.
async fn shutdown_or_sleep(delay: Duration) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(delay) => false,
        _ = signal::await_shutdown() => true,
    }
}

fn is_relevant(event: &bollard::models::EventMessage) -> bool {
    let action = event.action.as_deref().unwrap_or_default();
    let event_type = event
        .typ
        .as_ref()
        .map(|t| format!("{t:?}").to_lowercase())
        .unwrap_or_default();

    match event_type.as_str() {
        "container" => matches!(action, "start" | "stop" | "die"),
        "service" => action == "update",
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bollard::models::{EventMessage, EventMessageTypeEnum};

    fn event(typ: EventMessageTypeEnum, action: &str) -> EventMessage {
        EventMessage {
            typ: Some(typ),
            action: Some(action.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn container_start_stop_die_are_relevant() {
        assert!(is_relevant(&event(EventMessageTypeEnum::CONTAINER, "start")));
        assert!(is_relevant(&event(EventMessageTypeEnum::CONTAINER, "stop")));
        assert!(is_relevant(&event(EventMessageTypeEnum::CONTAINER, "die")));
    }

    #[test]
    fn container_other_actions_are_not_relevant() {
        assert!(!is_relevant(&event(EventMessageTypeEnum::CONTAINER, "exec_create")));
    }

    #[test]
    fn service_update_is_relevant() {
        assert!(is_relevant(&event(EventMessageTypeEnum::SERVICE, "update")));
    }

    #[test]
    fn service_other_actions_are_not_relevant() {
        assert!(!is_relevant(&event(EventMessageTypeEnum::SERVICE, "create")));
    }

    #[test]
    fn other_types_are_not_relevant() {
        assert!(!is_relevant(&event(EventMessageTypeEnum::NETWORK, "connect")));
    }
}
