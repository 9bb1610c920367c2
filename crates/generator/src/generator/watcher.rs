//! Per-Watcher Consumer (§4.6). Consumes the debounced output stream for one
//! watching config; each tick builds a fresh context and notifies without
//! forcing (event-driven regenerations notify only on content change).

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::config::Config;
use crate::context;
use crate::docker::DockerClient;
use crate::generator::notifier;
use crate::render::Renderer;
use crate::state::AmbientState;

pub async fn run(
    docker: Arc<DockerClient>,
    state: Arc<AmbientState>,
    renderer: Arc<dyn Renderer>,
    config: Config,
    all: bool,
    mut ticks: mpsc::Receiver<()>,
) {
    while ticks.recv().await.is_some() {
        match context::generate_context(&docker, &state, all).await {
            Ok(ctx) => {
                notifier::generate_and_notify(&docker, renderer.as_ref(), &config, &ctx, false).await;
            }
            Err(e) => {
                tracing::warn!(dest = %config.dest.display(), error = %e, "failed to build context for event tick, skipping");
            }
        }
    }
}
