//! Interval Task (§4.4), one per config with `Interval > 0`.

use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::context;
use crate::docker::DockerClient;
use crate::generator::{notifier, signal};
use crate::render::Renderer;
use crate::state::AmbientState;

pub async fn run(
    docker: Arc<DockerClient>,
    state: Arc<AmbientState>,
    renderer: Arc<dyn Renderer>,
    config: Config,
    all: bool,
) {
    let mut ticker = tokio::time::interval(Duration::from_secs(config.interval));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    // First tick fires immediately; the initial sync already rendered this
    // config once, so the first real tick is the one after it.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match context::generate_context(&docker, &state, all).await {
                    Ok(ctx) => {
                        notifier::generate_and_notify(&docker, renderer.as_ref(), &config, &ctx, true).await;
                    }
                    Err(e) => {
                        tracing::warn!(dest = %config.dest.display(), error = %e, "failed to build context for interval tick, skipping");
                    }
                }
            }
            _ = signal::await_shutdown() => {
                tracing::info!(dest = %config.dest.display(), "interval task shutting down");
                return;
            }
        }
    }
}
