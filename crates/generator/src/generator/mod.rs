//! Coordinator (§4.1). Top-level state owner: wires the Context Builder,
//! Notifier, Debouncer, Event Multiplexer, and Signal Task together,
//! performs the initial full sync, then runs until every started task
//! completes.

pub mod debounce;
pub mod interval;
pub mod multiplexer;
pub mod notifier;
pub mod signal;
pub mod watcher;

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::config::{Config, Settings};
use crate::context;
use crate::docker::DockerClient;
use crate::error::GeneratorError;
use crate::render::Renderer;
use crate::state::AmbientState;

pub struct Generator {
    docker: Arc<DockerClient>,
    state: Arc<AmbientState>,
    renderer: Arc<dyn Renderer>,
    settings: Settings,
}

impl Generator {
    /// Resolves the endpoint and builds a Daemon Client. A version/info probe
    /// is attempted once here to seed ambient state; failure is logged, not
    /// fatal (§4.1).
    pub async fn new(settings: Settings, renderer: Arc<dyn Renderer>) -> Result<Self, GeneratorError> {
        let docker =
            DockerClient::new(&settings.docker_endpoint).map_err(GeneratorError::Docker)?;
        let state = AmbientState::new();
        state.refresh_version(&docker).await;
        state.refresh_info(&docker).await;

        Ok(Self {
            docker: Arc::new(docker),
            state: Arc::new(state),
            renderer,
            settings,
        })
    }

    /// Startup sync, then start interval/event subsystems, then block until
    /// every started task returns.
    pub async fn generate(self) -> Result<(), GeneratorError> {
        let Generator {
            docker,
            state,
            renderer,
            settings,
        } = self;

        state.refresh_info(&docker).await;

        let all_configs = settings.configs.configs.clone();
        full_resync(&docker, &state, renderer.as_ref(), &all_configs, settings.all).await;

        let mut tasks = Vec::new();

        for config in settings.configs.filter_intervals().into_iter().cloned() {
            let docker = Arc::clone(&docker);
            let state = Arc::clone(&state);
            let renderer = Arc::clone(&renderer);
            let all = settings.all;
            tasks.push(tokio::spawn(async move {
                interval::run(docker, state, renderer, config, all).await;
            }));
        }

        let watching: Vec<Config> = settings.configs.filter_watches().into_iter().cloned().collect();
        if !watching.is_empty() {
            let mut watcher_senders = Vec::with_capacity(watching.len());

            for config in watching {
                let (raw_tx, raw_rx) = mpsc::channel(100);
                let (out_tx, out_rx) = mpsc::channel(100);

                let wait = config.wait.clone();
                tasks.push(tokio::spawn(async move {
                    debounce::run(raw_rx, wait, out_tx).await;
                }));

                let docker = Arc::clone(&docker);
                let state = Arc::clone(&state);
                let renderer = Arc::clone(&renderer);
                let all = settings.all;
                tasks.push(tokio::spawn(async move {
                    watcher::run(docker, state, renderer, config, all, out_rx).await;
                }));

                watcher_senders.push(raw_tx);
            }

            let endpoint = settings.docker_endpoint.clone();
            let docker_mux = Arc::clone(&docker);
            let state_mux = Arc::clone(&state);
            let renderer_mux = Arc::clone(&renderer);
            let configs_mux = Arc::new(all_configs.clone());
            let all = settings.all;
            tasks.push(tokio::spawn(async move {
                multiplexer::run(
                    endpoint,
                    docker_mux,
                    state_mux,
                    renderer_mux,
                    configs_mux,
                    all,
                    watcher_senders,
                )
                .await;
            }));

            let docker_sig = Arc::clone(&docker);
            let state_sig = Arc::clone(&state);
            let renderer_sig = Arc::clone(&renderer);
            let configs_sig = all_configs.clone();
            let all = settings.all;
            tasks.push(tokio::spawn(async move {
                run_signal_and_resync(docker_sig, state_sig, renderer_sig, configs_sig, all).await;
            }));
        }

        for task in tasks {
            if let Err(e) = task.await {
                tracing::error!(error = %e, "generator task panicked");
            }
        }

        Ok(())
    }
}

/// Rebuild the context and re-render every config once, unconditionally
/// (used at startup, on first successful event subscription, and on
/// hangup). `force_notify=false`: a resync notifies only configs whose
/// output actually changed.
pub async fn full_resync(
    docker: &DockerClient,
    state: &AmbientState,
    renderer: &dyn Renderer,
    configs: &[Config],
    all: bool,
) {
    match context::generate_context(docker, state, all).await {
        Ok(ctx) => {
            for config in configs {
                notifier::generate_and_notify(docker, renderer, config, &ctx, false).await;
            }
        }
        Err(e) => tracing::error!(error = %e, "failed to build context for full resync"),
    }
}

async fn run_signal_and_resync(
    docker: Arc<DockerClient>,
    state: Arc<AmbientState>,
    renderer: Arc<dyn Renderer>,
    configs: Vec<Config>,
    all: bool,
) {
    let (resync_tx, mut resync_rx) = mpsc::channel(1);
    let signal_task = tokio::spawn(signal::run(resync_tx));

    while resync_rx.recv().await.is_some() {
        full_resync(&docker, &state, renderer.as_ref(), &configs, all).await;
    }

    if let Err(e) = signal_task.await {
        tracing::error!(error = %e, "signal task panicked");
    }
}
