//! Notifier (§4.3). Renders one config, then, depending on the change/force
//! bits, runs the notify command and signals listed containers/services.

use crate::config::Config;
use crate::context::Context;
use crate::docker::DockerClient;
use crate::render::Renderer;

pub async fn generate_and_notify(
    docker: &DockerClient,
    renderer: &dyn Renderer,
    config: &Config,
    ctx: &Context,
    force_notify: bool,
) {
    let changed = match renderer.generate_file(config, ctx) {
        Ok(changed) => changed,
        Err(e) => {
            tracing::error!(dest = %config.dest.display(), error = %e, "failed to render config");
            false
        }
    };

    if !changed && !force_notify {
        tracing::debug!(dest = %config.dest.display(), "unchanged, skipping notifications");
        return;
    }
    if !changed {
        tracing::debug!(dest = %config.dest.display(), "unchanged, notifying anyway");
    }

    run_notify_cmd(config).await;

    for (id, signal) in &config.notify_containers {
        if let Err(e) = docker.kill_container(id, signal).await {
            tracing::warn!(container_id = %id, signal = %signal, error = %e, "failed to signal container");
        }
    }

    for (service_name, signal) in &config.notify_services {
        signal_service(docker, service_name, signal).await;
    }
}

async fn run_notify_cmd(config: &Config) {
    if config.notify_cmd.is_empty() {
        return;
    }

    match tokio::process::Command::new("/bin/sh")
        .arg("-c")
        .arg(&config.notify_cmd)
        .output()
        .await
    {
        Ok(output) => {
            if !output.status.success() {
                tracing::warn!(cmd = %config.notify_cmd, status = %output.status, "notify command exited non-zero");
            }
            if config.notify_output {
                let combined = [output.stdout, output.stderr].concat();
                for line in String::from_utf8_lossy(&combined).lines() {
                    if !line.is_empty() {
                        tracing::info!(cmd = %config.notify_cmd, line = %line, "notify command output");
                    }
                }
            }
        }
        Err(e) => {
            tracing::warn!(cmd = %config.notify_cmd, error = %e, "failed to run notify command");
        }
    }
}

/// `NotifyServices` keys are Swarm service names; the Docker API's task list
/// filter accepts either a service name or id, so no name→id lookup step is
/// needed before calling `list_tasks_for_service`.
async fn signal_service(docker: &DockerClient, service_name: &str, signal: &str) {
    let tasks = match docker.list_tasks_for_service(service_name).await {
        Ok(tasks) => tasks,
        Err(e) => {
            tracing::warn!(service = %service_name, error = %e, "failed to list tasks for service");
            return;
        }
    };

    for task in tasks {
        let state = task
            .status
            .as_ref()
            .and_then(|s| s.state.as_ref())
            .map(|s| format!("{s:?}").to_lowercase());
        if state.as_deref() != Some("running") {
            continue;
        }

        let container_id = task
            .status
            .as_ref()
            .and_then(|s| s.container_status.as_ref())
            .and_then(|cs| cs.container_id.clone());

        if let Some(container_id) = container_id {
            if let Err(e) = docker.kill_container(&container_id, signal).await {
                tracing::warn!(
                    container_id = %container_id,
                    service = %service_name,
                    error = %e,
                    "failed to signal service task"
                );
            }
        }
    }
}
